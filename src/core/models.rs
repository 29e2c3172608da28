//! # Data Models Module / 数据模型模块
//!
//! This module defines the document model produced by the step tracker:
//! steps, attachments, failures and the per-unit test case report.
//! The types are plain data; the tracker is the only code that creates or closes steps.
//!
//! 此模块定义了步骤跟踪器生成的文档模型：
//! 步骤、附件、失败信息以及每个工作单元的测试用例报告。

use chrono::Utc;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Milliseconds since the Unix epoch, with microsecond precision.
/// 自 Unix 纪元以来的毫秒数，精度为微秒。
pub fn now_millis() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1000.0
}

/// The terminal status of a step or a test case.
/// 步骤或测试用例的最终状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The scope completed normally.
    /// 作用域正常完成。
    Passed,
    /// The scope raised an error, panicked, or contains a failed step.
    /// 作用域引发了错误、发生了 panic，或包含失败的步骤。
    Failed,
    /// The scope signalled a skip.
    /// 作用域发出了跳过信号。
    Skipped,
}

impl Status {
    /// The lowercase name used in rendered documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::Failed => "failed",
            Status::Skipped => "skipped",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Failed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A titled blob of evidence captured while a step was open.
/// 在步骤打开期间捕获的带标题的证据数据。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    title: String,
    /// Arbitrary bytes; not required to be valid text.
    /// 任意字节；不要求是有效文本。
    content: Vec<u8>,
    mime_type: Option<String>,
}

impl Attachment {
    pub fn new(title: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// One timed, named, status-bearing scope within a unit of work.
///
/// A step is created when its scope opens and closed exactly once when the scope exits.
/// After closing, its `stop` and `status` never change. A step that contains a failed
/// child is itself failed, whatever the outcome of its own body.
///
/// 工作单元内一个带计时、名称和状态的作用域。
/// 步骤在作用域打开时创建，并在作用域退出时恰好关闭一次。
/// 关闭后，其 `stop` 和 `status` 不再改变。包含失败子步骤的步骤本身也是失败的。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    name: String,
    start: f64,
    stop: Option<f64>,
    status: Option<Status>,
    children: Vec<Step>,
    attachments: Vec<Attachment>,
}

impl Step {
    pub(crate) fn open(name: String, start: f64) -> Self {
        Self {
            name,
            start,
            stop: None,
            status: None,
            children: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Fixes `stop` and the terminal status. A failed child overrides `outcome`.
    pub(crate) fn close(&mut self, stop: f64, outcome: Status) {
        if self.status.is_some() {
            return;
        }
        self.stop = Some(stop);
        self.status = Some(if self.has_failed_child() {
            Status::Failed
        } else {
            outcome
        });
    }

    pub(crate) fn push_child(&mut self, child: Step) {
        self.children.push(child);
    }

    pub(crate) fn push_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    /// `None` while the step is open.
    pub fn stop(&self) -> Option<f64> {
        self.stop
    }

    /// `None` while the step is open.
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn children(&self) -> &[Step] {
        &self.children
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_some()
    }

    pub fn has_failed_child(&self) -> bool {
        self.children
            .iter()
            .any(|child| child.status == Some(Status::Failed))
    }

    pub fn duration_ms(&self) -> Option<f64> {
        self.stop.map(|stop| stop - self.start)
    }

    /// Depth-first search for a step with the given name, starting with `self`.
    /// 从 `self` 开始，深度优先查找具有给定名称的步骤。
    pub fn find(&self, name: &str) -> Option<&Step> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

/// Counts every step in the given forest, nested steps included.
/// 统计给定步骤森林中的所有步骤（包括嵌套步骤）。
pub fn count_steps(steps: &[Step]) -> usize {
    steps
        .iter()
        .map(|step| 1 + count_steps(step.children()))
        .sum()
}

/// The error detail recorded for a failed (or skipped) unit of work.
/// 为失败（或跳过）的工作单元记录的错误详情。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// A one-line description of the failure / 失败的单行描述
    pub message: String,
    /// Extended detail such as an error chain / 扩展详情，例如错误链
    pub stack_trace: Option<String>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack_trace: None,
        }
    }

    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }
}

/// The sealed report of one execution of one unit of work.
///
/// Created by the report assembler when the unit starts and sealed when it ends.
/// Every step it contains has a terminal status.
///
/// 一个工作单元一次执行的封存报告。
/// 由报告组装器在单元开始时创建，在单元结束时封存。其中的每个步骤都有最终状态。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCaseReport {
    id: Uuid,
    name: String,
    status: Status,
    start: f64,
    stop: f64,
    failure: Option<Failure>,
    steps: Vec<Step>,
    attachments: Vec<Attachment>,
}

impl TestCaseReport {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: Uuid,
        name: String,
        status: Status,
        start: f64,
        stop: f64,
        failure: Option<Failure>,
        steps: Vec<Step>,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            id,
            name,
            status,
            start,
            stop,
            failure,
            steps,
            attachments,
        }
    }

    /// The stable identifier of this execution, also used to name persisted documents.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn duration_ms(&self) -> f64 {
        self.stop - self.start
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    /// The top-level steps, in open order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Attachments made while no step was open.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn find_step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find_map(|step| step.find(name))
    }

    pub fn step_count(&self) -> usize {
        count_steps(&self.steps)
    }
}
