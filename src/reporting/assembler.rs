//! # Report Assembler Module / 报告组装器模块
//!
//! The boundary between a host (test runner) and the step tracker. The host calls the
//! start hook when a unit of work begins and the end hook with its outcome when it
//! finishes; the assembler owns the unit's tracker in between and seals the report.
//!
//! `run_unit` and `run_unit_async` wrap both hooks around a closure or a future, catching
//! panics, and in the async case enforcing a timeout and honouring cancellation.
//!
//! 宿主（测试运行器）与步骤跟踪器之间的边界。宿主在工作单元开始时调用开始钩子，
//! 在结束时携带结果调用结束钩子；组装器在此期间拥有该单元的跟踪器并封存报告。

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::pin;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::config::ReportConfig;
use crate::core::models::{Failure, Status, TestCaseReport};
use crate::core::tracker::{Skip, Tracker, clear_skip_signal, panic_message, panic_status};
use crate::infra::t;

/// The outcome of a unit of work as reported by the host.
/// 宿主报告的工作单元结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Passed,
    Failed(Failure),
    /// Skipped, with an optional reason.
    Skipped(Option<String>),
}

impl UnitOutcome {
    pub fn status(&self) -> Status {
        match self {
            UnitOutcome::Passed => Status::Passed,
            UnitOutcome::Failed(_) => Status::Failed,
            UnitOutcome::Skipped(_) => Status::Skipped,
        }
    }

    /// Classifies a caught panic payload.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        clear_skip_signal();
        let message = panic_message(payload);
        match panic_status(payload) {
            Status::Skipped => UnitOutcome::Skipped(Some(message)),
            _ => UnitOutcome::Failed(Failure::new(message)),
        }
    }

    /// Classifies an error returned by the unit body. A [`Skip`] error is a skip.
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<Skip>() {
            Some(skip) => UnitOutcome::Skipped(Some(skip.reason().to_string())),
            None => {
                UnitOutcome::Failed(Failure::new(err.to_string()).with_stack_trace(format!("{err:?}")))
            }
        }
    }

    pub fn from_result(result: &anyhow::Result<()>) -> Self {
        match result {
            Ok(()) => UnitOutcome::Passed,
            Err(err) => Self::from_error(err),
        }
    }
}

/// One unit of work between its start and end hooks.
/// 处于开始钩子和结束钩子之间的一个工作单元。
#[derive(Debug)]
pub struct UnitRun {
    id: Uuid,
    name: String,
    start: f64,
    tracker: Tracker,
}

impl UnitRun {
    /// Start hook: creates a fresh report and its tracker.
    /// 开始钩子：创建新的报告及其跟踪器。
    pub fn start(name: impl Into<String>) -> Self {
        let name = name.into();
        let tracker = Tracker::new(name.clone());
        let start = tracker.now();
        Self {
            id: Uuid::new_v4(),
            name,
            start,
            tracker,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tracker to pass down to the unit body.
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// End hook: seals the tracker and produces the report.
    ///
    /// Steps still open are closed as `Failed` at the seal time. The report status is the
    /// host outcome, unless a top-level step failed, which makes the report `Failed`.
    ///
    /// 结束钩子：封存跟踪器并生成报告。
    pub fn finish(self, outcome: UnitOutcome) -> TestCaseReport {
        let trace = self.tracker.seal();
        let failed_step = trace
            .steps
            .iter()
            .find(|step| step.status() == Some(Status::Failed))
            .map(|step| step.name().to_string());

        let status = match failed_step {
            Some(_) => Status::Failed,
            None => outcome.status(),
        };
        let failure = match outcome {
            UnitOutcome::Failed(failure) => Some(failure),
            UnitOutcome::Skipped(reason) => reason.map(Failure::new),
            UnitOutcome::Passed => None,
        };
        let failure = match (failure, failed_step) {
            (None, Some(step)) => Some(Failure::new(t!("failure.step_failed", step = step))),
            (failure, _) => failure,
        };

        TestCaseReport::new(
            self.id,
            self.name,
            status,
            self.start,
            trace.stop,
            failure,
            trace.steps,
            trace.attachments,
        )
    }
}

/// Runs a synchronous unit of work and returns its sealed report.
///
/// `Ok` passes, a [`Skip`] error or `skip()` panic skips, any other error or panic fails.
///
/// 运行同步工作单元并返回其封存的报告。
pub fn run_unit(
    name: impl Into<String>,
    body: impl FnOnce(&Tracker) -> anyhow::Result<()>,
) -> TestCaseReport {
    let run = UnitRun::start(name);
    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| body(run.tracker()))) {
        Ok(result) => UnitOutcome::from_result(&result),
        Err(payload) => UnitOutcome::from_panic(&*payload),
    };
    run.finish(outcome)
}

/// Runs an asynchronous unit of work and returns its sealed report.
///
/// When `timeout` elapses or `stop_token` is cancelled first, the body future is dropped
/// (closing its open steps as `Failed`) and the report fails with the partial trace.
///
/// 运行异步工作单元并返回其封存的报告。
/// 超时或取消时会丢弃主体 future（将其打开的步骤关闭为 `Failed`），报告以部分轨迹失败。
pub async fn run_unit_async<F, Fut>(
    name: impl Into<String>,
    timeout: Option<Duration>,
    stop_token: CancellationToken,
    body: F,
) -> TestCaseReport
where
    F: FnOnce(Tracker) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let run = UnitRun::start(name);
    let execution = AssertUnwindSafe(body(run.tracker().clone())).catch_unwind();
    let deadline = async {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };

    // The body future lives in this block so that it is dropped after the tracker is
    // interrupted: steps it still holds open then close as failed.
    let outcome = {
        let mut execution = pin!(execution);
        tokio::select! {
            biased;
            _ = stop_token.cancelled() => {
                run.tracker().interrupt();
                UnitOutcome::Failed(Failure::new(t!("unit.cancelled")))
            }
            finished = &mut execution => match finished {
                Ok(result) => UnitOutcome::from_result(&result),
                Err(payload) => UnitOutcome::from_panic(&*payload),
            },
            _ = deadline => {
                run.tracker().interrupt();
                let secs = timeout.unwrap_or_default().as_secs_f64();
                UnitOutcome::Failed(Failure::new(t!("unit.timeout", secs = format!("{secs:.1}"))))
            }
        }
    };
    run.finish(outcome)
}

/// Runs an asynchronous unit of work under the configured unit timeout.
/// 在配置的单元超时下运行异步工作单元。
pub async fn run_configured_unit_async<F, Fut>(
    config: &ReportConfig,
    name: impl Into<String>,
    stop_token: CancellationToken,
    body: F,
) -> TestCaseReport
where
    F: FnOnce(Tracker) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    run_unit_async(name, config.unit_timeout(), stop_token, body).await
}
