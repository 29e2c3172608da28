//! # Suite Module / 测试套件模块
//!
//! A suite is a named, ordered collection of units of work. Running it produces one
//! test case report per unit, collected into a [`SuiteReport`] in declaration order.
//!
//! Each unit gets its own tracker. In parallel runs every unit executes on a blocking
//! worker thread, so a tracker never crosses threads.
//!
//! 测试套件是命名的、有序的工作单元集合。运行它会为每个单元生成一个测试用例报告，
//! 并按声明顺序收集到 [`SuiteReport`] 中。

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::config::ReportConfig;
use crate::core::models::{Status, TestCaseReport, now_millis};
use crate::core::tracker::Tracker;
use crate::infra::t;
use crate::reporting::assembler::{UnitOutcome, UnitRun, run_unit};

type UnitBody = Arc<dyn Fn(&Tracker) -> anyhow::Result<()> + Send + Sync>;

/// Number of test cases per status.
/// 每种状态的测试用例数量。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }
}

/// The reports of one suite run.
/// 一次测试套件运行的报告。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    id: Uuid,
    name: String,
    start: f64,
    stop: f64,
    cases: Vec<TestCaseReport>,
}

impl SuiteReport {
    /// Groups already sealed reports; the suite's time span covers all of them.
    pub fn new(name: impl Into<String>, cases: Vec<TestCaseReport>) -> Self {
        let start = cases
            .iter()
            .map(TestCaseReport::start)
            .reduce(f64::min)
            .unwrap_or_else(now_millis);
        let stop = cases
            .iter()
            .map(TestCaseReport::stop)
            .reduce(f64::max)
            .unwrap_or(start);
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start,
            stop,
            cases,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    /// The test case reports, in declaration order.
    pub fn cases(&self) -> &[TestCaseReport] {
        &self.cases
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for case in &self.cases {
            match case.status() {
                Status::Passed => counts.passed += 1,
                Status::Failed => counts.failed += 1,
                Status::Skipped => counts.skipped += 1,
            }
        }
        counts
    }

    pub fn has_failures(&self) -> bool {
        self.cases.iter().any(|case| case.status().is_failure())
    }

    pub fn find_case(&self, name: &str) -> Option<&TestCaseReport> {
        self.cases.iter().find(|case| case.name() == name)
    }
}

/// A named, ordered collection of units of work.
/// 命名的、有序的工作单元集合。
#[derive(Clone)]
pub struct Suite {
    name: String,
    units: Vec<(String, UnitBody)>,
}

impl fmt::Debug for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field(
                "units",
                &self.units.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: Vec::new(),
        }
    }

    /// Appends a unit of work.
    pub fn unit(
        mut self,
        name: impl Into<String>,
        body: impl Fn(&Tracker) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.units.push((name.into(), Arc::new(body)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Runs every unit on the current thread, one after the other.
    /// 在当前线程上依次运行每个单元。
    pub fn run(&self) -> SuiteReport {
        let cases = self
            .units
            .iter()
            .map(|(name, body)| run_unit(name.clone(), |tracker| body(tracker)))
            .collect();
        SuiteReport::new(self.name.clone(), cases)
    }

    /// Runs the units with at most `jobs` of them at the same time.
    ///
    /// Units that have not started when `stop_token` is cancelled are reported as skipped.
    /// Reports keep declaration order.
    ///
    /// 以最多 `jobs` 个并发运行这些单元。
    /// 在 `stop_token` 被取消时尚未开始的单元将被报告为跳过。报告保持声明顺序。
    pub async fn run_parallel(
        &self,
        jobs: usize,
        stop_token: CancellationToken,
    ) -> anyhow::Result<SuiteReport> {
        let jobs = jobs.max(1);
        let mut indexed = stream::iter(self.units.iter().cloned().enumerate().map(
            |(index, (name, body))| {
                let stop_token = stop_token.clone();
                async move {
                    if stop_token.is_cancelled() {
                        let reason = t!("unit.cancelled").to_string();
                        let report = UnitRun::start(name).finish(UnitOutcome::Skipped(Some(reason)));
                        return Ok::<_, anyhow::Error>((index, report));
                    }
                    let report =
                        tokio::task::spawn_blocking(move || run_unit(name, |tracker| body(tracker)))
                            .await?;
                    Ok((index, report))
                }
            },
        ))
        .buffer_unordered(jobs)
        .collect::<Vec<anyhow::Result<(usize, TestCaseReport)>>>()
        .await
        .into_iter()
        .collect::<anyhow::Result<Vec<_>>>()?;

        indexed.sort_by_key(|(index, _)| *index);
        let cases = indexed.into_iter().map(|(_, report)| report).collect();
        Ok(SuiteReport::new(self.name.clone(), cases))
    }

    /// Runs the units in parallel with the configured number of jobs.
    /// 使用配置的并发数并行运行这些单元。
    pub async fn run_configured(
        &self,
        config: &ReportConfig,
        stop_token: CancellationToken,
    ) -> anyhow::Result<SuiteReport> {
        self.run_parallel(config.effective_jobs(), stop_token).await
    }
}
