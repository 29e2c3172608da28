//! # File System Operations Module / 文件系统操作模块
//!
//! This module persists rendered reports: one document per test case, one per suite
//! and a JSON summary, all inside a results directory.
//!
//! 此模块持久化渲染后的报告：每个测试用例一个文档、每个测试套件一个文档
//! 以及一个 JSON 摘要，全部位于结果目录中。

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::models::TestCaseReport;
use crate::reporting::suite::{StatusCounts, SuiteReport};

/// File name of the JSON summary.
pub const SUMMARY_FILE: &str = "summary.json";

/// Creates the results directory, optionally removing what a previous run left there.
///
/// # Arguments
/// * `dir` - The results directory
/// * `clean` - Whether to remove existing contents first
pub fn prepare_results_dir(dir: &Path, clean: bool) -> Result<()> {
    if clean && dir.exists() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to clean results directory: {}", dir.display()))?;
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create results directory: {}", dir.display()))
}

fn write_document(path: PathBuf, content: &[u8]) -> Result<PathBuf> {
    fs::write(&path, content)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(path)
}

/// Writes `<id>-testcase.xml` and returns its path.
pub fn write_test_case(dir: &Path, report: &TestCaseReport) -> Result<PathBuf> {
    write_document(
        dir.join(format!("{}-testcase.xml", report.id())),
        &report.to_xml(),
    )
}

/// Writes `<id>-testsuite.xml` and returns its path.
pub fn write_suite(dir: &Path, suite: &SuiteReport) -> Result<PathBuf> {
    write_document(
        dir.join(format!("{}-testsuite.xml", suite.id())),
        &suite.to_xml(),
    )
}

#[derive(Serialize)]
struct Summary<'a> {
    suite: &'a str,
    counts: StatusCounts,
    duration_ms: f64,
    cases: Vec<CaseSummary<'a>>,
}

#[derive(Serialize)]
struct CaseSummary<'a> {
    id: String,
    name: &'a str,
    status: &'static str,
    duration_ms: f64,
    steps: usize,
}

/// Writes `summary.json`: counts per status plus one line per test case.
pub fn write_summary(dir: &Path, suite: &SuiteReport) -> Result<PathBuf> {
    let summary = Summary {
        suite: suite.name(),
        counts: suite.counts(),
        duration_ms: suite.stop() - suite.start(),
        cases: suite
            .cases()
            .iter()
            .map(|case| CaseSummary {
                id: case.id().to_string(),
                name: case.name(),
                status: case.status().as_str(),
                duration_ms: case.duration_ms(),
                steps: case.step_count(),
            })
            .collect(),
    };
    let json = serde_json::to_vec_pretty(&summary).context("Failed to serialize summary")?;
    write_document(dir.join(SUMMARY_FILE), &json)
}
