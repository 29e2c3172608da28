//! Publishing a finished suite: documents to disk, summary to the console.
//! 发布已完成的测试套件：文档写入磁盘，摘要输出到控制台。

use anyhow::Result;
use colored::*;
use std::path::PathBuf;

use crate::core::config::ReportConfig;
use crate::infra::fs;
use crate::infra::t;
use crate::reporting::console::{print_failure_details, print_summary};
use crate::reporting::suite::SuiteReport;

/// Writes every document of `suite` into the configured results directory and prints
/// the console summary. Returns the written paths, test cases first.
///
/// 将 `suite` 的所有文档写入配置的结果目录并打印控制台摘要。返回写入的路径，测试用例在前。
pub fn publish(config: &ReportConfig, suite: &SuiteReport) -> Result<Vec<PathBuf>> {
    let locale = config.language.as_str();
    let dir = config.results_dir.as_path();
    fs::prepare_results_dir(dir, config.clean_results)?;

    let mut written = suite
        .cases()
        .iter()
        .map(|case| fs::write_test_case(dir, case))
        .collect::<Result<Vec<_>>>()?;
    written.push(fs::write_suite(dir, suite)?);
    if config.write_summary {
        written.push(fs::write_summary(dir, suite)?);
    }

    print_summary(suite, locale);
    print_failure_details(suite, locale);
    println!(
        "\n{}",
        t!(
            "publish.written",
            locale = locale,
            count = written.len(),
            dir = dir.display()
        )
        .cyan()
    );
    Ok(written)
}
