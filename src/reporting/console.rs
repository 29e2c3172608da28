//! # Console Reporting Module / 控制台报告模块
//!
//! This module handles the display of suite results in the console.
//! It provides functionality for printing colorful, formatted summaries and step trees
//! with internationalization support.
//!
//! 此模块处理控制台中测试套件结果的显示。
//! 它提供打印彩色格式化摘要和步骤树的功能，支持国际化。

use colored::*;

use crate::core::models::{Status, Step, TestCaseReport};
use crate::infra::t;
use crate::reporting::suite::SuiteReport;

fn status_label(status: Status, locale: &str) -> ColoredString {
    match status {
        Status::Passed => t!("status.passed", locale = locale).green(),
        Status::Failed => t!("status.failed", locale = locale).red(),
        Status::Skipped => t!("status.skipped", locale = locale).dimmed(),
    }
}

/// Formats a duration in milliseconds: `12.3ms` below a second, `1.50s` above.
pub fn format_duration(millis: f64) -> String {
    if millis >= 1000.0 {
        format!("{:.2}s", millis / 1000.0)
    } else {
        format!("{:.1}ms", millis)
    }
}

/// Prints a formatted summary of a suite run to the console.
/// Displays a table with status, test name, duration and step count,
/// followed by the totals per status.
///
/// 在控制台打印测试套件运行的格式化摘要。
/// 显示一个包含状态、测试名称、持续时间和步骤数的表格，随后是各状态的总数。
///
/// # Output Format / 输出格式
/// ```text
/// --- Test Summary: checkout ---
///   - Passed     | test_login                               |     12.3ms  (3 steps)
///   - Failed     | test_payment                             |      1.02s  (5 steps)
/// Passed: 1, Failed: 1, Skipped: 0
/// ```
pub fn print_summary(suite: &SuiteReport, locale: &str) {
    println!(
        "\n{}",
        t!("summary.banner", locale = locale, name = suite.name()).bold()
    );

    for case in suite.cases() {
        println!(
            "  - {:<10} | {:<40} | {:>10}  {}",
            status_label(case.status(), locale),
            case.name(),
            format_duration(case.duration_ms()),
            t!("summary.steps", locale = locale, count = case.step_count()).dimmed()
        );
    }

    let counts = suite.counts();
    println!(
        "{}",
        t!(
            "summary.totals",
            locale = locale,
            passed = counts.passed,
            failed = counts.failed,
            skipped = counts.skipped
        )
    );
}

/// Prints the failure message and step tree of every failed test case.
///
/// 打印每个失败测试用例的失败消息和步骤树。
pub fn print_failure_details(suite: &SuiteReport, locale: &str) {
    let failures: Vec<&TestCaseReport> = suite
        .cases()
        .iter()
        .filter(|case| case.status().is_failure())
        .collect();
    if failures.is_empty() {
        return;
    }

    println!("\n{}", t!("failure.banner", locale = locale).red().bold());
    println!("{}", "-".repeat(80));

    for (i, case) in failures.iter().enumerate() {
        println!(
            "[{}/{}] {} '{}'",
            i + 1,
            failures.len(),
            t!("failure.header", locale = locale).red(),
            case.name().cyan()
        );
        if let Some(failure) = case.failure() {
            println!("\n{}", failure.message);
            if let Some(stack_trace) = &failure.stack_trace {
                println!("{}", stack_trace.dimmed());
            }
        }
        if !case.steps().is_empty() {
            println!("\n--- {} ---\n", t!("failure.steps", locale = locale).yellow());
            print!("{}", render_step_tree(case.steps()));
        }
        println!("\n{}", "-".repeat(80));
    }
}

/// Renders a step forest as an indented plain-text tree, one line per step.
///
/// ```text
/// [passed] open session (1.2ms)
///   [failed] check greeting (0.4ms)
/// ```
pub fn render_step_tree(steps: &[Step]) -> String {
    let mut out = String::new();
    for step in steps {
        render_step(step, 0, &mut out);
    }
    out
}

fn render_step(step: &Step, depth: usize, out: &mut String) {
    let status = step.status().map_or("open", |status| status.as_str());
    let duration = step
        .duration_ms()
        .map(format_duration)
        .unwrap_or_else(|| "N/A".to_string());
    out.push_str(&format!(
        "{}[{}] {} ({})\n",
        "  ".repeat(depth),
        status,
        step.name(),
        duration
    ));
    for child in step.children() {
        render_step(child, depth + 1, out);
    }
}
