//! # Reporting Module / 报告模块
//!
//! This module turns tracked executions into reports: it assembles one sealed
//! test case report per unit of work, groups reports into suites, renders them as
//! XML documents, prints localized console summaries and publishes results to disk.
//!
//! 此模块将跟踪的执行转换为报告：为每个工作单元组装一个封存的测试用例报告，
//! 将报告分组为测试套件，渲染为 XML 文档，打印本地化的控制台摘要并将结果发布到磁盘。

pub mod assembler;
pub mod console;
pub mod document;
pub mod publish;
pub mod suite;

// Re-export common reporting functions
pub use assembler::{UnitOutcome, UnitRun, run_configured_unit_async, run_unit, run_unit_async};
pub use console::{print_failure_details, print_summary};
pub use publish::publish;
pub use suite::{StatusCounts, Suite, SuiteReport};
