//! # Step Report Library / Step Report 库
//!
//! This library records the execution of units of work (tests) as a tree of timed,
//! status-bearing steps and renders the result as a structured XML report.
//!
//! 此库将工作单元（测试）的执行记录为带有计时和状态的步骤树，
//! 并将结果渲染为结构化的 XML 报告。
//!
//! ## Modules / 模块
//!
//! - `core` - Document model, step tracker, callable wrappers and configuration
//! - `markup` - Declarative XML schemas and the safe serializer
//! - `reporting` - Report assembly, suites, console output and publishing
//! - `infra` - Infrastructure services like file system persistence and i18n
//!
//! - `core` - 文档模型、步骤跟踪器、可调用对象包装器和配置
//! - `markup` - 声明式 XML 模式和安全序列化器
//! - `reporting` - 报告组装、测试套件、控制台输出和发布
//! - `infra` - 基础设施服务，如文件系统持久化和国际化
//!
//! ## Example / 示例
//!
//! ```no_run
//! use step_report::reporting::run_unit;
//!
//! let report = run_unit("test_login", |tracker| {
//!     tracker.step("open session", || {
//!         tracker.attach_text("request", "POST /login");
//!     });
//!     tracker.step("check greeting", || assert!(true));
//!     Ok(())
//! });
//! let xml = report.to_xml();
//! assert!(!xml.is_empty());
//! ```

pub mod core;
pub mod infra;
pub mod markup;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::decorator;
pub use crate::core::models;
pub use crate::core::tracker;
pub use crate::core::decorator::Stepped;
pub use crate::core::models::{Attachment, Failure, Status, Step, TestCaseReport};
pub use crate::core::tracker::{Skip, StepGuard, Tracker, TrackerError, skip};

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// This function detects the user's system locale and sets the appropriate
/// language for console output. It attempts to match the full locale
/// (e.g., "zh-CN"), then just the language code (e.g., "en"), and finally
/// falls back to the default language ("en").
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    // Full locale first, then the language part, then "en".
    let lang = if available_locales.contains(&locale.as_str()) {
        &locale
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
