//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Step Report,
//! including the document model, the step tracker, callable wrappers and configuration.
//!
//! 此模块包含 Step Report 的核心功能，
//! 包括文档模型、步骤跟踪器、可调用对象包装器和配置。

pub mod config;
pub mod decorator;
pub mod models;
pub mod tracker;

// Re-exports
pub use config::ReportConfig;
pub use decorator::Stepped;
pub use models::{Status, Step, TestCaseReport};
pub use tracker::Tracker;
