//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Step Report,
//! including result file persistence and i18n support.
//!
//! 此模块为 Step Report 提供基础设施服务，
//! 包括结果文件持久化和国际化支持。

pub mod fs;

// Re-export i18n functions for easier access
pub use rust_i18n::t;

/// Looks up the message `key` in `locale`, falling back to English.
/// 在 `locale` 中查找消息 `key`，回退到英文。
pub fn translate(key: &str, locale: &str) -> String {
    t!(key, locale = locale).into_owned()
}
