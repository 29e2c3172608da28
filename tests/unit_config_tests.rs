//! # Config Module Unit Tests / Config 模块单元测试
//!
//! This module tests loading and defaulting of the report configuration.
//!
//! 此模块测试报告配置的加载和默认值。

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use step_report::config::ReportConfig;
use tempfile::tempdir;

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ReportConfig::from_toml_str("").unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.results_dir, PathBuf::from("step-results"));
        assert_eq!(config.language, "en");
        assert!(!config.clean_results);
        assert!(config.write_summary);
        assert_eq!(config.unit_timeout(), None);
    }

    #[test]
    fn test_full_config() {
        let config = ReportConfig::from_toml_str(
            r#"
results_dir = "out/reports"
language = "zh-CN"
clean_results = true
jobs = 3
unit_timeout_secs = 30
write_summary = false
"#,
        )
        .unwrap();

        assert_eq!(config.results_dir, PathBuf::from("out/reports"));
        assert_eq!(config.language, "zh-CN");
        assert!(config.clean_results);
        assert_eq!(config.effective_jobs(), 3);
        assert_eq!(config.unit_timeout(), Some(Duration::from_secs(30)));
        assert!(!config.write_summary);
    }

    #[test]
    fn test_zero_jobs_falls_back_to_cpu_count() {
        let config = ReportConfig::from_toml_str("jobs = 0").unwrap();
        assert_eq!(config.effective_jobs(), num_cpus::get() / 2 + 1);
        assert!(ReportConfig::default().effective_jobs() >= 1);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = ReportConfig::from_toml_str("jobs = \"many\"").unwrap_err();
        assert!(err.to_string().contains("Failed to parse report configuration"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("report.toml");
        fs::write(&path, "language = \"zh-CN\"\n").unwrap();

        let config = ReportConfig::load(&path).unwrap();
        assert_eq!(config.language, "zh-CN");
        assert_eq!(config.results_dir, PathBuf::from("step-results"));
    }

    #[test]
    fn test_load_missing_file_names_the_path() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("missing.toml");
        let err = ReportConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing.toml"));
    }
}
