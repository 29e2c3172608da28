//! # File System Module Unit Tests / 文件系统模块单元测试
//!
//! Tests for persisting documents and summaries into a results directory.
//!
//! 测试将文档和摘要持久化到结果目录。

mod common;

use common::xml_string;
use std::fs;
use step_report::infra::fs::{
    SUMMARY_FILE, prepare_results_dir, write_suite, write_summary, write_test_case,
};
use step_report::reporting::{Suite, run_unit};
use tempfile::tempdir;

#[cfg(test)]
mod fs_tests {
    use super::*;

    #[test]
    fn test_prepare_creates_nested_directory() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join("a").join("b");
        prepare_results_dir(&dir, false).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_prepare_clean_removes_old_files() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join("results");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("stale.xml"), "<old/>").unwrap();

        prepare_results_dir(&dir, false).unwrap();
        assert!(dir.join("stale.xml").exists());

        prepare_results_dir(&dir, true).unwrap();
        assert!(dir.is_dir());
        assert!(!dir.join("stale.xml").exists());
    }

    #[test]
    fn test_test_case_file_is_named_by_id() {
        let temp_dir = tempdir().unwrap();
        let report = run_unit("persisted", |tracker| {
            tracker.step("only step", || ());
            Ok(())
        });

        let path = write_test_case(temp_dir.path(), &report).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("{}-testcase.xml", report.id())
        );
        let content = xml_string(&fs::read(&path).unwrap());
        assert_eq!(content.as_bytes(), report.to_xml().as_slice());
        assert!(content.contains("<name>persisted</name>"));
    }

    #[test]
    fn test_suite_and_summary_files() {
        let temp_dir = tempdir().unwrap();
        let suite = Suite::new("files")
            .unit("ok", |_| Ok(()))
            .unit("bad", |_| anyhow::bail!("broken"))
            .run();

        let suite_path = write_suite(temp_dir.path(), &suite).unwrap();
        assert!(
            suite_path
                .to_string_lossy()
                .ends_with(&format!("{}-testsuite.xml", suite.id()))
        );

        let summary_path = write_summary(temp_dir.path(), &suite).unwrap();
        assert_eq!(summary_path, temp_dir.path().join(SUMMARY_FILE));
        let summary: serde_json::Value =
            serde_json::from_slice(&fs::read(&summary_path).unwrap()).unwrap();
        assert_eq!(summary["suite"], "files");
        assert_eq!(summary["counts"]["passed"], 1);
        assert_eq!(summary["counts"]["failed"], 1);
        assert_eq!(summary["cases"][1]["name"], "bad");
        assert_eq!(summary["cases"][1]["status"], "failed");
    }

    #[test]
    fn test_write_into_missing_directory_fails_with_context() {
        let temp_dir = tempdir().unwrap();
        let report = run_unit("orphan", |_| Ok(()));
        let err = write_test_case(&temp_dir.path().join("nope"), &report).unwrap_err();
        assert!(err.to_string().contains("Failed to write report"));
    }
}
