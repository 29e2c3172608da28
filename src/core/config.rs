//! # Configuration Module / 配置模块
//!
//! Settings for running and publishing reports, loaded from a TOML file.
//! Every key is optional; missing keys take the documented defaults.
//!
//! 运行和发布报告的设置，从 TOML 文件加载。每个键都是可选的；缺失的键采用文档中的默认值。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Report settings.
/// 报告设置。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Directory that receives the rendered documents. Defaults to `step-results`.
    /// 接收渲染文档的目录。默认为 `step-results`。
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// The language for console output (e.g., "en", "zh-CN").
    /// Defaults to "en" if not specified.
    ///
    /// 控制台输出的语言（例如 "en", "zh-CN"）。
    /// 如果未指定，则默认为 "en"。
    #[serde(default = "default_language")]
    pub language: String,

    /// If `true`, previous contents of `results_dir` are removed before publishing.
    /// 如果为 `true`，发布前会删除 `results_dir` 中的旧内容。
    #[serde(default)]
    pub clean_results: bool,

    /// Maximum number of units of work run at the same time by a parallel suite.
    /// 并行测试套件同时运行的最大工作单元数。
    #[serde(default)]
    pub jobs: Option<usize>,

    /// An optional time limit in seconds for each asynchronous unit of work.
    /// 每个异步工作单元的可选时间限制（秒）。
    #[serde(default)]
    pub unit_timeout_secs: Option<u64>,

    /// Whether to write `summary.json` next to the documents. Defaults to `true`.
    /// 是否在文档旁边写入 `summary.json`。默认为 `true`。
    #[serde(default = "default_true")]
    pub write_summary: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            language: default_language(),
            clean_results: false,
            jobs: None,
            unit_timeout_secs: None,
            write_summary: true,
        }
    }
}

impl ReportConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse report configuration")
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read report configuration: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid report configuration: {}", path.display()))
    }

    /// The effective parallelism: `jobs` when set and non-zero, otherwise half the CPUs plus one.
    pub fn effective_jobs(&self) -> usize {
        self.jobs
            .filter(|jobs| *jobs > 0)
            .unwrap_or_else(|| num_cpus::get() / 2 + 1)
    }

    pub fn unit_timeout(&self) -> Option<Duration> {
        self.unit_timeout_secs.map(Duration::from_secs)
    }
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("step-results")
}

fn default_language() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}
