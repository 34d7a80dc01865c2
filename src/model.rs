//! Request/response payloads of the benchmark service and the pure math on them.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, DashboardError};

/// Value sent for whichever size parameter the selected test kind ignores.
pub const DEFAULT_MATRIX_SIZE: u32 = 100;
pub const DEFAULT_FILE_SIZE_KB: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Cpu,
    Io,
}

impl TestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::Cpu => "cpu",
            TestKind::Io => "io",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// The service may echo the kind in either case.
impl<'de> Deserialize<'de> for TestKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for TestKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(TestKind::Cpu),
            "io" => Ok(TestKind::Io),
            other => Err(ConfigError::UnknownTestKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRequest {
    pub test_type: TestKind,
    pub matrix_size: u32,
    pub parallel_tasks: u32,
    #[serde(rename = "fileSizeKB")]
    pub file_size_kb: u32,
}

impl BenchmarkRequest {
    /// CPU run: the file size is not used and carries the fixed default.
    pub fn cpu(matrix_size: u32, parallel_tasks: u32) -> Result<Self, DashboardError> {
        Self::checked(TestKind::Cpu, matrix_size, parallel_tasks, DEFAULT_FILE_SIZE_KB)
    }

    /// I/O run: the matrix size is not used and carries the fixed default.
    pub fn io(file_size_kb: u32, parallel_tasks: u32) -> Result<Self, DashboardError> {
        Self::checked(TestKind::Io, DEFAULT_MATRIX_SIZE, parallel_tasks, file_size_kb)
    }

    fn checked(
        test_type: TestKind,
        matrix_size: u32,
        parallel_tasks: u32,
        file_size_kb: u32,
    ) -> Result<Self, DashboardError> {
        if parallel_tasks == 0 {
            return Err(DashboardError::InvalidRequest("parallel tasks must be > 0".into()));
        }
        if matrix_size == 0 || file_size_kb == 0 {
            return Err(DashboardError::InvalidRequest("sizes must be > 0".into()));
        }
        Ok(Self { test_type, matrix_size, parallel_tasks, file_size_kb })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    #[serde(rename = "threadModel")]
    pub thread_model: String,
    #[serde(default)]
    pub test_type: Option<TestKind>,
    #[serde(default)]
    pub matrix_size: u32,
    #[serde(rename = "fileSizeKB", default)]
    pub file_size_kb: u32,
    pub parallel_tasks: u32,
    pub total_execution_time_ms: f64,
    #[serde(rename = "memoryBeforeMB", default)]
    pub memory_before_mb: Option<f64>,
    #[serde(rename = "memoryPeakMB", default)]
    pub memory_peak_mb: Option<f64>,
    #[serde(rename = "memoryAfterMB", default)]
    pub memory_after_mb: Option<f64>,
    #[serde(rename = "memoryUsageMB", default)]
    pub memory_usage_mb: Option<f64>,
}

impl BenchmarkResult {
    /// Tasks per second; `None` when no time elapsed.
    pub fn throughput(&self) -> Option<f64> {
        throughput(self.parallel_tasks, self.total_execution_time_ms)
    }

    pub fn average_time_per_task(&self) -> Option<f64> {
        if self.parallel_tasks == 0 {
            return None;
        }
        Some(self.total_execution_time_ms / self.parallel_tasks as f64)
    }
}

pub fn throughput(parallel_tasks: u32, total_execution_time_ms: f64) -> Option<f64> {
    if total_execution_time_ms <= 0.0 || !total_execution_time_ms.is_finite() {
        return None;
    }
    Some(parallel_tasks as f64 / (total_execution_time_ms / 1000.0))
}

/// Body of `/api/matrix/*`: one result, or one per model for `compare-all`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BenchmarkResponse {
    Many(Vec<BenchmarkResult>),
    Single(BenchmarkResult),
}

impl BenchmarkResponse {
    /// Picks the shape from the first token so a bad field surfaces its
    /// own error instead of a generic no-variant-matched one.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        if body.trim_start().starts_with('[') {
            serde_json::from_str(body).map(BenchmarkResponse::Many)
        } else {
            serde_json::from_str(body).map(BenchmarkResponse::Single)
        }
    }

    pub fn into_results(self) -> Vec<BenchmarkResult> {
        match self {
            BenchmarkResponse::Many(v) => v,
            BenchmarkResponse::Single(r) => vec![r],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDetail {
    pub id: u64,
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub blocked: bool,
    pub thread_group: String,
}

/// Body of `/api/threads/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSystemInfo {
    pub total_started_thread_count: u64,
    pub current_thread_count: u32,
    pub peak_thread_count: u32,
    pub daemon_thread_count: u32,
    #[serde(default)]
    pub thread_details: Vec<ThreadDetail>,
    #[serde(default)]
    pub thread_group_stats: std::collections::BTreeMap<String, u64>,
}
