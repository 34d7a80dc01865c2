//! Benchmark service client seam.

use async_trait::async_trait;

use crate::error::ClientError;
use crate::labels::Endpoint;
use crate::model::{BenchmarkRequest, BenchmarkResponse, ThreadSystemInfo};

mod http;

pub use http::HttpApi;
pub(crate) use http::parse_base;

pub const HEAVY_LOAD_START_PATH: &str = "/api/system/heavy-load/start";
pub const HEAVY_LOAD_STOP_PATH: &str = "/api/system/heavy-load/stop";
pub const THREAD_INFO_PATH: &str = "/api/threads/info";

pub fn heavy_load_path(enabled: bool) -> &'static str {
    if enabled {
        HEAVY_LOAD_START_PATH
    } else {
        HEAVY_LOAD_STOP_PATH
    }
}

#[async_trait]
pub trait BenchmarkApi: Send + Sync {
    /// `POST /api/matrix/{endpoint}` with the request as JSON.
    async fn run_benchmark(
        &self,
        endpoint: Endpoint,
        request: &BenchmarkRequest,
    ) -> Result<BenchmarkResponse, ClientError>;

    /// Toggle background load; the body is opaque text.
    async fn set_heavy_load(&self, enabled: bool) -> Result<String, ClientError>;

    /// `GET` a static fragment relative to the service base.
    async fn fetch_fragment(&self, path: &str) -> Result<String, ClientError>;

    async fn thread_info(&self) -> Result<ThreadSystemInfo, ClientError>;
}
