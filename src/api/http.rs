use async_trait::async_trait;
use reqwest::{Client, Response};
use url::Url;

use super::{heavy_load_path, BenchmarkApi, THREAD_INFO_PATH};
use crate::error::{ClientError, ConfigError};
use crate::labels::Endpoint;
use crate::logging::{self, obj, params_hash, v_num, v_str, Domain};
use crate::model::{BenchmarkRequest, BenchmarkResponse, ThreadSystemInfo};

/// reqwest-backed client. No client-side timeout is set; requests run
/// until the transport gives up.
pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    pub fn new(base: &str) -> Result<Self, ConfigError> {
        let base = parse_base(base)?;
        Ok(Self { client: Client::new(), base })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Network(format!("bad url {}: {}", path, e)))
    }

    /// Status check and body read shared by every call.
    async fn read_body(resp: Response) -> Result<String, ClientError> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Http { status: status.as_u16(), body });
        }
        Ok(body)
    }
}

/// Base URLs are treated as directories so relative joins keep any prefix.
pub(crate) fn parse_base(base: &str) -> Result<Url, ConfigError> {
    let with_slash = if base.ends_with('/') { base.to_string() } else { format!("{}/", base) };
    let url = Url::parse(&with_slash).map_err(|e| ConfigError::InvalidBase(base.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidBase(base.to_string(), format!("unsupported scheme {}", other))),
    }
}

#[async_trait]
impl BenchmarkApi for HttpApi {
    async fn run_benchmark(
        &self,
        endpoint: Endpoint,
        request: &BenchmarkRequest,
    ) -> Result<BenchmarkResponse, ClientError> {
        let url = self.url(&endpoint.path())?;
        let payload = serde_json::to_string(request)?;
        logging::debug(
            Domain::Api,
            "request",
            obj(&[("url", v_str(url.as_str())), ("request_hash", v_str(&params_hash(&payload)))]),
        );

        let resp = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let body = Self::read_body(resp).await?;
        let parsed = BenchmarkResponse::parse(&body)?;

        logging::debug(
            Domain::Api,
            "response",
            obj(&[("endpoint", v_str(endpoint.as_str())), ("bytes", v_num(body.len() as f64))]),
        );
        Ok(parsed)
    }

    async fn set_heavy_load(&self, enabled: bool) -> Result<String, ClientError> {
        let url = self.url(heavy_load_path(enabled))?;
        let resp = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Self::read_body(resp).await
    }

    async fn fetch_fragment(&self, path: &str) -> Result<String, ClientError> {
        let url = self.url(path)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Self::read_body(resp).await
    }

    async fn thread_info(&self) -> Result<ThreadSystemInfo, ClientError> {
        let url = self.url(THREAD_INFO_PATH)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let body = Self::read_body(resp).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_keeps_prefix() {
        let api = HttpApi::new("http://localhost:8080/demo").unwrap();
        let url = api.url(&Endpoint::CompareAll.path()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/demo/api/matrix/compare-all");
        assert_eq!(api.url("infobox.html").unwrap().as_str(), "http://localhost:8080/demo/infobox.html");
    }

    #[test]
    fn test_base_rejects_non_http() {
        assert!(HttpApi::new("ftp://example.com").is_err());
        assert!(HttpApi::new("not a url").is_err());
    }
}
