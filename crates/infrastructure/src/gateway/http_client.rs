//! JSON answers over plain HTTP.
//!
//! ```text
//! GET /IN/<qname>/<qtype> HTTP/1.1
//! Host: <backend-host>
//! Accept: application/json
//! ```
//!
//! `<qname>` is the ASCII presentation form of the name, percent-encoded as
//! a single path segment. The root name is sent as an empty segment
//! (`/IN//NS`) since a literal `.` segment is dropped by URL normalization.

use async_trait::async_trait;
use jsondns_application::ports::GatewayClient;
use jsondns_domain::{DnsQuery, GatewayError};
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

const JSON_CONTENT_TYPE: &str = "application/json";
const QUESTION_CLASS: &str = "IN";
const ROOT_SEGMENT: &str = "";

pub struct HttpGatewayClient {
    client: reqwest::Client,
    host: String,
    timeout: Duration,
}

impl HttpGatewayClient {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            host: host.into(),
            timeout,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn url_for(&self, query: &DnsQuery) -> Result<Url, GatewayError> {
        let base = format!("http://{}/", self.host);
        let invalid = |reason: String| GatewayError::Fetch {
            url: base.clone(),
            reason,
        };

        let mut url =
            Url::parse(&base).map_err(|e| invalid(format!("invalid backend host: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| invalid("backend URL cannot carry a path".to_string()))?
            .clear()
            .push(QUESTION_CLASS)
            .push(name_segment(&query.domain))
            .push(&query.record_type);

        Ok(url)
    }
}

fn name_segment(domain: &str) -> &str {
    if domain == "." {
        ROOT_SEGMENT
    } else {
        domain
    }
}

#[async_trait]
impl GatewayClient for HttpGatewayClient {
    async fn fetch(&self, query: &DnsQuery) -> Result<serde_json::Value, GatewayError> {
        let url = self.url_for(query)?;
        debug!(url = %url, "Fetching JSON answer");

        let fetch_error = |reason: String| GatewayError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .get(url.clone())
                .header("Accept", JSON_CONTENT_TYPE)
                .send(),
        )
        .await
        .map_err(|_| fetch_error(format!("timed out after {}ms", self.timeout.as_millis())))?
        .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = tokio::time::timeout(self.timeout, response.bytes())
            .await
            .map_err(|_| fetch_error("timed out reading body".to_string()))?
            .map_err(|e| fetch_error(format!("failed to read body: {}", e)))?;

        debug!(url = %url, body_len = body.len(), "JSON answer received");

        serde_json::from_slice(&body).map_err(|e| GatewayError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
