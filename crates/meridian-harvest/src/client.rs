//! HTTP client for peer catalogs.
//!
//! Speaks the logical protocol as JSON envelopes: a lightweight GET for
//! capability probing, POST bodies for everything else. Every round trip
//! carries a timeout; transport failures, structured remote errors and
//! malformed bodies are classified separately so the harvest loop can
//! tolerate them differently.

use std::time::Duration;

use serde_json::Value;

use meridian_csw::protocol::{SearchRequest, SearchResults, SERVICE};

use crate::error::{HarvestError, Result};
use crate::normalize::{normalize_body, normalize_keys};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for one or more peer catalog services.
#[derive(Debug, Clone)]
pub struct PeerClient {
    client: reqwest::Client,
}

impl Default for PeerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerClient {
    /// Creates a client with the default request timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Creates a client with a custom request timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// Probes capabilities with the lightweight GET form.
    pub(crate) async fn capabilities_get(&self, base: &str, version: &str) -> Result<Value> {
        let request = self.client.get(base.trim_end_matches('/')).query(&[
            ("service", SERVICE),
            ("request", "GetCapabilities"),
            ("version", version),
        ]);
        self.fetch_json(request).await
    }

    /// Probes capabilities with the heavier POST body form.
    pub(crate) async fn capabilities_post(&self, base: &str, version: &str) -> Result<Value> {
        let body = serde_json::json!({
            "request": "GetCapabilities",
            "service": SERVICE,
            "acceptVersions": [version],
        });
        let request = self.client.post(base.trim_end_matches('/')).json(&body);
        self.fetch_json(request).await
    }

    /// Issues one search page against the peer.
    pub(crate) async fn get_records(
        &self,
        base: &str,
        search: &SearchRequest,
    ) -> Result<SearchResults> {
        let mut body = serde_json::to_value(search).map_err(|e| HarvestError::Malformed {
            message: format!("failed to encode search request: {e}"),
        })?;
        if let Value::Object(map) = &mut body {
            map.insert("request".to_string(), Value::String("GetRecords".into()));
        }
        let request = self.client.post(base.trim_end_matches('/')).json(&body);
        let value = self.fetch_json(request).await?;

        let results = value
            .get("results")
            .cloned()
            .ok_or_else(|| HarvestError::malformed("response has no results envelope"))?;
        serde_json::from_value(results).map_err(|e| HarvestError::Malformed {
            message: format!("unparsable search results: {e}"),
        })
    }

    /// Sends a request and returns the normalized response body.
    async fn fetch_json(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| HarvestError::from_transport(&e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HarvestError::from_transport(&e))?;

        let normalized = normalize_body(&body);
        let value: Value =
            serde_json::from_str(&normalized).map_err(|e| HarvestError::Malformed {
                message: format!("invalid JSON ({status}): {e}"),
            })?;
        let value = normalize_keys(value);

        if !status.is_success() {
            return Err(remote_error(&value, status.as_u16()));
        }
        // Some peers report protocol errors inside a 200 body.
        if let Some(exception) = value.get("exceptionReport").or_else(|| value.get("exception")) {
            return Err(remote_error(exception, status.as_u16()));
        }
        Ok(value)
    }
}

fn remote_error(value: &Value, status: u16) -> HarvestError {
    let code = value
        .get("code")
        .and_then(Value::as_str)
        .unwrap_or("NoApplicableCode")
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map_or_else(|| format!("http status {status}"), str::to_string);
    HarvestError::Remote { code, message }
}
