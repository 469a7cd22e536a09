//! HTTP transport seam.
//!
//! The engine consumes a `Transport` trait object; the real network stack is
//! an external collaborator. `HttpTransport` is the default adapter: POST,
//! JSON body, fixed content-type and cache headers, cookies included.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Minimal POST-JSON collaborator contract.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, url: &str, body: &Value) -> Result<Value>;
}

/// reqwest-backed transport with the picker's fixed request contract.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/json;charset=utf-8",
            )
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .body(body.to_string())
            .send()
            .await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
