//! Remote candidate source.
//!
//! Builds POST bodies from the static parameter object (injecting the live
//! keyword or value at the configured dot-path), projects responses through
//! the configured result path, and throttles keyword-driven fetches to one
//! call per window. Network and parse failures are logged here and degrade
//! to "no candidates"; they never propagate as errors. There is no request
//! cancellation: responses apply in arrival order, last-applied-wins, which
//! under rapid typing can let a stale response land after a fresher one.

pub mod throttle;
pub mod transport;

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Value, json};

use crate::accessor::{get_path, set_path};
use crate::config::RemoteConfig;

pub use throttle::Throttle;
pub use transport::{HttpTransport, Transport};

pub struct RemoteSource {
    config: RemoteConfig,
    transport: Arc<dyn Transport>,
    throttle: Throttle,
}

impl RemoteSource {
    pub fn new(config: RemoteConfig, transport: Arc<dyn Transport>) -> Self {
        let throttle = Throttle::new(config.throttle);
        Self {
            config,
            transport,
            throttle,
        }
    }

    /// Request body: the static parameter object with `injected` written at
    /// the keyword path. `None` leaves the parameters untouched (initial
    /// load).
    fn build_body(&self, injected: Option<&str>) -> Value {
        let mut body = self.config.fetch_param.clone().unwrap_or_else(|| json!({}));
        if let Some(value) = injected {
            set_path(&mut body, &self.config.keyword_path, json!(value));
        }
        body
    }

    /// Extract the candidate array from a response. Any navigation or shape
    /// failure degrades to an empty sequence.
    fn project(&self, response: Value) -> Vec<Value> {
        let projected = match &self.config.result_path {
            Some(path) => get_path(&response, path).cloned().unwrap_or(json!([])),
            None => response,
        };
        match projected {
            Value::Array(items) => items,
            other => {
                tracing::debug!(
                    "remote response is not an array (got {}), treating as empty",
                    type_name(&other)
                );
                Vec::new()
            }
        }
    }

    /// POST and project, logging failures. `None` means the caller must
    /// leave its state untouched.
    async fn request(&self, injected: Option<&str>) -> Option<Vec<Value>> {
        let body = self.build_body(injected);
        match self.transport.post(&self.config.src, &body).await {
            Ok(response) => Some(self.project(response)),
            Err(err) => {
                tracing::warn!("remote fetch from {} failed: {err}", self.config.src);
                None
            }
        }
    }

    /// Initial, unthrottled load with the static parameters only.
    pub async fn fetch_initial(&self) -> Option<Vec<Value>> {
        self.request(None).await
    }

    /// Record a keyword change. The fetch fires later, from `take_due`.
    pub fn arm_keyword(&mut self, keyword: &str, now: Instant) {
        self.throttle.call(keyword, now);
    }

    /// The keyword whose throttle window has elapsed, if any.
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        self.throttle.take_due(now)
    }

    pub fn has_pending(&self) -> bool {
        self.throttle.is_pending()
    }

    /// Drop any armed fetch.
    pub fn teardown(&mut self) {
        self.throttle.cancel();
    }

    /// Keyword search request.
    pub async fn fetch_by_keyword(&self, keyword: &str) -> Option<Vec<Value>> {
        tracing::debug!("keyword fetch: {keyword:?}");
        self.request(Some(keyword)).await
    }

    /// Unthrottled lookup of items by their external value string, for
    /// tokens missing from the local pool.
    pub async fn resolve_by_value(&self, values: &str) -> Option<Vec<Value>> {
        tracing::debug!("value resolution fetch: {values:?}");
        self.request(Some(values)).await
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
