//! Shared test helpers: a recording transport double and item builders.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use pinpick::{PickerError, Result, Transport};

/// Transport double that records every request and replays queued responses
/// in order (the last response repeats once the queue drains).
pub struct RecordingTransport {
    requests: Mutex<Vec<(String, Value)>>,
    responses: Mutex<Vec<Result<Value>>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(Vec::new()),
        })
    }

    /// Transport answering every request with the same candidate array.
    pub fn respond_with(response: Value) -> Arc<Self> {
        let transport = Self::new();
        transport.push_response(Ok(response));
        transport
    }

    /// Transport failing every request at the HTTP layer.
    pub fn failing() -> Arc<Self> {
        let transport = Self::new();
        transport.push_response(Err(PickerError::MalformedResponse(
            "connection refused".into(),
        )));
        transport
    }

    pub fn push_response(&self, response: Result<Value>) {
        self.responses.lock().unwrap().push(response);
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.requests.lock().unwrap().last().map(|(_, b)| b.clone())
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post(&self, url: &str, body: &Value) -> Result<Value> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));

        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.remove(0)
        } else {
            match responses.first() {
                Some(Ok(v)) => Ok(v.clone()),
                Some(Err(_)) => Err(PickerError::MalformedResponse(
                    "connection refused".into(),
                )),
                None => Ok(json!([])),
            }
        }
    }
}

/// A candidate city record.
pub fn city(id: u64, label: &str) -> Value {
    json!({"id": id, "label": label})
}

pub fn cities() -> Vec<Value> {
    vec![
        city(1, "北京"),
        city(2, "上海"),
        city(3, "深圳"),
        city(4, "广州"),
    ]
}
