//! # Test doubles
//!
//! [`MockTransport`] replays scripted replies and records every request it
//! receives, so tests can assert exactly what went over the wire and how
//! many times. [`RecordingDiagnostics`] collects the failures a client
//! reported.
//!
//! ```ignore
//! let transport = Arc::new(MockTransport::new());
//! transport.push_json(200, json!([{"id": 1, "name": "Ann"}]));
//! let client = ContactClient::new(transport.clone(), &ClientConfig::default());
//! let contacts = client.list().single().await?;
//! assert_eq!(transport.call_count(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::diagnostics::Diagnostics;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Result<HttpResponse, ApiError>>,
    requests: Vec<HttpRequest>,
}

/// Transport that answers from a FIFO queue of scripted replies.
///
/// A request arriving with the queue empty fails with `ApiError::Transport`.
#[derive(Debug, Default, Clone)]
pub struct MockTransport {
    script: Arc<Mutex<Script>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_response(&self, response: HttpResponse) -> &Self {
        self.script().replies.push_back(Ok(response));
        self
    }

    /// Queue a response whose body is `body` rendered as JSON.
    pub fn push_json(&self, status: u16, body: serde_json::Value) -> &Self {
        self.push_response(HttpResponse::new(status, body.to_string()))
    }

    /// Queue a failure that never produced a response.
    pub fn push_failure(&self, error: ApiError) -> &Self {
        self.script().replies.push_back(Err(error));
        self
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.script().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script().requests.len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut script = self.script();
        let reply = script.replies.pop_front().unwrap_or_else(|| {
            Err(ApiError::Transport(format!(
                "no scripted reply for {} {}",
                request.method, request.path
            )))
        });
        script.requests.push(request);
        reply
    }
}

/// Diagnostics sink that keeps what it was given.
#[derive(Debug, Default, Clone)]
pub struct RecordingDiagnostics {
    reported: Arc<Mutex<Vec<ApiError>>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reported(&self) -> Vec<ApiError> {
        self.reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, error: &ApiError) {
        self.reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.clone());
    }
}
