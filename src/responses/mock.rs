//! Scripted backend for development & testing
//! Keeps the router functional without network access

use super::{BackendError, ResponsesBackend, ResponsesRequest, ResponsesResponse};
use std::collections::VecDeque;
use std::sync::Mutex;

type Scripted = std::result::Result<ResponsesResponse, BackendError>;

/// Replays queued results in order and records every request it receives.
/// Once the queue is drained it answers with an empty response.
#[derive(Default)]
pub struct MockBackend {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ResponsesRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: ResponsesResponse) -> Self {
        self.push(Ok(response));
        self
    }

    pub fn with_error(self, error: BackendError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, result: Scripted) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(result);
        }
    }

    /// Requests received so far, in call order
    pub fn requests(&self) -> Vec<ResponsesRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl ResponsesBackend for MockBackend {
    async fn create(
        &self,
        request: &ResponsesRequest,
    ) -> std::result::Result<ResponsesResponse, BackendError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.unwrap_or_else(|| Ok(ResponsesResponse::default()))
    }
}
