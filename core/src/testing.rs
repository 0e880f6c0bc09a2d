//! Scripted in-memory transport for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::config::ClientConfig;
use crate::error::AppveyorError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::AppveyorClient;

/// Replays canned responses in order and records every request.
pub(crate) struct RecordingTransport {
    responses: RefCell<VecDeque<HttpResponse>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub(crate) fn new(responses: Vec<(u16, &str)>) -> Self {
        let responses = responses
            .into_iter()
            .map(|(status, body)| HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            })
            .collect();
        Self {
            responses: RefCell::new(responses),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub(crate) fn last(&self) -> HttpRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, AppveyorError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| AppveyorError::Transport("no scripted response left".to_string()))
    }
}

/// Authenticated client; the first response answers the token check.
pub(crate) fn client_with(responses: Vec<(u16, &str)>) -> AppveyorClient<RecordingTransport> {
    AppveyorClient::with_transport(
        "secret-token",
        ClientConfig::default(),
        RecordingTransport::new(responses),
    )
    .expect("token check should succeed")
}

/// Parsed JSON body of a recorded request.
pub(crate) fn body_json(request: &HttpRequest) -> serde_json::Value {
    serde_json::from_str(request.body.as_deref().expect("request has no body")).unwrap()
}
