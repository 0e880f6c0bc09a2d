//! Per-call request descriptors.
//!
//! A `Request` names the verb, the path below the configured endpoint, an
//! optional body and how the 200 body should be decoded. Resource groups
//! build one per call and hand it to `AppveyorClient::send`; nothing here
//! touches the network.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::Value;

use crate::dispatch::ResponseFormat;
use crate::error::AppveyorError;
use crate::http::HttpMethod;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// RFC 3986 unreserved characters pass through; everything else is escaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a caller-supplied path segment or query value.
pub(crate) fn encode(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// Body attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured payload, serialized as JSON on send.
    Json(Value),
    /// Pre-rendered text sent as-is with its own content type.
    Raw { content_type: String, body: String },
}

impl RequestBody {
    pub fn content_type(&self) -> &str {
        match self {
            RequestBody::Json(_) => JSON_CONTENT_TYPE,
            RequestBody::Raw { content_type, .. } => content_type,
        }
    }

    pub(crate) fn render(&self) -> Result<String, AppveyorError> {
        match self {
            RequestBody::Json(value) => Ok(serde_json::to_string(value)?),
            RequestBody::Raw { body, .. } => Ok(body.clone()),
        }
    }
}

/// One call against the API, before it is bound to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<RequestBody>,
    pub format: ResponseFormat,
}

impl Request {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            format: ResponseFormat::Json,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Attach a structured body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, AppveyorError> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Attach a raw text body.
    pub fn raw(mut self, content_type: impl Into<String>, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw {
            content_type: content_type.into(),
            body: body.into(),
        });
        self
    }

    /// Return the 200 body as text instead of decoding it.
    pub fn text_response(mut self) -> Self {
        self.format = ResponseFormat::Text;
        self
    }
}
