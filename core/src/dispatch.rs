//! Response interpretation.
//!
//! Turns an `HttpResponse` into the outcome every resource method returns:
//! `Some(value)` for 200, `None` for 204, `AppveyorError::Api` for anything
//! else. A 200 whose body is not valid JSON is also an `Api` error; the
//! status stays 200 so callers can tell it apart from a rejected request.

use serde_json::Value;

use crate::error::AppveyorError;
use crate::http::HttpResponse;

/// Message used when a failed response carries no text of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Unexpected error
    Possible reasons are:
     - Communication with Appveyor has failed.
     - Insufficient permissions.
     - Invalid contents returned.
";

/// Result of one request: decoded payload, empty success, or failure.
pub type Outcome = Result<Option<Value>, AppveyorError>;

/// How a 200 response body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    /// The body is returned verbatim as a JSON string (build logs, YAML).
    Text,
}

/// Interpret a raw response.
pub fn interpret(response: &HttpResponse, format: ResponseFormat) -> Outcome {
    match response.status {
        200 => match format {
            ResponseFormat::Text => Ok(Some(Value::String(response.body.clone()))),
            ResponseFormat::Json => match serde_json::from_str(&response.body) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    tracing::warn!(error = %e, "undecodable body on a 200 response");
                    Err(api_error(response))
                }
            },
        },
        204 => Ok(None),
        status => {
            tracing::warn!(status, "appveyor rejected the request");
            Err(api_error(response))
        }
    }
}

fn api_error(response: &HttpResponse) -> AppveyorError {
    let text = response.body.trim();
    let message = if text.is_empty() {
        GENERIC_FAILURE_MESSAGE.to_string()
    } else {
        text.to_string()
    };
    AppveyorError::Api {
        status: response.status,
        message,
    }
}
