//! Error shapes for remote calls
//!
//! Every call through an [`Endpoint`](super::Endpoint) resolves to exactly one
//! `Result`; these are the failure variants.

use serde::Deserialize;
use thiserror::Error;

/// Message surfaced when the server could not be reached at all.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Unable to reach the release server";

/// Message surfaced when a successful response could not be understood.
pub const DECODE_FAILURE_MESSAGE: &str = "The release server returned an unexpected response";

/// Failure of a single remote call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never reached the server or no response came back.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("server error ({status}): {message}")]
    Application { status: u16, message: String },

    /// A 2xx response body did not match the endpoint's response type.
    #[error("decode error: {0}")]
    Decode(String),

    /// Request parameters could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
}

/// Error payload returned by the release server on failure.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    errors: Vec<String>,
}

impl ApiError {
    /// Build an application error from a non-2xx response body.
    ///
    /// Uses the first entry of the payload's `errors` list when present.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorPayload>(body)
            .ok()
            .and_then(|payload| payload.errors.into_iter().find(|e| !e.is_empty()))
            .unwrap_or_else(|| format!("request failed with status {}", status));

        ApiError::Application { status, message }
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => TRANSPORT_FAILURE_MESSAGE.to_string(),
            ApiError::Application { message, .. } => message.clone(),
            ApiError::Decode(_) => DECODE_FAILURE_MESSAGE.to_string(),
            ApiError::Encode(detail) => format!("Invalid request parameters: {}", detail),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}
