//! Inference error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. Structured logging
//! is the caller's responsibility; these types carry the context needed to build
//! meaningful log entries.

use thiserror::Error;

/// Errors that can occur during inference operations.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The API credential is not present in the process environment.
    #[error("missing credential: set {var} (see https://huggingface.co/docs/hub/security-tokens)")]
    MissingCredential {
        var: String,
    },

    /// Configuration loading or validation error.
    #[error("config error: {reason}")]
    ConfigError {
        reason: String,
    },

    /// TCP/HTTP connection to the model endpoint failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed {
        endpoint: String,
        reason: String,
    },

    /// The model endpoint did not respond within the configured timeout.
    #[error("inference timeout after {duration_secs}s")]
    Timeout {
        duration_secs: u64,
    },

    /// Non-2xx HTTP response from the model endpoint.
    #[error("HTTP {status}: {body}")]
    HttpError {
        status: u16,
        body: String,
    },

    /// The endpoint answered, but not in the shape the call expects.
    #[error("malformed response: {reason}")]
    MalformedResponse {
        reason: String,
    },

    /// Chat completion and the text-generation fallback both failed.
    #[error("both methods failed. chat error: {chat}, text gen error: {text}")]
    BothMethodsFailed {
        chat: Box<InferenceError>,
        text: Box<InferenceError>,
    },
}

impl InferenceError {
    /// Whether this error means the response object lacked the expected structure.
    pub fn is_shape_error(&self) -> bool {
        matches!(self, InferenceError::MalformedResponse { .. })
    }
}
