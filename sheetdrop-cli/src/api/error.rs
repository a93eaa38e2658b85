//! Error values for identity and drive calls.
//!
//! Every variant is scoped to the user action that triggered the call;
//! nothing here aborts the process.

use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// The call did not complete within its deadline.
    Timeout(String),
    /// The token exchange was rejected or returned no usable token.
    AuthFailure(String),
    /// Transport-level failure before any status code was received.
    Network(String),
    /// The API answered with a status the workflow does not accept.
    UnexpectedStatus { status: u16, body: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Timeout(what) => write!(f, "timed out: {}", what),
            ApiError::AuthFailure(msg) => write!(f, "authentication failed: {}", msg),
            ApiError::Network(msg) => write!(f, "network error: {}", msg),
            ApiError::UnexpectedStatus { status, body } => {
                write!(f, "unexpected status {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Classify a reqwest transport error for the given call.
    pub fn from_transport(call: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(call.to_string())
        } else {
            ApiError::Network(format!("{}: {}", call, err))
        }
    }
}
