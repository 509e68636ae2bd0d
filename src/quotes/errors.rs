//! Per-symbol fetch errors
//!
//! Every variant is recoverable: the sync job logs it against the symbol
//! and moves on to the next one.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The endpoint answered with something other than 200
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// DNS, connection, or timeout failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// 200 response whose body is not a JSON object
    #[error("Invalid quote payload: {0}")]
    Decode(String),
}

impl FetchError {
    /// Returns true if the request never produced an HTTP response
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}

// The request URL carries the API token, so it is stripped from the message
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.without_url().to_string())
    }
}
