use thiserror::Error;

use crate::endpoint::Endpoint;

/// Errors from backend requests.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad credentials, or the token response did not carry a token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport failure (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// Response body was not the expected JSON shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// The backend answered with an error status or `success: false`.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// An authenticated endpoint was called before a token was obtained.
    #[error("{0} endpoint requires a token")]
    MissingToken(Endpoint),
}

impl ClientError {
    /// Short machine-readable code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth(_) => "AUTH_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Parse(_) => "PARSE_ERROR",
            Self::Server { .. } => "SERVER_ERROR",
            Self::MissingToken(_) => "MISSING_TOKEN",
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
