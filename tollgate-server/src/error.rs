//! Error types for the HTTP layer

use hyper::StatusCode;
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;

/// Outcome of a page handler that did not produce a response.
///
/// The status goes to the client; the cause only goes to the log.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub cause: Option<anyhow::Error>,
}

impl HttpError {
    pub fn new(status: StatusCode) -> Self {
        HttpError { status, cause: None }
    }

    pub fn with_cause(status: StatusCode, cause: impl Into<anyhow::Error>) -> Self {
        HttpError {
            status,
            cause: Some(cause.into()),
        }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn bad_request(cause: impl Into<anyhow::Error>) -> Self {
        Self::with_cause(StatusCode::BAD_REQUEST, cause)
    }

    pub fn internal(cause: impl Into<anyhow::Error>) -> Self {
        Self::with_cause(StatusCode::INTERNAL_SERVER_ERROR, cause)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {:#}", self.status, cause),
            None => write!(f, "{}", self.status),
        }
    }
}

/// Transport-level failures
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
