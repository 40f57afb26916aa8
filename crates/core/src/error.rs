//! Unified error types for pagetitle.
//!
//! Every variant carries a stable code prefix so that failures can be
//! reported to HTTP callers without leaking the Rust type names.

use tokio_rusqlite::rusqlite;

/// Unified error types for the pagetitle service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing, blank, or non-string URL input.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// URL could not be parsed or uses an unsupported scheme.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Fetch did not complete within the configured timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Remote server answered with a non-2xx status.
    #[error("HTTP_ERROR: status {0}")]
    HttpStatus(u16),

    /// DNS, connect, TLS or body read failure.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// A resolution task died before producing a result.
    #[error("INTERNAL_ERROR: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::FetchTimeout(_) => "FETCH_TIMEOUT",
            Error::FetchTooLarge(_) => "FETCH_TOO_LARGE",
            Error::HttpStatus(_) => "HTTP_ERROR",
            Error::Network(_) => "NETWORK_ERROR",
            Error::Database(_) => "CACHE_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Human-readable detail without the code prefix.
    pub fn detail(&self) -> String {
        match self {
            Error::InvalidInput(msg)
            | Error::InvalidUrl(msg)
            | Error::FetchTimeout(msg)
            | Error::FetchTooLarge(msg)
            | Error::Network(msg)
            | Error::Internal(msg) => msg.clone(),
            Error::HttpStatus(status) => format!("status {status}"),
            Error::Database(e) => e.to_string(),
        }
    }

    /// Whether the caller, rather than the remote page or the service, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::InvalidUrl(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
