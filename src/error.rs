//! Error types for the EodData client.

use thiserror::Error;

use crate::client::Endpoint;

/// Failure reported by the service for a structurally valid request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The exchange code is not known to the service.
    #[error("invalid exchange code")]
    InvalidExchangeCode,

    /// The symbol code is not known to the service.
    #[error("invalid symbol code")]
    InvalidSymbolCode,

    /// Login was rejected for the configured username and password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The service answered with a message this client does not recognise.
    #[error("unrecognised service message: {0}")]
    Unknown(String),
}

/// Errors returned by [`EodDataClient`](crate::EodDataClient) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP/network error from reqwest
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body is not well-formed XML
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Domain error reported by the service; never retried
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Re-authentication did not recover the call within the configured depth
    #[error("{endpoint}: relogin depth reached after {attempts} attempts")]
    ReloginDepthReached { endpoint: Endpoint, attempts: u32 },

    /// HTTP 500 persisted after the server error backoff budget
    #[error("{endpoint}: server error (HTTP {status}) after {attempts} attempts")]
    ServerError {
        endpoint: Endpoint,
        status: u16,
        attempts: u32,
    },

    /// Any non-200 status other than 500
    #[error("{endpoint}: unexpected HTTP status {status}")]
    UnexpectedStatus { endpoint: Endpoint, status: u16 },

    /// The XML document did not have the expected shape
    #[error("malformed response at <{element}>: {reason}")]
    MalformedResponse { element: String, reason: String },

    /// Invalid client configuration or call parameter
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn malformed(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedResponse {
            element: element.into(),
            reason: reason.into(),
        }
    }

    /// Returns the domain error kind, if this is a domain error.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Error::Domain(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
