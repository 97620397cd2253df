//! Client error taxonomy with HTTP status mapping.
//!
//! [`ClientError`] is the unified error type for all service calls. HTTP
//! statuses map onto structured variants: 401 to `Authentication`, 400/404
//! to `InvalidRequest`, a zero credit balance to `InsufficientCredits`, and
//! everything else protocol-shaped to `Api`.

use thiserror::Error;

/// Errors produced by the service client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never completed (connection refused, timeout, TLS, ...).
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service rejected the credentials (401).
    #[error("authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },

    /// The request was malformed or addressed a missing resource (400/404).
    #[error("invalid request: {message}")]
    InvalidRequest {
        message: String,
        /// Structured validation errors from the response body, when present.
        errors: Option<serde_json::Value>,
    },

    /// The account has no credits left to run jobs.
    #[error("insufficient credits balance")]
    InsufficientCredits,

    /// Any other service-side failure (5xx, unexpected payloads).
    #[error("service error: {message}")]
    Api { message: String },

    /// The project cannot be submitted as constructed.
    #[error("invalid project: {reason}")]
    InvalidProject { reason: String },

    /// The configured base URL cannot be used to build request paths.
    #[error("invalid base url: {0}")]
    InvalidUrl(String),

    /// Compatibility resolver failure while building from the catalog.
    #[error(transparent)]
    Resolver(#[from] renderq_core::ResolverError),

    /// Local filesystem failure while staging project files.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Timestamp formatting failure while naming the remote output folder.
    #[error("timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() || err.is_connect() {
            "unexpected error communicating with the service agent; \
             check that it is running and retry"
                .to_string()
        } else {
            "unexpected error communicating with the service agent".to_string()
        };
        ClientError::Transport {
            message,
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = ClientError::Authentication {
            status: 401,
            message: "bad access key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "authentication failed (401): bad access key"
        );

        assert_eq!(
            ClientError::InsufficientCredits.to_string(),
            "insufficient credits balance"
        );
    }

    #[test]
    fn resolver_errors_convert() {
        let err: ClientError = renderq_core::ResolverError::EmptyQuery.into();
        assert!(matches!(err, ClientError::Resolver(_)));
    }
}
