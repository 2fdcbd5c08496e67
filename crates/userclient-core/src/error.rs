//! Error types and status classification for the user service client.
//!
//! [`classify`] is the single place where a transport status code is turned
//! into a semantic [`ErrorKind`]. Every component above the transport
//! branches on the kind, never on the raw status.

use std::fmt;

use http::StatusCode;

/// Status codes treated as a temporarily unavailable service
/// (403, 500, 502, 503, 504).
pub const SERVICE_UNAVAILABLE_STATUSES: [u16; 5] = [403, 500, 502, 503, 504];

/// Semantic classification of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The credential was rejected.
    Unauthorized,
    /// The requested user does not exist.
    NotFound,
    /// The service is temporarily unavailable; the call may be retried.
    ServiceUnavailable,
    /// Authentication succeeded but no token came back.
    MissingCredential,
    /// A notification did not follow the `source:event:payload` format.
    Malformed,
    /// Anything else, with a human readable detail.
    Unknown(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::MissingCredential => write!(f, "missing_credential"),
            Self::Malformed => write!(f, "malformed"),
            Self::Unknown(detail) => write!(f, "unknown: {detail}"),
        }
    }
}

/// Maps a transport status code to an [`ErrorKind`].
///
/// Total and deterministic: codes without a dedicated mapping become
/// [`ErrorKind::Unknown`] carrying the canonical reason phrase of the code.
#[must_use]
pub fn classify(status: u16) -> ErrorKind {
    if status == StatusCode::UNAUTHORIZED.as_u16() {
        return ErrorKind::Unauthorized;
    }
    if status == StatusCode::NOT_FOUND.as_u16() {
        return ErrorKind::NotFound;
    }
    if SERVICE_UNAVAILABLE_STATUSES.contains(&status) {
        return ErrorKind::ServiceUnavailable;
    }
    ErrorKind::Unknown(status_text(status))
}

fn status_text(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map_or_else(|| format!("unexpected status {status}"), ToString::to_string)
}

/// Errors produced by the user service client stack.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserClientError {
    /// The token or credentials were rejected by the service.
    #[error("Unauthorized")]
    Unauthorized,

    /// The user does not exist.
    #[error("User not found")]
    NotFound,

    /// The service answered with a status that indicates a transient outage.
    #[error("Service is unavailable")]
    ServiceUnavailable,

    /// The authenticate response carried no token.
    #[error("Missing token in response")]
    MissingToken,

    /// A notification payload could not be parsed.
    #[error("Malformed message: {message}")]
    Malformed {
        /// The offending payload or a description of the problem.
        message: String,
    },

    /// The service answered with a status that has no dedicated mapping.
    #[error("Unexpected status {status}: {reason}")]
    UnexpectedStatus {
        /// Raw status code.
        status: u16,
        /// Reason phrase for the status.
        reason: String,
    },

    /// The request never produced a response.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },

    /// The subscription delivered an event of an unexpected shape.
    #[error("Unknown message: {message}")]
    UnknownMessage {
        /// Description of the event.
        message: String,
    },

    /// The subscription itself failed.
    #[error("Subscription error: {message}")]
    Subscription {
        /// Description of the subscription failure.
        message: String,
    },

    /// The idle liveness probe failed.
    #[error("Liveness probe failed: {message}")]
    ProbeFailed {
        /// Description of the probe failure.
        message: String,
    },

    /// The operation was cancelled by its caller.
    #[error("Operation cancelled")]
    Cancelled,
}

impl UserClientError {
    /// Creates the error for a non-success transport status.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match classify(status) {
            ErrorKind::Unauthorized => Self::Unauthorized,
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::ServiceUnavailable => Self::ServiceUnavailable,
            ErrorKind::MissingCredential => Self::MissingToken,
            ErrorKind::Malformed => Self::malformed(status_text(status)),
            ErrorKind::Unknown(reason) => Self::UnexpectedStatus { status, reason },
        }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a new `UnknownMessage` error.
    #[must_use]
    pub fn unknown_message(message: impl Into<String>) -> Self {
        Self::UnknownMessage {
            message: message.into(),
        }
    }

    /// Creates a new `Subscription` error.
    #[must_use]
    pub fn subscription(message: impl Into<String>) -> Self {
        Self::Subscription {
            message: message.into(),
        }
    }

    /// Creates a new `ProbeFailed` error.
    #[must_use]
    pub fn probe_failed(message: impl Into<String>) -> Self {
        Self::ProbeFailed {
            message: message.into(),
        }
    }

    /// Returns the semantic kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::NotFound => ErrorKind::NotFound,
            Self::ServiceUnavailable => ErrorKind::ServiceUnavailable,
            Self::MissingToken => ErrorKind::MissingCredential,
            Self::Malformed { .. } => ErrorKind::Malformed,
            Self::UnexpectedStatus { reason, .. } => ErrorKind::Unknown(reason.clone()),
            Self::Transport { .. }
            | Self::Decode { .. }
            | Self::UnknownMessage { .. }
            | Self::Subscription { .. }
            | Self::ProbeFailed { .. }
            | Self::Cancelled => ErrorKind::Unknown(self.to_string()),
        }
    }

    /// Returns `true` if the failure is transient and the call may be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable)
    }

    /// Returns `true` if the credential was rejected.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

impl From<ErrorKind> for UserClientError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Unauthorized => Self::Unauthorized,
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::ServiceUnavailable => Self::ServiceUnavailable,
            ErrorKind::MissingCredential => Self::MissingToken,
            ErrorKind::Malformed => Self::malformed("malformed message"),
            ErrorKind::Unknown(reason) => Self::transport(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_statuses() {
        assert_eq!(classify(401), ErrorKind::Unauthorized);
        assert_eq!(classify(404), ErrorKind::NotFound);
        for status in [403, 500, 502, 503, 504] {
            assert_eq!(classify(status), ErrorKind::ServiceUnavailable, "{status}");
        }
    }

    #[test]
    fn test_classify_unknown_status_carries_reason() {
        assert_eq!(classify(510), ErrorKind::Unknown("Not Extended".to_string()));
        assert_eq!(classify(418), ErrorKind::Unknown("I'm a teapot".to_string()));
        assert_eq!(
            classify(599),
            ErrorKind::Unknown("unexpected status 599".to_string())
        );
    }

    #[test]
    fn test_classify_is_stable() {
        for status in 100..600 {
            assert_eq!(classify(status), classify(status));
        }
    }

    #[test]
    fn test_from_status() {
        assert_eq!(UserClientError::from_status(401), UserClientError::Unauthorized);
        assert_eq!(UserClientError::from_status(404), UserClientError::NotFound);
        assert_eq!(
            UserClientError::from_status(503),
            UserClientError::ServiceUnavailable
        );
        assert_eq!(
            UserClientError::from_status(510),
            UserClientError::UnexpectedStatus {
                status: 510,
                reason: "Not Extended".to_string()
            }
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(UserClientError::MissingToken.kind(), ErrorKind::MissingCredential);
        assert_eq!(
            UserClientError::malformed("incorrect").kind(),
            ErrorKind::Malformed
        );
        assert_eq!(
            UserClientError::from_status(510).kind(),
            ErrorKind::Unknown("Not Extended".to_string())
        );
        assert!(matches!(
            UserClientError::transport("connection refused").kind(),
            ErrorKind::Unknown(detail) if detail.contains("connection refused")
        ));
    }

    #[test]
    fn test_predicates() {
        assert!(UserClientError::ServiceUnavailable.is_retryable());
        assert!(!UserClientError::Unauthorized.is_retryable());
        assert!(!UserClientError::NotFound.is_retryable());
        assert!(UserClientError::Unauthorized.is_unauthorized());
        assert!(!UserClientError::ServiceUnavailable.is_unauthorized());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(UserClientError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(
            UserClientError::ServiceUnavailable.to_string(),
            "Service is unavailable"
        );
        assert_eq!(
            UserClientError::from_status(510).to_string(),
            "Unexpected status 510: Not Extended"
        );
        assert_eq!(ErrorKind::ServiceUnavailable.to_string(), "service_unavailable");
    }
}
