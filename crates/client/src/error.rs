//! Client error types

use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// No auth token is stored; the request was not sent
    #[error("No auth token available")]
    MissingToken,
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// The operator has to log in again
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::MissingToken | Self::AuthenticationFailed(_))
    }

    /// HTTP status behind the error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError { status, .. } => Some(*status),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::BadRequest(_) => Some(400),
            Self::Request(err) => err.status().map(|status| status.as_u16()),
            Self::Serialization(_) | Self::Configuration(_) | Self::MissingToken => None,
        }
    }
}

impl From<nanostore_core::CoreError> for ClientError {
    fn from(err: nanostore_core::CoreError) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ClientError::from_status(StatusCode::UNAUTHORIZED, "x".into()),
            ClientError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::BAD_GATEWAY, "x".into()),
            ClientError::ServerError { status: 502, .. }
        ));
        assert_eq!(
            ClientError::from_status(StatusCode::NOT_FOUND, "x".into()).status(),
            Some(404)
        );
    }

    #[test]
    fn test_auth_expiry_classification() {
        assert!(ClientError::MissingToken.is_auth_expired());
        assert!(ClientError::AuthenticationFailed("expired".into()).is_auth_expired());
        assert!(!ClientError::Forbidden("no".into()).is_auth_expired());
        assert_eq!(ClientError::MissingToken.status(), None);
    }
}
