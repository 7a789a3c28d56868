//! Error types and handling.

use std::collections::BTreeMap;

use thiserror::Error;

/// Application-wide error type.
///
/// The `Display` output of each variant is what the console shows in its
/// error banner.
#[derive(Error, Debug)]
pub enum AppError {
    /// The API could not be reached (connection refused, DNS, timeout).
    #[error("Unable to connect to the department API: {0}")]
    Unreachable(String),

    /// Any other transport-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The API answered with a non-success status.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        field_errors: BTreeMap<String, String>,
    },

    /// A success response whose body did not match the expected shape.
    #[error("Unexpected response from the API: {0}")]
    Decode(String),

    /// Form input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Unreachable(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl AppError {
    /// Create a config error with message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error with message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether the failure means the backend is not reachable at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// Per-field messages reported by the API for a rejected request.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Api { field_errors, .. } if !field_errors.is_empty() => Some(field_errors),
            _ => None,
        }
    }

    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_message_only() {
        let err = AppError::Api {
            status: 409,
            message: "Department code already exists: ENG".to_string(),
            field_errors: BTreeMap::new(),
        };
        assert_eq!(err.to_string(), "Department code already exists: ENG");
        assert_eq!(err.status(), Some(409));
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn test_unreachable_classification() {
        assert!(AppError::Unreachable("connection refused".to_string()).is_unreachable());
        assert!(!AppError::validation("Name is required").is_unreachable());
        assert!(!AppError::Http("builder error".to_string()).is_unreachable());
    }

    #[test]
    fn test_field_errors_exposed_when_present() {
        let mut fields = BTreeMap::new();
        fields.insert("email".to_string(), "Email address is invalid".to_string());
        let err = AppError::Api {
            status: 400,
            message: "Bad Request".to_string(),
            field_errors: fields,
        };
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.get("email").map(String::as_str), Some("Email address is invalid"));
    }
}
