//! Error taxonomy shared by every drive operation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failure raised by a drive operation or one of its collaborators.
pub enum DriveError {
    /// Input was rejected before any network call (empty name, missing field).
    #[error("{0}")]
    Validation(String),
    /// The acting user could not be established.
    #[error("{0}")]
    Auth(String),
    /// Transferring bytes to or from object storage returned a non-success status.
    #[error("storage transfer failed: {status} {body}")]
    Transfer {
        /// HTTP status returned by the storage endpoint.
        status: u16,
        /// Response body text, possibly empty.
        body: String,
    },
    /// A backend API call failed.
    #[error("{message}")]
    Remote {
        /// HTTP status when a response was received.
        status: Option<u16>,
        /// Server-provided message, or a transport description.
        message: String,
    },
    /// The operation targeted an id that is no longer present locally.
    #[error("item `{id}` not found")]
    NotFound {
        /// Canonical id that could not be resolved.
        id: String,
    },
}

impl DriveError {
    /// Builds a [`DriveError::Remote`] without a status (transport-level failure).
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            status: None,
            message: message.into(),
        }
    }

    /// Builds a [`DriveError::NotFound`].
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Returns `true` when retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transfer { .. } | Self::Remote { .. })
    }

    /// Text suitable for a user-facing status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Auth(message) => message.clone(),
            Self::Transfer { status, .. } => {
                format!("Storage transfer failed ({status}). Please try again.")
            }
            Self::Remote { message, .. } if message.is_empty() => {
                "The server could not complete the request. Please try again.".to_string()
            }
            Self::Remote { message, .. } => message.clone(),
            Self::NotFound { .. } => "That item is no longer available.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_error_carries_status_and_body() {
        let err = DriveError::Transfer {
            status: 500,
            body: "InternalError".to_string(),
        };
        assert_eq!(err.to_string(), "storage transfer failed: 500 InternalError");
        assert!(err.is_retryable());
    }

    #[test]
    fn validation_and_not_found_are_not_retryable() {
        assert!(!DriveError::Validation("Folder name is required".into()).is_retryable());
        assert!(!DriveError::not_found("f1").is_retryable());
        assert_eq!(DriveError::not_found("f1").to_string(), "item `f1` not found");
    }

    #[test]
    fn empty_remote_message_gets_generic_text() {
        assert_eq!(
            DriveError::remote("").user_message(),
            "The server could not complete the request. Please try again."
        );
        assert_eq!(DriveError::remote("Folder exists").user_message(), "Folder exists");
    }
}
