//! Error types for recording engagement operations

use thiserror::Error;

/// Outcome code reported to the call-processing layer on success.
pub const ENGAGE_OK: i32 = 1;

#[derive(Debug, Error)]
pub enum EngageError {
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unknown recording destination: {0}")]
    UnknownDestination(String),

    #[error("Dialog creation failed: {0}")]
    DialogCreationFailed(String),

    #[error("Session creation failed: {0}")]
    SessionCreationFailed(String),

    #[error("Invalid media description: {0}")]
    InvalidMedia(String),

    #[error("Media attach failed: {0}")]
    MediaAttachFailed(String),

    #[error("Callback registration failed: {0}")]
    CallbackRegistrationFailed(String),

    #[error("Recording start failed: {0}")]
    RecordingStartFailed(String),

    #[error("Invalid session state transition: {0}")]
    InvalidTransition(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl EngageError {
    /// Signed outcome code for the call-processing layer.
    ///
    /// Success is positive (`ENGAGE_OK`); every failure kind maps to its own
    /// negative value so script logic can branch on the cause.
    pub fn code(&self) -> i32 {
        match self {
            Self::MissingParameter(_) => -1,
            Self::UnknownDestination(_) => -2,
            Self::DialogCreationFailed(_) => -3,
            Self::SessionCreationFailed(_) => -4,
            Self::InvalidMedia(_) => -5,
            Self::MediaAttachFailed(_) => -6,
            Self::CallbackRegistrationFailed(_) => -7,
            Self::RecordingStartFailed(_) => -8,
            Self::InvalidTransition(_) => -9,
            Self::ConfigError(_) => -100,
        }
    }
}

/// Failure reported by an external collaborator (dialog engine, transaction
/// notifier, media relay). Mapped onto the `EngageError` taxonomy at the
/// orchestrator boundary.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct AdapterError(pub String);

impl AdapterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type Result<T> = std::result::Result<T, EngageError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn outcome_codes_are_distinct_and_negative() {
        let errors = vec![
            EngageError::MissingParameter("destination"),
            EngageError::UnknownDestination("main".into()),
            EngageError::DialogCreationFailed("engine down".into()),
            EngageError::SessionCreationFailed("store full".into()),
            EngageError::InvalidMedia("empty payload".into()),
            EngageError::MediaAttachFailed("relay refused".into()),
            EngageError::CallbackRegistrationFailed("no transaction".into()),
            EngageError::RecordingStartFailed("srs unreachable".into()),
        ];
        let codes: HashSet<i32> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|c| *c < 0));
        assert!(ENGAGE_OK > 0);
    }

    #[test]
    fn error_messages_name_the_cause() {
        let err = EngageError::UnknownDestination("branch-office".into());
        assert_eq!(
            err.to_string(),
            "Unknown recording destination: branch-office"
        );
    }
}
