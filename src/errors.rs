use std::fmt;
use std::result::Result as StdResult;

use thiserror::Error;

/// Machine-readable reason attached to every [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    MissingField,
    InvalidField,
    MissingDistance,
    InvalidDistance,
    MissingName,
    InvalidFormat,
    LimitReached,
    ProbeInProgress,
    LoadFailed,
    SubmissionInProgress,
    NotOnFinalStep,
    InsufficientImages,
    StepLocked,
    UnitLocked,
    AlreadySubmitted,
    UnknownStep,
}

impl ValidationKind {
    pub fn code(self) -> &'static str {
        match self {
            ValidationKind::MissingField => "MissingField",
            ValidationKind::InvalidField => "InvalidField",
            ValidationKind::MissingDistance => "MissingDistance",
            ValidationKind::InvalidDistance => "InvalidDistance",
            ValidationKind::MissingName => "MissingName",
            ValidationKind::InvalidFormat => "InvalidFormat",
            ValidationKind::LimitReached => "LimitReached",
            ValidationKind::ProbeInProgress => "ProbeInProgress",
            ValidationKind::LoadFailed => "LoadFailed",
            ValidationKind::SubmissionInProgress => "SubmissionInProgress",
            ValidationKind::NotOnFinalStep => "NotOnFinalStep",
            ValidationKind::InsufficientImages => "InsufficientImages",
            ValidationKind::StepLocked => "StepLocked",
            ValidationKind::UnitLocked => "UnitLocked",
            ValidationKind::AlreadySubmitted => "AlreadySubmitted",
            ValidationKind::UnknownStep => "UnknownStep",
        }
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// User-fixable failure raised by the wizard core. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub kind: ValidationKind,
    /// First unmet field, when the failure is tied to one.
    pub field: Option<&'static str>,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: None,
            message: message.into(),
        }
    }

    pub fn for_field(
        kind: ValidationKind,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn missing(field: &'static str, label: &str) -> Self {
        Self::for_field(
            ValidationKind::MissingField,
            field,
            format!("{label} is required"),
        )
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::for_field(ValidationKind::InvalidField, field, message)
    }
}

/// Failure reported by the listing service collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Listing rejected: {0}")]
    Rejected(String),
    #[error("Listing not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for RemoteError {
    fn from(err: std::io::Error) -> Self {
        RemoteError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Storage(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Unified error type for the wizard core, storage, and configuration layers.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl WizardError {
    /// Returns the validation kind when this is a [`ValidationError`].
    pub fn validation_kind(&self) -> Option<ValidationKind> {
        match self {
            WizardError::Validation(err) => Some(err.kind),
            _ => None,
        }
    }
}

pub type Result<T> = StdResult<T, WizardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_names_the_field() {
        let err = ValidationError::missing("city", "City");
        assert_eq!(err.kind, ValidationKind::MissingField);
        assert_eq!(err.field, Some("city"));
        assert_eq!(err.to_string(), "City is required");
    }

    #[test]
    fn wizard_error_exposes_validation_kind() {
        let err: WizardError =
            ValidationError::new(ValidationKind::LimitReached, "too many images").into();
        assert_eq!(err.validation_kind(), Some(ValidationKind::LimitReached));

        let remote: WizardError = RemoteError::Network("offline".into()).into();
        assert!(remote.validation_kind().is_none());
        assert_eq!(remote.to_string(), "Network error: offline");
    }
}
