use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type shared by the recurrence engine, its services and storage backends.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Lookup failed: {0}")]
    Lookup(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;

/// Tag describing which family a [`PlannerError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    Configuration,
    Lookup,
    Persistence,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Lookup => "lookup",
            ErrorKind::Persistence => "persistence",
        };
        f.write_str(label)
    }
}

impl PlannerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlannerError::Validation(_) => ErrorKind::Validation,
            PlannerError::Configuration(_) => ErrorKind::Configuration,
            PlannerError::Lookup(_) => ErrorKind::Lookup,
            PlannerError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// Message without the kind prefix added by `Display`.
    pub fn detail(&self) -> &str {
        match self {
            PlannerError::Validation(message)
            | PlannerError::Configuration(message)
            | PlannerError::Lookup(message)
            | PlannerError::Persistence(message) => message,
        }
    }
}

impl From<std::io::Error> for PlannerError {
    fn from(err: std::io::Error) -> Self {
        PlannerError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::Persistence(err.to_string())
    }
}

/// Success flag plus human readable message handed back to UI collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub success: bool,
    pub kind: Option<ErrorKind>,
    pub message: String,
}

impl Feedback {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            kind: None,
            message: message.into(),
        }
    }

    pub fn failed(err: &PlannerError) -> Self {
        Self {
            success: false,
            kind: Some(err.kind()),
            message: err.to_string(),
        }
    }

    pub fn from_result<T>(result: &Result<T>, success_message: impl Into<String>) -> Self {
        match result {
            Ok(_) => Self::ok(success_message),
            Err(err) => Self::failed(err),
        }
    }
}

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] PlannerError),
    #[error(transparent)]
    Usage(#[from] clap::Error),
}
