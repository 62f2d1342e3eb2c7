//! Error types for acceptance checks

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Browser session unavailable: {0}")]
    SessionUnavailable(String),

    #[error("Target {url} unreachable after {attempts} attempts")]
    TargetUnreachable { url: String, attempts: usize },

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Stale element handle #{handle}: obtained before the last navigation")]
    StaleElement { handle: u64 },

    #[error("{message} (expected: {expected}, observed: {observed})")]
    AssertionFailed {
        message: String,
        expected: String,
        observed: String,
    },

    #[error("Script execution failed: {0}")]
    ScriptExecution(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Check panicked: {0}")]
    Panicked(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

/// Coarse classification carried on failed outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ElementNotFound,
    AssertionFailed,
    ScriptError,
    StaleElement,
    Timeout,
    Panic,
    Other,
}

impl E2eError {
    pub fn assertion(
        message: impl Into<String>,
        expected: impl Display,
        observed: impl Display,
    ) -> Self {
        E2eError::AssertionFailed {
            message: message.into(),
            expected: expected.to_string(),
            observed: observed.to_string(),
        }
    }

    /// Session-level errors abort the whole run; everything else becomes a
    /// failed outcome for the check that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            E2eError::SessionUnavailable(_) | E2eError::TargetUnreachable { .. }
        )
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            E2eError::ElementNotFound { .. } => FailureKind::ElementNotFound,
            E2eError::AssertionFailed { .. } => FailureKind::AssertionFailed,
            E2eError::ScriptExecution(_) => FailureKind::ScriptError,
            E2eError::StaleElement { .. } => FailureKind::StaleElement,
            E2eError::Timeout(_) => FailureKind::Timeout,
            E2eError::Panicked(_) => FailureKind::Panic,
            _ => FailureKind::Other,
        }
    }
}

/// Fail with an assertion error unless `condition` holds.
pub fn ensure(
    condition: bool,
    message: &str,
    expected: impl Display,
    observed: impl Display,
) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::assertion(message, expected, observed))
    }
}
