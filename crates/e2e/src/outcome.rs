//! Per-check outcomes and the run summary

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{E2eError, E2eResult, FailureKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Passed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureDetail {
    pub kind: FailureKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<String>,
}

impl From<&E2eError> for FailureDetail {
    fn from(err: &E2eError) -> Self {
        match err {
            E2eError::AssertionFailed {
                message,
                expected,
                observed,
            } => FailureDetail {
                kind: FailureKind::AssertionFailed,
                message: message.clone(),
                expected: Some(expected.clone()),
                observed: Some(observed.clone()),
            },
            other => FailureDetail {
                kind: other.kind(),
                message: other.to_string(),
                expected: None,
                observed: None,
            },
        }
    }
}

/// Result of running one check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub check_id: String,
    pub description: String,
    /// 1-based execution position within the run
    pub position: usize,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<FailureDetail>,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

impl Outcome {
    pub fn passed(check_id: &str, description: &str, position: usize, duration_ms: u64) -> Self {
        Self {
            check_id: check_id.to_string(),
            description: description.to_string(),
            position,
            status: Status::Passed,
            detail: None,
            duration_ms,
            screenshot: None,
        }
    }

    pub fn failed(
        check_id: &str,
        description: &str,
        position: usize,
        error: &E2eError,
        duration_ms: u64,
    ) -> Self {
        Self {
            check_id: check_id.to_string(),
            description: description.to_string(),
            position,
            status: Status::Failed,
            detail: Some(FailureDetail::from(error)),
            duration_ms,
            screenshot: None,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == Status::Passed
    }

    /// One-line failure text for console output.
    pub fn failure_message(&self) -> Option<String> {
        self.detail.as_ref().map(|detail| match (&detail.expected, &detail.observed) {
            (Some(expected), Some(observed)) => format!(
                "{} (expected: {}, observed: {})",
                detail.message, expected, observed
            ),
            _ => detail.message.clone(),
        })
    }
}

/// Aggregate over all outcomes of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
    pub outcomes: Vec<Outcome>,
}

impl Default for Summary {
    fn default() -> Self {
        Self::new()
    }
}

impl Summary {
    pub fn new() -> Self {
        Self {
            total: 0,
            passed: 0,
            failed: 0,
            started_at: Utc::now(),
            finished_at: None,
            duration_ms: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome.status {
            Status::Passed => self.passed += 1,
            Status::Failed => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn finish(&mut self) {
        let finished = Utc::now();
        self.duration_ms = (finished - self.started_at).num_milliseconds().max(0) as u64;
        self.finished_at = Some(finished);
    }

    /// Percentage of passed checks. An empty run reports 0.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 * 100.0 / self.total as f64
        }
    }

    pub fn success_rate_display(&self) -> String {
        format!("{:.2}%", self.success_rate())
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn outcome(&self, check_id: &str) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.check_id == check_id)
    }

    /// Write the summary as `suite-results.json` under `dir`.
    pub fn write_json(&self, dir: &Path) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(dir)?;

        let path = dir.join("suite-results.json");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
