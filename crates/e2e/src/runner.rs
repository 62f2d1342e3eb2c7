//! Orchestrator and suite lifecycle
//!
//! [`Orchestrator::run`] drives an ordered batch of checks through one
//! session. [`Suite`] owns the session around it: open, run, always close.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;

use futures::FutureExt;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::catalog::{catalog, Check, Isolation};
use crate::chrome::ChromeDriver;
use crate::config::{Expectations, SuiteConfig};
use crate::driver::Driver;
use crate::error::{E2eError, E2eResult};
use crate::outcome::{Outcome, Summary};
use crate::report::Reporter;
use crate::session::{wait_for_target, Session};

/// Runs checks in ascending order against one session and aggregates outcomes.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    expectations: Expectations,
    /// Only run checks with these ids
    only: Option<Vec<String>>,
    /// Where failure screenshots go, when enabled
    screenshot_dir: Option<PathBuf>,
}

impl Orchestrator {
    pub fn new(expectations: Expectations) -> Self {
        Self {
            expectations,
            only: None,
            screenshot_dir: None,
        }
    }

    pub fn only(mut self, ids: Vec<String>) -> Self {
        self.only = Some(ids);
        self
    }

    pub fn screenshots_to(mut self, dir: PathBuf) -> Self {
        self.screenshot_dir = Some(dir);
        self
    }

    /// Checks that will run, in execution order. Order comes from each check's
    /// `order` key, never from its position in `checks`.
    pub fn plan(&self, checks: &[Check]) -> Vec<Check> {
        let mut planned: Vec<Check> = checks
            .iter()
            .filter(|check| match &self.only {
                Some(ids) => ids.iter().any(|id| id.eq_ignore_ascii_case(check.id)),
                None => true,
            })
            .cloned()
            .collect();
        planned.sort_by_key(|check| check.order);
        planned
    }

    /// Run every planned check. A failing check never stops the run; only
    /// session-level errors are returned.
    pub async fn run(
        &self,
        checks: &[Check],
        session: &mut Session,
        reporter: &mut dyn Reporter,
    ) -> E2eResult<Summary> {
        let planned = self.plan(checks);
        let mut summary = Summary::new();

        info!("Running {} check(s) against {}", planned.len(), session.base_url());
        reporter.suite_started(planned.len());

        for (index, check) in planned.iter().enumerate() {
            reporter.check_started(check);
            let outcome = self.run_check(check, index + 1, session).await?;

            if outcome.is_passed() {
                info!("✓ {} ({} ms)", outcome.check_id, outcome.duration_ms);
            } else {
                error!(
                    "✗ {} - {}",
                    outcome.check_id,
                    outcome.failure_message().unwrap_or_default()
                );
            }

            reporter.check_finished(&outcome);
            summary.record(outcome);
        }

        summary.finish();
        info!(
            "Check results: {} passed, {} failed ({} ms)",
            summary.passed, summary.failed, summary.duration_ms
        );
        reporter.suite_finished(&summary);
        Ok(summary)
    }

    async fn run_check(
        &self,
        check: &Check,
        position: usize,
        session: &mut Session,
    ) -> E2eResult<Outcome> {
        let start = Instant::now();
        debug!("Running check: {} (order {})", check.id, check.order);

        let result = match check.isolation {
            Isolation::Reload => session.navigate_to_base().await,
            Isolation::Shared => Ok(()),
        };
        let result = match result {
            Ok(()) => AssertUnwindSafe(check.run(session, &self.expectations))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(E2eError::Panicked(panic_message(panic)))),
            Err(e) => Err(e),
        };

        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => Ok(Outcome::passed(check.id, check.description, position, duration_ms)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                let mut outcome =
                    Outcome::failed(check.id, check.description, position, &e, duration_ms);
                if let Some(dir) = &self.screenshot_dir {
                    outcome.screenshot = capture_failure(session, dir, check.id).await;
                }
                Ok(outcome)
            }
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Screenshot failures are logged; they never change a check's status.
async fn capture_failure(session: &mut Session, dir: &std::path::Path, check_id: &str) -> Option<PathBuf> {
    let png = match session.screenshot().await {
        Ok(png) => png,
        Err(e) => {
            warn!("Could not capture screenshot for {}: {}", check_id, e);
            return None;
        }
    };
    let path = dir.join(format!("{}.png", check_id));
    let written = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, png));
    match written {
        Ok(()) => Some(path),
        Err(e) => {
            warn!("Could not write {}: {}", path.display(), e);
            None
        }
    }
}

/// One complete run: preflight, open the session, run the checks, close.
pub struct Suite {
    config: SuiteConfig,
    checks: Vec<Check>,
    only: Option<Vec<String>>,
}

impl Suite {
    pub fn new(config: SuiteConfig) -> Self {
        Self {
            config,
            checks: catalog(),
            only: None,
        }
    }

    pub fn only(mut self, ids: Vec<String>) -> Self {
        if !ids.is_empty() {
            self.only = Some(ids);
        }
        self
    }

    /// Run against a Chrome instance launched from the configuration.
    pub async fn run(self, reporter: &mut dyn Reporter) -> E2eResult<Summary> {
        let browser = self.config.browser.clone();
        let timeouts = self.config.timeouts.clone();
        self.run_with(
            || async move {
                let driver: Box<dyn Driver> =
                    Box::new(ChromeDriver::launch(&browser, &timeouts).await?);
                Ok::<_, E2eError>(driver)
            },
            reporter,
        )
        .await
    }

    /// Run against a driver produced by `launch`. The session is closed on
    /// every exit path, including a panic escaping the orchestrator.
    pub async fn run_with<F, Fut>(self, launch: F, reporter: &mut dyn Reporter) -> E2eResult<Summary>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = E2eResult<Box<dyn Driver>>>,
    {
        self.config.validate()?;

        let preflight = self.config.timeouts.preflight();
        if !preflight.is_zero() {
            wait_for_target(&self.config.base_url, preflight).await?;
        }

        let driver = launch().await.map_err(|e| match e {
            E2eError::SessionUnavailable(_) => e,
            other => E2eError::SessionUnavailable(other.to_string()),
        })?;
        let mut session = Session::open(driver, self.config.base_url.clone(), self.config.timeouts.clone());

        let mut orchestrator = Orchestrator::new(self.config.expectations.clone());
        if let Some(ids) = self.only.clone() {
            orchestrator = orchestrator.only(ids);
        }
        if self.config.screenshots_on_failure {
            orchestrator = orchestrator.screenshots_to(self.config.output_dir.join("screenshots"));
        }

        let result = AssertUnwindSafe(orchestrator.run(&self.checks, &mut session, reporter))
            .catch_unwind()
            .await;

        if let Err(e) = session.close().await {
            warn!("Error while closing browser session: {}", e);
        }

        match result {
            Ok(summary) => summary,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
