//! Suite execution

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use brewbite_e2e::{
    catalog, ConsoleReporter, HarnessStyle, Outcome, Reporter, SilentReporter, Suite, SuiteConfig,
};

use crate::output::{
    print_document, print_error, print_info, print_list, print_success, print_warning,
    OutputFormat, TableDisplay,
};

#[derive(Args)]
pub struct RunArgs {
    /// Landing page URL (overrides the configuration file and BREWBITE_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Progress output style
    #[arg(long, default_value = "ordered")]
    pub style: HarnessStyle,

    /// Run only these checks, e.g. --only TC-01,TC-05
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Launch Chrome without its sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Directory for suite-results.json and screenshots
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Capture a screenshot for every failed check
    #[arg(long)]
    pub screenshots: bool,

    /// Wait up to this many seconds for the page to answer before launching
    #[arg(long)]
    pub wait_for_target: Option<u64>,
}

impl RunArgs {
    fn apply(&self, config: &mut SuiteConfig) {
        if let Some(ref url) = self.base_url {
            config.base_url = url.clone();
        }
        if self.headed {
            config.browser.headless = false;
        }
        if self.no_sandbox {
            config.browser.sandbox = false;
        }
        if let Some(ref dir) = self.output {
            config.output_dir = dir.clone();
        }
        if self.screenshots {
            config.screenshots_on_failure = true;
        }
        if let Some(secs) = self.wait_for_target {
            config.timeouts.preflight_timeout_ms = secs.saturating_mul(1000);
        }
    }
}

/// Outcome row for the results table
#[derive(Serialize)]
pub struct OutcomeDisplay {
    pub position: usize,
    pub check_id: String,
    pub description: String,
    pub passed: bool,
    pub duration_ms: u64,
    pub detail: String,
}

impl From<&Outcome> for OutcomeDisplay {
    fn from(outcome: &Outcome) -> Self {
        Self {
            position: outcome.position,
            check_id: outcome.check_id.clone(),
            description: outcome.description.clone(),
            passed: outcome.is_passed(),
            duration_ms: outcome.duration_ms,
            detail: outcome.failure_message().unwrap_or_default(),
        }
    }
}

impl TableDisplay for OutcomeDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["#", "Check", "Description", "Result", "Duration", "Detail"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.position.to_string(),
            self.check_id.clone(),
            self.description.clone(),
            if self.passed { "✓" } else { "✗" }.to_string(),
            format!("{}ms", self.duration_ms),
            self.detail.clone(),
        ]
    }
}

/// Reject ids the catalog does not know before spending a browser launch.
fn check_ids(only: &[String]) -> Result<()> {
    let known = catalog();
    for id in only {
        if !known.iter().any(|check| check.id.eq_ignore_ascii_case(id)) {
            bail!("unknown check id '{}' (see `brewbite list`)", id);
        }
    }
    Ok(())
}

/// Run the suite; the returned exit code is 0 when every check passed.
pub async fn execute(args: RunArgs, config_path: &Path, format: OutputFormat) -> Result<i32> {
    let mut config = SuiteConfig::load(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?
        .with_env_overrides()?;
    args.apply(&mut config);
    config.validate()?;
    check_ids(&args.only)?;

    debug!("Effective configuration: {:?}", config);
    let output_dir = config.output_dir.clone();

    let mut reporter: Box<dyn Reporter> = if format.is_document() {
        Box::new(SilentReporter)
    } else {
        Box::new(ConsoleReporter::stdout(args.style))
    };

    let summary = Suite::new(config)
        .only(args.only)
        .run(reporter.as_mut())
        .await?;

    let results = match summary.write_json(&output_dir) {
        Ok(path) => Some(path),
        Err(e) => {
            print_warning(&format!("Could not write results: {}", e));
            None
        }
    };

    if format.is_document() {
        print_document(&summary, format)?;
    } else {
        if format == OutputFormat::Table {
            let rows: Vec<OutcomeDisplay> = summary.outcomes.iter().map(OutcomeDisplay::from).collect();
            print_list(&rows, format);
        }

        let rate = summary.success_rate_display();
        if summary.all_passed() {
            print_success(&format!(
                "{} {}/{} checks ({})",
                "PASSED".green().bold(),
                summary.passed,
                summary.total,
                rate
            ));
        } else {
            print_error(&format!(
                "{} {} of {} checks ({} success)",
                "FAILED".red().bold(),
                summary.failed,
                summary.total,
                rate
            ));
        }
        if let Some(path) = results {
            print_info(&format!("Results written to {}", path.display()));
        }
    }

    Ok(if summary.all_passed() { 0 } else { 1 })
}
