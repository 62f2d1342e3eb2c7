//! Brew & Bite Café acceptance checks
//!
//! This crate drives a real browser against the café landing page and runs a
//! fixed catalog of seventeen checks against it:
//! - One browser session per run, always closed on exit
//! - Checks run in ascending priority, each against a fresh page load
//! - A failing check is recorded and the run continues
//! - Results are aggregated into a [`Summary`] with a success rate
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Suite                               │
//! │    ├── wait_for_target(base_url)     (optional preflight)   │
//! │    ├── launch() -> Box<dyn Driver>   (ChromeDriver)         │
//! │    ├── Session::open / Session::close                       │
//! │    └── Orchestrator::run(catalog) -> Summary                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Check { id, description, order, procedure }                │
//! │    ├── Session: find, text, css_value, click, hover         │
//! │    ├── geometry: placement, is_in_viewport                  │
//! │    ├── style: distinct, is_grid, FontBaseline               │
//! │    └── text: word_count, looks_like_email                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Reporter (ordered | prioritized | sequential)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod chrome;
pub mod config;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod outcome;
pub mod report;
pub mod runner;
pub mod session;
pub mod style;
pub mod text;
pub mod wait;

pub use catalog::{catalog, Check, Isolation};
pub use chrome::ChromeDriver;
pub use config::{BrowserConfig, Expectations, SuiteConfig, Timeouts};
pub use driver::{Driver, NodeId, Selector};
pub use error::{E2eError, E2eResult, FailureKind};
pub use outcome::{FailureDetail, Outcome, Status, Summary};
pub use report::{ConsoleReporter, HarnessStyle, Reporter, SilentReporter};
pub use runner::{Orchestrator, Suite};
pub use session::{ElementHandle, Session, SessionState};

/// Run the whole catalog against `base_url` in a default headless Chrome.
pub async fn run(base_url: &str) -> E2eResult<Summary> {
    let config = SuiteConfig {
        base_url: base_url.to_string(),
        ..SuiteConfig::default()
    };
    Suite::new(config).run(&mut SilentReporter).await
}
