//! Suite configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{E2eError, E2eResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5173";

/// Everything a run needs besides the check catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Page under test; every check starts from a fresh load of it
    pub base_url: String,

    pub browser: BrowserConfig,

    pub timeouts: Timeouts,

    pub expectations: Expectations,

    /// Directory for results and failure screenshots
    pub output_dir: PathBuf,

    /// Capture a screenshot for every failed check
    pub screenshots_on_failure: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: BrowserConfig::default(),
            timeouts: Timeouts::default(),
            expectations: Expectations::default(),
            output_dir: PathBuf::from("test-results"),
            screenshots_on_failure: false,
        }
    }
}

/// Browser launch options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,

    pub window_width: u32,
    pub window_height: u32,

    /// Chrome/Chromium binary; auto-detected when unset
    pub executable: Option<PathBuf>,

    /// Disable for containers without user namespaces
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            executable: None,
            sandbox: true,
        }
    }
}

/// Wait bounds, in milliseconds on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Applied to every element lookup
    pub implicit_wait_ms: u64,

    /// Upper bound for scroll, transition and hover effects to settle
    pub settle_timeout_ms: u64,

    pub poll_interval_ms: u64,

    /// How long to wait for the target to answer HTTP before launching a
    /// browser. Zero skips the probe.
    pub preflight_timeout_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            implicit_wait_ms: 10_000,
            settle_timeout_ms: 1_000,
            poll_interval_ms: 50,
            preflight_timeout_ms: 0,
        }
    }
}

impl Timeouts {
    pub fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn preflight(&self) -> Duration {
        Duration::from_millis(self.preflight_timeout_ms)
    }
}

/// Fixed facts about the page under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Expectations {
    pub cafe_name: String,
    pub min_menu_items: usize,
    pub min_about_words: usize,
    /// Whether `h3` headings join the font consistency check
    pub include_h3_in_font_check: bool,
}

impl Default for Expectations {
    fn default() -> Self {
        Self {
            cafe_name: "Brew & Bite Café".to_string(),
            min_menu_items: 4,
            min_about_words: 50,
            include_h3_in_font_check: false,
        }
    }
}

impl SuiteConfig {
    /// Load configuration from a YAML file; a missing file yields defaults.
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            debug!("Loading suite configuration from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            Self::from_yaml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> E2eResult<String> {
        serde_yaml::to_string(self).map_err(E2eError::from)
    }

    /// Apply `BREWBITE_BASE_URL` and `BREWBITE_HEADLESS`.
    pub fn with_env_overrides(self) -> E2eResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> E2eResult<Self> {
        if let Some(url) = lookup("BREWBITE_BASE_URL") {
            self.base_url = url;
        }
        if let Some(headless) = lookup("BREWBITE_HEADLESS") {
            self.browser.headless = match headless.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(E2eError::Config(format!(
                        "BREWBITE_HEADLESS must be a boolean, got '{}'",
                        other
                    )))
                }
            };
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> E2eResult<()> {
        if !(self.base_url.starts_with("http://")
            || self.base_url.starts_with("https://")
            || self.base_url.starts_with("file://"))
        {
            return Err(E2eError::Config(format!(
                "base_url must be an http(s) or file URL, got '{}'",
                self.base_url
            )));
        }
        if self.browser.window_width == 0 || self.browser.window_height == 0 {
            return Err(E2eError::Config("window size must be non-zero".to_string()));
        }
        Ok(())
    }
}
