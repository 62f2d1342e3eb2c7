//! Run reporters
//!
//! The three harness styles share one catalog and one orchestrator; they only
//! differ in how progress and the final summary are printed.

use std::io::Write;

use clap::ValueEnum;
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};

use crate::catalog::Check;
use crate::outcome::{Outcome, Summary};

/// Observer of a run. Every method has a no-op default.
pub trait Reporter: Send {
    fn suite_started(&mut self, _total: usize) {}

    fn check_started(&mut self, _check: &Check) {}

    fn check_finished(&mut self, _outcome: &Outcome) {}

    fn suite_finished(&mut self, _summary: &Summary) {}
}

/// Reports nothing.
#[derive(Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarnessStyle {
    /// "Executing TC-nn" / "TC-nn: PASSED" per check
    #[default]
    Ordered,
    /// Like ordered, tagged with each check's priority
    Prioritized,
    /// Banner, per-check result lines and a success-rate summary block
    Sequential,
}

const RULE_WIDTH: usize = 70;

/// Console reporter for one of the harness styles.
pub struct ConsoleReporter<W: Write + Send> {
    style: HarnessStyle,
    out: W,
    color: bool,
    current_order: u32,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout(style: HarnessStyle) -> Self {
        Self::new(style, std::io::stdout(), true)
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(style: HarnessStyle, out: W, color: bool) -> Self {
        Self {
            style,
            out,
            color,
            current_order: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.color(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn line(&mut self, text: &str) {
        // Console output is best effort; a closed pipe must not fail the run.
        let _ = writeln!(self.out, "{}", text);
    }

    fn rule(&mut self) {
        self.line(&"=".repeat(RULE_WIDTH));
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn suite_started(&mut self, total: usize) {
        if self.style == HarnessStyle::Sequential {
            self.rule();
            self.line("BREW & BITE CAFÉ - ACCEPTANCE CHECK EXECUTION");
            self.rule();
            self.line(&format!("Running {} check(s)", total));
            self.line("");
        }
    }

    fn check_started(&mut self, check: &Check) {
        self.current_order = check.order;
        let text = match self.style {
            HarnessStyle::Ordered => format!("Executing {}: {}", check.id, check.description),
            HarnessStyle::Prioritized => format!(
                "[priority {}] Executing {}: {}",
                check.order, check.id, check.description
            ),
            HarnessStyle::Sequential => format!("{}: {}", check.id, check.description),
        };
        self.line(&text);
    }

    fn check_finished(&mut self, outcome: &Outcome) {
        let status = if outcome.is_passed() {
            self.paint("PASSED", Color::Green)
        } else {
            self.paint("FAILED", Color::Red)
        };
        let failure = outcome.failure_message();

        match self.style {
            HarnessStyle::Ordered | HarnessStyle::Prioritized => {
                let prefix = if self.style == HarnessStyle::Prioritized {
                    format!("[priority {}] ", self.current_order)
                } else {
                    String::new()
                };
                match failure {
                    None => self.line(&format!(
                        "{}{}: {} ({} ms)",
                        prefix, outcome.check_id, status, outcome.duration_ms
                    )),
                    Some(message) => self.line(&format!(
                        "{}{}: {} - {}",
                        prefix, outcome.check_id, status, message
                    )),
                }
            }
            HarnessStyle::Sequential => {
                let mark = if outcome.is_passed() { "✓" } else { "✗" };
                self.line(&format!("Result: {} {}", status, mark));
                if let Some(message) = failure {
                    self.line(&format!("Error: {}", message));
                }
            }
        }
        self.line("");
    }

    fn suite_finished(&mut self, summary: &Summary) {
        match self.style {
            HarnessStyle::Sequential => {
                self.rule();
                self.line("TEST EXECUTION SUMMARY");
                self.rule();
                self.line(&format!("Total Tests: {}", summary.total));
                self.line(&format!("Passed: {}", summary.passed));
                self.line(&format!("Failed: {}", summary.failed));
                self.line(&format!("Success Rate: {}", summary.success_rate_display()));
                self.rule();
            }
            HarnessStyle::Ordered | HarnessStyle::Prioritized => {
                self.line(&format!(
                    "Results: {} passed, {} failed of {} ({}, {} ms)",
                    summary.passed,
                    summary.failed,
                    summary.total,
                    summary.success_rate_display(),
                    summary.duration_ms
                ));
            }
        }
        let _ = self.out.flush();
    }
}
