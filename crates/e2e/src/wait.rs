//! Bounded polling for page state that settles after an interaction

use std::time::Duration;

use tokio::time::{sleep, Instant};

/// Samples a condition until it holds or the deadline passes.
///
/// ```ignore
/// let poller = Poller::new(timeout, interval);
/// loop {
///     if condition().await? { break; }
///     if !poller.tick().await { return Err(..); }
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    deadline: Instant,
    interval: Duration,
}

impl Poller {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Sleep until the next sample. Returns `false` once the deadline has
    /// passed and no further sample should be taken.
    pub async fn tick(&self) -> bool {
        let now = Instant::now();
        if now >= self.deadline {
            return false;
        }
        sleep(self.interval.min(self.deadline - now)).await;
        true
    }
}
