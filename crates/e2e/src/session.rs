//! Browser session lifecycle
//!
//! A [`Session`] owns the one driver for a run. It stamps every element handle
//! with the navigation generation it was found in and rejects handles from an
//! earlier page load.

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Timeouts;
use crate::driver::{scripts, Driver, NodeId, Selector};
use crate::error::{E2eError, E2eResult};
use crate::geometry::Placement;
use crate::wait::Poller;

/// Reference to an element located during one page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    node: NodeId,
    generation: u64,
}

impl ElementHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed,
}

/// The single live browser connection for a run.
pub struct Session {
    driver: Box<dyn Driver>,
    base_url: String,
    timeouts: Timeouts,
    state: SessionState,
    generation: u64,
}

impl Session {
    /// Wrap a freshly launched driver.
    pub fn open(driver: Box<dyn Driver>, base_url: impl Into<String>, timeouts: Timeouts) -> Self {
        let base_url = base_url.into();
        info!("Browser session opened for {}", base_url);
        Self {
            driver,
            base_url,
            timeouts,
            state: SessionState::Open,
            generation: 0,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Terminate the browser. Further calls are no-ops.
    pub async fn close(&mut self) -> E2eResult<()> {
        if !self.is_open() {
            return Ok(());
        }
        self.state = SessionState::Closed;
        info!("Closing browser session");
        self.driver.quit().await
    }

    fn ensure_open(&self) -> E2eResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(E2eError::SessionUnavailable("session already closed".to_string()))
        }
    }

    fn node(&self, handle: &ElementHandle) -> E2eResult<NodeId> {
        self.ensure_open()?;
        if handle.generation != self.generation {
            return Err(E2eError::StaleElement { handle: handle.node });
        }
        Ok(handle.node)
    }

    fn stamp(&self, node: NodeId) -> ElementHandle {
        ElementHandle {
            node,
            generation: self.generation,
        }
    }

    /// Fresh load of the base URL. Resets scroll, hover and in-page timers.
    pub async fn navigate_to_base(&mut self) -> E2eResult<()> {
        let url = self.base_url.clone();
        self.navigate(&url).await
    }

    pub async fn navigate(&mut self, url: &str) -> E2eResult<()> {
        self.ensure_open()?;
        self.generation += 1;
        debug!("Navigating to {} (generation {})", url, self.generation);
        self.driver.navigate(url).await
    }

    pub async fn find(&mut self, selector: &Selector) -> E2eResult<ElementHandle> {
        self.ensure_open()?;
        let node = self.driver.find_one(selector).await?;
        Ok(self.stamp(node))
    }

    pub async fn find_all(&mut self, selector: &Selector) -> E2eResult<Vec<ElementHandle>> {
        self.ensure_open()?;
        let nodes = self.driver.find_many(selector).await?;
        Ok(nodes.into_iter().map(|node| self.stamp(node)).collect())
    }

    pub async fn find_in(
        &mut self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> E2eResult<ElementHandle> {
        let parent = self.node(parent)?;
        let node = self.driver.find_within(parent, selector).await?;
        Ok(self.stamp(node))
    }

    pub async fn is_visible(&mut self, handle: &ElementHandle) -> E2eResult<bool> {
        let node = self.node(handle)?;
        self.driver.is_visible(node).await
    }

    pub async fn is_enabled(&mut self, handle: &ElementHandle) -> E2eResult<bool> {
        let node = self.node(handle)?;
        self.driver.is_enabled(node).await
    }

    pub async fn text(&mut self, handle: &ElementHandle) -> E2eResult<String> {
        let node = self.node(handle)?;
        self.driver.text(node).await
    }

    pub async fn css_value(&mut self, handle: &ElementHandle, property: &str) -> E2eResult<String> {
        let node = self.node(handle)?;
        self.driver.computed_style(node, property).await
    }

    pub async fn execute_script(
        &mut self,
        script: &str,
        args: &[&ElementHandle],
    ) -> E2eResult<serde_json::Value> {
        let mut nodes = Vec::with_capacity(args.len());
        for handle in args {
            nodes.push(self.node(handle)?);
        }
        self.driver.execute_script(script, &nodes).await
    }

    pub async fn click(&mut self, handle: &ElementHandle) -> E2eResult<()> {
        let node = self.node(handle)?;
        self.driver.click(node).await
    }

    pub async fn hover(&mut self, handle: &ElementHandle) -> E2eResult<()> {
        let node = self.node(handle)?;
        self.driver.hover_over(node).await
    }

    pub async fn screenshot(&mut self) -> E2eResult<Vec<u8>> {
        self.ensure_open()?;
        self.driver.screenshot().await
    }

    /// Bounding box of the element and the viewport height it was measured in.
    pub async fn placement(&mut self, handle: &ElementHandle) -> E2eResult<Placement> {
        let value = self.execute_script(scripts::PLACEMENT, &[handle]).await?;
        let placement = match value {
            serde_json::Value::String(json) => serde_json::from_str(&json)?,
            other => serde_json::from_value(other)?,
        };
        Ok(placement)
    }

    /// Poll until the element's top edge lies in the viewport, or the settle
    /// bound elapses. Returns the last placement sampled.
    pub async fn wait_in_viewport(&mut self, handle: &ElementHandle) -> E2eResult<(bool, Placement)> {
        let poller = Poller::new(self.timeouts.settle(), self.timeouts.poll_interval());
        loop {
            let placement = self.placement(handle).await?;
            if placement.in_viewport() {
                return Ok((true, placement));
            }
            if !poller.tick().await {
                return Ok((false, placement));
            }
        }
    }

    /// Scroll the element to the top of the viewport and let the layout settle.
    pub async fn scroll_to(&mut self, selector: &Selector) -> E2eResult<ElementHandle> {
        let element = self.find(selector).await?;
        self.execute_script(scripts::SCROLL_INTO_VIEW, &[&element]).await?;
        let (settled, placement) = self.wait_in_viewport(&element).await?;
        if !settled {
            warn!(
                "{} did not settle in the viewport (top={})",
                selector, placement.rect.top
            );
        }
        Ok(element)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.is_open() {
            warn!("Browser session dropped without close; relying on driver drop to terminate it");
        }
    }
}

/// Probe the target over HTTP until it answers, before spending a browser
/// launch on it.
pub async fn wait_for_target(url: &str, timeout_duration: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    while start.elapsed() < timeout_duration {
        attempts += 1;

        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("Target {} is up after {} attempt(s)", url, attempts);
                return Ok(());
            }
            Ok(resp) => {
                warn!("Target returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {} to come up...", url);
                }
                // Connection refused is expected while the dev server starts
                if !e.is_connect() {
                    warn!("Preflight error: {}", e);
                }
            }
        }

        sleep(Duration::from_millis(250)).await;
    }

    Err(E2eError::TargetUnreachable {
        url: url.to_string(),
        attempts,
    })
}
