//! Chrome automation over the DevTools protocol

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::{BrowserConfig, Timeouts};
use crate::driver::{Driver, NodeId, Selector};
use crate::error::{E2eError, E2eResult};
use crate::wait::Poller;

const VISIBLE_FN: &str = r#"function() {
    const style = window.getComputedStyle(this);
    if (style.display === 'none' || style.visibility === 'hidden' || style.opacity === '0') {
        return false;
    }
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}"#;

const ENABLED_FN: &str = "function() { return !this.disabled; }";

/// Upper bound for one page load, independent of the implicit wait
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// A launched Chrome with one page and the elements located on it since the
/// last navigation.
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    elements: HashMap<NodeId, Element>,
    next_node: NodeId,
    implicit_wait: Duration,
    poll_interval: Duration,
}

impl ChromeDriver {
    /// Launch Chrome with a maximized window and open a blank page.
    pub async fn launch(config: &BrowserConfig, timeouts: &Timeouts) -> E2eResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.window_width, config.window_height)
            .viewport(None)
            .arg("--start-maximized");

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.executable {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|e| E2eError::SessionUnavailable(format!("browser config: {}", e)))?;

        info!(
            "Launching Chrome ({}x{}, headless: {})",
            config.window_width, config.window_height, config.headless
        );
        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| E2eError::SessionUnavailable(format!("failed to launch Chrome: {}", e)))?;

        // The handler stream must be polled for the browser to make progress
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| E2eError::SessionUnavailable(format!("failed to open page: {}", e)))?;

        Ok(Self {
            browser,
            page,
            handler,
            elements: HashMap::new(),
            next_node: 0,
            implicit_wait: timeouts.implicit_wait(),
            poll_interval: timeouts.poll_interval(),
        })
    }

    fn register(&mut self, element: Element) -> NodeId {
        self.next_node += 1;
        self.elements.insert(self.next_node, element);
        self.next_node
    }

    fn element(&self, node: NodeId) -> E2eResult<&Element> {
        self.elements
            .get(&node)
            .ok_or(E2eError::StaleElement { handle: node })
    }

    fn poller(&self) -> Poller {
        Poller::new(self.implicit_wait, self.poll_interval)
    }

    /// Call `function` with the element bound to `this`.
    async fn call_on(&self, node: NodeId, function: &str) -> E2eResult<Value> {
        let returns = self
            .element(node)?
            .call_js_fn(function, false)
            .await
            .map_err(cdp_error)?;
        if let Some(details) = returns.exception_details {
            return Err(E2eError::ScriptExecution(details.text));
        }
        Ok(returns.result.value.unwrap_or(Value::Null))
    }
}

fn is_session_error(err: &CdpError) -> bool {
    matches!(
        err,
        CdpError::Ws(_) | CdpError::NoResponse | CdpError::ChannelSendError(_)
    )
}

fn cdp_error(err: CdpError) -> E2eError {
    if is_session_error(&err) {
        E2eError::SessionUnavailable(err.to_string())
    } else {
        E2eError::ScriptExecution(err.to_string())
    }
}

/// Wrap an injected script body so it runs with its one element argument
/// bound to both `this` and `arguments[0]`.
fn bind_to_element(script: &str, args: &[NodeId]) -> E2eResult<(NodeId, String)> {
    let [node] = args else {
        return Err(E2eError::ScriptExecution(format!(
            "scripts take exactly one element argument, got {}",
            args.len()
        )));
    };
    let function = format!(
        "function() {{ return (function() {{ {} }}).apply(this, [this]); }}",
        script
    );
    Ok((*node, function))
}

#[async_trait]
impl Driver for ChromeDriver {
    async fn navigate(&mut self, url: &str) -> E2eResult<()> {
        self.elements.clear();
        debug!("Loading {}", url);
        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, CdpError>(())
        };
        match timeout(NAVIGATION_TIMEOUT, load).await {
            Ok(loaded) => loaded.map_err(cdp_error),
            Err(_) => Err(E2eError::Timeout(format!("load of {}", url))),
        }
    }

    async fn find_one(&mut self, selector: &Selector) -> E2eResult<NodeId> {
        let css = selector.to_css();
        let poller = self.poller();
        loop {
            match self.page.find_element(css.as_str()).await {
                Ok(element) => return Ok(self.register(element)),
                Err(e) if is_session_error(&e) => return Err(cdp_error(e)),
                Err(e) => debug!("{} not present yet: {}", selector, e),
            }
            if !poller.tick().await {
                return Err(E2eError::ElementNotFound {
                    selector: selector.to_string(),
                });
            }
        }
    }

    async fn find_many(&mut self, selector: &Selector) -> E2eResult<Vec<NodeId>> {
        let css = selector.to_css();
        let poller = self.poller();
        loop {
            let elements = match self.page.find_elements(css.as_str()).await {
                Ok(elements) => elements,
                Err(e) if is_session_error(&e) => return Err(cdp_error(e)),
                Err(e) => {
                    debug!("{} lookup failed: {}", selector, e);
                    Vec::new()
                }
            };
            if !elements.is_empty() || !poller.tick().await {
                return Ok(elements.into_iter().map(|e| self.register(e)).collect());
            }
        }
    }

    async fn find_within(&mut self, parent: NodeId, selector: &Selector) -> E2eResult<NodeId> {
        let css = selector.to_css();
        let poller = self.poller();
        loop {
            let found = self.element(parent)?.find_element(css.as_str()).await;
            match found {
                Ok(element) => return Ok(self.register(element)),
                Err(e) if is_session_error(&e) => return Err(cdp_error(e)),
                Err(e) => debug!("{} not present under #{} yet: {}", selector, parent, e),
            }
            if !poller.tick().await {
                return Err(E2eError::ElementNotFound {
                    selector: selector.to_string(),
                });
            }
        }
    }

    async fn is_visible(&mut self, node: NodeId) -> E2eResult<bool> {
        Ok(self.call_on(node, VISIBLE_FN).await?.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&mut self, node: NodeId) -> E2eResult<bool> {
        Ok(self.call_on(node, ENABLED_FN).await?.as_bool().unwrap_or(false))
    }

    async fn text(&mut self, node: NodeId) -> E2eResult<String> {
        let text = self
            .element(node)?
            .inner_text()
            .await
            .map_err(cdp_error)?
            .unwrap_or_default();
        Ok(text.trim().to_string())
    }

    async fn computed_style(&mut self, node: NodeId, property: &str) -> E2eResult<String> {
        let function = format!(
            "function() {{ return window.getComputedStyle(this).getPropertyValue({}); }}",
            serde_json::to_string(property)?
        );
        let value = self.call_on(node, &function).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn execute_script(&mut self, script: &str, args: &[NodeId]) -> E2eResult<Value> {
        let (node, function) = bind_to_element(script, args)?;
        self.call_on(node, &function).await
    }

    async fn click(&mut self, node: NodeId) -> E2eResult<()> {
        self.element(node)?.click().await.map_err(cdp_error)?;
        Ok(())
    }

    async fn hover_over(&mut self, node: NodeId) -> E2eResult<()> {
        self.element(node)?.hover().await.map_err(cdp_error)?;
        Ok(())
    }

    async fn screenshot(&mut self) -> E2eResult<Vec<u8>> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .build(),
            )
            .await
            .map_err(cdp_error)
    }

    async fn quit(&mut self) -> E2eResult<()> {
        self.elements.clear();
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("Waiting for Chrome to exit failed: {}", e);
        }
        self.handler.abort();
        closed.map_err(cdp_error)?;
        Ok(())
    }
}
