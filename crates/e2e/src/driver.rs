//! Browser driver capability
//!
//! The engine never talks to a browser directly. Everything it needs from one
//! is expressed by [`Driver`]: navigation, element lookup, element state,
//! computed style, script execution and pointer movement. [`crate::chrome`]
//! implements it over the Chrome DevTools Protocol; tests implement it over an
//! in-memory page.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::E2eResult;

/// Driver-assigned reference to a located DOM node. Only meaningful until the
/// driver navigates again.
pub type NodeId = u64;

/// How to locate an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Selector {
    Id(String),
    Class(String),
    Tag(String),
    Css(String),
}

impl Selector {
    pub fn id(id: impl Into<String>) -> Self {
        Selector::Id(id.into())
    }

    pub fn class(class: impl Into<String>) -> Self {
        Selector::Class(class.into())
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Selector::Tag(tag.into())
    }

    /// CSS form handed to the browser.
    pub fn to_css(&self) -> String {
        match self {
            Selector::Id(id) => format!("#{}", id),
            Selector::Class(class) => format!(".{}", class),
            Selector::Tag(tag) => tag.clone(),
            Selector::Css(css) => css.clone(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(id) => write!(f, "id={}", id),
            Selector::Class(class) => write!(f, "class={}", class),
            Selector::Tag(tag) => write!(f, "tag={}", tag),
            Selector::Css(css) => write!(f, "css={}", css),
        }
    }
}

/// Scripts the engine injects. Each receives its element as `arguments[0]`.
pub mod scripts {
    pub const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView(true);";

    pub const PLACEMENT: &str = "var rect = arguments[0].getBoundingClientRect(); \
        return JSON.stringify({ top: rect.top, left: rect.left, width: rect.width, \
        height: rect.height, viewportHeight: window.innerHeight });";
}

/// Capability the engine consumes from a live browser.
///
/// `find_one` and `find_within` apply the driver's implicit wait before
/// reporting `ElementNotFound`. `find_many` applies the same bound but returns
/// an empty collection instead of failing.
#[async_trait]
pub trait Driver: Send {
    async fn navigate(&mut self, url: &str) -> E2eResult<()>;

    async fn find_one(&mut self, selector: &Selector) -> E2eResult<NodeId>;

    async fn find_many(&mut self, selector: &Selector) -> E2eResult<Vec<NodeId>>;

    async fn find_within(&mut self, parent: NodeId, selector: &Selector) -> E2eResult<NodeId>;

    async fn is_visible(&mut self, node: NodeId) -> E2eResult<bool>;

    async fn is_enabled(&mut self, node: NodeId) -> E2eResult<bool>;

    /// Rendered text, trimmed.
    async fn text(&mut self, node: NodeId) -> E2eResult<String>;

    async fn computed_style(&mut self, node: NodeId, property: &str) -> E2eResult<String>;

    async fn execute_script(
        &mut self,
        script: &str,
        args: &[NodeId],
    ) -> E2eResult<serde_json::Value>;

    async fn click(&mut self, node: NodeId) -> E2eResult<()>;

    async fn hover_over(&mut self, node: NodeId) -> E2eResult<()>;

    /// PNG of the current viewport.
    async fn screenshot(&mut self) -> E2eResult<Vec<u8>>;

    /// Terminate the browser. Called exactly once by the owning session.
    async fn quit(&mut self) -> E2eResult<()>;
}
