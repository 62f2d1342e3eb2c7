//! In-memory landing page for driving the engine without a browser
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Value};

use brewbite_e2e::driver::scripts;
use brewbite_e2e::style;
use brewbite_e2e::{
    catalog, Driver, E2eError, E2eResult, Expectations, NodeId, Orchestrator, Selector, Session,
    SilentReporter, Summary, SuiteConfig, Timeouts,
};

pub const BASE_URL: &str = "http://localhost:5173";
pub const VIEWPORT_HEIGHT: f64 = 800.0;

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub text: String,
    pub parent: Option<usize>,
    pub visible: bool,
    pub enabled: bool,
    pub detached: bool,
    /// Document offset of the top edge
    pub top: f64,
    pub height: f64,
    pub styles: HashMap<String, String>,
    pub hover_styles: HashMap<String, String>,
}

#[derive(Debug, Default)]
pub struct PageState {
    pub elements: Vec<FakeElement>,
    /// Anchor id -> section id it scrolls to
    pub link_targets: HashMap<String, String>,
    /// Style reads after a hover before the hover styles apply
    pub hover_lag: usize,
    /// Every navigation fails as if the browser died
    pub browser_gone: bool,

    pub visited: Vec<String>,
    pub clicks: Vec<String>,
    pub quits: usize,
    pub screenshots: usize,

    nodes: HashMap<NodeId, usize>,
    next_node: NodeId,
    scroll_y: f64,
    hovered: Option<usize>,
    reads_since_hover: usize,
}

impl PageState {
    fn add(&mut self, parent: Option<usize>, tag: &str, id: Option<&str>, classes: &[&str]) -> usize {
        let top = parent.map(|p| self.elements[p].top).unwrap_or(0.0);
        self.elements.push(FakeElement {
            tag: tag.to_string(),
            id: id.map(str::to_string),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            parent,
            visible: true,
            enabled: true,
            top,
            height: 40.0,
            ..FakeElement::default()
        });
        self.elements.len() - 1
    }

    fn section(&mut self, parent: usize, id: &str, top: f64, height: f64) -> usize {
        let idx = self.add(Some(parent), "section", Some(id), &[]);
        self.elements[idx].top = top;
        self.elements[idx].height = height;
        idx
    }

    fn index_of(&self, id: &str) -> usize {
        self.elements
            .iter()
            .position(|el| el.id.as_deref() == Some(id))
            .unwrap_or_else(|| panic!("no element with id {}", id))
    }

    pub fn by_id(&mut self, id: &str) -> &mut FakeElement {
        let idx = self.index_of(id);
        &mut self.elements[idx]
    }

    pub fn set_style(&mut self, id: &str, property: &str, value: &str) {
        self.by_id(id).styles.insert(property.to_string(), value.to_string());
    }

    /// Detach the element and everything below it.
    pub fn remove(&mut self, id: &str) {
        let root = self.index_of(id);
        for idx in 0..self.elements.len() {
            if idx == root || self.is_descendant(idx, root) {
                self.elements[idx].detached = true;
            }
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        for idx in 0..self.elements.len() {
            if self.elements[idx].classes.iter().any(|c| c == class) {
                self.elements[idx].detached = true;
            }
        }
    }

    /// Keep only the first `n` menu items.
    pub fn truncate_menu(&mut self, n: usize) {
        let items: Vec<usize> = (0..self.elements.len())
            .filter(|&idx| self.elements[idx].classes.iter().any(|c| c == "menu-item"))
            .collect();
        for &item in items.iter().skip(n) {
            for idx in 0..self.elements.len() {
                if idx == item || self.is_descendant(idx, item) {
                    self.elements[idx].detached = true;
                }
            }
        }
    }

    fn is_descendant(&self, idx: usize, ancestor: usize) -> bool {
        let mut current = self.elements[idx].parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.elements[parent].parent;
        }
        false
    }

    fn matches(el: &FakeElement, selector: &Selector) -> bool {
        if el.detached {
            return false;
        }
        match selector {
            Selector::Id(id) => el.id.as_deref() == Some(id.as_str()),
            Selector::Class(class) => el.classes.iter().any(|c| c == class),
            Selector::Tag(tag) => el.tag.eq_ignore_ascii_case(tag),
            Selector::Css(_) => false,
        }
    }

    fn register(&mut self, idx: usize) -> NodeId {
        self.next_node += 1;
        self.nodes.insert(self.next_node, idx);
        self.next_node
    }

    fn resolve(&self, node: NodeId) -> E2eResult<usize> {
        self.nodes
            .get(&node)
            .copied()
            .ok_or(E2eError::StaleElement { handle: node })
    }

    fn navigate(&mut self, url: &str) -> E2eResult<()> {
        if self.browser_gone {
            return Err(E2eError::SessionUnavailable("browser crashed".to_string()));
        }
        self.visited.push(url.to_string());
        self.nodes.clear();
        self.scroll_y = 0.0;
        self.hovered = None;
        self.reads_since_hover = 0;
        Ok(())
    }

    fn find_first(&mut self, selector: &Selector, within: Option<usize>) -> E2eResult<NodeId> {
        let found = (0..self.elements.len()).find(|&idx| {
            Self::matches(&self.elements[idx], selector)
                && within.map_or(true, |parent| self.is_descendant(idx, parent))
        });
        match found {
            Some(idx) => Ok(self.register(idx)),
            None => Err(E2eError::ElementNotFound {
                selector: selector.to_string(),
            }),
        }
    }

    fn find_all(&mut self, selector: &Selector) -> Vec<NodeId> {
        let found: Vec<usize> = (0..self.elements.len())
            .filter(|&idx| Self::matches(&self.elements[idx], selector))
            .collect();
        found.into_iter().map(|idx| self.register(idx)).collect()
    }

    fn computed_style(&mut self, idx: usize, property: &str) -> String {
        if self.hovered == Some(idx) {
            self.reads_since_hover += 1;
            if self.reads_since_hover > self.hover_lag {
                if let Some(value) = self.elements[idx].hover_styles.get(property) {
                    return value.clone();
                }
            }
        }
        if let Some(value) = self.elements[idx].styles.get(property) {
            return value.clone();
        }
        match property {
            "background-color" => style::TRANSPARENT,
            "background-image" | "box-shadow" => "none",
            "display" => "block",
            "font-family" => "\"Times New Roman\"",
            _ => "",
        }
        .to_string()
    }

    fn execute_script(&mut self, script: &str, args: &[NodeId]) -> E2eResult<Value> {
        let [node] = args else {
            return Err(E2eError::ScriptExecution("expected one element argument".to_string()));
        };
        let idx = self.resolve(*node)?;
        if script == scripts::SCROLL_INTO_VIEW {
            self.scroll_y = self.elements[idx].top;
            Ok(Value::Null)
        } else if script == scripts::PLACEMENT {
            let el = &self.elements[idx];
            let rect = json!({
                "top": el.top - self.scroll_y,
                "left": 0.0,
                "width": 1280.0,
                "height": el.height,
                "viewportHeight": VIEWPORT_HEIGHT,
            });
            Ok(Value::String(rect.to_string()))
        } else {
            Err(E2eError::ScriptExecution(format!("unsupported script: {}", script)))
        }
    }

    fn click(&mut self, idx: usize) {
        let id = self.elements[idx].id.clone().unwrap_or_default();
        self.clicks.push(id.clone());
        if let Some(target) = self.link_targets.get(&id).cloned() {
            let target = self.index_of(&target);
            self.scroll_y = self.elements[target].top;
        }
    }
}

/// A page the whole catalog passes against.
pub struct FakePage {
    state: Arc<Mutex<PageState>>,
}

impl FakePage {
    pub fn landing() -> Self {
        let mut page = PageState::default();

        let body = page.add(None, "body", None, &[]);
        page.elements[body].styles.insert("background-color".into(), "rgb(255, 248, 240)".into());

        let navbar = page.add(Some(body), "nav", Some("navbar"), &[]);
        page.elements[navbar].styles.insert("background-color".into(), "rgb(62, 39, 35)".into());
        for (link, target) in [
            ("nav-home", "home"),
            ("nav-menu", "menu"),
            ("nav-about", "about"),
            ("nav-contact", "contact"),
        ] {
            page.add(Some(navbar), "a", Some(link), &[]);
            page.link_targets.insert(link.to_string(), target.to_string());
        }

        let hero = page.section(body, "home", 0.0, 800.0);
        page.elements[hero].styles.insert(
            "background-image".into(),
            "linear-gradient(rgba(0, 0, 0, 0.5), rgba(0, 0, 0, 0.5))".into(),
        );
        let name = page.add(Some(hero), "h1", Some("cafe-name"), &[]);
        page.elements[name].text = "Brew & Bite Café".into();
        let tagline = page.add(Some(hero), "p", Some("tagline"), &[]);
        page.elements[tagline].text = "Artisan coffee and fresh bites, every day".into();
        let button = page.add(Some(hero), "button", Some("reserve-button"), &[]);
        page.elements[button].text = "Reserve a Table".into();
        page.elements[button].styles.insert("background-color".into(), "rgb(111, 78, 55)".into());
        page.elements[button]
            .hover_styles
            .insert("background-color".into(), "rgb(139, 94, 60)".into());

        let menu = page.section(body, "menu", 900.0, 1200.0);
        let title = page.add(Some(menu), "h2", None, &[]);
        page.elements[title].text = "Our Menu".into();
        let container = page.add(Some(menu), "div", Some("menu-container"), &[]);
        page.elements[container].styles.insert("display".into(), "grid".into());
        for (dish, price) in [
            ("Espresso", "$3.50"),
            ("Cappuccino", "$4.25"),
            ("Avocado Toast", "$9.00"),
            ("Blueberry Muffin", "$3.75"),
            ("Croissant", "$3.25"),
            ("Cold Brew", "$4.50"),
        ] {
            let item = page.add(Some(container), "div", None, &["menu-item"]);
            page.elements[item]
                .styles
                .insert("box-shadow".into(), "rgba(0, 0, 0, 0.1) 0px 4px 6px 0px".into());
            page.add(Some(item), "img", None, &["menu-item-image"]);
            let name = page.add(Some(item), "h3", None, &["menu-item-name"]);
            page.elements[name].text = dish.into();
            let price_el = page.add(Some(item), "span", None, &["menu-item-price"]);
            page.elements[price_el].text = price.into();
        }

        let about = page.section(body, "about", 2200.0, 600.0);
        let title = page.add(Some(about), "h2", None, &[]);
        page.elements[title].text = "About Us".into();
        let about_text = page.add(Some(about), "p", Some("about-text"), &[]);
        page.elements[about_text].text = words(60);

        let contact = page.section(body, "contact", 2900.0, 500.0);
        let title = page.add(Some(contact), "h2", None, &[]);
        page.elements[title].text = "Contact".into();
        let email = page.add(Some(contact), "p", Some("contact-email"), &[]);
        page.elements[email].text = "hello@brewandbite.cafe".into();
        let phone = page.add(Some(contact), "p", Some("contact-phone"), &[]);
        page.elements[phone].text = "+1 (555) 012-3456".into();

        let footer = page.add(Some(body), "footer", Some("footer"), &[]);
        page.elements[footer].top = 3500.0;
        page.elements[footer].height = 200.0;
        let copyright = page.add(Some(footer), "p", Some("copyright-text"), &[]);
        page.elements[copyright].text = "© 2025 Brew & Bite Café. All rights reserved.".into();

        let serif = "\"Playfair Display\", serif";
        for el in page.elements.iter_mut() {
            match el.tag.as_str() {
                "h1" | "h2" => {
                    el.styles.insert("font-family".into(), serif.into());
                }
                "h3" => {
                    el.styles.insert("font-family".into(), "Inter, sans-serif".into());
                }
                _ => {}
            }
        }

        Self {
            state: Arc::new(Mutex::new(page)),
        }
    }

    /// Landing page after `edit`.
    pub fn landing_with(edit: impl FnOnce(&mut PageState)) -> Self {
        let page = Self::landing();
        edit(&mut page.lock());
        page
    }

    /// Shared view of the page that outlives the driver.
    pub fn state(&self) -> Arc<Mutex<PageState>> {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap()
    }

    pub fn into_session(self) -> Session {
        Session::open(Box::new(self), BASE_URL, quick_timeouts())
    }
}

fn words(n: usize) -> String {
    (0..n).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl Driver for FakePage {
    async fn navigate(&mut self, url: &str) -> E2eResult<()> {
        self.lock().navigate(url)
    }

    async fn find_one(&mut self, selector: &Selector) -> E2eResult<NodeId> {
        self.lock().find_first(selector, None)
    }

    async fn find_many(&mut self, selector: &Selector) -> E2eResult<Vec<NodeId>> {
        Ok(self.lock().find_all(selector))
    }

    async fn find_within(&mut self, parent: NodeId, selector: &Selector) -> E2eResult<NodeId> {
        let mut page = self.lock();
        let parent = page.resolve(parent)?;
        page.find_first(selector, Some(parent))
    }

    async fn is_visible(&mut self, node: NodeId) -> E2eResult<bool> {
        let page = self.lock();
        let idx = page.resolve(node)?;
        Ok(page.elements[idx].visible)
    }

    async fn is_enabled(&mut self, node: NodeId) -> E2eResult<bool> {
        let page = self.lock();
        let idx = page.resolve(node)?;
        Ok(page.elements[idx].enabled)
    }

    async fn text(&mut self, node: NodeId) -> E2eResult<String> {
        let page = self.lock();
        let idx = page.resolve(node)?;
        Ok(page.elements[idx].text.trim().to_string())
    }

    async fn computed_style(&mut self, node: NodeId, property: &str) -> E2eResult<String> {
        let mut page = self.lock();
        let idx = page.resolve(node)?;
        Ok(page.computed_style(idx, property))
    }

    async fn execute_script(&mut self, script: &str, args: &[NodeId]) -> E2eResult<Value> {
        self.lock().execute_script(script, args)
    }

    async fn click(&mut self, node: NodeId) -> E2eResult<()> {
        let mut page = self.lock();
        let idx = page.resolve(node)?;
        page.click(idx);
        Ok(())
    }

    async fn hover_over(&mut self, node: NodeId) -> E2eResult<()> {
        let mut page = self.lock();
        let idx = page.resolve(node)?;
        page.hovered = Some(idx);
        page.reads_since_hover = 0;
        Ok(())
    }

    async fn screenshot(&mut self) -> E2eResult<Vec<u8>> {
        self.lock().screenshots += 1;
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }

    async fn quit(&mut self) -> E2eResult<()> {
        self.lock().quits += 1;
        Ok(())
    }
}

/// Short bounds so failing checks give up quickly.
pub fn quick_timeouts() -> Timeouts {
    Timeouts {
        implicit_wait_ms: 0,
        settle_timeout_ms: 40,
        poll_interval_ms: 5,
        preflight_timeout_ms: 0,
    }
}

pub fn quick_config() -> SuiteConfig {
    SuiteConfig {
        base_url: BASE_URL.to_string(),
        timeouts: quick_timeouts(),
        ..SuiteConfig::default()
    }
}

/// Run the named checks from the catalog against `page`.
pub async fn run_checks(page: FakePage, ids: &[&str], expectations: Expectations) -> Summary {
    let mut session = page.into_session();
    let summary = Orchestrator::new(expectations)
        .only(ids.iter().map(|id| id.to_string()).collect())
        .run(&catalog(), &mut session, &mut SilentReporter)
        .await
        .unwrap();
    session.close().await.unwrap();
    summary
}
