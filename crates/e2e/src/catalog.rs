//! The check catalog for the Brew & Bite Café landing page
//!
//! Each [`Check`] is data: an id, a description, an ordering key and a
//! procedure. The orchestrator decides when each one runs.

use std::fmt;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;

use crate::config::Expectations;
use crate::driver::Selector;
use crate::error::{ensure, E2eError, E2eResult};
use crate::session::Session;
use crate::style::{self, FontBaseline};
use crate::text;
use crate::wait::Poller;

/// Body of a check. Returning `Ok` means the check passed.
pub type Procedure =
    for<'a> fn(&'a mut Session, &'a Expectations) -> BoxFuture<'a, E2eResult<()>>;

/// Page state a check expects before its body runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isolation {
    /// Fresh load of the base URL
    Reload,
    /// Continue on whatever the previous check left behind
    Shared,
}

#[derive(Clone)]
pub struct Check {
    pub id: &'static str,
    pub description: &'static str,
    /// Checks run in ascending order of this key
    pub order: u32,
    pub isolation: Isolation,
    pub procedure: Procedure,
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("order", &self.order)
            .field("isolation", &self.isolation)
            .finish()
    }
}

impl Check {
    pub fn new(
        id: &'static str,
        description: &'static str,
        order: u32,
        procedure: Procedure,
    ) -> Self {
        Self {
            id,
            description,
            order,
            isolation: Isolation::Reload,
            procedure,
        }
    }

    pub fn run<'a>(
        &self,
        session: &'a mut Session,
        expectations: &'a Expectations,
    ) -> BoxFuture<'a, E2eResult<()>> {
        (self.procedure)(session, expectations)
    }
}

/// All seventeen checks, in execution order.
pub fn catalog() -> Vec<Check> {
    vec![
        Check::new("TC-01", "Verify Navigation Bar Contains All Required Links", 1, navigation_links),
        Check::new("TC-02", "Verify Navigation Bar is Visible", 2, navigation_visible),
        Check::new("TC-03", "Verify Navigation Links Scroll to Correct Sections", 3, navigation_scrolling),
        Check::new("TC-04", "Verify Hero Section Contains Café Name and Tagline", 4, hero_content),
        Check::new("TC-05", "Verify Minimum 4 Menu Items are Displayed", 5, menu_item_count),
        Check::new("TC-06", "Verify Each Menu Item Has Name and Price", 6, menu_item_fields),
        Check::new("TC-07", "Verify Each Menu Item Has an Image", 7, menu_item_images),
        Check::new("TC-08", "Verify About Us Section Contains Minimum 50 Words", 8, about_word_count),
        Check::new("TC-09", "Verify Contact Section Displays Email Address", 9, contact_email),
        Check::new("TC-10", "Verify Contact Section Displays Phone Number", 10, contact_phone),
        Check::new("TC-11", "Verify Footer Contains Copyright Text", 11, footer_copyright),
        Check::new("TC-12", "Verify Reserve Table Button Exists in Hero Section", 12, reserve_button),
        Check::new("TC-13", "Verify Navigation Bar Has Distinct Background Color", 13, navigation_background),
        Check::new("TC-14", "Verify Hero Section Has Background Color or Image", 14, hero_background),
        Check::new("TC-15", "Verify Menu Items are Displayed in Grid/Card Layout", 15, menu_grid_layout),
        Check::new("TC-16", "Verify Consistent Font Family for All Headings", 16, heading_fonts),
        Check::new("TC-17", "Verify Reserve Table Button Has Hover Effect", 17, reserve_hover),
    ]
}

const NAV_LINKS: [(&str, &str); 4] = [
    ("nav-home", "Home link should be present"),
    ("nav-menu", "Menu link should be present"),
    ("nav-about", "About Us link should be present"),
    ("nav-contact", "Contact link should be present"),
];

async fn ensure_visible(session: &mut Session, id: &str, message: &str) -> E2eResult<()> {
    let element = session.find(&Selector::id(id)).await?;
    let visible = session.is_visible(&element).await?;
    ensure(visible, message, "visible", "hidden")
}

fn navigation_links<'a>(s: &'a mut Session, _: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        ensure_visible(s, "navbar", "Navigation bar should be visible").await?;
        for (id, message) in NAV_LINKS {
            ensure_visible(s, id, message).await?;
        }
        Ok(())
    }
    .boxed()
}

fn navigation_visible<'a>(s: &'a mut Session, _: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move { ensure_visible(s, "navbar", "Navigation bar should be visible").await }.boxed()
}

fn navigation_scrolling<'a>(s: &'a mut Session, _: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        let targets = [
            ("nav-menu", "menu", "Menu section should be in viewport"),
            ("nav-about", "about", "About section should be in viewport"),
            ("nav-contact", "contact", "Contact section should be in viewport"),
        ];
        for (link_id, section_id, message) in targets {
            let link = s.find(&Selector::id(link_id)).await?;
            s.click(&link).await?;

            let section = s.find(&Selector::id(section_id)).await?;
            let (in_view, placement) = s.wait_in_viewport(&section).await?;
            ensure(
                in_view,
                message,
                format!("top within [0, {}]", placement.viewport_height),
                format!("top = {}", placement.rect.top),
            )?;
        }
        Ok(())
    }
    .boxed()
}

fn hero_content<'a>(s: &'a mut Session, e: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        ensure_visible(s, "home", "Hero section should be visible").await?;

        let name = s.find(&Selector::id("cafe-name")).await?;
        let name_text = s.text(&name).await?;
        ensure(
            name_text.contains(&e.cafe_name),
            "Café name should be present",
            format!("text containing '{}'", e.cafe_name),
            format!("'{}'", name_text),
        )?;

        let tagline = s.find(&Selector::id("tagline")).await?;
        let tagline_text = s.text(&tagline).await?;
        ensure(!tagline_text.is_empty(), "Tagline should be present", "non-empty text", "''")
    }
    .boxed()
}

fn menu_item_count<'a>(s: &'a mut Session, e: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        s.scroll_to(&Selector::id("menu")).await?;
        let items = s.find_all(&Selector::class("menu-item")).await?;
        debug!("Found {} menu items", items.len());
        ensure(
            items.len() >= e.min_menu_items,
            &format!(
                "At least {} menu items should be displayed: found {}, need ≥ {}",
                e.min_menu_items,
                items.len(),
                e.min_menu_items
            ),
            format!(">= {}", e.min_menu_items),
            items.len(),
        )
    }
    .boxed()
}

fn menu_item_fields<'a>(s: &'a mut Session, _: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        s.scroll_to(&Selector::id("menu")).await?;
        let items = s.find_all(&Selector::class("menu-item")).await?;
        for (i, item) in items.iter().enumerate() {
            let name = s.find_in(item, &Selector::class("menu-item-name")).await?;
            let name_text = s.text(&name).await?;
            ensure(
                !name_text.is_empty(),
                &format!("Menu item {} should have a name", i + 1),
                "non-empty name",
                "''",
            )?;

            let price = s.find_in(item, &Selector::class("menu-item-price")).await?;
            let price_text = s.text(&price).await?;
            ensure(
                !price_text.is_empty(),
                &format!("Menu item {} ('{}') should have a price", i + 1, name_text),
                "non-empty price",
                "''",
            )?;
        }
        Ok(())
    }
    .boxed()
}

fn menu_item_images<'a>(s: &'a mut Session, _: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        s.scroll_to(&Selector::id("menu")).await?;
        let items = s.find_all(&Selector::class("menu-item")).await?;
        for (i, item) in items.iter().enumerate() {
            let image = s.find_in(item, &Selector::class("menu-item-image")).await?;
            let visible = s.is_visible(&image).await?;
            ensure(
                visible,
                &format!("Menu item {} should have an image", i + 1),
                "visible image",
                "hidden",
            )?;
        }
        Ok(())
    }
    .boxed()
}

fn about_word_count<'a>(s: &'a mut Session, e: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        s.scroll_to(&Selector::id("about")).await?;
        let about = s.find(&Selector::id("about-text")).await?;
        let words = text::word_count(&s.text(&about).await?);
        ensure(
            words >= e.min_about_words,
            &format!(
                "About Us section should contain at least {} words",
                e.min_about_words
            ),
            format!(">= {} words", e.min_about_words),
            format!("{} words", words),
        )
    }
    .boxed()
}

fn contact_email<'a>(s: &'a mut Session, _: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        s.scroll_to(&Selector::id("contact")).await?;
        let email = s.find(&Selector::id("contact-email")).await?;
        let email_text = s.text(&email).await?;
        ensure(
            text::looks_like_email(&email_text),
            "Email address should be present and contain @",
            "non-empty text containing '@'",
            format!("'{}'", email_text),
        )
    }
    .boxed()
}

fn contact_phone<'a>(s: &'a mut Session, _: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        s.scroll_to(&Selector::id("contact")).await?;
        let phone = s.find(&Selector::id("contact-phone")).await?;
        let phone_text = s.text(&phone).await?;
        ensure(!phone_text.is_empty(), "Phone number should not be empty", "non-empty text", "''")
    }
    .boxed()
}

fn footer_copyright<'a>(s: &'a mut Session, _: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        let footer = s.scroll_to(&Selector::id("footer")).await?;
        let visible = s.is_visible(&footer).await?;
        ensure(visible, "Footer should be visible", "visible", "hidden")?;

        let copyright = s.find(&Selector::id("copyright-text")).await?;
        let copyright_text = s.text(&copyright).await?;
        ensure(
            text::has_copyright_notice(&copyright_text),
            "Footer should contain copyright text",
            "'©' or 'copyright'",
            format!("'{}'", copyright_text),
        )
    }
    .boxed()
}

fn reserve_button<'a>(s: &'a mut Session, _: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        s.find(&Selector::id("home")).await?;
        let button = s.find(&Selector::id("reserve-button")).await?;
        let visible = s.is_visible(&button).await?;
        ensure(visible, "Reserve Table button should be visible", "visible", "hidden")?;
        let enabled = s.is_enabled(&button).await?;
        ensure(enabled, "Reserve Table button should be clickable", "enabled", "disabled")
    }
    .boxed()
}

fn navigation_background<'a>(s: &'a mut Session, _: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        let navbar = s.find(&Selector::id("navbar")).await?;
        let nav_color = s.css_value(&navbar, "background-color").await?;
        let body = s.find(&Selector::tag("body")).await?;
        let body_color = s.css_value(&body, "background-color").await?;
        ensure(
            style::distinct(&nav_color, &body_color),
            "Navigation bar background should be different from page background",
            format!("anything but {}", body_color),
            nav_color,
        )
    }
    .boxed()
}

fn hero_background<'a>(s: &'a mut Session, _: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        let hero = s.find(&Selector::id("home")).await?;
        let color = s.css_value(&hero, "background-color").await?;
        let image = s.css_value(&hero, "background-image").await?;
        ensure(
            style::has_background(&color, &image),
            "Hero section should have background color or image",
            "opaque background-color or a background-image",
            format!("background-color: {}; background-image: {}", color, image),
        )
    }
    .boxed()
}

fn menu_grid_layout<'a>(s: &'a mut Session, _: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        s.scroll_to(&Selector::id("menu")).await?;
        let container = s.find(&Selector::id("menu-container")).await?;
        let display = s.css_value(&container, "display").await?;
        ensure(style::is_grid(&display), "Menu should use grid layout", "display: *grid*", &display)?;

        let items = s.find_all(&Selector::class("menu-item")).await?;
        for (i, item) in items.iter().enumerate() {
            let shadow = s.css_value(item, "box-shadow").await?;
            ensure(
                !style::is_none(&shadow),
                &format!("Menu item {} should have card-like styling", i + 1),
                "a box-shadow",
                &shadow,
            )?;
        }
        Ok(())
    }
    .boxed()
}

fn heading_fonts<'a>(s: &'a mut Session, e: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        let mut tags = vec!["h1", "h2"];
        if e.include_h3_in_font_check {
            tags.push("h3");
        }

        let mut fonts = FontBaseline::new();
        for tag in tags {
            let headings = s.find_all(&Selector::tag(tag)).await?;
            for heading in &headings {
                let font = s.css_value(heading, "font-family").await?;
                fonts.observe(&font).map_err(|mismatch| {
                    E2eError::assertion(
                        format!("All headings should have consistent font family ({} differs)", tag),
                        mismatch.baseline,
                        mismatch.observed,
                    )
                })?;
            }
        }
        debug!("Compared {} heading font(s) against the baseline", fonts.compared());
        Ok(())
    }
    .boxed()
}

fn reserve_hover<'a>(s: &'a mut Session, _: &'a Expectations) -> BoxFuture<'a, E2eResult<()>> {
    async move {
        let button = s.find(&Selector::id("reserve-button")).await?;
        let initial = s.css_value(&button, "background-color").await?;

        s.hover(&button).await?;

        let timeouts = s.timeouts().clone();
        let poller = Poller::new(timeouts.settle(), timeouts.poll_interval());
        loop {
            let hovered = s.css_value(&button, "background-color").await?;
            if style::distinct(&initial, &hovered) {
                return Ok(());
            }
            if !poller.tick().await {
                return Err(E2eError::assertion(
                    "Button color should change on hover",
                    format!("anything but {}", initial),
                    hovered,
                ));
            }
        }
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seventeen_checks_with_unique_ids_and_orders() {
        let checks = catalog();
        assert_eq!(checks.len(), 17);

        let ids: HashSet<_> = checks.iter().map(|c| c.id).collect();
        let orders: HashSet<_> = checks.iter().map(|c| c.order).collect();
        assert_eq!(ids.len(), 17);
        assert_eq!(orders.len(), 17);
    }

    #[test]
    fn ids_follow_order() {
        for check in catalog() {
            assert_eq!(check.id, format!("TC-{:02}", check.order));
            assert_eq!(check.isolation, Isolation::Reload);
        }
    }

    #[test]
    fn debug_omits_procedure() {
        let check = &catalog()[0];
        let rendered = format!("{:?}", check);
        assert!(rendered.contains("TC-01"));
        assert!(!rendered.contains("procedure"));
    }
}
