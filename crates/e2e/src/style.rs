//! Computed-style comparisons
//!
//! Values are compared as the browser serializes them. Two equivalent colors
//! in different notations compare as different.

/// Computed `background-color` of an element with no background.
pub const TRANSPARENT: &str = "rgba(0, 0, 0, 0)";

/// Exact match, used for font families.
pub fn same(a: &str, b: &str) -> bool {
    a == b
}

/// Background distinctness and hover color change.
pub fn distinct(a: &str, b: &str) -> bool {
    !same(a, b)
}

/// `display` values such as `grid` and `inline-grid`.
pub fn is_grid(display: &str) -> bool {
    display.contains("grid")
}

/// `box-shadow: none`, `background-image: none`.
pub fn is_none(value: &str) -> bool {
    value.trim() == "none"
}

fn compact(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn is_transparent(color: &str) -> bool {
    let color = compact(color);
    color == compact(TRANSPARENT) || color == "transparent"
}

/// A background color that is not fully transparent, or any background image.
pub fn has_background(color: &str, image: &str) -> bool {
    !is_transparent(color) || !is_none(image)
}

/// Heading font that disagrees with the first heading seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontMismatch {
    pub baseline: String,
    pub observed: String,
}

/// The first font observed becomes the baseline; every later one must match it.
#[derive(Debug, Default)]
pub struct FontBaseline {
    baseline: Option<String>,
    compared: usize,
}

impl FontBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, font: &str) -> Result<(), FontMismatch> {
        match &self.baseline {
            None => {
                self.baseline = Some(font.to_string());
                Ok(())
            }
            Some(baseline) => {
                self.compared += 1;
                if same(baseline, font) {
                    Ok(())
                } else {
                    Err(FontMismatch {
                        baseline: baseline.clone(),
                        observed: font.to_string(),
                    })
                }
            }
        }
    }

    pub fn baseline(&self) -> Option<&str> {
        self.baseline.as_deref()
    }

    /// Number of fonts compared against the baseline.
    pub fn compared(&self) -> usize {
        self.compared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("grid", true)]
    #[test_case("inline-grid", true)]
    #[test_case("flex", false)]
    #[test_case("block", false)]
    fn grid_detection(display: &str, expected: bool) {
        assert_eq!(is_grid(display), expected);
    }

    #[test_case("rgba(0, 0, 0, 0)", true)]
    #[test_case("rgba(0,0,0,0)", true)]
    #[test_case("transparent", true)]
    #[test_case("rgba(0, 0, 0, 0.5)", false)]
    #[test_case("rgb(44, 62, 80)", false)]
    fn transparency(color: &str, expected: bool) {
        assert_eq!(is_transparent(color), expected);
    }

    #[test]
    fn hero_background_from_color_or_image() {
        assert!(has_background("rgb(102, 126, 234)", "none"));
        assert!(has_background(TRANSPARENT, "linear-gradient(135deg, rgb(102, 126, 234) 0%, rgb(118, 75, 162) 100%)"));
        assert!(!has_background(TRANSPARENT, "none"));
    }

    #[test]
    fn box_shadow_none_is_default() {
        assert!(is_none("none"));
        assert!(!is_none("rgba(0, 0, 0, 0.1) 0px 4px 6px 0px"));
    }

    #[test]
    fn notation_differences_compare_as_distinct() {
        assert!(distinct("rgb(243, 156, 18)", "rgba(243, 156, 18, 1)"));
        assert!(!distinct("rgb(243, 156, 18)", "rgb(243, 156, 18)"));
    }

    #[test]
    fn first_font_seeds_baseline() {
        let mut fonts = FontBaseline::new();
        assert_eq!(fonts.baseline(), None);
        fonts.observe("Georgia, serif").unwrap();
        fonts.observe("Georgia, serif").unwrap();
        assert_eq!(fonts.baseline(), Some("Georgia, serif"));
        assert_eq!(fonts.compared(), 1);

        let mismatch = fonts.observe("Arial, sans-serif").unwrap_err();
        assert_eq!(mismatch.baseline, "Georgia, serif");
        assert_eq!(mismatch.observed, "Arial, sans-serif");
    }

    #[test]
    fn no_headings_means_no_comparisons() {
        let fonts = FontBaseline::new();
        assert_eq!(fonts.compared(), 0);
        assert!(fonts.baseline().is_none());
    }
}
