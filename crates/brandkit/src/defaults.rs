//! Deciding whether a style value is still an untouched placeholder
//!
//! Both styling paths only overwrite a customized value when asked to; a
//! value the detector reports as default counts as not customized.

use page_model::{parse_px, LayoutSettings, TypographySettings};
use serde::{Deserialize, Serialize};

/// Predicate deciding overwrite eligibility of existing style values
pub trait DefaultDetector {
    /// `None` (never set) is always default
    fn is_default_color(&self, color: Option<&str>) -> bool;

    fn is_default_font_size(&self, size: Option<&str>) -> bool;

    fn is_default_typography(&self, typography: Option<&TypographySettings>) -> bool {
        typography.map_or(true, TypographySettings::is_empty)
    }

    fn is_default_spacing(&self, layout: &LayoutSettings) -> bool {
        layout.has_default_spacing()
    }
}

impl<D: DefaultDetector + ?Sized> DefaultDetector for &D {
    fn is_default_color(&self, color: Option<&str>) -> bool {
        (**self).is_default_color(color)
    }

    fn is_default_font_size(&self, size: Option<&str>) -> bool {
        (**self).is_default_font_size(size)
    }

    fn is_default_typography(&self, typography: Option<&TypographySettings>) -> bool {
        (**self).is_default_typography(typography)
    }

    fn is_default_spacing(&self, layout: &LayoutSettings) -> bool {
        (**self).is_default_spacing(layout)
    }
}

/// Fixed lists of placeholder values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaceholderDefaults {
    /// Colors compared case-insensitively
    pub colors: Vec<String>,
    /// Font sizes in pixels
    pub font_sizes: Vec<f64>,
}

impl Default for PlaceholderDefaults {
    fn default() -> Self {
        let colors = [
            "#ffffff", "#fff", "white", "#000000", "#000", "black", "transparent", "gray", "grey",
            "lightgray", "lightgrey", "darkgray", "darkgrey", "#808080", "#f5f5f5", "#333333",
        ];
        Self {
            colors: colors.iter().map(|c| c.to_string()).collect(),
            font_sizes: vec![16.0],
        }
    }
}

impl PlaceholderDefaults {
    /// Detector that treats only unset values as default
    pub fn none() -> Self {
        Self {
            colors: Vec::new(),
            font_sizes: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.colors.push(color.into().to_lowercase());
        self
    }

    pub fn with_font_size(mut self, px: f64) -> Self {
        self.font_sizes.push(px);
        self
    }
}

impl DefaultDetector for PlaceholderDefaults {
    fn is_default_color(&self, color: Option<&str>) -> bool {
        let Some(color) = color else {
            return true;
        };
        let color = color.trim();
        color.is_empty() || self.colors.iter().any(|c| c.eq_ignore_ascii_case(color))
    }

    fn is_default_font_size(&self, size: Option<&str>) -> bool {
        match size.map(str::trim) {
            None | Some("") => true,
            Some(size) => parse_px(size)
                .map_or(false, |px| self.font_sizes.iter().any(|d| (d - px).abs() < f64::EPSILON)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_model::BoxSpacing;

    #[test]
    fn test_placeholder_colors() {
        let defaults = PlaceholderDefaults::default();
        assert!(defaults.is_default_color(None));
        assert!(defaults.is_default_color(Some("#FFFFFF")));
        assert!(defaults.is_default_color(Some(" transparent ")));
        assert!(!defaults.is_default_color(Some("#123456")));
    }

    #[test]
    fn test_font_sizes() {
        let defaults = PlaceholderDefaults::default();
        assert!(defaults.is_default_font_size(None));
        assert!(defaults.is_default_font_size(Some("16px")));
        assert!(!defaults.is_default_font_size(Some("18px")));
        assert!(!defaults.is_default_font_size(Some("1rem")));
    }

    #[test]
    fn test_configured_detector() {
        let strict = PlaceholderDefaults::none().with_color("#FAFAFA");
        assert!(strict.is_default_color(Some("#fafafa")));
        assert!(!strict.is_default_color(Some("#ffffff")));
        assert!(!strict.is_default_font_size(Some("16px")));
    }

    #[test]
    fn test_structural_defaults() {
        let defaults = PlaceholderDefaults::default();
        assert!(defaults.is_default_typography(None));
        assert!(defaults.is_default_typography(Some(&TypographySettings::default())));

        let mut layout = LayoutSettings::default();
        assert!(defaults.is_default_spacing(&layout));
        layout.padding = Some(BoxSpacing::uniform("12px"));
        assert!(!defaults.is_default_spacing(&layout));
    }
}
