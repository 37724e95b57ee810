//! Section settings bags
//!
//! Every section carries five independently stored settings groups:
//! - Layout: spacing, width and alignment
//! - Style: colors, typography, background, border, shadow, component style
//! - Responsive: per-device overrides for mobile, tablet and desktop
//! - Animation: entrance effect, duration and delay
//! - Custom: raw CSS/JS/HTML and extra attributes
//!
//! All fields are optional so that "never set" can be told apart from an
//! explicit value when styling engines decide whether to overwrite.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Shared value types
// =============================================================================

/// Horizontal alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

/// Four-sided spacing (padding or margin) as CSS length strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoxSpacing {
    pub top: Option<String>,
    pub right: Option<String>,
    pub bottom: Option<String>,
    pub left: Option<String>,
}

impl BoxSpacing {
    /// Same value on all four sides
    pub fn uniform(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            top: Some(value.clone()),
            right: Some(value.clone()),
            bottom: Some(value.clone()),
            left: Some(value),
        }
    }

    /// Vertical value on top/bottom, horizontal value on left/right
    pub fn symmetric(vertical: impl Into<String>, horizontal: impl Into<String>) -> Self {
        let vertical = vertical.into();
        let horizontal = horizontal.into();
        Self {
            top: Some(vertical.clone()),
            right: Some(horizontal.clone()),
            bottom: Some(vertical),
            left: Some(horizontal),
        }
    }

    /// True if every side is unset or a zero length
    pub fn is_zero(&self) -> bool {
        [&self.top, &self.right, &self.bottom, &self.left]
            .iter()
            .all(|side| side.as_deref().map_or(true, is_zero_length))
    }
}

fn is_zero_length(value: &str) -> bool {
    matches!(value.trim(), "" | "0" | "0px" | "0rem" | "0em" | "0%")
}

/// Parse a CSS pixel length ("16px", "16") into a number
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

// =============================================================================
// Layout
// =============================================================================

/// Layout settings: spacing, width, alignment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutSettings {
    pub padding: Option<BoxSpacing>,
    pub margin: Option<BoxSpacing>,
    pub width: Option<String>,
    pub max_width: Option<String>,
    pub alignment: Option<Alignment>,
    pub columns: Option<u8>,
    pub gap: Option<String>,
}

impl LayoutSettings {
    /// True if neither padding nor margin carries a non-zero value
    pub fn has_default_spacing(&self) -> bool {
        self.padding.as_ref().map_or(true, BoxSpacing::is_zero)
            && self.margin.as_ref().map_or(true, BoxSpacing::is_zero)
    }
}

// =============================================================================
// Style
// =============================================================================

/// Typography block of a section style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypographySettings {
    pub font_family: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<String>,
    pub line_height: Option<String>,
    pub letter_spacing: Option<String>,
}

impl TypographySettings {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Border definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BorderSettings {
    pub width: Option<String>,
    pub style: Option<String>,
    pub color: Option<String>,
}

/// Style overrides for an interaction state (hover, focus, disabled)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StateStyle {
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub border_color: Option<String>,
    pub shadow: Option<String>,
    pub opacity: Option<f32>,
}

/// A complete component style: base properties plus interaction states
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentStyle {
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub border_color: Option<String>,
    pub border_width: Option<String>,
    pub border_radius: Option<String>,
    pub padding: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<String>,
    pub shadow: Option<String>,
    pub hover: Option<StateStyle>,
    pub focus: Option<StateStyle>,
    pub disabled: Option<StateStyle>,
}

/// Visual style settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleSettings {
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub typography: Option<TypographySettings>,
    pub background_image: Option<String>,
    pub border: Option<BorderSettings>,
    pub border_radius: Option<String>,
    pub shadow: Option<String>,
    pub component_style: Option<ComponentStyle>,
}

impl StyleSettings {
    /// True if no typography block has been set, or it is empty
    pub fn has_default_typography(&self) -> bool {
        self.typography.as_ref().map_or(true, TypographySettings::is_empty)
    }
}

// =============================================================================
// Responsive
// =============================================================================

/// Target device class for responsive overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Mobile,
    Tablet,
    Desktop,
}

impl Device {
    pub const ALL: [Device; 3] = [Device::Mobile, Device::Tablet, Device::Desktop];

    /// Factor applied to font size and spacing when deriving device values
    pub fn scale_factor(&self) -> f64 {
        match self {
            Device::Mobile => 0.875,
            Device::Tablet => 0.9375,
            Device::Desktop => 1.0,
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Mobile => write!(f, "mobile"),
            Device::Tablet => write!(f, "tablet"),
            Device::Desktop => write!(f, "desktop"),
        }
    }
}

/// Overrides applied at a single breakpoint. Lengths are in pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceOverrides {
    pub font_size: Option<f64>,
    pub padding: Option<f64>,
    pub margin: Option<f64>,
    pub hidden: Option<bool>,
    pub text_align: Option<Alignment>,
}

/// Per-breakpoint overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponsiveSettings {
    pub mobile: Option<DeviceOverrides>,
    pub tablet: Option<DeviceOverrides>,
    pub desktop: Option<DeviceOverrides>,
}

impl ResponsiveSettings {
    pub fn get(&self, device: Device) -> Option<&DeviceOverrides> {
        match device {
            Device::Mobile => self.mobile.as_ref(),
            Device::Tablet => self.tablet.as_ref(),
            Device::Desktop => self.desktop.as_ref(),
        }
    }

    /// Get the overrides for a device, creating an empty set if absent
    pub fn entry(&mut self, device: Device) -> &mut DeviceOverrides {
        let slot = match device {
            Device::Mobile => &mut self.mobile,
            Device::Tablet => &mut self.tablet,
            Device::Desktop => &mut self.desktop,
        };
        slot.get_or_insert_with(DeviceOverrides::default)
    }
}

// =============================================================================
// Animation
// =============================================================================

/// Entrance animation effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntranceEffect {
    None,
    Fade,
    SlideUp,
    SlideDown,
    SlideLeft,
    SlideRight,
    Zoom,
    Bounce,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationSettings {
    pub entrance: Option<EntranceEffect>,
    pub duration_ms: Option<u32>,
    pub delay_ms: Option<u32>,
    pub easing: Option<String>,
}

// =============================================================================
// Custom code
// =============================================================================

/// Raw author-supplied code and attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomSettings {
    #[serde(rename = "customCSS")]
    pub custom_css: Option<String>,
    #[serde(rename = "customJS")]
    pub custom_js: Option<String>,
    #[serde(rename = "customHTML")]
    pub custom_html: Option<String>,
    pub custom_attributes: BTreeMap<String, String>,
}

impl CustomSettings {
    pub fn is_empty(&self) -> bool {
        self.custom_css.is_none()
            && self.custom_js.is_none()
            && self.custom_html.is_none()
            && self.custom_attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_spacing_zero_detection() {
        assert!(BoxSpacing::default().is_zero());
        assert!(BoxSpacing::uniform("0px").is_zero());
        assert!(!BoxSpacing::symmetric("64px", "0").is_zero());
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("16px"), Some(16.0));
        assert_eq!(parse_px(" 24 "), Some(24.0));
        assert_eq!(parse_px("1.5rem"), None);
        assert_eq!(parse_px("NaN"), None);
        assert_eq!(parse_px("infpx"), None);
        assert_eq!(parse_px("-inf"), None);
    }

    #[test]
    fn test_layout_default_spacing() {
        let mut layout = LayoutSettings::default();
        assert!(layout.has_default_spacing());

        layout.padding = Some(BoxSpacing::uniform("32px"));
        assert!(!layout.has_default_spacing());
    }

    #[test]
    fn test_responsive_entry_creates_overrides() {
        let mut responsive = ResponsiveSettings::default();
        assert!(responsive.get(Device::Mobile).is_none());

        responsive.entry(Device::Mobile).font_size = Some(14.0);
        assert_eq!(responsive.get(Device::Mobile).unwrap().font_size, Some(14.0));
        assert!(responsive.get(Device::Tablet).is_none());
    }

    #[test]
    fn test_custom_settings_wire_names() {
        let json = r#"{"customCSS": "a{}", "customJS": "x()", "customAttributes": {"data-x": "1"}}"#;
        let custom: CustomSettings = serde_json::from_str(json).unwrap();
        assert_eq!(custom.custom_css.as_deref(), Some("a{}"));
        assert_eq!(custom.custom_js.as_deref(), Some("x()"));
        assert_eq!(custom.custom_attributes.get("data-x").map(String::as_str), Some("1"));
        assert!(!custom.is_empty());
    }

    #[test]
    fn test_device_scale_factors() {
        assert_eq!(Device::Mobile.scale_factor(), 0.875);
        assert_eq!(Device::Tablet.scale_factor(), 0.9375);
        assert_eq!(Device::Desktop.scale_factor(), 1.0);
    }
}
