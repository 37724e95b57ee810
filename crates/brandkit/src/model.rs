//! Brandkit design tokens
//!
//! A brandkit bundles the color palettes, typography system, spacing scale
//! and component presets of a brand. It is applied to sections but never
//! stored inside a template.

use crate::color::{BrandColors, Color, ColorScale, Palette};
use crate::{BrandkitError, Result};
use page_model::{ComponentStyle, StateStyle, TypographySettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Typography
// =============================================================================

/// Named entries of the text-style table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyleKey {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Body,
    Small,
    Caption,
    Button,
    Link,
}

impl TextStyleKey {
    pub const ALL: [TextStyleKey; 11] = [
        TextStyleKey::H1,
        TextStyleKey::H2,
        TextStyleKey::H3,
        TextStyleKey::H4,
        TextStyleKey::H5,
        TextStyleKey::H6,
        TextStyleKey::Body,
        TextStyleKey::Small,
        TextStyleKey::Caption,
        TextStyleKey::Button,
        TextStyleKey::Link,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextStyleKey::H1 => "h1",
            TextStyleKey::H2 => "h2",
            TextStyleKey::H3 => "h3",
            TextStyleKey::H4 => "h4",
            TextStyleKey::H5 => "h5",
            TextStyleKey::H6 => "h6",
            TextStyleKey::Body => "body",
            TextStyleKey::Small => "small",
            TextStyleKey::Caption => "caption",
            TextStyleKey::Button => "button",
            TextStyleKey::Link => "link",
        }
    }
}

/// Which font family a text style draws from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontRole {
    Heading,
    #[default]
    Body,
    Mono,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFamilies {
    pub heading: String,
    pub body: String,
    pub mono: String,
}

impl Default for FontFamilies {
    fn default() -> Self {
        Self {
            heading: "Inter, system-ui, sans-serif".to_string(),
            body: "Inter, system-ui, sans-serif".to_string(),
            mono: "JetBrains Mono, ui-monospace, monospace".to_string(),
        }
    }
}

impl FontFamilies {
    pub fn get(&self, role: FontRole) -> &str {
        match role {
            FontRole::Heading => &self.heading,
            FontRole::Body => &self.body,
            FontRole::Mono => &self.mono,
        }
    }
}

/// One row of the text-style table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default)]
    pub family: FontRole,
    pub font_size: String,
    pub font_weight: String,
    pub line_height: String,
    #[serde(default = "default_letter_spacing")]
    pub letter_spacing: String,
}

fn default_letter_spacing() -> String {
    "0".to_string()
}

impl TextStyle {
    pub fn new(
        family: FontRole,
        font_size: impl Into<String>,
        font_weight: impl Into<String>,
        line_height: impl Into<String>,
    ) -> Self {
        Self {
            family,
            font_size: font_size.into(),
            font_weight: font_weight.into(),
            line_height: line_height.into(),
            letter_spacing: default_letter_spacing(),
        }
    }

    pub fn with_letter_spacing(mut self, letter_spacing: impl Into<String>) -> Self {
        self.letter_spacing = letter_spacing.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographySystem {
    pub font_families: FontFamilies,
    /// Base font size in pixels
    pub base_font_size: f64,
    pub text_styles: BTreeMap<TextStyleKey, TextStyle>,
}

impl Default for TypographySystem {
    fn default() -> Self {
        use FontRole::{Body, Heading};
        let text_styles = [
            (TextStyleKey::H1, TextStyle::new(Heading, "48px", "700", "1.2").with_letter_spacing("-0.02em")),
            (TextStyleKey::H2, TextStyle::new(Heading, "36px", "700", "1.25").with_letter_spacing("-0.01em")),
            (TextStyleKey::H3, TextStyle::new(Heading, "30px", "600", "1.3")),
            (TextStyleKey::H4, TextStyle::new(Heading, "24px", "600", "1.35")),
            (TextStyleKey::H5, TextStyle::new(Heading, "20px", "600", "1.4")),
            (TextStyleKey::H6, TextStyle::new(Heading, "18px", "600", "1.4")),
            (TextStyleKey::Body, TextStyle::new(Body, "16px", "400", "1.6")),
            (TextStyleKey::Small, TextStyle::new(Body, "14px", "400", "1.5")),
            (TextStyleKey::Caption, TextStyle::new(Body, "12px", "400", "1.4").with_letter_spacing("0.02em")),
            (TextStyleKey::Button, TextStyle::new(Body, "16px", "600", "1").with_letter_spacing("0.01em")),
            (TextStyleKey::Link, TextStyle::new(Body, "16px", "500", "1.6")),
        ]
        .into_iter()
        .collect();

        Self {
            font_families: FontFamilies::default(),
            base_font_size: 16.0,
            text_styles,
        }
    }
}

impl TypographySystem {
    pub fn style(&self, key: TextStyleKey) -> Option<&TextStyle> {
        self.text_styles.get(&key)
    }

    /// Text style `key` as a section typography block, with its font family
    /// resolved
    pub fn resolve(&self, key: TextStyleKey) -> Option<TypographySettings> {
        let style = self.style(key)?;
        Some(TypographySettings {
            font_family: Some(self.font_families.get(style.family).to_string()),
            font_size: Some(style.font_size.clone()),
            font_weight: Some(style.font_weight.clone()),
            line_height: Some(style.line_height.clone()),
            letter_spacing: Some(style.letter_spacing.clone()),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(missing) = TextStyleKey::ALL.iter().find(|key| !self.text_styles.contains_key(key)) {
            return Err(BrandkitError::MissingTextStyle(missing.as_str().to_string()));
        }
        Ok(())
    }
}

// =============================================================================
// Spacing
// =============================================================================

/// Named spacing steps mapped to pixel strings ("4" -> "16px")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpacingScale(BTreeMap<String, String>);

/// Steps of the default scale; each step is four pixels
pub const SPACING_STEPS: [u16; 20] = [0, 1, 2, 3, 4, 5, 6, 8, 10, 12, 16, 20, 24, 32, 40, 48, 56, 64, 80, 96];

impl Default for SpacingScale {
    fn default() -> Self {
        Self(
            SPACING_STEPS
                .iter()
                .map(|step| (step.to_string(), format!("{}px", step * 4)))
                .collect(),
        )
    }
}

impl SpacingScale {
    /// Pixel string of a named step
    pub fn px(&self, step: &str) -> Option<&str> {
        self.0.get(step).map(String::as_str)
    }

    /// Like `px`, failing on an unknown step
    pub fn require(&self, step: &str) -> Result<&str> {
        self.px(step)
            .ok_or_else(|| BrandkitError::MissingSpacingStep(step.to_string()))
    }

    pub fn set(&mut self, step: impl Into<String>, px: impl Into<String>) {
        self.0.insert(step.into(), px.into());
    }
}

// =============================================================================
// Components
// =============================================================================

/// Preset groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetGroup {
    Buttons,
    Cards,
    Forms,
    Navigation,
}

/// Named component styles per group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentPresets {
    pub buttons: BTreeMap<String, ComponentStyle>,
    pub cards: BTreeMap<String, ComponentStyle>,
    pub forms: BTreeMap<String, ComponentStyle>,
    pub navigation: BTreeMap<String, ComponentStyle>,
}

impl ComponentPresets {
    pub fn group(&self, group: PresetGroup) -> &BTreeMap<String, ComponentStyle> {
        match group {
            PresetGroup::Buttons => &self.buttons,
            PresetGroup::Cards => &self.cards,
            PresetGroup::Forms => &self.forms,
            PresetGroup::Navigation => &self.navigation,
        }
    }

    pub fn get(&self, group: PresetGroup, name: &str) -> Option<&ComponentStyle> {
        self.group(group).get(name)
    }

    /// Presets derived from a set of palettes
    pub fn from_colors(colors: &BrandColors) -> Self {
        let shade = |palette: Palette, shade: u16| colors.get(palette, shade).map(str::to_string);
        let state = |background: Option<String>| {
            Some(StateStyle {
                background_color: background,
                ..StateStyle::default()
            })
        };

        let primary_button = ComponentStyle {
            background_color: shade(Palette::Primary, 500),
            text_color: shade(Palette::Neutral, 50),
            border_radius: Some("8px".to_string()),
            padding: Some("12px 24px".to_string()),
            font_weight: Some("600".to_string()),
            hover: state(shade(Palette::Primary, 600)),
            focus: Some(StateStyle {
                shadow: Some(format!(
                    "0 0 0 3px {}",
                    colors.get(Palette::Primary, 200).unwrap_or("#bfdbfe")
                )),
                ..StateStyle::default()
            }),
            disabled: Some(StateStyle {
                opacity: Some(0.5),
                ..StateStyle::default()
            }),
            ..ComponentStyle::default()
        };
        let secondary_button = ComponentStyle {
            background_color: Some("transparent".to_string()),
            text_color: shade(Palette::Primary, 600),
            border_color: shade(Palette::Primary, 500),
            border_width: Some("1px".to_string()),
            hover: state(shade(Palette::Primary, 50)),
            ..primary_button.clone()
        };
        let card = ComponentStyle {
            background_color: shade(Palette::Neutral, 50),
            border_color: shade(Palette::Neutral, 200),
            border_width: Some("1px".to_string()),
            border_radius: Some("12px".to_string()),
            padding: Some("24px".to_string()),
            shadow: Some("0 1px 3px rgba(0, 0, 0, 0.1)".to_string()),
            ..ComponentStyle::default()
        };
        let input = ComponentStyle {
            background_color: Some("#ffffff".to_string()),
            text_color: shade(Palette::Neutral, 900),
            border_color: shade(Palette::Neutral, 300),
            border_width: Some("1px".to_string()),
            border_radius: Some("6px".to_string()),
            padding: Some("10px 12px".to_string()),
            focus: Some(StateStyle {
                border_color: shade(Palette::Primary, 500),
                ..StateStyle::default()
            }),
            disabled: Some(StateStyle {
                background_color: shade(Palette::Neutral, 100),
                opacity: Some(0.7),
                ..StateStyle::default()
            }),
            ..ComponentStyle::default()
        };
        let navigation = ComponentStyle {
            background_color: shade(Palette::Neutral, 50),
            text_color: shade(Palette::Neutral, 800),
            padding: Some("16px 24px".to_string()),
            hover: Some(StateStyle {
                text_color: shade(Palette::Primary, 600),
                ..StateStyle::default()
            }),
            ..ComponentStyle::default()
        };
        let footer = ComponentStyle {
            background_color: shade(Palette::Neutral, 900),
            text_color: shade(Palette::Neutral, 100),
            padding: Some("48px 24px".to_string()),
            ..navigation.clone()
        };

        Self {
            buttons: [("primary".to_string(), primary_button), ("secondary".to_string(), secondary_button)]
                .into_iter()
                .collect(),
            cards: [("default".to_string(), card)].into_iter().collect(),
            forms: [("input".to_string(), input)].into_iter().collect(),
            navigation: [("header".to_string(), navigation), ("footer".to_string(), footer)]
                .into_iter()
                .collect(),
        }
    }
}

// =============================================================================
// Brandkit
// =============================================================================

/// Which derivation steps run automatically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmartSettings {
    pub smart_spacing: bool,
    pub smart_typography: bool,
    pub smart_colors: bool,
}

impl Default for SmartSettings {
    fn default() -> Self {
        Self {
            smart_spacing: true,
            smart_typography: true,
            smart_colors: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessibilityInfo {
    /// Lowest WCAG contrast ratio among the role color pairs
    pub contrast_score: Option<f64>,
}

/// A named, versioned design-token bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brandkit {
    pub id: String,
    pub name: String,
    pub version: String,
    pub colors: BrandColors,
    pub typography: TypographySystem,
    pub spacing: SpacingScale,
    #[serde(default)]
    pub components: ComponentPresets,
    #[serde(default)]
    pub smart_settings: SmartSettings,
    #[serde(default)]
    pub accessibility: AccessibilityInfo,
}

impl Brandkit {
    /// Build a kit whose palettes derive from four base colors
    pub fn from_base_colors(
        name: impl Into<String>,
        primary: Color,
        secondary: Color,
        accent: Color,
        neutral: Color,
    ) -> Self {
        let colors = BrandColors {
            primary: ColorScale::from_base(primary),
            secondary: ColorScale::from_base(secondary),
            accent: ColorScale::from_base(accent),
            neutral: ColorScale::from_base(neutral),
            semantic: Default::default(),
        };
        let mut brandkit = Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            version: "1.0.0".to_string(),
            components: ComponentPresets::from_colors(&colors),
            colors,
            typography: TypographySystem::default(),
            spacing: SpacingScale::default(),
            smart_settings: SmartSettings::default(),
            accessibility: AccessibilityInfo::default(),
        };
        brandkit.refresh_accessibility();
        brandkit
    }

    /// Default kit: blue primary, violet secondary, amber accent, slate neutral
    pub fn starter(name: impl Into<String>) -> Self {
        Self::from_base_colors(
            name,
            Color::rgb(37, 99, 235),
            Color::rgb(124, 58, 237),
            Color::rgb(245, 158, 11),
            Color::rgb(100, 116, 139),
        )
    }

    /// Check that every palette, text style and spacing step the engines
    /// look up is present
    pub fn validate(&self) -> Result<()> {
        self.colors.validate()?;
        self.typography.validate()?;
        for step in crate::roles::REQUIRED_SPACING_STEPS {
            self.spacing.require(step)?;
        }
        Ok(())
    }

    /// Recompute `accessibility.contrast_score` from the role color pairs
    pub fn refresh_accessibility(&mut self) -> Option<f64> {
        let score = crate::roles::ColorRole::ALL
            .iter()
            .filter_map(|role| {
                let (background, text) = role.colors(&self.colors)?;
                Some(Color::from_hex(background)?.contrast_ratio(&Color::from_hex(text)?))
            })
            .fold(None, |min: Option<f64>, ratio| Some(min.map_or(ratio, |m| m.min(ratio))));
        self.accessibility.contrast_score = score;
        score
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON and validate
    pub fn from_json(json: &str) -> Result<Self> {
        let brandkit: Self = serde_json::from_str(json)?;
        brandkit.validate()?;
        Ok(brandkit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_is_complete() {
        let kit = Brandkit::starter("Acme");
        assert!(kit.validate().is_ok());
        assert_eq!(kit.colors.get(Palette::Primary, 500), Some("#2563eb"));
        assert_eq!(kit.typography.base_font_size, 16.0);
        assert_eq!(kit.spacing.px("4"), Some("16px"));
        assert_eq!(kit.spacing.px("96"), Some("384px"));
        assert!(kit.components.get(PresetGroup::Buttons, "primary").is_some());
        assert!(kit.accessibility.contrast_score.is_some());
    }

    #[test]
    fn test_resolve_text_style() {
        let typography = TypographySystem::default();
        let h1 = typography.resolve(TextStyleKey::H1).unwrap();
        assert_eq!(h1.font_size.as_deref(), Some("48px"));
        assert_eq!(h1.font_family.as_deref(), Some("Inter, system-ui, sans-serif"));
        assert_eq!(h1.letter_spacing.as_deref(), Some("-0.02em"));
    }

    #[test]
    fn test_json_round_trip() {
        let kit = Brandkit::starter("Acme");
        let json = kit.to_json().unwrap();
        assert!(json.contains("\"smartSettings\""));
        assert!(json.contains("\"h1\""));
        let loaded = Brandkit::from_json(&json).unwrap();
        assert_eq!(loaded.id, kit.id);
        assert_eq!(loaded.colors, kit.colors);
        assert_eq!(loaded.typography, kit.typography);
        assert_eq!(loaded.components, kit.components);
    }

    #[test]
    fn test_from_json_rejects_incomplete_kit() {
        let mut kit = Brandkit::starter("Acme");
        kit.typography.text_styles.remove(&TextStyleKey::Caption);
        let json = kit.to_json().unwrap();
        assert!(matches!(
            Brandkit::from_json(&json),
            Err(BrandkitError::MissingTextStyle(key)) if key == "caption"
        ));
    }

    #[test]
    fn test_low_contrast_kit_scores_low() {
        let gray = Color::rgb(150, 150, 150);
        let kit = Brandkit::from_base_colors("Flat", gray, gray, gray, gray);
        assert!(kit.accessibility.contrast_score.unwrap() < 4.5);
    }
}
