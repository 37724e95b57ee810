//! Section type lookup tables
//!
//! Each section type maps to a color role, a text style, a spacing context
//! and optionally a component preset.

use crate::color::{BrandColors, Palette};
use crate::model::{PresetGroup, SpacingScale, TextStyleKey};
use page_model::{parse_px, BoxSpacing, SectionType};

/// Spacing steps the contexts below draw from
pub const REQUIRED_SPACING_STEPS: [&str; 7] = ["2", "4", "6", "8", "12", "16", "24"];

// =============================================================================
// Colors
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Primary,
    Accent,
    Secondary,
    Neutral,
}

impl ColorRole {
    pub const ALL: [ColorRole; 4] = [
        ColorRole::Primary,
        ColorRole::Accent,
        ColorRole::Secondary,
        ColorRole::Neutral,
    ];

    pub fn for_section(section_type: &SectionType) -> Self {
        match section_type {
            SectionType::Hero | SectionType::Cta => ColorRole::Primary,
            SectionType::Pricing | SectionType::Testimonials => ColorRole::Accent,
            SectionType::FeaturedContent | SectionType::TeamShowcase => ColorRole::Secondary,
            _ => ColorRole::Neutral,
        }
    }

    /// Palette and shade of the background, then of the text
    pub fn shades(&self) -> ((Palette, u16), (Palette, u16)) {
        match self {
            ColorRole::Primary => ((Palette::Primary, 500), (Palette::Neutral, 50)),
            ColorRole::Accent => ((Palette::Accent, 50), (Palette::Neutral, 900)),
            ColorRole::Secondary => ((Palette::Secondary, 100), (Palette::Primary, 900)),
            ColorRole::Neutral => ((Palette::Neutral, 50), (Palette::Neutral, 900)),
        }
    }

    /// Background and text hex values
    pub fn colors<'a>(&self, colors: &'a BrandColors) -> Option<(&'a str, &'a str)> {
        let ((bg_palette, bg_shade), (text_palette, text_shade)) = self.shades();
        Some((
            colors.get(bg_palette, bg_shade)?,
            colors.get(text_palette, text_shade)?,
        ))
    }
}

// =============================================================================
// Typography
// =============================================================================

pub fn text_style_for(section_type: &SectionType) -> TextStyleKey {
    match section_type {
        SectionType::Hero => TextStyleKey::H1,
        SectionType::ButtonGroup | SectionType::Cta => TextStyleKey::Button,
        _ => TextStyleKey::Body,
    }
}

// =============================================================================
// Spacing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpacingContext {
    /// Large vertical, medium horizontal padding
    Hero,
    /// Medium padding and a bottom margin
    Content,
    /// Small padding
    Compact,
    /// Large padding
    Section,
}

/// Concrete spacing drawn from a scale
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSpacing {
    pub padding: BoxSpacing,
    pub margin: Option<BoxSpacing>,
}

impl SpacingContext {
    pub fn for_section(section_type: &SectionType) -> Self {
        match section_type {
            SectionType::Hero => SpacingContext::Hero,
            SectionType::RichText
            | SectionType::Image
            | SectionType::Video
            | SectionType::Gallery
            | SectionType::Faq => SpacingContext::Content,
            SectionType::Breadcrumbs | SectionType::Pagination => SpacingContext::Compact,
            _ => SpacingContext::Section,
        }
    }

    /// Vertical and horizontal padding steps, then the bottom margin step
    fn steps(&self) -> (&'static str, &'static str, Option<&'static str>) {
        match self {
            SpacingContext::Hero => ("24", "8", None),
            SpacingContext::Content => ("12", "6", Some("8")),
            SpacingContext::Compact => ("2", "4", None),
            SpacingContext::Section => ("16", "8", None),
        }
    }

    pub fn resolve(&self, scale: &SpacingScale) -> Option<ResolvedSpacing> {
        let (vertical, horizontal, bottom) = self.steps();
        let padding = BoxSpacing::symmetric(scale.px(vertical)?, scale.px(horizontal)?);
        let margin = match bottom {
            Some(step) => Some(BoxSpacing {
                bottom: Some(scale.px(step)?.to_string()),
                ..BoxSpacing::default()
            }),
            None => None,
        };
        Some(ResolvedSpacing { padding, margin })
    }

    /// Vertical padding in pixels
    pub fn vertical_px(&self, scale: &SpacingScale) -> Option<f64> {
        scale.px(self.steps().0).and_then(parse_px)
    }
}

// =============================================================================
// Components
// =============================================================================

/// Component preset injected into a section type, if any
pub fn component_for(section_type: &SectionType) -> Option<(PresetGroup, &'static str)> {
    match section_type {
        SectionType::ButtonGroup | SectionType::Cta => Some((PresetGroup::Buttons, "primary")),
        SectionType::ContactForm | SectionType::Newsletter => Some((PresetGroup::Forms, "input")),
        SectionType::Navigation => Some((PresetGroup::Navigation, "header")),
        SectionType::Footer => Some((PresetGroup::Navigation, "footer")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_roles() {
        assert_eq!(ColorRole::for_section(&SectionType::Hero), ColorRole::Primary);
        assert_eq!(ColorRole::for_section(&SectionType::Pricing), ColorRole::Accent);
        assert_eq!(ColorRole::for_section(&SectionType::TeamShowcase), ColorRole::Secondary);
        assert_eq!(ColorRole::for_section(&SectionType::Faq), ColorRole::Neutral);
        assert_eq!(
            ColorRole::for_section(&SectionType::Other("MAP".to_string())),
            ColorRole::Neutral
        );
    }

    #[test]
    fn test_text_styles() {
        assert_eq!(text_style_for(&SectionType::Hero), TextStyleKey::H1);
        assert_eq!(text_style_for(&SectionType::Cta), TextStyleKey::Button);
        assert_eq!(text_style_for(&SectionType::Stats), TextStyleKey::Body);
    }

    #[test]
    fn test_spacing_contexts_resolve() {
        let scale = SpacingScale::default();

        let hero = SpacingContext::Hero.resolve(&scale).unwrap();
        assert_eq!(hero.padding, BoxSpacing::symmetric("96px", "32px"));
        assert!(hero.margin.is_none());

        let content = SpacingContext::for_section(&SectionType::RichText)
            .resolve(&scale)
            .unwrap();
        assert_eq!(content.margin.unwrap().bottom.as_deref(), Some("32px"));

        assert_eq!(
            SpacingContext::for_section(&SectionType::Pagination),
            SpacingContext::Compact
        );
        assert_eq!(SpacingContext::Section.vertical_px(&scale), Some(64.0));
    }

    #[test]
    fn test_component_slots() {
        assert_eq!(component_for(&SectionType::Footer), Some((PresetGroup::Navigation, "footer")));
        assert_eq!(component_for(&SectionType::Newsletter), Some((PresetGroup::Forms, "input")));
        assert_eq!(component_for(&SectionType::Hero), None);
    }
}
