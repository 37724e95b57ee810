//! Page sections and their per-language content

use crate::{
    AnimationSettings, CustomSettings, LayoutSettings, ResponsiveSettings, SectionId,
    StyleSettings,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// Section Type
// =============================================================================

/// The kind of visual block a section renders as.
///
/// Unknown kinds are kept verbatim in `Other` so templates produced by newer
/// editors survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionType {
    Hero,
    RichText,
    Image,
    Gallery,
    Video,
    Grid,
    ContactForm,
    Newsletter,
    Testimonials,
    Pricing,
    FeaturedContent,
    TeamShowcase,
    Cta,
    ButtonGroup,
    Navigation,
    Footer,
    Breadcrumbs,
    Pagination,
    Faq,
    Stats,
    CustomHtml,
    Other(String),
}

impl SectionType {
    /// All built-in section kinds
    pub const KNOWN: [SectionType; 21] = [
        SectionType::Hero,
        SectionType::RichText,
        SectionType::Image,
        SectionType::Gallery,
        SectionType::Video,
        SectionType::Grid,
        SectionType::ContactForm,
        SectionType::Newsletter,
        SectionType::Testimonials,
        SectionType::Pricing,
        SectionType::FeaturedContent,
        SectionType::TeamShowcase,
        SectionType::Cta,
        SectionType::ButtonGroup,
        SectionType::Navigation,
        SectionType::Footer,
        SectionType::Breadcrumbs,
        SectionType::Pagination,
        SectionType::Faq,
        SectionType::Stats,
        SectionType::CustomHtml,
    ];

    /// Wire name, e.g. `RICH_TEXT`
    pub fn as_str(&self) -> &str {
        match self {
            SectionType::Hero => "HERO",
            SectionType::RichText => "RICH_TEXT",
            SectionType::Image => "IMAGE",
            SectionType::Gallery => "GALLERY",
            SectionType::Video => "VIDEO",
            SectionType::Grid => "GRID",
            SectionType::ContactForm => "CONTACT_FORM",
            SectionType::Newsletter => "NEWSLETTER",
            SectionType::Testimonials => "TESTIMONIALS",
            SectionType::Pricing => "PRICING",
            SectionType::FeaturedContent => "FEATURED_CONTENT",
            SectionType::TeamShowcase => "TEAM_SHOWCASE",
            SectionType::Cta => "CTA",
            SectionType::ButtonGroup => "BUTTON_GROUP",
            SectionType::Navigation => "NAVIGATION",
            SectionType::Footer => "FOOTER",
            SectionType::Breadcrumbs => "BREADCRUMBS",
            SectionType::Pagination => "PAGINATION",
            SectionType::Faq => "FAQ",
            SectionType::Stats => "STATS",
            SectionType::CustomHtml => "CUSTOM_HTML",
            SectionType::Other(name) => name,
        }
    }
}

impl From<&str> for SectionType {
    fn from(s: &str) -> Self {
        SectionType::KNOWN
            .iter()
            .find(|known| known.as_str().eq_ignore_ascii_case(s))
            .cloned()
            .unwrap_or_else(|| SectionType::Other(s.to_string()))
    }
}

impl From<String> for SectionType {
    fn from(s: String) -> Self {
        SectionType::from(s.as_str())
    }
}

impl From<SectionType> for String {
    fn from(section_type: SectionType) -> Self {
        section_type.as_str().to_string()
    }
}

impl std::fmt::Display for SectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Translations
// =============================================================================

/// Section content for a single language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTranslation {
    /// Language code (e.g., "en", "fr")
    pub language: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    /// HTML content
    #[serde(default)]
    pub content: Option<String>,
    /// Free-form section-specific data (button labels, form fields, ...)
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl SectionTranslation {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// The plain text fields (title, subtitle, content) that are present
    pub fn text_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = Vec::new();
        if let Some(title) = &self.title {
            fields.push(("title", title.as_str()));
        }
        if let Some(subtitle) = &self.subtitle {
            fields.push(("subtitle", subtitle.as_str()));
        }
        if let Some(content) = &self.content {
            fields.push(("content", content.as_str()));
        }
        fields
    }
}

/// Where a section is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderContext {
    /// Visitor-facing page
    Public,
    /// Editor or admin preview
    Preview,
}

// =============================================================================
// Page Section
// =============================================================================

/// One visual block of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSection {
    pub id: SectionId,
    #[serde(rename = "type")]
    pub section_type: SectionType,
    /// Render sequence among siblings
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub translations: Vec<SectionTranslation>,
    #[serde(default)]
    pub layout_settings: LayoutSettings,
    #[serde(default)]
    pub style_settings: StyleSettings,
    #[serde(default)]
    pub responsive_settings: ResponsiveSettings,
    #[serde(default)]
    pub animation_settings: AnimationSettings,
    #[serde(default)]
    pub custom_settings: CustomSettings,
}

impl PageSection {
    /// Create an empty section with a fresh ID
    pub fn new(section_type: SectionType, order: i32) -> Self {
        Self {
            id: SectionId::new(),
            section_type,
            order,
            translations: Vec::new(),
            layout_settings: LayoutSettings::default(),
            style_settings: StyleSettings::default(),
            responsive_settings: ResponsiveSettings::default(),
            animation_settings: AnimationSettings::default(),
            custom_settings: CustomSettings::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<SectionId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_translation(mut self, translation: SectionTranslation) -> Self {
        self.translations.push(translation);
        self
    }

    pub fn with_style(mut self, style: StyleSettings) -> Self {
        self.style_settings = style;
        self
    }

    pub fn with_layout(mut self, layout: LayoutSettings) -> Self {
        self.layout_settings = layout;
        self
    }

    pub fn with_custom(mut self, custom: CustomSettings) -> Self {
        self.custom_settings = custom;
        self
    }

    /// Translation for `language`, falling back to the first available one
    pub fn translation_for(&self, language: &str) -> Option<&SectionTranslation> {
        self.translations
            .iter()
            .find(|t| t.language == language)
            .or_else(|| self.translations.first())
    }

    /// Whether the section produces any output in the given context.
    /// Sections without translations are only shown in previews.
    pub fn is_renderable(&self, context: RenderContext) -> bool {
        context == RenderContext::Preview || !self.translations.is_empty()
    }

    /// Translation to render for `language`. A section without translations
    /// renders nothing publicly; previews show a placeholder, so `None` is
    /// returned in both cases and `is_renderable` tells them apart.
    pub fn renderable_translation(
        &self,
        language: &str,
        context: RenderContext,
    ) -> Option<&SectionTranslation> {
        if !self.is_renderable(context) {
            return None;
        }
        self.translation_for(language)
    }

    /// Deep copy with a new section ID
    pub fn duplicate(&self) -> Self {
        Self {
            id: SectionId::new(),
            ..self.clone()
        }
    }
}

/// Sort sections by `order`. Sections sharing an order value keep their
/// relative insertion order.
pub fn sort_sections(sections: &mut [PageSection]) {
    sections.sort_by_key(|s| s.order);
}
