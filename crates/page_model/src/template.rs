//! Templates: named, versioned bundles of page sections

use crate::{PageModelError, PageSection, Result, SectionId, TemplateAsset};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Enumerations
// =============================================================================

/// Template categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateCategory {
    LandingPage,
    Business,
    Portfolio,
    Blog,
    Ecommerce,
    Event,
    Personal,
    Nonprofit,
    Education,
    Other,
}

impl Default for TemplateCategory {
    fn default() -> Self {
        Self::Other
    }
}

impl std::fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LandingPage => "LANDING_PAGE",
            Self::Business => "BUSINESS",
            Self::Portfolio => "PORTFOLIO",
            Self::Blog => "BLOG",
            Self::Ecommerce => "ECOMMERCE",
            Self::Event => "EVENT",
            Self::Personal => "PERSONAL",
            Self::Nonprofit => "NONPROFIT",
            Self::Education => "EDUCATION",
            Self::Other => "OTHER",
        };
        write!(f, "{}", name)
    }
}

/// How much experience a template expects from its user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Accepted wire names
    pub const NAMES: [&'static str; 3] = ["BEGINNER", "INTERMEDIATE", "ADVANCED"];
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Beginner
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Beginner => "BEGINNER",
            Self::Intermediate => "INTERMEDIATE",
            Self::Advanced => "ADVANCED",
        };
        write!(f, "{}", name)
    }
}

/// Publication state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

// =============================================================================
// Author & metrics
// =============================================================================

/// The single owning user of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateAuthor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl TemplateAuthor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            website: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }
}

/// Usage counters and rating aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateMetrics {
    pub download_count: u64,
    pub view_count: u64,
    /// Average rating, `None` until the first review
    pub rating: Option<f64>,
    pub rating_count: u32,
}

impl TemplateMetrics {
    /// Fold a 1-5 star rating into the running average
    pub fn record_rating(&mut self, stars: u8) -> Result<()> {
        if !(1..=5).contains(&stars) {
            return Err(PageModelError::InvalidRating(stars));
        }
        let total = self.rating.unwrap_or(0.0) * f64::from(self.rating_count) + f64::from(stars);
        self.rating_count += 1;
        self.rating = Some(total / f64::from(self.rating_count));
        Ok(())
    }
}

/// Check a `MAJOR.MINOR.PATCH` version string
pub fn is_semver(version: &str) -> bool {
    regex_lite::Regex::new(r"^\d+\.\d+\.\d+$")
        .map(|re| re.is_match(version))
        .unwrap_or(false)
}

// =============================================================================
// Template
// =============================================================================

/// A named, versioned, categorized bundle of page sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    pub category: TemplateCategory,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub status: TemplateStatus,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub sections: Vec<PageSection>,
    #[serde(default)]
    pub global_styles: Option<serde_json::Value>,
    #[serde(default)]
    pub assets: Vec<TemplateAsset>,
    /// Screenshot URLs
    #[serde(default)]
    pub preview_images: Vec<String>,
    #[serde(default)]
    pub metrics: TemplateMetrics,
    author: TemplateAuthor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// Create a new draft template
    pub fn new(
        name: impl Into<String>,
        category: TemplateCategory,
        author: TemplateAuthor,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            version: "1.0.0".to_string(),
            category,
            difficulty: Difficulty::default(),
            status: TemplateStatus::Draft,
            is_public: false,
            is_featured: false,
            tags: Vec::new(),
            license: None,
            sections: Vec::new(),
            global_styles: None,
            assets: Vec::new(),
            preview_images: Vec::new(),
            metrics: TemplateMetrics::default(),
            author,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a template from the sections of an in-editor draft page
    pub fn from_draft(
        name: impl Into<String>,
        category: TemplateCategory,
        author: TemplateAuthor,
        draft_sections: &[PageSection],
    ) -> Self {
        let mut template = Self::new(name, category, author);
        template.sections = draft_sections.iter().map(PageSection::duplicate).collect();
        template
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_section(mut self, section: PageSection) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_asset(mut self, asset: TemplateAsset) -> Self {
        self.assets.push(asset);
        self
    }

    pub fn with_preview_image(mut self, url: impl Into<String>) -> Self {
        self.preview_images.push(url.into());
        self
    }

    /// The owning user. Ownership never changes after creation.
    pub fn author(&self) -> &TemplateAuthor {
        &self.author
    }

    /// Set the version, rejecting anything that is not `MAJOR.MINOR.PATCH`
    pub fn set_version(&mut self, version: impl Into<String>) -> Result<()> {
        let version = version.into();
        if !is_semver(&version) {
            return Err(PageModelError::InvalidVersion(version));
        }
        self.version = version;
        self.touch();
        Ok(())
    }

    /// Replace sections, assets and global styles as a whole
    pub fn replace_content(
        &mut self,
        sections: Vec<PageSection>,
        assets: Vec<TemplateAsset>,
        global_styles: Option<serde_json::Value>,
    ) {
        self.sections = sections;
        self.assets = assets;
        self.global_styles = global_styles;
        self.touch();
    }

    /// Look up a section by ID
    pub fn section(&self, id: &SectionId) -> Result<&PageSection> {
        self.sections
            .iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| PageModelError::SectionNotFound(id.to_string()))
    }

    /// Sections in render order; equal `order` values keep insertion order
    pub fn sorted_sections(&self) -> Vec<&PageSection> {
        let mut sections: Vec<&PageSection> = self.sections.iter().collect();
        sections.sort_by_key(|s| s.order);
        sections
    }

    /// Deep copy under a new identity: new template ID, a fresh ID for every
    /// section, reset counters and draft status.
    pub fn duplicate(&self, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            status: TemplateStatus::Draft,
            is_featured: false,
            sections: self.sections.iter().map(PageSection::duplicate).collect(),
            metrics: TemplateMetrics::default(),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn record_rating(&mut self, stars: u8) -> Result<()> {
        self.metrics.record_rating(stars)?;
        self.touch();
        Ok(())
    }

    pub fn record_download(&mut self) {
        self.metrics.download_count += 1;
    }

    pub fn record_view(&mut self) {
        self.metrics.view_count += 1;
    }

    /// Update the modified timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// The transportable form of this template: server-only fields (ID,
    /// author, timestamps, counters) are dropped and every section receives
    /// a fresh ID.
    pub fn to_portable(&self) -> PortableTemplate {
        PortableTemplate {
            name: self.name.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
            category: Some(self.category),
            difficulty: self.difficulty,
            tags: self.tags.clone(),
            license: self.license.clone(),
            sections: self.sections.iter().map(PageSection::duplicate).collect(),
            global_styles: self.global_styles.clone(),
        }
    }
}

// =============================================================================
// Portable template
// =============================================================================

/// Template content as carried in an exported archive
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortableTemplate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub category: Option<TemplateCategory>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub sections: Vec<PageSection>,
    #[serde(default)]
    pub global_styles: Option<serde_json::Value>,
}

impl PortableTemplate {
    /// Materialize an imported template under a new owner
    pub fn into_template(self, author: TemplateAuthor, assets: Vec<TemplateAsset>) -> Template {
        let mut template = Template::new(self.name, self.category.unwrap_or_default(), author);
        template.description = self.description;
        if is_semver(&self.version) {
            template.version = self.version;
        }
        template.difficulty = self.difficulty;
        template.tags = self.tags;
        template.license = self.license;
        template.sections = self.sections;
        template.global_styles = self.global_styles;
        template.assets = assets;
        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SectionTranslation, SectionType};
    use proptest::prelude::*;

    fn author() -> TemplateAuthor {
        TemplateAuthor::new("user-1", "Ada").with_email("ada@example.com")
    }

    fn sample() -> Template {
        Template::new("Landing", TemplateCategory::LandingPage, author())
            .with_section(
                PageSection::new(SectionType::Hero, 0)
                    .with_translation(SectionTranslation::new("en").with_title("Welcome")),
            )
            .with_section(PageSection::new(SectionType::Footer, 1))
    }

    #[test]
    fn test_template_creation() {
        let template = sample();
        assert_eq!(template.status, TemplateStatus::Draft);
        assert_eq!(template.version, "1.0.0");
        assert_eq!(template.author().name, "Ada");
        assert_eq!(template.sections.len(), 2);
    }

    #[test]
    fn test_duplicate_is_deep_copy_with_fresh_ids() {
        let mut original = sample();
        original.record_download();
        original.record_rating(4).unwrap();

        let copy = original.duplicate("Landing (copy)");
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "Landing (copy)");
        assert_eq!(copy.metrics, TemplateMetrics::default());
        assert_eq!(copy.author(), original.author());
        for (a, b) in copy.sections.iter().zip(&original.sections) {
            assert_ne!(a.id, b.id);
            assert_eq!(a.section_type, b.section_type);
            assert_eq!(a.translations, b.translations);
        }
    }

    #[test]
    fn test_from_draft_does_not_share_section_ids() {
        let draft = vec![PageSection::new(SectionType::RichText, 0)];
        let template = Template::from_draft("From draft", TemplateCategory::Blog, author(), &draft);
        assert_eq!(template.sections.len(), 1);
        assert_ne!(template.sections[0].id, draft[0].id);
    }

    #[test]
    fn test_rating_average() {
        let mut template = sample();
        template.record_rating(5).unwrap();
        template.record_rating(3).unwrap();
        assert_eq!(template.metrics.rating_count, 2);
        assert_eq!(template.metrics.rating, Some(4.0));
        assert_eq!(template.record_rating(0), Err(PageModelError::InvalidRating(0)));
        assert_eq!(template.record_rating(6), Err(PageModelError::InvalidRating(6)));
    }

    #[test]
    fn test_set_version_requires_semver() {
        let mut template = sample();
        assert!(template.set_version("2.1.0").is_ok());
        assert_eq!(template.version, "2.1.0");
        assert!(matches!(
            template.set_version("v2"),
            Err(PageModelError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_sorted_sections_stable() {
        let template = Template::new("t", TemplateCategory::Blog, author())
            .with_section(PageSection::new(SectionType::Faq, 1).with_id("x"))
            .with_section(PageSection::new(SectionType::Hero, 0).with_id("y"))
            .with_section(PageSection::new(SectionType::Cta, 0).with_id("z"));
        let ids: Vec<_> = template.sorted_sections().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["y", "z", "x"]);
    }

    #[test]
    fn test_portable_form_strips_server_fields() {
        let template = sample();
        let portable = template.to_portable();
        let json = serde_json::to_value(&portable).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("author").is_none());
        assert!(json.get("metrics").is_none());
        assert!(json.get("createdAt").is_none());
        assert_eq!(json["category"], "LANDING_PAGE");
        assert_ne!(portable.sections[0].id, template.sections[0].id);
    }

    #[test]
    fn test_portable_into_template() {
        let portable = sample().to_portable();
        let section_ids: Vec<_> = portable.sections.iter().map(|s| s.id.clone()).collect();
        let template = portable.into_template(TemplateAuthor::new("user-2", "Grace"), Vec::new());
        assert_eq!(template.author().id, "user-2");
        assert_eq!(template.category, TemplateCategory::LandingPage);
        let imported_ids: Vec<_> = template.sections.iter().map(|s| s.id.clone()).collect();
        assert_eq!(imported_ids, section_ids);
    }

    #[test]
    fn test_is_semver() {
        assert!(is_semver("1.0.0"));
        assert!(is_semver("10.20.30"));
        assert!(!is_semver("1.0"));
        assert!(!is_semver("1.0.0-beta"));
    }

    proptest! {
        #[test]
        fn prop_portable_sections_never_reuse_ids(count in 0usize..20) {
            let mut template = Template::new("p", TemplateCategory::Other, author());
            for i in 0..count {
                template.sections.push(PageSection::new(SectionType::RichText, i as i32));
            }
            let portable = template.to_portable();
            prop_assert_eq!(portable.sections.len(), count);
            for (a, b) in portable.sections.iter().zip(&template.sections) {
                prop_assert_ne!(&a.id, &b.id);
            }
        }
    }
}
