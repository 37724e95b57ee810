//! Structural and security validation of template content
//!
//! The validator only classifies and reports. It never rewrites content;
//! see the sanitizer for that.

use super::patterns::{
    base64_regex, css_patterns, dangerous_patterns, has_executable_extension, obfuscation_regex,
    suspicious_keywords, url_regex, HEURISTIC_THRESHOLD,
};
use super::{IssueLocation, IssueType, SecurityIssue, Severity, ValidationResult};
use crate::templates::TemplateManifest;
use page_model::{is_semver, CustomSettings, Difficulty, PageSection, PortableTemplate, Template};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Longest matched text carried in a finding
const MAX_PATTERN_LEN: usize = 100;

/// Validator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorConfig {
    /// Accept `customJS` without reporting it
    pub allow_custom_js: bool,
    /// Domains external URLs may point to. Empty disables the check.
    pub allowed_domains: Vec<String>,
}

impl ValidatorConfig {
    pub fn with_custom_js(mut self, allow: bool) -> Self {
        self.allow_custom_js = allow;
        self
    }

    pub fn with_allowed_domain(mut self, domain: impl Into<String>) -> Self {
        self.allowed_domains.push(domain.into().to_ascii_lowercase());
        self
    }

    /// Whether `host` is one of the allowed domains or a subdomain of one
    pub fn is_domain_allowed(&self, host: &str) -> bool {
        if self.allowed_domains.is_empty() {
            return true;
        }
        let host = host.to_ascii_lowercase();
        self.allowed_domains.iter().any(|domain| {
            let domain = domain.to_ascii_lowercase();
            host == domain || host.ends_with(&format!(".{}", domain))
        })
    }
}

/// Template validator
#[derive(Debug, Clone, Default)]
pub struct TemplateValidator {
    config: ValidatorConfig,
}

impl TemplateValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Shape checks on raw template JSON: the document must be an object,
    /// `sections` (when present) an array and `difficulty` (when present) one
    /// of the known names. The first failure is reported on its own.
    pub fn check_shape(&self, value: &Value) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some(object) = value.as_object() else {
            result.error("Template data must be a JSON object");
            return result.finalize();
        };

        if let Some(sections) = object.get("sections") {
            if !sections.is_array() {
                result.error("Template sections must be an array");
                return result.finalize();
            }
        }

        if let Some(difficulty) = object.get("difficulty") {
            let known = difficulty
                .as_str()
                .map(|name| Difficulty::NAMES.contains(&name))
                .unwrap_or(false);
            if !known {
                result.error(format!(
                    "Invalid difficulty {} (expected one of {})",
                    difficulty,
                    Difficulty::NAMES.join(", ")
                ));
            }
        }

        result.finalize()
    }

    /// Validate raw template JSON. Documents failing the shape checks are
    /// reported without going further.
    pub fn validate_json(
        &self,
        value: &Value,
        manifest: Option<&TemplateManifest>,
    ) -> ValidationResult {
        let shape = self.check_shape(value);
        if !shape.is_valid {
            return shape;
        }

        match serde_json::from_value::<PortableTemplate>(value.clone()) {
            Ok(template) => self.validate(&template, manifest),
            Err(e) => {
                let mut result = ValidationResult::new();
                result.error(format!("Invalid template data: {}", e));
                result.finalize()
            }
        }
    }

    /// Validate a stored template in place, keeping its section IDs
    pub fn validate_template(
        &self,
        template: &Template,
        manifest: Option<&TemplateManifest>,
    ) -> ValidationResult {
        let portable = PortableTemplate {
            name: template.name.clone(),
            description: template.description.clone(),
            version: template.version.clone(),
            category: Some(template.category),
            difficulty: template.difficulty,
            tags: template.tags.clone(),
            license: template.license.clone(),
            sections: template.sections.clone(),
            global_styles: template.global_styles.clone(),
        };
        self.validate(&portable, manifest)
    }

    /// Run structural, content, custom-code and whole-template checks
    pub fn validate(
        &self,
        template: &PortableTemplate,
        manifest: Option<&TemplateManifest>,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();

        self.check_structure(template, manifest, &mut result);
        for (index, section) in template.sections.iter().enumerate() {
            self.check_section(index, section, &mut result);
        }
        self.check_obfuscation(template, &mut result);

        let result = result.finalize();
        if !result.security_issues.is_empty() {
            tracing::debug!(
                "Template {:?} validated with {} security issue(s)",
                template.name,
                result.security_issues.len()
            );
        }
        result
    }

    fn check_structure(
        &self,
        template: &PortableTemplate,
        manifest: Option<&TemplateManifest>,
        result: &mut ValidationResult,
    ) {
        if template.name.trim().is_empty() {
            result.error("Template name is required");
        }
        if template.category.is_none() {
            result.error("Template category is required");
        }
        if !is_semver(&template.version) {
            result.warning(format!(
                "Template version {:?} is not in MAJOR.MINOR.PATCH format",
                template.version
            ));
        }
        if template.sections.is_empty() {
            result.warning("Template has no sections");
        }

        let mut seen_ids = HashSet::new();
        let mut reported_ids = HashSet::new();
        let mut orders: BTreeMap<i32, usize> = BTreeMap::new();
        for section in &template.sections {
            if !seen_ids.insert(&section.id) && reported_ids.insert(&section.id) {
                result.error(format!("Duplicate section id: {}", section.id));
            }
            *orders.entry(section.order).or_default() += 1;
        }
        for (order, count) in orders {
            if count > 1 {
                result.warning(format!(
                    "{} sections share order {}; they render in list order",
                    count, order
                ));
            }
        }

        if let Some(manifest) = manifest {
            if !manifest.is_supported() {
                result.error(format!(
                    "Unsupported manifest version: {}",
                    manifest.version
                ));
            }
            if manifest.name != template.name {
                result.warning(format!(
                    "Manifest name {:?} does not match template name {:?}",
                    manifest.name, template.name
                ));
            }
        }
    }

    fn check_section(&self, index: usize, section: &PageSection, result: &mut ValidationResult) {
        for (t, translation) in section.translations.iter().enumerate() {
            for (field, text) in translation.text_fields() {
                let location = IssueLocation::section(index, format!("translations[{}].{}", t, field));
                self.scan_text(text, &location, result);
            }
            if let Some(metadata) = &translation.metadata {
                let path = format!("translations[{}].metadata", t);
                self.scan_value(index, metadata, path, result);
            }
        }

        if let Some(image) = &section.style_settings.background_image {
            let location = IssueLocation::section(index, "styleSettings.backgroundImage");
            self.scan_urls(image, &location, result);
        }

        self.check_custom_code(index, &section.custom_settings, result);
    }

    fn scan_value(&self, index: usize, value: &Value, path: String, result: &mut ValidationResult) {
        match value {
            Value::String(text) => {
                self.scan_text(text, &IssueLocation::section(index, path), result);
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.scan_value(index, item, format!("{}[{}]", path, i), result);
                }
            }
            Value::Object(map) => {
                for (key, item) in map {
                    self.scan_value(index, item, format!("{}.{}", path, key), result);
                }
            }
            _ => {}
        }
    }

    /// Content rules for one text field
    fn scan_text(&self, text: &str, location: &IssueLocation, result: &mut ValidationResult) {
        for pattern in dangerous_patterns() {
            if let Some(found) = pattern.regex.find(text) {
                result.issue(
                    SecurityIssue::new(
                        pattern.issue_type,
                        Severity::High,
                        format!("Dangerous pattern detected: {}", pattern.name),
                        location.clone(),
                    )
                    .with_pattern(snippet(found.as_str())),
                );
            }
        }

        for keyword in suspicious_keywords() {
            for _ in keyword.regex.find_iter(text) {
                result.issue(
                    SecurityIssue::new(
                        IssueType::SuspiciousContent,
                        Severity::Medium,
                        format!("Suspicious keyword: {}", keyword.keyword),
                        location.clone(),
                    )
                    .with_pattern(keyword.keyword),
                );
            }
        }

        self.scan_urls(text, location, result);
    }

    fn scan_urls(&self, text: &str, location: &IssueLocation, result: &mut ValidationResult) {
        let Some(regex) = url_regex() else {
            return;
        };
        for found in regex.find_iter(text) {
            let raw = found
                .as_str()
                .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'));
            self.check_url(raw, location, result);
        }
    }

    fn check_url(&self, raw: &str, location: &IssueLocation, result: &mut ValidationResult) {
        let Ok(url) = url::Url::parse(raw) else {
            return;
        };

        if !matches!(url.scheme(), "http" | "https") {
            result.issue(
                SecurityIssue::new(
                    IssueType::SuspiciousContent,
                    Severity::High,
                    format!("URL uses non-HTTP scheme {:?}", url.scheme()),
                    location.clone(),
                )
                .with_pattern(snippet(raw)),
            );
        }

        if let Some(host) = url.host_str() {
            if !self.config.is_domain_allowed(host) {
                result.issue(
                    SecurityIssue::new(
                        IssueType::PrivacyLeak,
                        Severity::Medium,
                        format!("URL points to non-allowed domain {}", host),
                        location.clone(),
                    )
                    .with_pattern(snippet(raw)),
                );
            }
        }

        if has_executable_extension(url.path()) {
            result.issue(
                SecurityIssue::new(
                    IssueType::MaliciousCode,
                    Severity::Critical,
                    "URL links to an executable file",
                    location.clone(),
                )
                .with_pattern(snippet(raw)),
            );
        }
    }

    fn check_custom_code(&self, index: usize, custom: &CustomSettings, result: &mut ValidationResult) {
        if let Some(js) = custom.custom_js.as_deref().filter(|js| !js.trim().is_empty()) {
            if !self.config.allow_custom_js {
                result.issue(
                    SecurityIssue::new(
                        IssueType::MaliciousCode,
                        Severity::High,
                        "Custom JavaScript is not allowed",
                        IssueLocation::section(index, "customSettings.customJS"),
                    )
                    .with_pattern(snippet(js)),
                );
            }
        }

        if let Some(css) = &custom.custom_css {
            for (name, regex) in css_patterns() {
                if let Some(found) = regex.find(css) {
                    result.issue(
                        SecurityIssue::new(
                            IssueType::Xss,
                            Severity::High,
                            format!("Dangerous CSS detected: {}", name),
                            IssueLocation::section(index, "customSettings.customCSS"),
                        )
                        .with_pattern(snippet(found.as_str())),
                    );
                }
            }
        }

        for (name, value) in &custom.custom_attributes {
            let location = IssueLocation::section(index, format!("customSettings.customAttributes.{}", name));
            if name.to_ascii_lowercase().starts_with("on") {
                result.issue(
                    SecurityIssue::new(
                        IssueType::Xss,
                        Severity::High,
                        format!("Event handler attribute {}", name),
                        location.clone(),
                    )
                    .with_pattern(name.as_str()),
                );
            }
            let lowered = value.to_ascii_lowercase();
            if ["javascript:", "data:", "vbscript:"]
                .iter()
                .any(|scheme| lowered.contains(scheme))
            {
                result.issue(
                    SecurityIssue::new(
                        IssueType::Xss,
                        Severity::High,
                        format!("Dangerous URI in attribute {}", name),
                        location,
                    )
                    .with_pattern(snippet(value)),
                );
            }
        }

        if let Some(html) = &custom.custom_html {
            let location = IssueLocation::section(index, "customSettings.customHTML");
            self.scan_text(html, &location, result);
        }
    }

    /// Density scan over the whole serialized template
    fn check_obfuscation(&self, template: &PortableTemplate, result: &mut ValidationResult) {
        let serialized = match serde_json::to_string(template) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::warn!("Could not serialize template for heuristic scan: {}", e);
                return;
            }
        };

        if let Some(regex) = base64_regex() {
            let count = regex.find_iter(&serialized).count();
            if count > HEURISTIC_THRESHOLD {
                result.issue(SecurityIssue::new(
                    IssueType::SuspiciousContent,
                    Severity::Medium,
                    format!("High density of base64-encoded data ({} occurrences)", count),
                    IssueLocation::template("template"),
                ));
            }
        }

        if let Some(regex) = obfuscation_regex() {
            let count = regex.find_iter(&serialized).count();
            if count > HEURISTIC_THRESHOLD {
                result.issue(SecurityIssue::new(
                    IssueType::SuspiciousContent,
                    Severity::Medium,
                    format!(
                        "High density of escape sequences or dynamic evaluation ({} occurrences)",
                        count
                    ),
                    IssueLocation::template("template"),
                ));
            }
        }
    }
}

fn snippet(text: &str) -> String {
    match text.char_indices().nth(MAX_PATTERN_LEN) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_model::{SectionTranslation, SectionType, TemplateCategory};
    use serde_json::json;

    fn template_with(sections: Vec<PageSection>) -> PortableTemplate {
        PortableTemplate {
            name: "Landing".to_string(),
            version: "1.0.0".to_string(),
            category: Some(TemplateCategory::LandingPage),
            sections,
            ..Default::default()
        }
    }

    fn text_section(order: i32, content: &str) -> PageSection {
        PageSection::new(SectionType::RichText, order)
            .with_translation(SectionTranslation::new("en").with_content(content))
    }

    #[test]
    fn test_clean_template_is_valid() {
        let template = template_with(vec![text_section(0, "<p>Welcome to our studio.</p>")]);
        let result = TemplateValidator::default().validate(&template, None);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.security_issues.is_empty());
    }

    #[test]
    fn test_executable_link_is_critical() {
        let template = template_with(vec![text_section(
            0,
            r#"<a href="https://files.example.com/setup.exe">Download</a>"#,
        )]);
        let result = TemplateValidator::default().validate(&template, None);
        assert!(!result.is_valid);
        let critical: Vec<_> = result.issues_at_least(Severity::Critical).collect();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].issue_type, IssueType::MaliciousCode);
        assert_eq!(
            critical[0].location.to_string(),
            "sections[0].translations[0].content"
        );
    }

    #[test]
    fn test_fetch_keyword_is_medium_only() {
        let template = template_with(vec![text_section(0, "We fetch fresh produce every morning.")]);
        let result = TemplateValidator::default().validate(&template, None);
        assert!(result.is_valid);
        assert_eq!(result.security_issues.len(), 1);
        let issue = &result.security_issues[0];
        assert_eq!(issue.severity, Severity::Medium);
        assert_eq!(issue.issue_type, IssueType::SuspiciousContent);
        assert_eq!(issue.pattern.as_deref(), Some("fetch"));
    }

    #[test]
    fn test_keyword_reported_per_occurrence() {
        let template = template_with(vec![text_section(0, "eval this, then eval that")]);
        let result = TemplateValidator::default().validate(&template, None);
        let evals = result
            .security_issues
            .iter()
            .filter(|i| i.pattern.as_deref() == Some("eval"))
            .count();
        assert_eq!(evals, 2);
    }

    #[test]
    fn test_duplicate_order_is_warning_only() {
        let template = template_with(vec![text_section(0, "a"), text_section(0, "b")]);
        let result = TemplateValidator::default().validate(&template, None);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("share order 0")));
    }

    #[test]
    fn test_duplicate_ids_are_errors() {
        let template = template_with(vec![
            text_section(0, "a").with_id("same"),
            text_section(1, "b").with_id("same"),
        ]);
        let result = TemplateValidator::default().validate(&template, None);
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["Duplicate section id: same".to_string()]);
    }

    #[test]
    fn test_structural_checks() {
        let mut template = template_with(vec![text_section(0, "a")]);
        template.name = "  ".to_string();
        template.category = None;
        template.version = "v1".to_string();
        let result = TemplateValidator::default().validate(&template, None);
        assert_eq!(result.errors.len(), 2);
        assert!(result.warnings.iter().any(|w| w.contains("MAJOR.MINOR.PATCH")));
        assert!(!result.is_valid);
    }

    #[test]
    fn test_dangerous_content_is_high() {
        let template = template_with(vec![text_section(0, "<script>alert(1)</script>")]);
        let result = TemplateValidator::default().validate(&template, None);
        assert!(result.is_valid);
        assert!(result
            .security_issues
            .iter()
            .any(|i| i.severity == Severity::High && i.issue_type == IssueType::Xss));
    }

    #[test]
    fn test_metadata_is_walked_recursively() {
        let section = PageSection::new(SectionType::ButtonGroup, 0).with_translation(
            SectionTranslation::new("en").with_metadata(json!({
                "buttons": [{"label": "Go", "href": "javascript:alert(1)"}]
            })),
        );
        let result = TemplateValidator::default().validate(&template_with(vec![section]), None);
        let issue = result
            .security_issues
            .iter()
            .find(|i| i.issue_type == IssueType::Xss)
            .unwrap();
        assert_eq!(
            issue.location.to_string(),
            "sections[0].translations[0].metadata.buttons[0].href"
        );
    }

    #[test]
    fn test_url_checks() {
        let config = ValidatorConfig::default().with_allowed_domain("example.com");
        let validator = TemplateValidator::new(config);
        let template = template_with(vec![text_section(
            0,
            "See https://cdn.example.com/a.png and https://tracker.test/p.gif or ftp://files.example.com/x",
        )]);
        let result = validator.validate(&template, None);
        assert!(result.is_valid);

        let privacy: Vec<_> = result
            .security_issues
            .iter()
            .filter(|i| i.issue_type == IssueType::PrivacyLeak)
            .collect();
        assert_eq!(privacy.len(), 1);
        assert!(privacy[0].message.contains("tracker.test"));
        assert!(result
            .security_issues
            .iter()
            .any(|i| i.severity == Severity::High && i.message.contains("ftp")));
    }

    #[test]
    fn test_custom_code_checks() {
        let mut custom = CustomSettings {
            custom_js: Some("console.log('hi')".to_string()),
            custom_css: Some("div { width: expression(alert(1)); }".to_string()),
            custom_html: Some("<iframe src=\"https://x.example\"></iframe>".to_string()),
            ..Default::default()
        };
        custom.custom_attributes.insert("onclick".to_string(), "go()".to_string());
        custom.custom_attributes.insert("href".to_string(), "vbscript:msgbox".to_string());
        let section = PageSection::new(SectionType::CustomHtml, 0).with_custom(custom);
        let template = template_with(vec![section]);

        let result = TemplateValidator::default().validate(&template, None);
        let fields: Vec<String> = result
            .issues_at_least(Severity::High)
            .map(|i| i.location.field.clone())
            .collect();
        assert!(fields.contains(&"customSettings.customJS".to_string()));
        assert!(fields.contains(&"customSettings.customCSS".to_string()));
        assert!(fields.contains(&"customSettings.customAttributes.onclick".to_string()));
        assert!(fields.contains(&"customSettings.customAttributes.href".to_string()));
        assert!(fields.contains(&"customSettings.customHTML".to_string()));

        let permissive = TemplateValidator::new(ValidatorConfig::default().with_custom_js(true));
        let result = permissive.validate(&template, None);
        assert!(!result
            .security_issues
            .iter()
            .any(|i| i.location.field == "customSettings.customJS"));
    }

    #[test]
    fn test_obfuscation_heuristic() {
        let blob = "QUJDREVGR0hJSktMTU5PUFFSU1RVVldYWVphYmNkZWZnaGlqa2xtbm9w";
        let content = vec![blob; 6].join(" ");
        let template = template_with(vec![text_section(0, &content)]);
        let result = TemplateValidator::default().validate(&template, None);
        assert!(result.is_valid);
        assert!(result
            .security_issues
            .iter()
            .any(|i| i.message.contains("base64") && i.location.section_index.is_none()));
    }

    #[test]
    fn test_validate_json_shape_checks() {
        let validator = TemplateValidator::default();

        let result = validator.validate_json(&json!({"name": "x", "sections": {}}), None);
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["Template sections must be an array".to_string()]);

        let result = validator.validate_json(
            &json!({"name": "x", "category": "BLOG", "difficulty": "EXPERT", "sections": []}),
            None,
        );
        assert!(result.errors[0].contains("Invalid difficulty"));

        let result = validator.validate_json(
            &json!({"name": "x", "version": "1.0.0", "category": "BLOG", "sections": []}),
            None,
        );
        assert!(result.is_valid);
    }

    #[test]
    fn test_manifest_checks() {
        use page_model::TemplateAuthor;
        let source = Template::new("Other name", TemplateCategory::Blog, TemplateAuthor::new("u", "U"));
        let mut manifest = TemplateManifest::from_template(&source);
        let template = template_with(vec![text_section(0, "a")]);

        let result = TemplateValidator::default().validate(&template, Some(&manifest));
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("does not match")));

        manifest.version = "0.1.0".to_string();
        let result = TemplateValidator::default().validate(&template, Some(&manifest));
        assert!(!result.is_valid);
    }
}
