//! Content sanitization ahead of validation
//!
//! This is the only place imported content is rewritten. Section IDs and
//! ordering are never touched.

use page_model::PortableTemplate;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// How aggressively content is rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SanitizationLevel {
    /// Everything in `Moderate`, plus style and form elements and custom JS
    Strict,
    /// Scripts, event handlers, dangerous URIs and embedded frames
    #[default]
    Moderate,
    /// Scripts and event handlers only
    Permissive,
}

/// An HTML-sanitization capability applied to untrusted template content
pub trait ContentSanitizer {
    /// Rewrite one HTML fragment
    fn sanitize_html(&self, html: &str, level: SanitizationLevel) -> String;

    /// Rewrite every text field of a template. Returns how many fields changed.
    fn sanitize_template(&self, template: &mut PortableTemplate, level: SanitizationLevel) -> usize {
        let mut changed = 0;
        for section in &mut template.sections {
            for translation in &mut section.translations {
                for field in [
                    &mut translation.title,
                    &mut translation.subtitle,
                    &mut translation.content,
                ] {
                    if let Some(text) = field.as_mut() {
                        changed += self.rewrite(text, level);
                    }
                }
                if let Some(metadata) = translation.metadata.as_mut() {
                    changed += self.sanitize_value(metadata, level);
                }
            }

            let custom = &mut section.custom_settings;
            if let Some(html) = custom.custom_html.as_mut() {
                changed += self.rewrite(html, level);
            }
            if level == SanitizationLevel::Strict {
                if custom.custom_js.take().is_some() {
                    changed += 1;
                }
                let before = custom.custom_attributes.len();
                custom
                    .custom_attributes
                    .retain(|name, _| !name.to_ascii_lowercase().starts_with("on"));
                changed += before - custom.custom_attributes.len();
            }
        }
        changed
    }

    /// Rewrite every string inside a JSON value
    fn sanitize_value(&self, value: &mut Value, level: SanitizationLevel) -> usize {
        match value {
            Value::String(text) => self.rewrite(text, level),
            Value::Array(items) => items.iter_mut().map(|v| self.sanitize_value(v, level)).sum(),
            Value::Object(map) => map.values_mut().map(|v| self.sanitize_value(v, level)).sum(),
            _ => 0,
        }
    }

    /// Sanitize `text` in place, returning 1 if it changed
    fn rewrite(&self, text: &mut String, level: SanitizationLevel) -> usize {
        let cleaned = self.sanitize_html(text, level);
        if cleaned == *text {
            0
        } else {
            *text = cleaned;
            1
        }
    }
}

struct Rule {
    regex: Regex,
    replacement: &'static str,
}

fn rules(sources: &[(&str, &'static str)]) -> Vec<Rule> {
    sources
        .iter()
        .filter_map(|(source, replacement)| match Regex::new(source) {
            Ok(regex) => Some(Rule {
                regex,
                replacement: *replacement,
            }),
            Err(e) => {
                tracing::warn!("Skipping invalid sanitizer rule {}: {}", source, e);
                None
            }
        })
        .collect()
}

fn permissive_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        rules(&[
            (r"(?is)<\s*script\b.*?<\s*/\s*script\s*>", ""),
            (r"(?is)<\s*script\b[^>]*>?", ""),
            (r#"(?i)\s+on[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#, ""),
        ])
    })
}

fn moderate_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        rules(&[
            (r"(?is)<\s*(iframe|object)\b.*?<\s*/\s*(iframe|object)\s*>", ""),
            (r"(?is)<\s*/?\s*(iframe|object|embed)\b[^>]*>", ""),
            (r"(?i)javascript\s*:", "blocked:"),
            (r"(?i)vbscript\s*:", "blocked:"),
            (r"(?i)data\s*:\s*text/html", "blocked:"),
        ])
    })
}

fn strict_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        rules(&[
            (r"(?is)<\s*style\b.*?<\s*/\s*style\s*>", ""),
            (r"(?is)<\s*/?\s*(style|form|input|button|textarea|select)\b[^>]*>", ""),
        ])
    })
}

/// Regex-based sanitizer used by default on import
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternSanitizer;

impl ContentSanitizer for PatternSanitizer {
    fn sanitize_html(&self, html: &str, level: SanitizationLevel) -> String {
        let mut stages = vec![permissive_rules()];
        if matches!(level, SanitizationLevel::Moderate | SanitizationLevel::Strict) {
            stages.push(moderate_rules());
        }
        if level == SanitizationLevel::Strict {
            stages.push(strict_rules());
        }

        let mut output = html.to_string();
        for rule in stages.into_iter().flatten() {
            if rule.regex.is_match(&output) {
                output = rule.regex.replace_all(&output, rule.replacement).into_owned();
            }
        }
        output
    }
}
