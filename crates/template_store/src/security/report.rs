//! Validation reports and security findings

use serde::{Deserialize, Serialize};

/// Severity of a security finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Informational, rarely harmful
    Low,
    /// Worth reviewing, never blocks an import
    Medium,
    /// Likely harmful content
    High,
    /// Blocks the template from being accepted
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        };
        write!(f, "{}", name)
    }
}

/// Category of a security finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    Xss,
    Injection,
    MaliciousCode,
    SuspiciousContent,
    PrivacyLeak,
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Xss => "XSS",
            Self::Injection => "INJECTION",
            Self::MaliciousCode => "MALICIOUS_CODE",
            Self::SuspiciousContent => "SUSPICIOUS_CONTENT",
            Self::PrivacyLeak => "PRIVACY_LEAK",
        };
        write!(f, "{}", name)
    }
}

/// Where in a template a finding was made
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLocation {
    /// Index into the template's section list, `None` for template-wide findings
    pub section_index: Option<usize>,
    /// Field path within the section (or template)
    pub field: String,
}

impl IssueLocation {
    /// Location inside a section, e.g. `translations[0].content`
    pub fn section(index: usize, field: impl Into<String>) -> Self {
        Self {
            section_index: Some(index),
            field: field.into(),
        }
    }

    /// Template-wide location
    pub fn template(field: impl Into<String>) -> Self {
        Self {
            section_index: None,
            field: field.into(),
        }
    }
}

impl std::fmt::Display for IssueLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.section_index {
            Some(index) if self.field.is_empty() => write!(f, "sections[{}]", index),
            Some(index) => write!(f, "sections[{}].{}", index, self.field),
            None => write!(f, "{}", self.field),
        }
    }
}

/// A single security finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub message: String,
    pub location: IssueLocation,
    /// The text that triggered the finding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl SecurityIssue {
    pub fn new(
        issue_type: IssueType,
        severity: Severity,
        message: impl Into<String>,
        location: IssueLocation,
    ) -> Self {
        Self {
            issue_type,
            severity,
            message: message.into(),
            location,
            pattern: None,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

impl std::fmt::Display for SecurityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} {}] {} at {}",
            self.severity, self.issue_type, self.message, self.location
        )
    }
}

/// Outcome of validating a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// No structural errors and no critical security issues
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub security_issues: Vec<SecurityIssue>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            security_issues: Vec::new(),
        }
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn issue(&mut self, issue: SecurityIssue) {
        self.security_issues.push(issue);
    }

    /// Whether any finding is CRITICAL
    pub fn has_critical(&self) -> bool {
        self.security_issues
            .iter()
            .any(|issue| issue.severity == Severity::Critical)
    }

    /// Findings at or above `severity`
    pub fn issues_at_least(&self, severity: Severity) -> impl Iterator<Item = &SecurityIssue> {
        self.security_issues
            .iter()
            .filter(move |issue| issue.severity >= severity)
    }

    /// Recompute `is_valid` from the collected findings
    pub fn finalize(mut self) -> Self {
        self.is_valid = self.errors.is_empty() && !self.has_critical();
        self
    }

    /// One-line summary, e.g. for error messages
    pub fn summary(&self) -> String {
        let critical = self
            .security_issues
            .iter()
            .filter(|issue| issue.severity == Severity::Critical)
            .count();
        let mut summary = format!(
            "{} error(s), {} warning(s), {} security issue(s) ({} critical)",
            self.errors.len(),
            self.warnings.len(),
            self.security_issues.len(),
            critical
        );
        if let Some(first) = self.errors.first() {
            summary.push_str(&format!("; first error: {}", first));
        } else if let Some(first) = self
            .security_issues
            .iter()
            .find(|issue| issue.severity == Severity::Critical)
        {
            summary.push_str(&format!("; {}", first));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let location = IssueLocation::section(2, "translations[0].content");
        assert_eq!(location.to_string(), "sections[2].translations[0].content");
        assert_eq!(IssueLocation::template("name").to_string(), "name");
        assert_eq!(IssueLocation::section(1, "").to_string(), "sections[1]");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_finalize() {
        let mut result = ValidationResult::new();
        result.issue(SecurityIssue::new(
            IssueType::SuspiciousContent,
            Severity::Medium,
            "suspicious keyword",
            IssueLocation::section(0, "translations[0].content"),
        ));
        result.warning("duplicate order");
        assert!(result.clone().finalize().is_valid);

        result.issue(SecurityIssue::new(
            IssueType::MaliciousCode,
            Severity::Critical,
            "executable link",
            IssueLocation::section(0, "translations[0].content"),
        ));
        let result = result.finalize();
        assert!(!result.is_valid);
        assert!(result.summary().contains("1 critical"));
        assert_eq!(result.issues_at_least(Severity::High).count(), 1);
    }

    #[test]
    fn test_wire_format() {
        let issue = SecurityIssue::new(
            IssueType::PrivacyLeak,
            Severity::Medium,
            "external domain",
            IssueLocation::section(3, "customSettings.customHTML"),
        )
        .with_pattern("https://tracker.example");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["type"], "PRIVACY_LEAK");
        assert_eq!(json["severity"], "MEDIUM");
        assert_eq!(json["location"]["sectionIndex"], 3);
    }
}
