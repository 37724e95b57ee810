//! Fixed pattern tables used by the validator and sanitizer
//!
//! Every table is compiled once on first use.

use super::IssueType;
use regex_lite::Regex;
use std::sync::OnceLock;

/// File extensions treated as executable downloads
pub const EXECUTABLE_EXTENSIONS: [&str; 10] = [
    "exe", "bat", "cmd", "scr", "msi", "vbs", "ps1", "jar", "dll", "apk",
];

/// Keywords reported as suspicious when they appear in content
pub const SUSPICIOUS_KEYWORDS: [&str; 13] = [
    "eval",
    "document.write",
    "document.cookie",
    "innerHTML",
    "outerHTML",
    "localStorage",
    "sessionStorage",
    "fetch",
    "XMLHttpRequest",
    "require",
    "setTimeout",
    "setInterval",
    "window.location",
];

/// More matches than this in the serialized template trigger a heuristic finding
pub const HEURISTIC_THRESHOLD: usize = 5;

/// A compiled dangerous-content rule
#[derive(Debug)]
pub struct DangerousPattern {
    pub name: &'static str,
    pub issue_type: IssueType,
    pub regex: Regex,
}

/// A compiled suspicious keyword
#[derive(Debug)]
pub struct KeywordPattern {
    pub keyword: &'static str,
    pub regex: Regex,
}

fn compile(source: &str) -> Option<Regex> {
    match Regex::new(source) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!("Skipping invalid security pattern {}: {}", source, e);
            None
        }
    }
}

/// Script injection, dangerous URIs, event handlers, SQL and shell/template
/// injection markers, and links to executables
pub fn dangerous_patterns() -> &'static [DangerousPattern] {
    static PATTERNS: OnceLock<Vec<DangerousPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let executable = EXECUTABLE_EXTENSIONS.join("|");
        let executable_link = format!(
            r#"(?i)/[^\s/?#"'<>]+\.({})(?:$|[?#\s"'<>)])"#,
            executable
        );
        let table: Vec<(&'static str, IssueType, String)> = vec![
            ("script tag", IssueType::Xss, r"(?is)<\s*script\b".to_string()),
            ("javascript URI", IssueType::Xss, r"(?i)javascript\s*:".to_string()),
            ("vbscript URI", IssueType::Xss, r"(?i)vbscript\s*:".to_string()),
            ("HTML data URI", IssueType::Xss, r"(?i)data\s*:\s*text/html".to_string()),
            (
                "inline event handler",
                IssueType::Xss,
                r#"(?i)<[^>]*\son[a-z]+\s*="#.to_string(),
            ),
            (
                "embedded frame",
                IssueType::Xss,
                r"(?i)<\s*(iframe|object|embed)\b".to_string(),
            ),
            (
                "SQL injection",
                IssueType::Injection,
                r"(?i)\b(union\s+(all\s+)?select|drop\s+(table|database)|delete\s+from|insert\s+into|truncate\s+table)\b".to_string(),
            ),
            (
                "SQL tautology",
                IssueType::Injection,
                r#"(?i)['"]\s*or\s+['"]?1['"]?\s*=\s*['"]?1"#.to_string(),
            ),
            ("shell substitution", IssueType::Injection, r"\$\([^)]*\)".to_string()),
            ("template expression", IssueType::Injection, r"\$\{[^}]*\}".to_string()),
            ("server template tag", IssueType::Injection, r"(?s)<%.*?%>".to_string()),
            ("executable link", IssueType::Injection, executable_link),
        ];
        table
            .into_iter()
            .filter_map(|(name, issue_type, source)| {
                compile(&source).map(|regex| DangerousPattern {
                    name,
                    issue_type,
                    regex,
                })
            })
            .collect()
    })
}

/// Word-boundary matchers for `SUSPICIOUS_KEYWORDS`
pub fn suspicious_keywords() -> &'static [KeywordPattern] {
    static KEYWORDS: OnceLock<Vec<KeywordPattern>> = OnceLock::new();
    KEYWORDS.get_or_init(|| {
        SUSPICIOUS_KEYWORDS
            .iter()
            .copied()
            .filter_map(|keyword| {
                compile(&format!(r"\b{}\b", regex_lite::escape(keyword)))
                    .map(|regex| KeywordPattern { keyword, regex })
            })
            .collect()
    })
}

/// Dangerous constructs in custom CSS
pub fn css_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            ("CSS expression()", r"(?i)expression\s*\("),
            ("CSS @import", r"(?i)@import\b"),
            ("embedded base64 data URI", r#"(?i)url\s*\(\s*['"]?\s*data:[^)]*;base64"#),
            ("IE behavior", r"(?i)behavior\s*:"),
            ("XBL binding", r"(?i)-moz-binding\s*:"),
            ("javascript URI", r"(?i)javascript\s*:"),
        ]
        .into_iter()
        .filter_map(|(name, source)| compile(source).map(|regex| (name, regex)))
        .collect()
    })
}

/// Absolute URLs with any scheme
pub fn url_regex() -> Option<&'static Regex> {
    static URL: OnceLock<Option<Regex>> = OnceLock::new();
    URL.get_or_init(|| compile(r#"(?i)\b[a-z][a-z0-9+.\-]*://[^\s"'<>()]+"#))
        .as_ref()
}

/// Long base64-looking runs
pub fn base64_regex() -> Option<&'static Regex> {
    static BASE64: OnceLock<Option<Regex>> = OnceLock::new();
    BASE64
        .get_or_init(|| compile(r"[A-Za-z0-9+/]{40,}={0,2}"))
        .as_ref()
}

/// Unicode/hex escapes and dynamic-evaluation markers
pub fn obfuscation_regex() -> Option<&'static Regex> {
    static OBFUSCATION: OnceLock<Option<Regex>> = OnceLock::new();
    OBFUSCATION
        .get_or_init(|| {
            compile(r"(?i)(\\u[0-9a-f]{4}|\\x[0-9a-f]{2}|\beval\s*\(|new\s+Function\s*\(|\batob\s*\(|String\.fromCharCode)")
        })
        .as_ref()
}

/// Whether a URL path ends in an executable file extension
pub fn has_executable_extension(path: &str) -> bool {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => EXECUTABLE_EXTENSIONS
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(ext)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tables_compile() {
        assert_eq!(dangerous_patterns().len(), 12);
        assert_eq!(suspicious_keywords().len(), SUSPICIOUS_KEYWORDS.len());
        assert_eq!(css_patterns().len(), 6);
        assert!(url_regex().is_some());
        assert!(base64_regex().is_some());
        assert!(obfuscation_regex().is_some());
    }

    fn matching(text: &str) -> Vec<&'static str> {
        dangerous_patterns()
            .iter()
            .filter(|p| p.regex.is_match(text))
            .map(|p| p.name)
            .collect()
    }

    #[test]
    fn test_dangerous_patterns() {
        assert_eq!(matching("<SCRIPT>alert(1)</SCRIPT>"), vec!["script tag"]);
        assert_eq!(matching(r#"<img src="x" onerror="go()">"#), vec!["inline event handler"]);
        assert_eq!(matching("1' OR '1'='1"), vec!["SQL tautology"]);
        assert_eq!(matching("x; DROP TABLE users"), vec!["SQL injection"]);
        assert_eq!(matching("Hello ${user.name}"), vec!["template expression"]);
        assert!(matching("Download https://evil.test/setup.exe now").contains(&"executable link"));
        assert!(matching("<p>A plain paragraph about union members.</p>").is_empty());
    }

    #[test]
    fn test_keyword_word_boundaries() {
        let hits = |text: &str| -> Vec<&'static str> {
            suspicious_keywords()
                .iter()
                .filter(|k| k.regex.is_match(text))
                .map(|k| k.keyword)
                .collect()
        };
        assert_eq!(hits("We fetch fresh coffee daily"), vec!["fetch"]);
        assert!(hits("Retrieval and prefetching").is_empty());
        assert_eq!(hits("call document.write here"), vec!["document.write"]);
    }

    #[test]
    fn test_executable_extension() {
        assert!(has_executable_extension("/downloads/setup.EXE"));
        assert!(has_executable_extension("/run.ps1"));
        assert!(!has_executable_extension("/images/hero.png"));
        assert!(!has_executable_extension("/.exe"));
        assert!(!has_executable_extension("/"));
    }
}
