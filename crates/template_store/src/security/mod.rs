//! Template security scanning
//!
//! - Pattern-based content scanning with severity-ranked findings
//! - Structural validation of template data and manifests
//! - Level-based sanitization of untrusted imported content

mod report;
pub mod patterns;
mod validator;
mod sanitizer;

pub use report::*;
pub use validator::*;
pub use sanitizer::*;
