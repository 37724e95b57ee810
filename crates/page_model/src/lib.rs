//! Page Model - Templates, page sections and their settings
//!
//! This crate provides the shared data model for the page builder:
//! templates bundling ordered sections, per-language section translations,
//! binary assets, and the typed settings bags (layout, style, responsive,
//! animation, custom) that the styling and packaging engines operate on.

mod error;
mod section_id;
mod asset;
pub mod settings;
pub mod section;
pub mod template;

pub use error::*;
pub use section_id::*;
pub use asset::*;
pub use settings::*;
pub use section::*;
pub use template::*;
