//! Template packaging system
//!
//! This module provides:
//! - Template archive format (ZIP with manifest.json + template.json)
//! - Named-entry containers (ZIP-backed and in-memory)
//! - Asset fetching for export
//! - Export, import, preview and collection bundles
//! - A directory-backed template library

mod error;
mod manifest;
mod container;
mod fetch;
mod package;
mod collection;
mod library;


pub use error::*;
pub use manifest::*;
pub use container::*;
pub use fetch::*;
pub use package::*;
pub use collection::*;
pub use library::*;
