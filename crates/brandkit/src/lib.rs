//! Brandkit - Design tokens and section style composition
//!
//! This crate provides:
//! - The brandkit model: color scales, typography system, spacing scale,
//!   component presets
//! - Section-type role tables (color role, text style, spacing context,
//!   component preset)
//! - `apply_brandkit_to_sections`, which derives styles for whole settings
//!   blocks and reports every change
//! - `SmartStyleApplication`, a per-property merge with responsive scaling
//! - A configurable predicate for "is this value still a default"

mod error;
pub mod color;
pub mod model;
pub mod roles;
pub mod defaults;
pub mod suggestions;
mod engine;
mod smart;

pub use error::*;
pub use color::{BrandColors, Color, ColorScale, Palette, SemanticColors, SHADES};
pub use model::*;
pub use defaults::{DefaultDetector, PlaceholderDefaults};
pub use engine::*;
pub use smart::*;
