//! Error types for page model operations

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PageModelError {
    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Invalid rating: {0} (expected 1-5)")]
    InvalidRating(u8),

    #[error("Invalid version string: {0}")]
    InvalidVersion(String),
}

pub type Result<T> = std::result::Result<T, PageModelError>;
