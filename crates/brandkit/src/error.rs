//! Error types for brandkit operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrandkitError {
    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid color value: {0}")]
    InvalidColor(String),

    /// A palette lacks one of the eleven shades
    #[error("Palette {palette} is missing shade {shade}")]
    MissingShade { palette: String, shade: u16 },

    #[error("Typography system has no text style {0}")]
    MissingTextStyle(String),

    #[error("Spacing scale has no step {0}")]
    MissingSpacingStep(String),
}

pub type Result<T> = std::result::Result<T, BrandkitError>;
