//! Colors and 11-step color scales

use crate::{BrandkitError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shade steps of every color scale, lightest first
pub const SHADES: [u16; 11] = [50, 100, 200, 300, 400, 500, 600, 700, 800, 900, 950];

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse "#rrggbb", "rrggbb" or the short "#rgb" form
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            6 => Some(Self::rgb(
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            )),
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|d| d * 17);
                Some(Self::rgb(digit(0)?, digit(1)?, digit(2)?))
            }
            _ => None,
        }
    }

    /// Lowercase "#rrggbb"
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Mix with `other`; `ratio` 0.0 keeps self, 1.0 yields other
    pub fn blend(self, other: Color, ratio: f64) -> Color {
        let ratio = ratio.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) * (1.0 - ratio) + f64::from(b) * ratio).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// WCAG relative luminance
    pub fn relative_luminance(&self) -> f64 {
        let channel = |c: u8| {
            let c = f64::from(c) / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }

    /// WCAG contrast ratio, from 1.0 to 21.0
    pub fn contrast_ratio(&self, other: &Color) -> f64 {
        let a = self.relative_luminance();
        let b = other.relative_luminance();
        let (light, dark) = if a > b { (a, b) } else { (b, a) };
        (light + 0.05) / (dark + 0.05)
    }
}

/// Shades of one hue keyed by step (50..950), stored as hex strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorScale(BTreeMap<u16, String>);

impl ColorScale {
    /// Derive a full scale around `base`, which becomes shade 500.
    /// Lighter shades mix toward white, darker shades toward black.
    pub fn from_base(base: Color) -> Self {
        const MIX: [f64; 11] = [0.95, 0.9, 0.75, 0.6, 0.3, 0.0, 0.1, 0.25, 0.4, 0.55, 0.7];
        let shades = SHADES
            .iter()
            .zip(MIX)
            .map(|(&shade, amount)| {
                let color = match shade.cmp(&500) {
                    std::cmp::Ordering::Less => base.blend(Color::WHITE, amount),
                    std::cmp::Ordering::Equal => base,
                    std::cmp::Ordering::Greater => base.blend(Color::BLACK, amount),
                };
                (shade, color.to_hex())
            })
            .collect();
        Self(shades)
    }

    pub fn shade(&self, shade: u16) -> Option<&str> {
        self.0.get(&shade).map(String::as_str)
    }

    pub fn set(&mut self, shade: u16, hex: impl Into<String>) {
        self.0.insert(shade, hex.into());
    }

    /// Check that all eleven shades exist and parse as colors
    pub fn validate(&self, palette: &str) -> Result<()> {
        for shade in SHADES {
            let value = self.shade(shade).ok_or_else(|| BrandkitError::MissingShade {
                palette: palette.to_string(),
                shade,
            })?;
            if Color::from_hex(value).is_none() {
                return Err(BrandkitError::InvalidColor(format!(
                    "{}.{} = {}",
                    palette, shade, value
                )));
            }
        }
        Ok(())
    }
}

/// Named palettes of a brandkit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    Primary,
    Secondary,
    Accent,
    Neutral,
}

impl std::fmt::Display for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Palette::Primary => write!(f, "primary"),
            Palette::Secondary => write!(f, "secondary"),
            Palette::Accent => write!(f, "accent"),
            Palette::Neutral => write!(f, "neutral"),
        }
    }
}

/// Status colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticColors {
    pub success: String,
    pub warning: String,
    pub error: String,
    pub info: String,
}

impl Default for SemanticColors {
    fn default() -> Self {
        Self {
            success: "#16a34a".to_string(),
            warning: "#d97706".to_string(),
            error: "#dc2626".to_string(),
            info: "#2563eb".to_string(),
        }
    }
}

/// The brand color palettes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandColors {
    pub primary: ColorScale,
    pub secondary: ColorScale,
    pub accent: ColorScale,
    pub neutral: ColorScale,
    #[serde(default)]
    pub semantic: SemanticColors,
}

impl BrandColors {
    pub fn palette(&self, palette: Palette) -> &ColorScale {
        match palette {
            Palette::Primary => &self.primary,
            Palette::Secondary => &self.secondary,
            Palette::Accent => &self.accent,
            Palette::Neutral => &self.neutral,
        }
    }

    /// Hex value of `palette`-`shade`
    pub fn get(&self, palette: Palette, shade: u16) -> Option<&str> {
        self.palette(palette).shade(shade)
    }

    pub fn validate(&self) -> Result<()> {
        for palette in [Palette::Primary, Palette::Secondary, Palette::Accent, Palette::Neutral] {
            self.palette(palette).validate(&palette.to_string())?;
        }
        let semantic = &self.semantic;
        for value in [&semantic.success, &semantic.warning, &semantic.error, &semantic.info] {
            if Color::from_hex(value).is_none() {
                return Err(BrandkitError::InvalidColor(value.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(Color::from_hex("FFF"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#12"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
        assert_eq!(Color::rgb(18, 52, 86).to_hex(), "#123456");
    }

    #[test]
    fn test_contrast_ratio_bounds() {
        let ratio = Color::BLACK.contrast_ratio(&Color::WHITE);
        assert!((ratio - 21.0).abs() < 0.01);
        assert!((Color::WHITE.contrast_ratio(&Color::WHITE) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scale_from_base_keeps_base_at_500() {
        let scale = ColorScale::from_base(Color::rgb(37, 99, 235));
        assert_eq!(scale.shade(500), Some("#2563eb"));
        assert!(scale.validate("primary").is_ok());

        let light = Color::from_hex(scale.shade(50).unwrap()).unwrap();
        let dark = Color::from_hex(scale.shade(950).unwrap()).unwrap();
        assert!(light.relative_luminance() > dark.relative_luminance());
    }

    #[test]
    fn test_scale_validation_reports_missing_shade() {
        let mut scale = ColorScale::default();
        scale.set(50, "#ffffff");
        let err = scale.validate("accent").unwrap_err();
        assert!(matches!(err, BrandkitError::MissingShade { shade: 100, .. }));
    }

    #[test]
    fn test_scale_wire_format() {
        let scale = ColorScale::from_base(Color::rgb(0, 0, 0));
        let json = serde_json::to_value(&scale).unwrap();
        assert_eq!(json["500"], "#000000");
    }
}
