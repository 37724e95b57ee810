//! Per-property brandkit application
//!
//! Unlike `apply_brandkit_to_sections`, which replaces whole settings
//! blocks, this pass merges individual properties into a section's style,
//! layout and responsive settings. Each category can be switched off, and
//! responsive overrides are derived only for the target devices.

use crate::defaults::{DefaultDetector, PlaceholderDefaults};
use crate::engine::StyleChange;
use crate::roles::{text_style_for, ColorRole, SpacingContext};
use crate::{Brandkit, Palette, Result};
use page_model::{parse_px, BoxSpacing, Device, PageSection, SectionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmartStyleOptions {
    pub apply_colors: bool,
    pub apply_typography: bool,
    pub apply_spacing: bool,
    pub apply_responsive: bool,
    pub preserve_customizations: bool,
    /// Devices that receive responsive overrides
    pub target_devices: Vec<Device>,
}

impl Default for SmartStyleOptions {
    fn default() -> Self {
        Self {
            apply_colors: true,
            apply_typography: true,
            apply_spacing: true,
            apply_responsive: true,
            preserve_customizations: true,
            target_devices: Device::ALL.to_vec(),
        }
    }
}

impl SmartStyleOptions {
    /// Toggles taken from the kit's smart settings
    pub fn for_brandkit(brandkit: &Brandkit) -> Self {
        let smart = &brandkit.smart_settings;
        Self {
            apply_colors: smart.smart_colors,
            apply_typography: smart.smart_typography,
            apply_spacing: smart.smart_spacing,
            ..Self::default()
        }
    }

    pub fn with_colors(mut self, apply: bool) -> Self {
        self.apply_colors = apply;
        self
    }

    pub fn with_typography(mut self, apply: bool) -> Self {
        self.apply_typography = apply;
        self
    }

    pub fn with_spacing(mut self, apply: bool) -> Self {
        self.apply_spacing = apply;
        self
    }

    pub fn with_responsive(mut self, apply: bool) -> Self {
        self.apply_responsive = apply;
        self
    }

    pub fn with_preserve_customizations(mut self, preserve: bool) -> Self {
        self.preserve_customizations = preserve;
        self
    }

    pub fn with_target_devices(mut self, devices: Vec<Device>) -> Self {
        self.target_devices = devices;
        self
    }
}

/// Merges a brandkit into sections property by property
pub struct SmartStyleApplication<'a, D = PlaceholderDefaults> {
    brandkit: &'a Brandkit,
    options: SmartStyleOptions,
    detector: D,
}

impl<'a> SmartStyleApplication<'a, PlaceholderDefaults> {
    /// Fails if the kit is missing palettes, text styles or spacing steps
    pub fn new(brandkit: &'a Brandkit, options: SmartStyleOptions) -> Result<Self> {
        brandkit.validate()?;
        Ok(Self {
            brandkit,
            options,
            detector: PlaceholderDefaults::default(),
        })
    }
}

impl<'a, D: DefaultDetector> SmartStyleApplication<'a, D> {
    pub fn with_detector<E: DefaultDetector>(self, detector: E) -> SmartStyleApplication<'a, E> {
        SmartStyleApplication {
            brandkit: self.brandkit,
            options: self.options,
            detector,
        }
    }

    pub fn options(&self) -> &SmartStyleOptions {
        &self.options
    }

    /// Merge the kit into `section`, returning the properties that changed
    pub fn apply(&self, section: &mut PageSection) -> Vec<StyleChange> {
        let mut changes = Vec::new();
        if self.options.apply_colors {
            self.apply_colors(section, &mut changes);
        }
        if self.options.apply_typography {
            self.apply_typography(section, &mut changes);
        }
        if self.options.apply_spacing {
            self.apply_spacing(section, &mut changes);
        }
        if self.options.apply_responsive {
            self.apply_responsive(section, &mut changes);
        }
        tracing::debug!(
            "Smart styling of section {} ({}): {} change(s)",
            section.id,
            section.section_type,
            changes.len()
        );
        changes
    }

    pub fn apply_all(&self, sections: &mut [PageSection]) -> Vec<(SectionId, Vec<StyleChange>)> {
        sections
            .iter_mut()
            .map(|section| {
                let changes = self.apply(section);
                (section.id.clone(), changes)
            })
            .collect()
    }

    fn eligible(&self, is_default: bool) -> bool {
        !self.options.preserve_customizations || is_default
    }

    fn apply_colors(&self, section: &mut PageSection, changes: &mut Vec<StyleChange>) {
        let colors = &self.brandkit.colors;
        let Some((background, text)) = ColorRole::for_section(&section.section_type).colors(colors)
        else {
            return;
        };
        let style = &mut section.style_settings;

        if self.eligible(self.detector.is_default_color(style.background_color.as_deref())) {
            set_text(&mut style.background_color, background, "style.backgroundColor", changes);
        }
        if self.eligible(self.detector.is_default_color(style.text_color.as_deref())) {
            set_text(&mut style.text_color, text, "style.textColor", changes);
        }
        if let (Some(border), Some(neutral)) = (style.border.as_mut(), colors.get(Palette::Neutral, 200)) {
            if self.eligible(self.detector.is_default_color(border.color.as_deref())) {
                set_text(&mut border.color, neutral, "style.border.color", changes);
            }
        }
    }

    fn apply_typography(&self, section: &mut PageSection, changes: &mut Vec<StyleChange>) {
        let key = text_style_for(&section.section_type);
        let Some(target) = self.brandkit.typography.resolve(key) else {
            return;
        };
        let typography = section.style_settings.typography.get_or_insert_with(Default::default);

        let font_size_default = self.detector.is_default_font_size(typography.font_size.as_deref());
        for (slot, value, property, is_default) in [
            (&mut typography.font_family, &target.font_family, "fontFamily", None),
            (&mut typography.font_size, &target.font_size, "fontSize", Some(font_size_default)),
            (&mut typography.font_weight, &target.font_weight, "fontWeight", None),
            (&mut typography.line_height, &target.line_height, "lineHeight", None),
            (&mut typography.letter_spacing, &target.letter_spacing, "letterSpacing", None),
        ] {
            let Some(value) = value else { continue };
            if self.eligible(is_default.unwrap_or(slot.is_none())) {
                set_text(slot, value, &format!("style.typography.{}", property), changes);
            }
        }
    }

    fn apply_spacing(&self, section: &mut PageSection, changes: &mut Vec<StyleChange>) {
        let context = SpacingContext::for_section(&section.section_type);
        let Some(spacing) = context.resolve(&self.brandkit.spacing) else {
            return;
        };
        let layout = &mut section.layout_settings;
        self.merge_box(&mut layout.padding, &spacing.padding, "layout.padding", changes);
        if let Some(margin) = &spacing.margin {
            self.merge_box(&mut layout.margin, margin, "layout.margin", changes);
        }
    }

    fn merge_box(
        &self,
        slot: &mut Option<BoxSpacing>,
        target: &BoxSpacing,
        prefix: &str,
        changes: &mut Vec<StyleChange>,
    ) {
        let spacing = slot.get_or_insert_with(BoxSpacing::default);
        for (side, current, value) in [
            ("top", &mut spacing.top, &target.top),
            ("right", &mut spacing.right, &target.right),
            ("bottom", &mut spacing.bottom, &target.bottom),
            ("left", &mut spacing.left, &target.left),
        ] {
            let Some(value) = value else { continue };
            let is_default = current
                .as_deref()
                .map_or(true, |v| v.trim().is_empty() || parse_px(v) == Some(0.0));
            if self.eligible(is_default) {
                set_text(current, value, &format!("{}.{}", prefix, side), changes);
            }
        }
    }

    fn apply_responsive(&self, section: &mut PageSection, changes: &mut Vec<StyleChange>) {
        // Device font sizes always derive from the brandkit body size
        let base_font = self.brandkit.typography.base_font_size;
        let base_padding = section
            .layout_settings
            .padding
            .as_ref()
            .and_then(|p| p.top.as_deref())
            .and_then(parse_px)
            .or_else(|| {
                SpacingContext::for_section(&section.section_type).vertical_px(&self.brandkit.spacing)
            });
        let base_margin = section
            .layout_settings
            .margin
            .as_ref()
            .and_then(|m| m.bottom.as_deref())
            .and_then(parse_px);

        let mut seen = Vec::new();
        for &device in &self.options.target_devices {
            if seen.contains(&device) {
                continue;
            }
            seen.push(device);

            let current = section.responsive_settings.get(device).cloned().unwrap_or_default();
            let mut updated = current.clone();
            for (slot, base, property) in [
                (&mut updated.font_size, Some(base_font), "fontSize"),
                (&mut updated.padding, base_padding, "padding"),
                (&mut updated.margin, base_margin, "margin"),
            ] {
                let Some(base) = base else { continue };
                if self.eligible(slot.is_none()) {
                    let value = scale_for_device(base, device);
                    if *slot != Some(value) {
                        changes.push(StyleChange::new(
                            format!("responsive.{}.{}", device, property),
                            slot.map(Value::from),
                            Value::from(value),
                        ));
                        *slot = Some(value);
                    }
                }
            }
            if updated != current {
                *section.responsive_settings.entry(device) = updated;
            }
        }
    }
}

/// Scale a pixel length for `device`, rounded to whole pixels
pub fn scale_for_device(px: f64, device: Device) -> f64 {
    (px * device.scale_factor()).round()
}

fn set_text(slot: &mut Option<String>, value: &str, property: &str, changes: &mut Vec<StyleChange>) {
    if slot.as_deref() == Some(value) {
        return;
    }
    changes.push(StyleChange::new(property, slot.take().map(Value::from), Value::from(value)));
    *slot = Some(value.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_model::{
        BorderSettings, DeviceOverrides, LayoutSettings, SectionType, StyleSettings,
        TypographySettings,
    };
    use proptest::prelude::*;

    fn kit() -> Brandkit {
        Brandkit::starter("Acme")
    }

    #[test]
    fn test_mobile_font_size_scales_from_base() {
        let kit = kit();
        let options = SmartStyleOptions::default()
            .with_colors(false)
            .with_typography(false)
            .with_spacing(false)
            .with_target_devices(vec![Device::Mobile]);
        let smart = SmartStyleApplication::new(&kit, options).unwrap();

        let mut section = PageSection::new(SectionType::RichText, 0);
        let changes = smart.apply(&mut section);

        let mobile = section.responsive_settings.get(Device::Mobile).unwrap();
        assert_eq!(mobile.font_size, Some(14.0));
        assert!(section.responsive_settings.get(Device::Tablet).is_none());
        assert!(changes.iter().any(|c| c.property == "responsive.mobile.fontSize"));
    }

    #[test]
    fn test_hero_mobile_font_size_ignores_heading_size() {
        let kit = kit();
        let options = SmartStyleOptions::default().with_target_devices(vec![Device::Mobile]);
        let smart = SmartStyleApplication::new(&kit, options).unwrap();

        let mut section = PageSection::new(SectionType::Hero, 0);
        smart.apply(&mut section);

        let typography = section.style_settings.typography.as_ref().unwrap();
        assert_eq!(typography.font_size.as_deref(), Some("48px"));
        let mobile = section.responsive_settings.get(Device::Mobile).unwrap();
        assert_eq!(mobile.font_size, Some(14.0));
    }

    #[test]
    fn test_non_finite_padding_falls_back_to_context() {
        let kit = kit();
        let options = SmartStyleOptions::default()
            .with_colors(false)
            .with_typography(false)
            .with_spacing(false)
            .with_target_devices(vec![Device::Mobile]);
        let smart = SmartStyleApplication::new(&kit, options).unwrap();

        let mut section = PageSection::new(SectionType::RichText, 0);
        section.layout_settings.padding = Some(BoxSpacing {
            top: Some("NaN".to_string()),
            ..BoxSpacing::default()
        });
        let changes = smart.apply(&mut section);

        // Content sections use 48px vertical padding
        let mobile = section.responsive_settings.get(Device::Mobile).unwrap();
        assert_eq!(mobile.padding, Some(42.0));
        assert!(changes.iter().all(|c| !c.value.is_null()));
    }

    #[test]
    fn test_all_devices() {
        let kit = kit();
        let smart = SmartStyleApplication::new(&kit, SmartStyleOptions::default()).unwrap();
        let mut section = PageSection::new(SectionType::Hero, 0);
        smart.apply(&mut section);

        // Font sizes scale from the 16px base, padding from the 96px hero padding
        let responsive = &section.responsive_settings;
        assert_eq!(responsive.get(Device::Mobile).unwrap().font_size, Some(14.0));
        assert_eq!(responsive.get(Device::Tablet).unwrap().font_size, Some(15.0));
        assert_eq!(responsive.get(Device::Desktop).unwrap().font_size, Some(16.0));
        assert_eq!(responsive.get(Device::Mobile).unwrap().padding, Some(84.0));
        assert_eq!(responsive.get(Device::Mobile).unwrap().margin, None);
    }

    #[test]
    fn test_existing_override_is_preserved() {
        let kit = kit();
        let mut section = PageSection::new(SectionType::RichText, 0);
        *section.responsive_settings.entry(Device::Mobile) = DeviceOverrides {
            font_size: Some(20.0),
            ..DeviceOverrides::default()
        };

        let options = SmartStyleOptions::default().with_target_devices(vec![Device::Mobile]);
        let smart = SmartStyleApplication::new(&kit, options.clone()).unwrap();
        smart.apply(&mut section);
        assert_eq!(section.responsive_settings.get(Device::Mobile).unwrap().font_size, Some(20.0));

        let forced =
            SmartStyleApplication::new(&kit, options.with_preserve_customizations(false)).unwrap();
        forced.apply(&mut section);
        assert_eq!(section.responsive_settings.get(Device::Mobile).unwrap().font_size, Some(14.0));
    }

    #[test]
    fn test_per_property_typography_merge() {
        let kit = kit();
        let mut section = PageSection::new(SectionType::RichText, 0).with_style(StyleSettings {
            typography: Some(TypographySettings {
                font_family: Some("Georgia, serif".to_string()),
                font_size: Some("16px".to_string()),
                ..TypographySettings::default()
            }),
            ..StyleSettings::default()
        });
        let options = SmartStyleOptions::default().with_responsive(false);
        let changes = SmartStyleApplication::new(&kit, options).unwrap().apply(&mut section);

        let typography = section.style_settings.typography.as_ref().unwrap();
        assert_eq!(typography.font_family.as_deref(), Some("Georgia, serif"));
        assert_eq!(typography.font_weight.as_deref(), Some("400"));
        assert_eq!(typography.line_height.as_deref(), Some("1.6"));
        // 16px counts as a default; the body style is also 16px
        assert!(!changes.iter().any(|c| c.property == "style.typography.fontSize"));
        assert!(!changes.iter().any(|c| c.property == "style.typography.fontFamily"));
    }

    #[test]
    fn test_per_side_spacing_merge() {
        let kit = kit();
        let mut section = PageSection::new(SectionType::Hero, 0).with_layout(LayoutSettings {
            padding: Some(BoxSpacing {
                top: Some("120px".to_string()),
                left: Some("0".to_string()),
                ..BoxSpacing::default()
            }),
            ..LayoutSettings::default()
        });
        let options = SmartStyleOptions::default().with_responsive(false);
        SmartStyleApplication::new(&kit, options).unwrap().apply(&mut section);

        let padding = section.layout_settings.padding.unwrap();
        assert_eq!(padding.top.as_deref(), Some("120px"));
        assert_eq!(padding.bottom.as_deref(), Some("96px"));
        assert_eq!(padding.left.as_deref(), Some("32px"));
        assert_eq!(padding.right.as_deref(), Some("32px"));
    }

    #[test]
    fn test_colors_and_toggles() {
        let kit = kit();
        let mut section = PageSection::new(SectionType::Pricing, 0).with_style(StyleSettings {
            text_color: Some("#222222".to_string()),
            border: Some(BorderSettings {
                width: Some("1px".to_string()),
                color: Some("black".to_string()),
                ..BorderSettings::default()
            }),
            ..StyleSettings::default()
        });

        let none = SmartStyleOptions::default()
            .with_colors(false)
            .with_typography(false)
            .with_spacing(false)
            .with_responsive(false);
        let untouched = section.clone();
        assert!(SmartStyleApplication::new(&kit, none).unwrap().apply(&mut section).is_empty());
        assert_eq!(section, untouched);

        let colors_only = SmartStyleOptions::default()
            .with_typography(false)
            .with_spacing(false)
            .with_responsive(false);
        let changes = SmartStyleApplication::new(&kit, colors_only).unwrap().apply(&mut section);
        let style = &section.style_settings;
        assert_eq!(style.background_color.as_deref(), kit.colors.accent.shade(50));
        assert_eq!(style.text_color.as_deref(), Some("#222222"));
        assert_eq!(
            style.border.as_ref().unwrap().color.as_deref(),
            kit.colors.neutral.shade(200)
        );
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn test_custom_detector_and_options_from_kit() {
        let mut kit = kit();
        kit.smart_settings.smart_colors = false;
        let options = SmartStyleOptions::for_brandkit(&kit);
        assert!(!options.apply_colors);
        assert!(options.apply_spacing);

        let smart = SmartStyleApplication::new(&kit, SmartStyleOptions::default())
            .unwrap()
            .with_detector(PlaceholderDefaults::none());
        let mut section = PageSection::new(SectionType::Hero, 0).with_style(StyleSettings {
            background_color: Some("#ffffff".to_string()),
            ..StyleSettings::default()
        });
        smart.apply(&mut section);
        assert_eq!(section.style_settings.background_color.as_deref(), Some("#ffffff"));
    }

    #[test]
    fn test_apply_all_keeps_order() {
        let kit = kit();
        let smart = SmartStyleApplication::new(&kit, SmartStyleOptions::default()).unwrap();
        let mut sections = vec![
            PageSection::new(SectionType::Hero, 0),
            PageSection::new(SectionType::Footer, 1),
        ];
        let ids: Vec<_> = sections.iter().map(|s| s.id.clone()).collect();
        let results = smart.apply_all(&mut sections);
        assert_eq!(results.iter().map(|(id, _)| id.clone()).collect::<Vec<_>>(), ids);
        assert!(results.iter().all(|(_, changes)| !changes.is_empty()));
    }

    fn any_device() -> impl Strategy<Value = Device> {
        prop_oneof![Just(Device::Mobile), Just(Device::Tablet), Just(Device::Desktop)]
    }

    proptest! {
        #[test]
        fn prop_scaled_sizes_are_whole_pixels(base in 1u32..200, device in any_device()) {
            let scaled = scale_for_device(f64::from(base), device);
            prop_assert_eq!(scaled.fract(), 0.0);
            prop_assert!(scaled <= f64::from(base));
        }

        #[test]
        fn prop_smaller_devices_never_get_larger_text(base in 1u32..200) {
            let base = f64::from(base);
            let mobile = scale_for_device(base, Device::Mobile);
            let tablet = scale_for_device(base, Device::Tablet);
            let desktop = scale_for_device(base, Device::Desktop);
            prop_assert!(mobile <= tablet && tablet <= desktop);
            prop_assert_eq!(desktop, base);
        }
    }
}
