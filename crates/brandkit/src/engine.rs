//! Applying a brandkit to a list of sections
//!
//! Every section is processed independently. For each one the engine
//! resolves colors, typography, spacing (when the kit enables smart spacing)
//! and component presets from the section type, then attaches suggestions.
//! The input sections are never modified; the result carries updated copies
//! plus a report listing every property that changed or was kept.

use crate::defaults::{DefaultDetector, PlaceholderDefaults};
use crate::roles::{component_for, text_style_for, ColorRole, SpacingContext};
use crate::suggestions::{global_suggestions, section_suggestions};
use crate::{Brandkit, Result};
use page_model::{PageSection, SectionId, SectionType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One property rewritten by a styling pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleChange {
    /// Dotted property path, e.g. `style.backgroundColor`
    pub property: String,
    pub previous: Option<Value>,
    pub value: Value,
}

impl StyleChange {
    pub fn new(property: impl Into<String>, previous: Option<Value>, value: Value) -> Self {
        Self {
            property: property.into(),
            previous,
            value,
        }
    }
}

/// What happened to one section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionReport {
    pub section_id: SectionId,
    pub block_type: SectionType,
    pub changes: Vec<StyleChange>,
    /// Properties left alone because they carry customized values
    pub preserved: Vec<String>,
    pub suggestions: Vec<String>,
}

impl SectionReport {
    fn new(section: &PageSection) -> Self {
        Self {
            section_id: section.id.clone(),
            block_type: section.section_type.clone(),
            changes: Vec::new(),
            preserved: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn changed(&self, property: &str) -> bool {
        self.changes.iter().any(|c| c.property == property)
    }
}

/// Result of `apply_brandkit_to_sections`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandkitApplication {
    /// Updated copies, in input order
    pub sections: Vec<PageSection>,
    /// One report per section, in input order
    pub reports: Vec<SectionReport>,
    pub global_suggestions: Vec<String>,
}

impl BrandkitApplication {
    pub fn change_count(&self) -> usize {
        self.reports.iter().map(|r| r.changes.len()).sum()
    }

    pub fn report(&self, id: &SectionId) -> Option<&SectionReport> {
        self.reports.iter().find(|r| &r.section_id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandkitOptions {
    /// Keep existing values unless the detector reports them as defaults
    pub preserve_customizations: bool,
}

impl Default for BrandkitOptions {
    fn default() -> Self {
        Self {
            preserve_customizations: true,
        }
    }
}

impl BrandkitOptions {
    pub fn with_preserve_customizations(mut self, preserve: bool) -> Self {
        self.preserve_customizations = preserve;
        self
    }
}

/// Apply `brandkit` using the placeholder-list default detector
pub fn apply_brandkit_to_sections(
    sections: &[PageSection],
    brandkit: &Brandkit,
    options: &BrandkitOptions,
) -> Result<BrandkitApplication> {
    apply_brandkit_with(sections, brandkit, options, &PlaceholderDefaults::default())
}

/// Apply `brandkit` with a caller-supplied default detector
pub fn apply_brandkit_with<D>(
    sections: &[PageSection],
    brandkit: &Brandkit,
    options: &BrandkitOptions,
    detector: &D,
) -> Result<BrandkitApplication>
where
    D: DefaultDetector + ?Sized,
{
    brandkit.validate()?;

    let mut updated = Vec::with_capacity(sections.len());
    let mut reports = Vec::with_capacity(sections.len());
    for section in sections {
        let mut section = section.clone();
        let report = apply_to_section(&mut section, brandkit, options, detector)?;
        tracing::debug!(
            "Brandkit {:?} on section {} ({}): {} change(s), {} preserved",
            brandkit.name,
            report.section_id,
            report.block_type,
            report.changes.len(),
            report.preserved.len()
        );
        updated.push(section);
        reports.push(report);
    }

    Ok(BrandkitApplication {
        sections: updated,
        reports,
        global_suggestions: global_suggestions(brandkit),
    })
}

fn apply_to_section<D>(
    section: &mut PageSection,
    brandkit: &Brandkit,
    options: &BrandkitOptions,
    detector: &D,
) -> Result<SectionReport>
where
    D: DefaultDetector + ?Sized,
{
    let mut report = SectionReport::new(section);
    let preserve = options.preserve_customizations;
    let section_type = section.section_type.clone();

    if let Some((background, text)) = ColorRole::for_section(&section_type).colors(&brandkit.colors) {
        let style = &mut section.style_settings;
        for (slot, value, property) in [
            (&mut style.background_color, background, "style.backgroundColor"),
            (&mut style.text_color, text, "style.textColor"),
        ] {
            if !preserve || detector.is_default_color(slot.as_deref()) {
                replace(slot, value.to_string(), property, &mut report)?;
            } else {
                report.preserved.push(property.to_string());
            }
        }
    }

    if let Some(typography) = brandkit.typography.resolve(text_style_for(&section_type)) {
        let slot = &mut section.style_settings.typography;
        if !preserve || detector.is_default_typography(slot.as_ref()) {
            replace(slot, typography, "style.typography", &mut report)?;
        } else {
            report.preserved.push("style.typography".to_string());
        }
    }

    if brandkit.smart_settings.smart_spacing {
        if let Some(spacing) = SpacingContext::for_section(&section_type).resolve(&brandkit.spacing) {
            let layout = &mut section.layout_settings;
            if !preserve || detector.is_default_spacing(layout) {
                replace(&mut layout.padding, spacing.padding, "layout.padding", &mut report)?;
                if let Some(margin) = spacing.margin {
                    replace(&mut layout.margin, margin, "layout.margin", &mut report)?;
                }
            } else {
                report.preserved.push("layout.padding".to_string());
            }
        }
    }

    if let Some((group, name)) = component_for(&section_type) {
        match brandkit.components.get(group, name) {
            Some(preset) => {
                let slot = &mut section.style_settings.component_style;
                if !preserve || slot.is_none() {
                    replace(slot, preset.clone(), "style.componentStyle", &mut report)?;
                } else {
                    report.preserved.push("style.componentStyle".to_string());
                }
            }
            None => tracing::debug!("Brandkit {:?} has no {:?} preset {:?}", brandkit.name, group, name),
        }
    }

    report.suggestions = section_suggestions(&section_type)
        .iter()
        .map(|s| s.to_string())
        .collect();
    Ok(report)
}

/// Store `value` in `slot`, recording a change if it differs
fn replace<T>(slot: &mut Option<T>, value: T, property: &str, report: &mut SectionReport) -> Result<()>
where
    T: Serialize + PartialEq,
{
    if slot.as_ref() == Some(&value) {
        return Ok(());
    }
    let previous = slot.as_ref().map(serde_json::to_value).transpose()?;
    report
        .changes
        .push(StyleChange::new(property, previous, serde_json::to_value(&value)?));
    *slot = Some(value);
    Ok(())
}
