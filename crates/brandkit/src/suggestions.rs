//! Non-binding design suggestions attached to applied sections

use crate::Brandkit;
use page_model::SectionType;

/// WCAG AA contrast ratio for normal text
pub const MIN_CONTRAST_SCORE: f64 = 4.5;

/// Fixed hints for a section type
pub fn section_suggestions(section_type: &SectionType) -> &'static [&'static str] {
    match section_type {
        SectionType::Hero => &[
            "Ensure the call-to-action button contrasts with the hero background",
            "Keep the headline short enough to fit on one line on mobile",
        ],
        SectionType::ContactForm => &[
            "Add validation styling for required and invalid fields",
            "Use the brand focus color on active inputs",
        ],
        SectionType::Newsletter => &["Keep the signup form to a single email field"],
        SectionType::Cta | SectionType::ButtonGroup => &[
            "Use the primary button variant for the main action only",
        ],
        SectionType::Pricing => &["Highlight the recommended plan with the accent palette"],
        SectionType::Testimonials => &["Pair quotes with author photos for credibility"],
        SectionType::Navigation => &["Limit top-level navigation to seven items"],
        SectionType::Footer => &["Check that footer links meet contrast requirements on dark backgrounds"],
        SectionType::Gallery | SectionType::Image => &["Provide alt text for every image"],
        SectionType::RichText => &["Keep line length between 60 and 80 characters"],
        _ => &[],
    }
}

/// Hints about the brandkit as a whole
pub fn global_suggestions(brandkit: &Brandkit) -> Vec<String> {
    let mut suggestions = Vec::new();
    if let Some(score) = brandkit.accessibility.contrast_score {
        if score < MIN_CONTRAST_SCORE {
            suggestions.push(format!(
                "Brand color contrast ratio {:.2} is below the recommended {}; darken text or lighten backgrounds",
                score, MIN_CONTRAST_SCORE
            ));
        }
    }
    suggestions
}
