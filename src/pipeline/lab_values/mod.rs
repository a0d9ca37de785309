//! Lab value pipeline: normalize OCR text, pull values by keyword window,
//! and classify them against the reference table.

pub mod catalog;
pub mod extractor;
pub mod normalize;
pub mod reference;

pub use catalog::{find_definition, TEST_DEFINITIONS};
pub use extractor::extract_values;
pub use normalize::normalize_text;
pub use reference::{classify, ReferenceError, ReferenceTable};

use crate::models::{ComparisonResult, TestDefinition};

/// Text in, classified results out. `None` when no value was extracted at
/// all; values the reference table has no row for are dropped silently.
pub fn analyze_text(
    raw_text: &str,
    definitions: &[TestDefinition],
    reference: &ReferenceTable,
) -> Option<Vec<ComparisonResult>> {
    let normalized = normalize_text(raw_text);
    let values = extract_values(&normalized, definitions);
    if values.is_empty() {
        return None;
    }
    Some(reference.compare(&values))
}
