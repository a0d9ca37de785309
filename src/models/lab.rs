use serde::{Deserialize, Serialize};

use super::enums::TestStatus;

/// A known lab test: OCR keywords, the range a printed value must fall in to
/// be believed, and an optional test-specific value pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct TestDefinition {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub plausible_range: (f64, f64),
    pub special_pattern: Option<&'static str>,
}

impl TestDefinition {
    pub fn is_plausible(&self, value: f64) -> bool {
        let (min, max) = self.plausible_range;
        min <= value && value <= max
    }

    pub fn is_urine(&self) -> bool {
        self.name.starts_with("Urine_")
    }
}

/// One value pulled out of report text. At most one per test per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedValue {
    pub test: String,
    pub value: f64,
}

/// A row of the reference table, keyed by test name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRow {
    #[serde(rename = "Test_Name")]
    pub test_name: String,
    #[serde(rename = "Min_Value")]
    pub min: f64,
    #[serde(rename = "Max_Value")]
    pub max: f64,
    #[serde(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Description")]
    pub description: String,
}

/// Results posted back by clients (chat, doctor suggestions) may omit the
/// cosmetic fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub test: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub unit: String,
    pub status: TestStatus,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
}

impl ComparisonResult {
    /// Display name with underscores replaced, as shown on chart axes.
    pub fn display_name(&self) -> String {
        self.test.replace('_', " ")
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}
