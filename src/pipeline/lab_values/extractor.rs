//! Keyword-window value extraction.
//!
//! For every definition, keywords are tried in order. The first occurrence of
//! a keyword opens a fixed window of text, and the resolver looks for a value
//! inside it. A keyword whose window yields nothing hands over to the next
//! keyword of the same test.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::catalog::TEST_DEFINITIONS;
use crate::models::{ExtractedValue, TestDefinition};

/// Characters of context taken from the start of a keyword match.
pub const WINDOW_CHARS: usize = 100;

/// Words that mean "nothing found" on urinalysis reports. Checked as
/// substrings, so OCR fragments like "sen" (from "absent") also count.
pub const NEGATIVE_LEXICON: &[&str] = &[
    "nil", "negative", "absent", "neg", "sen", "eon", "not seen", "no", "none", "trace", "clear",
    "normal",
];

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+\.?\d*)\b").expect("valid number regex"));
static HPF_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*-\s*(\d+)\s*/?\s*hpf").expect("valid hpf range regex")
});
static HPF_SINGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*/?\s*hpf").expect("valid hpf regex"));

/// Catalog special patterns, compiled once and keyed by pattern text.
static SPECIAL_PATTERNS: LazyLock<HashMap<&'static str, Regex>> = LazyLock::new(|| {
    TEST_DEFINITIONS
        .iter()
        .filter_map(|def| def.special_pattern)
        .filter_map(|pattern| Regex::new(pattern).ok().map(|re| (pattern, re)))
        .collect()
});

/// Extract at most one value per definition from normalized (lower-cased) text.
pub fn extract_values(text: &str, definitions: &[TestDefinition]) -> Vec<ExtractedValue> {
    let mut values = Vec::new();

    for def in definitions {
        let special = def.special_pattern.and_then(|p| special_regex(def.name, p));

        for keyword in def.keywords {
            let Some(idx) = text.find(keyword) else {
                continue;
            };
            let context = window(text, idx);
            if let Some(value) = resolve(def, special.as_deref(), context) {
                tracing::debug!(test = def.name, keyword, value, "Extracted lab value");
                values.push(ExtractedValue {
                    test: def.name.to_string(),
                    value,
                });
                break;
            }
        }
    }

    values
}

/// Cached regex for catalog patterns; anything else is compiled on the spot.
fn special_regex(test: &str, pattern: &'static str) -> Option<Cow<'static, Regex>> {
    if let Some(re) = SPECIAL_PATTERNS.get(pattern) {
        return Some(Cow::Borrowed(re));
    }
    match Regex::new(pattern) {
        Ok(re) => Some(Cow::Owned(re)),
        Err(e) => {
            tracing::warn!(test, error = %e, "Invalid special pattern, skipping");
            None
        }
    }
}

/// `WINDOW_CHARS` characters starting at byte offset `start`.
fn window(text: &str, start: usize) -> &str {
    let rest = &text[start..];
    let end = rest
        .char_indices()
        .nth(WINDOW_CHARS)
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    &rest[..end]
}

/// First success wins: special pattern, plausible number, then (urine only)
/// the negative lexicon and the `/hpf` microscopy forms.
fn resolve(def: &TestDefinition, special: Option<&Regex>, context: &str) -> Option<f64> {
    if let Some(re) = special {
        let value = re
            .find(context)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|v| def.is_plausible(*v));
        if value.is_some() {
            return value;
        }
    }

    let number = NUMBER_RE
        .captures_iter(context)
        .filter_map(|c| c[1].parse::<f64>().ok())
        .find(|v| def.is_plausible(*v));
    if number.is_some() {
        return number;
    }

    if !def.is_urine() {
        return None;
    }

    if NEGATIVE_LEXICON.iter().any(|word| context.contains(word)) {
        return Some(0.0);
    }

    hpf_value(context).filter(|v| def.is_plausible(*v))
}

/// `N-M /hpf` averages the range; otherwise a single `N /hpf`.
fn hpf_value(context: &str) -> Option<f64> {
    if let Some(caps) = HPF_RANGE_RE.captures(context) {
        if let (Ok(low), Ok(high)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) {
            return Some((f64::from(low) + f64::from(high)) / 2.0);
        }
    }
    HPF_SINGLE_RE
        .captures(context)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .map(f64::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::lab_values::catalog::TEST_DEFINITIONS;
    use crate::pipeline::lab_values::normalize::normalize_text;

    fn value_of(values: &[ExtractedValue], test: &str) -> Option<f64> {
        values.iter().find(|v| v.test == test).map(|v| v.value)
    }

    fn extract(raw: &str) -> Vec<ExtractedValue> {
        extract_values(&normalize_text(raw), TEST_DEFINITIONS)
    }

    #[test]
    fn hemoglobin_in_range_is_extracted() {
        let values = extract("Hemoglobin 11.2");
        assert_eq!(value_of(&values, "Hemoglobin"), Some(11.2));
    }

    #[test]
    fn implausible_value_is_rejected() {
        let values = extract("hemoglobin 45.2");
        assert_eq!(value_of(&values, "Hemoglobin"), None);
    }

    #[test]
    fn missing_keyword_gives_no_value() {
        let values = extract("patient name and address only");
        assert_eq!(value_of(&values, "Ferritin"), None);
        assert_eq!(value_of(&values, "Hemoglobin"), None);
    }

    #[test]
    fn urine_negative_maps_to_zero() {
        let values = extract("PROTEIN nil");
        assert_eq!(value_of(&values, "Urine_Protein"), Some(0.0));
    }

    #[test]
    fn negative_lexicon_ignored_for_blood_tests() {
        let values = extract("ferritin not seen");
        assert_eq!(value_of(&values, "Ferritin"), None);
    }

    #[test]
    fn specific_gravity_uses_special_pattern() {
        let values = extract("specific gravity 1.025");
        assert_eq!(value_of(&values, "Urine_Specific_Gravity"), Some(1.025));
    }

    #[test]
    fn at_most_one_value_per_test() {
        let values = extract("glucose 95 mg/dl\nfbs 110");
        let count = values.iter().filter(|v| v.test == "Glucose").count();
        assert_eq!(count, 1);
        assert_eq!(value_of(&values, "Glucose"), Some(95.0));
    }

    #[test]
    fn only_first_keyword_occurrence_is_examined() {
        let padding = "x".repeat(WINDOW_CHARS + 20);
        let text = format!("ferritin pending {padding} ferritin 120");
        let values = extract(&text);
        assert_eq!(value_of(&values, "Ferritin"), None);
    }

    #[test]
    fn later_keyword_gets_a_second_chance() {
        let padding = "x".repeat(WINDOW_CHARS + 20);
        let text = format!("hemoglobin: see attached {padding} hgb 13.5");
        let values = extract(&text);
        assert_eq!(value_of(&values, "Hemoglobin"), Some(13.5));
    }

    #[test]
    fn window_is_char_based() {
        let text = format!("é{}", "a".repeat(200));
        assert_eq!(window(&text, 0).chars().count(), WINDOW_CHARS);
        assert_eq!(window("short", 1), "hort");
    }

    #[test]
    fn hpf_range_is_averaged() {
        assert_eq!(hpf_value("pus cells 3-5 /hpf"), Some(4.0));
        assert_eq!(hpf_value("rbc 2 - 3 hpf"), Some(2.5));
        assert_eq!(hpf_value("epithelial 6/hpf"), Some(6.0));
        assert_eq!(hpf_value("no microscopy"), None);
    }

    #[test]
    fn huge_hpf_range_does_not_overflow() {
        let values = extract("pus 3000000000-3000000000 hpf");
        assert_eq!(value_of(&values, "Urine_WBC"), None);
        assert_eq!(hpf_value("4000000000-4000000000 hpf"), Some(4_000_000_000.0));
    }

    #[test]
    fn catalog_patterns_are_precompiled() {
        let pattern = TEST_DEFINITIONS
            .iter()
            .find_map(|d| d.special_pattern)
            .unwrap();
        assert!(matches!(
            special_regex("Urine_Specific_Gravity", pattern),
            Some(Cow::Borrowed(_))
        ));
    }

    #[test]
    fn custom_pattern_is_compiled_on_demand() {
        let defs = [TestDefinition {
            name: "Custom_Ratio",
            keywords: &["ratio"],
            plausible_range: (0.0, 10.0),
            special_pattern: Some(r"\d+\.\d{2}"),
        }];
        assert!(matches!(
            special_regex("Custom_Ratio", r"\d+\.\d{2}"),
            Some(Cow::Owned(_))
        ));
        let values = extract_values("ratio 2.57", &defs);
        assert_eq!(value_of(&values, "Custom_Ratio"), Some(2.57));
        assert!(special_regex("Broken", "(unclosed").is_none());
    }
}
