//! Specialist referral, urgency and condition tips from abnormal results.

use serde::{Deserialize, Serialize};

use crate::models::{ComparisonResult, Priority, TestStatus, Urgency};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistSuggestion {
    pub name: String,
    pub priority: Priority,
    pub reason_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistRecommendations {
    pub specialists: Vec<SpecialistSuggestion>,
    pub urgency: Urgency,
    pub reasons: Vec<String>,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipCard {
    pub title: String,
    pub tips: Vec<String>,
}

/// Search links for one specialist near a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinderUrls {
    pub google: String,
    pub healthgrades: String,
    pub zocdoc: String,
    pub vitals: String,
}

pub const PRIMARY_CARE: &str = "Primary Care Physician";

const CARDIAC: &[&str] = &[
    "Troponin", "BNP", "NT_proBNP", "CK_MB", "Cholesterol", "LDL", "HDL", "Triglycerides",
];
const RENAL: &[&str] = &["Creatinine", "BUN", "Urea", "Urine_Protein", "Urine_Blood", "Potassium"];
const ENDOCRINE: &[&str] = &[
    "TSH", "T3", "T4", "Free_T3", "Free_T4", "HbA1c", "Glucose", "Insulin",
    "Testosterone_Total", "Estradiol", "Cortisol", "DHEA_S",
];
const HEPATIC: &[&str] = &[
    "ALT", "AST", "Alkaline_Phosphatase", "GGT", "Total_Bilirubin", "Direct_Bilirubin",
    "Albumin", "Total_Protein",
];
const HEMATOLOGIC: &[&str] = &[
    "Hemoglobin", "WBC", "RBC", "Platelets", "Ferritin", "Iron", "TIBC", "MCV", "MCH", "MCHC",
    "RDW",
];
const UROLOGIC: &[&str] = &["PSA", "Urine_WBC", "Urine_RBC", "Urine_Bacteria", "Urine_Nitrite"];
const RHEUMATOLOGIC: &[&str] = &["CRP", "ESR", "Uric_Acid"];
const TUMOUR_MARKERS: &[&str] = &["CEA", "CA_125", "CA_19_9", "AFP", "PSA"];

/// Per-specialist hit counts, kept in first-hit order so ties stay stable.
#[derive(Default)]
struct Scores(Vec<(&'static str, u32)>);

impl Scores {
    fn bump(&mut self, name: &'static str) {
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, score)) => *score += 1,
            None => self.0.push((name, 1)),
        }
    }
}

pub fn recommend(results: &[ComparisonResult]) -> SpecialistRecommendations {
    use TestStatus::*;

    let mut scores = Scores::default();
    let mut urgency = Urgency::Routine;
    let mut reasons: Vec<String> = Vec::new();
    let mut urgent_conditions: Vec<String> = Vec::new();

    for r in results.iter().filter(|r| r.status.is_abnormal()) {
        let test = r.test.as_str();
        let (status, value) = (r.status, r.value);

        if CARDIAC.contains(&test) {
            scores.bump("Cardiologist");
            if test == "Troponin" && status == High {
                urgent_conditions.push("Possible heart attack - EMERGENCY".into());
                urgency = urgency.escalate(Urgency::Emergency);
            } else if matches!(test, "BNP" | "NT_proBNP") && status == High {
                reasons.push("Elevated heart failure markers".into());
            } else if matches!(test, "Cholesterol" | "LDL" | "Triglycerides") && status == High {
                reasons.push("High cardiovascular risk factors".into());
            }
        }

        if RENAL.contains(&test) {
            scores.bump("Nephrologist");
            if test == "Urine_Protein" && status == High {
                reasons.push("Protein in urine - possible kidney disease".into());
            } else if matches!(test, "Creatinine" | "BUN") && status == High {
                reasons.push("Elevated kidney function markers".into());
            }
        }

        if ENDOCRINE.contains(&test) {
            scores.bump("Endocrinologist");
            if test == "HbA1c" && value > 6.5 {
                reasons.push("Diabetes diagnosis - needs management".into());
            } else if matches!(test, "TSH" | "T3" | "T4") {
                reasons.push("Thyroid dysfunction detected".into());
            } else if matches!(test, "Testosterone_Total" | "Estradiol") {
                reasons.push("Hormonal imbalance detected".into());
            }
        }

        if HEPATIC.contains(&test) {
            scores.bump("Hepatologist");
            if matches!(test, "ALT" | "AST") && value > 100.0 {
                reasons.push("Significantly elevated liver enzymes".into());
            } else if test == "Total_Bilirubin" && status == High {
                reasons.push("Elevated bilirubin - possible liver/bile duct issue".into());
            }
        }

        if HEMATOLOGIC.contains(&test) {
            scores.bump("Hematologist");
            if test == "Hemoglobin" && value < 8.0 {
                reasons.push("Severe anemia - needs urgent evaluation".into());
                urgency = urgency.escalate(Urgency::Urgent);
            } else if test == "WBC" && !(2000.0..=20000.0).contains(&value) {
                reasons.push("Abnormal white blood cell count".into());
            } else if test == "Platelets" && value < 50000.0 {
                reasons.push("Low platelet count - bleeding risk".into());
                urgency = urgency.escalate(Urgency::Urgent);
            }
        }

        if UROLOGIC.contains(&test) {
            scores.bump("Urologist");
            if test == "PSA" && value > 4.0 {
                reasons.push("Elevated PSA - prostate evaluation needed".into());
            } else if matches!(test, "Urine_WBC" | "Urine_Bacteria") && status == High {
                reasons.push("Urinary tract infection detected".into());
            }
        }

        if RHEUMATOLOGIC.contains(&test) && status == High {
            scores.bump("Rheumatologist");
            if test == "Uric_Acid" && value > 8.0 {
                reasons.push("High uric acid - gout risk".into());
            } else if matches!(test, "CRP" | "ESR") {
                reasons.push("Elevated inflammation markers".into());
            }
        }

        if TUMOUR_MARKERS.contains(&test) && status == High {
            scores.bump("Oncologist");
            reasons.push(format!("Elevated tumor marker: {test}"));
            urgency = urgency.escalate(Urgency::Urgent);
        }
    }

    let mut ranked = scores.0;
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut specialists: Vec<SpecialistSuggestion> = ranked
        .into_iter()
        .take(3)
        .map(|(name, score)| SpecialistSuggestion {
            name: name.to_string(),
            priority: match score {
                s if s >= 3 => Priority::High,
                2 => Priority::Medium,
                _ => Priority::Low,
            },
            reason_count: score,
        })
        .collect();

    if specialists.is_empty() {
        specialists.push(SpecialistSuggestion {
            name: PRIMARY_CARE.to_string(),
            priority: Priority::Medium,
            reason_count: 1,
        });
        reasons.push("General health consultation recommended".into());
    }

    urgent_conditions.extend(reasons);

    SpecialistRecommendations {
        specialists,
        urgency,
        reasons: urgent_conditions,
        next_steps: next_steps(urgency).iter().map(|s| s.to_string()).collect(),
    }
}

pub fn next_steps(urgency: Urgency) -> &'static [&'static str] {
    match urgency {
        Urgency::Emergency => &[
            "🚨 SEEK EMERGENCY MEDICAL CARE IMMEDIATELY",
            "Call emergency services or go to nearest ER",
            "Do not wait for an appointment",
            "Bring all test results with you",
        ],
        Urgency::Urgent => &[
            "⚠️ Schedule appointment within 24-48 hours",
            "Contact your primary care physician immediately",
            "Explain your test results",
            "Request urgent specialist referral if needed",
        ],
        Urgency::Routine => &[
            "📅 Schedule appointment within 1-2 weeks",
            "Discuss results with your doctor",
            "Get specialist referral if recommended",
            "Follow up on any abnormal findings",
        ],
    }
}

fn specialist_keywords(name: &str) -> &'static [&'static str] {
    match name {
        "Cardiologist" => &["cardiologist", "heart doctor", "cardiovascular specialist"],
        "Nephrologist" => &["nephrologist", "kidney specialist", "renal doctor"],
        "Endocrinologist" => &[
            "endocrinologist", "diabetes doctor", "hormone specialist", "thyroid doctor",
        ],
        "Hepatologist" => &["hepatologist", "liver specialist", "gastroenterologist"],
        "Hematologist" => &["hematologist", "blood specialist", "blood disorder doctor"],
        "Urologist" => &["urologist", "urinary specialist", "prostate doctor"],
        "Rheumatologist" => &["rheumatologist", "arthritis doctor", "autoimmune specialist"],
        "Oncologist" => &["oncologist", "cancer specialist", "cancer doctor"],
        PRIMARY_CARE => &["primary care", "general practitioner", "family doctor", "GP"],
        _ => &[],
    }
}

/// Search phrases for the named specialists, deduplicated in first-seen order.
pub fn search_keywords<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for name in names {
        for kw in specialist_keywords(name) {
            if !keywords.iter().any(|k| k == kw) {
                keywords.push(kw.to_string());
            }
        }
    }
    keywords
}

pub fn finder_urls(specialist: &str, location: &str) -> FinderUrls {
    let near = format!("{specialist} near {location}");
    FinderUrls {
        google: with_query("https://www.google.com/search", &[("q", near.trim())]),
        healthgrades: with_query(
            "https://www.healthgrades.com/search",
            &[("what", specialist), ("where", location)],
        ),
        zocdoc: with_query(
            "https://www.zocdoc.com/search/",
            &[
                ("dr_specialty", ""),
                ("insurance_carrier", ""),
                ("search_query", specialist),
                ("address", location),
            ],
        ),
        vitals: with_query(
            "https://www.vitals.com/search",
            &[("type", "specialty"), ("q", specialist), ("loc", location)],
        ),
    }
}

fn with_query(base: &str, params: &[(&str, &str)]) -> String {
    match reqwest::Url::parse_with_params(base, params) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!(base, error = %e, "Could not build finder URL");
            base.to_string()
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Condition tips
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    HighCholesterol,
    Diabetes,
    KidneyIssues,
    LiverIssues,
    Anemia,
    ThyroidIssues,
    Uti,
}

const CONDITION_ORDER: [Condition; 7] = [
    Condition::HighCholesterol,
    Condition::Diabetes,
    Condition::KidneyIssues,
    Condition::LiverIssues,
    Condition::Anemia,
    Condition::ThyroidIssues,
    Condition::Uti,
];

fn detect(test: &str, status: TestStatus) -> Option<Condition> {
    use TestStatus::*;
    match (test, status) {
        ("Cholesterol" | "LDL" | "Triglycerides", High) => Some(Condition::HighCholesterol),
        ("Glucose" | "HbA1c", High) => Some(Condition::Diabetes),
        ("Creatinine" | "BUN" | "Urine_Protein", High) => Some(Condition::KidneyIssues),
        ("ALT" | "AST" | "GGT", High) => Some(Condition::LiverIssues),
        ("Hemoglobin", Low) => Some(Condition::Anemia),
        ("TSH" | "T4", Low | High) => Some(Condition::ThyroidIssues),
        ("Urine_WBC" | "Urine_Bacteria", High) => Some(Condition::Uti),
        _ => None,
    }
}

impl Condition {
    fn key(self) -> &'static str {
        match self {
            Condition::HighCholesterol => "high_cholesterol",
            Condition::Diabetes => "diabetes",
            Condition::KidneyIssues => "kidney_issues",
            Condition::LiverIssues => "liver_issues",
            Condition::Anemia => "anemia",
            Condition::ThyroidIssues => "thyroid_issues",
            Condition::Uti => "uti",
        }
    }
}

fn detected(results: &[ComparisonResult]) -> Vec<Condition> {
    let found: Vec<Condition> = results
        .iter()
        .filter_map(|r| detect(&r.test, r.status))
        .collect();
    CONDITION_ORDER
        .iter()
        .copied()
        .filter(|c| found.contains(c))
        .collect()
}

/// Condition keys (`high_cholesterol`, `diabetes`, ...) found in the results.
pub fn detected_conditions(results: &[ComparisonResult]) -> Vec<&'static str> {
    detected(results).into_iter().map(Condition::key).collect()
}

fn tip_card(condition: Condition) -> (&'static str, &'static [&'static str]) {
    match condition {
        Condition::HighCholesterol => (
            "💛 Managing High Cholesterol",
            &[
                "Eat more fiber: oats, beans, fruits, vegetables",
                "Choose healthy fats: olive oil, avocados, nuts",
                "Limit saturated fats: red meat, butter, cheese",
                "Exercise 30 minutes daily",
                "Maintain healthy weight",
                "Consider plant sterols supplements",
                "Quit smoking if applicable",
            ],
        ),
        Condition::Diabetes => (
            "🍬 Managing Blood Sugar",
            &[
                "Monitor blood sugar regularly",
                "Eat low glycemic index foods",
                "Control portion sizes",
                "Exercise regularly (150 min/week)",
                "Stay hydrated with water",
                "Avoid sugary drinks and processed foods",
                "Take medications as prescribed",
                "Check feet daily for wounds",
            ],
        ),
        Condition::KidneyIssues => (
            "🫘 Protecting Your Kidneys",
            &[
                "Drink plenty of water (8-10 glasses daily)",
                "Limit sodium intake (<2,300mg/day)",
                "Control blood pressure",
                "Manage blood sugar if diabetic",
                "Avoid NSAIDs (ibuprofen, aspirin)",
                "Limit protein if advised by doctor",
                "Monitor kidney function regularly",
            ],
        ),
        Condition::LiverIssues => (
            "🧪 Supporting Liver Health",
            &[
                "Avoid alcohol completely",
                "Maintain healthy weight",
                "Eat liver-friendly foods: leafy greens, berries",
                "Avoid processed foods and excess sugar",
                "Stay hydrated",
                "Avoid unnecessary medications",
                "Get vaccinated for hepatitis A & B",
                "Exercise regularly",
            ],
        ),
        Condition::Anemia => (
            "🔴 Treating Anemia",
            &[
                "Eat iron-rich foods: red meat, spinach, beans",
                "Take vitamin C with iron for better absorption",
                "Avoid tea/coffee with meals",
                "Consider iron supplements (consult doctor)",
                "Eat vitamin B12: eggs, dairy, fish",
                "Include folate: leafy greens, citrus",
                "Cook in cast iron cookware",
            ],
        ),
        Condition::ThyroidIssues => (
            "🦋 Managing Thyroid Health",
            &[
                "Take thyroid medication as prescribed",
                "Take medication on empty stomach",
                "Avoid soy products near medication time",
                "Get adequate iodine (but not excessive)",
                "Manage stress levels",
                "Get regular thyroid function tests",
                "Maintain healthy weight",
            ],
        ),
        Condition::Uti => (
            "💧 Treating UTI",
            &[
                "Drink plenty of water (flush bacteria)",
                "Urinate frequently, don't hold it",
                "Take full course of antibiotics",
                "Drink cranberry juice (unsweetened)",
                "Avoid irritants: caffeine, alcohol, spicy foods",
                "Wipe front to back (women)",
                "Urinate after sexual activity",
                "Wear cotton underwear",
            ],
        ),
    }
}

/// One tip card per detected condition, in a fixed condition order.
pub fn health_tips(results: &[ComparisonResult]) -> Vec<TipCard> {
    detected(results)
        .into_iter()
        .map(|c| {
            let (title, tips) = tip_card(c);
            TipCard {
                title: title.to_string(),
                tips: tips.iter().map(|t| t.to_string()).collect(),
            }
        })
        .collect()
}
