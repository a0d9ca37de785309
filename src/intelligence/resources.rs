//! Static health content: news, preventive tips, food advice, trusted
//! resources and emergency warning signs.

use serde::{Deserialize, Serialize};

use super::specialists::TipCard;
use crate::models::ComparisonResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub category: String,
    pub date: String,
    pub source: String,
    pub relevance: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreventiveTips {
    pub daily_habits: TipCard,
    pub nutrition: TipCard,
    pub exercise: TipCard,
    pub mental_health: TipCard,
    pub preventive_care: TipCard,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodRecommendation {
    pub eat_more: Vec<String>,
    pub eat_less: Vec<String>,
    pub supplements: Vec<String>,
}

impl FoodRecommendation {
    pub fn is_empty(&self) -> bool {
        self.eat_more.is_empty() && self.eat_less.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifestyleModification {
    pub condition: String,
    pub modifications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub name: String,
    pub url: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificResources {
    pub diabetes: Vec<ResourceLink>,
    pub heart: Vec<ResourceLink>,
    pub kidney: Vec<ResourceLink>,
    pub thyroid: Vec<ResourceLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalResources {
    pub general: Vec<ResourceLink>,
    pub specific: SpecificResources,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignCard {
    pub title: String,
    pub signs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencySigns {
    pub cardiac: SignCard,
    pub stroke: SignCard,
    pub diabetic: SignCard,
    pub kidney: SignCard,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn card(title: &str, tips: &[&str]) -> TipCard {
    TipCard {
        title: title.to_string(),
        tips: strings(tips),
    }
}

fn link(name: &str, url: &str, description: &str) -> ResourceLink {
    ResourceLink {
        name: name.to_string(),
        url: url.to_string(),
        description: description.to_string(),
    }
}

fn signs(title: &str, items: &[&str]) -> SignCard {
    SignCard {
        title: title.to_string(),
        signs: strings(items),
    }
}

// ═══════════════════════════════════════════════════════════
// News
// ═══════════════════════════════════════════════════════════

const NEWS: &[(&str, &str, &str, &str, &[&str])] = &[
    (
        "New Study Shows Benefits of Mediterranean Diet for Heart Health",
        "Recent research confirms that Mediterranean diet reduces cardiovascular disease risk by 30%.",
        "Nutrition",
        "Medical Journal",
        &["Cholesterol", "Heart Health", "Triglycerides"],
    ),
    (
        "Vitamin D Deficiency Linked to Immune Function",
        "Studies show adequate vitamin D levels are crucial for immune system health.",
        "Vitamins",
        "Health Research",
        &["Vitamin D", "Immunity", "Bone Health"],
    ),
    (
        "Early Detection of Kidney Disease Through Regular Testing",
        "Regular monitoring of creatinine and protein levels can detect kidney disease early.",
        "Kidney Health",
        "Nephrology Today",
        &["Creatinine", "Kidney Function", "Urine Protein"],
    ),
    (
        "Managing Diabetes: Latest Guidelines for HbA1c Targets",
        "New recommendations suggest personalized HbA1c targets based on individual factors.",
        "Diabetes",
        "Diabetes Association",
        &["HbA1c", "Glucose", "Diabetes"],
    ),
    (
        "Thyroid Health: Understanding TSH Levels",
        "Comprehensive guide to interpreting thyroid function tests and when to seek treatment.",
        "Endocrinology",
        "Endocrine Society",
        &["TSH", "Thyroid", "T3", "T4"],
    ),
];

/// Curated health news, dated today.
pub fn health_news() -> Vec<NewsItem> {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    NEWS.iter()
        .map(|(title, summary, category, source, relevance)| NewsItem {
            title: title.to_string(),
            summary: summary.to_string(),
            category: category.to_string(),
            date: today.clone(),
            source: source.to_string(),
            relevance: strings(relevance),
        })
        .collect()
}

/// News whose relevance tags overlap an abnormal test (substring match in
/// either direction, case-insensitive). Falls back to the first three items.
pub fn relevant_news(results: &[ComparisonResult]) -> Vec<NewsItem> {
    let all = health_news();
    let abnormal: Vec<String> = results
        .iter()
        .filter(|r| r.status.is_abnormal())
        .map(|r| r.test.to_lowercase())
        .collect();

    let relevant: Vec<NewsItem> = all
        .iter()
        .filter(|news| {
            abnormal.iter().any(|test| {
                news.relevance.iter().any(|kw| {
                    let kw = kw.to_lowercase();
                    kw.contains(test.as_str()) || test.contains(kw.as_str())
                })
            })
        })
        .cloned()
        .collect();

    if relevant.is_empty() {
        all.into_iter().take(3).collect()
    } else {
        relevant
    }
}

// ═══════════════════════════════════════════════════════════
// Tips and food
// ═══════════════════════════════════════════════════════════

pub fn preventive_tips() -> PreventiveTips {
    PreventiveTips {
        daily_habits: card(
            "🌟 Daily Health Habits",
            &[
                "Drink 8-10 glasses of water daily",
                "Get 7-9 hours of quality sleep",
                "Exercise for 30 minutes daily",
                "Eat 5 servings of fruits and vegetables",
                "Practice stress management (meditation, yoga)",
                "Limit screen time before bed",
                "Take breaks from sitting every hour",
            ],
        ),
        nutrition: card(
            "🥗 Nutrition Guidelines",
            &[
                "Eat a rainbow of colorful vegetables",
                "Choose whole grains over refined",
                "Include lean proteins in every meal",
                "Limit processed and packaged foods",
                "Reduce added sugar intake",
                "Use healthy fats (olive oil, avocados, nuts)",
                "Practice portion control",
            ],
        ),
        exercise: card(
            "🏃 Exercise Recommendations",
            &[
                "150 minutes moderate aerobic activity per week",
                "Strength training 2 days per week",
                "Include flexibility exercises (stretching, yoga)",
                "Start slowly and gradually increase intensity",
                "Find activities you enjoy",
                "Mix cardio and strength training",
                "Stay consistent - make it a habit",
            ],
        ),
        mental_health: card(
            "🧠 Mental Wellness",
            &[
                "Practice mindfulness or meditation daily",
                "Maintain social connections",
                "Set realistic goals and priorities",
                "Take breaks and practice self-care",
                "Seek help when feeling overwhelmed",
                "Limit negative news consumption",
                "Express gratitude daily",
            ],
        ),
        preventive_care: card(
            "🏥 Preventive Healthcare",
            &[
                "Get annual physical examinations",
                "Stay up-to-date with vaccinations",
                "Schedule age-appropriate screenings",
                "Monitor blood pressure regularly",
                "Check cholesterol levels annually",
                "Get dental checkups twice yearly",
                "Perform self-examinations (breast, testicular)",
            ],
        ),
    }
}

/// Food advice for a (test, status) pair; empty lists when none is known.
pub fn food_recommendations(test_name: &str, status: &str) -> FoodRecommendation {
    let (more, less, supplements): (&[&str], &[&str], &[&str]) = match (test_name, status) {
        ("Cholesterol", "High") => (
            &[
                "Oats", "Barley", "Beans", "Lentils", "Nuts", "Fatty fish", "Olive oil",
                "Avocados", "Fruits", "Vegetables",
            ],
            &[
                "Red meat", "Butter", "Cheese", "Fried foods", "Processed meats", "Baked goods",
                "Fast food",
            ],
            &["Fish oil (Omega-3)", "Plant sterols", "Psyllium fiber", "Red yeast rice"],
        ),
        ("Glucose", "High") => (
            &[
                "Non-starchy vegetables", "Whole grains", "Legumes", "Nuts", "Seeds",
                "Lean proteins", "Berries",
            ],
            &[
                "White bread", "White rice", "Sugary drinks", "Candy", "Pastries",
                "Processed snacks",
            ],
            &["Chromium", "Alpha-lipoic acid", "Berberine", "Cinnamon extract"],
        ),
        ("Hemoglobin", "Low") => (
            &[
                "Red meat", "Liver", "Spinach", "Lentils", "Beans", "Fortified cereals",
                "Pumpkin seeds", "Quinoa",
            ],
            &["Tea with meals", "Coffee with meals", "Excessive dairy"],
            &[
                "Iron supplements",
                "Vitamin C (enhances iron absorption)",
                "Vitamin B12",
                "Folate",
            ],
        ),
        ("Vitamin_D", "Low") => (
            &["Fatty fish", "Egg yolks", "Fortified milk", "Fortified cereals", "Mushrooms"],
            &[],
            &["Vitamin D3 (2000-4000 IU daily)", "Get 15-30 minutes sun exposure daily"],
        ),
        ("Calcium", "Low") => (
            &["Dairy products", "Leafy greens", "Sardines", "Tofu", "Almonds", "Fortified foods"],
            &["Excessive salt", "Caffeine"],
            &["Calcium citrate or carbonate", "Vitamin D (helps absorption)"],
        ),
        ("Iron", "Low") => (
            &["Red meat", "Poultry", "Fish", "Beans", "Dark leafy greens", "Dried fruits"],
            &["Tea", "Coffee", "Calcium-rich foods with iron meals"],
            &["Ferrous sulfate", "Vitamin C"],
        ),
        ("Uric_Acid", "High") => (
            &[
                "Water (8-10 glasses)", "Cherries", "Coffee", "Low-fat dairy", "Vegetables",
                "Whole grains",
            ],
            &[
                "Red meat", "Organ meats", "Seafood", "Alcohol", "Sugary drinks",
                "High-fructose corn syrup",
            ],
            &["Vitamin C", "Cherry extract"],
        ),
        _ => (&[], &[], &[]),
    };
    FoodRecommendation {
        eat_more: strings(more),
        eat_less: strings(less),
        supplements: strings(supplements),
    }
}

/// Lifestyle changes for the named conditions (`high_cholesterol`,
/// `diabetes`, `hypertension`); unknown names are ignored.
pub fn lifestyle_modifications(conditions: &[&str]) -> Vec<LifestyleModification> {
    let mut out = Vec::new();
    let mut push = |condition: &str, items: &[&str]| {
        out.push(LifestyleModification {
            condition: condition.to_string(),
            modifications: strings(items),
        })
    };

    if conditions.contains(&"high_cholesterol") {
        push(
            "High Cholesterol",
            &[
                "Exercise 30 minutes daily (walking, swimming, cycling)",
                "Lose 5-10% of body weight if overweight",
                "Quit smoking (raises HDL by 10%)",
                "Limit alcohol to 1 drink/day (women) or 2/day (men)",
                "Manage stress through meditation or yoga",
                "Get 7-9 hours of sleep nightly",
            ],
        );
    }
    if conditions.contains(&"diabetes") {
        push(
            "Diabetes/High Blood Sugar",
            &[
                "Monitor blood sugar regularly",
                "Exercise 150 minutes per week",
                "Lose weight if overweight (even 5-7% helps)",
                "Eat smaller, frequent meals",
                "Manage stress (raises blood sugar)",
                "Get adequate sleep (affects insulin sensitivity)",
                "Stay hydrated with water",
            ],
        );
    }
    if conditions.contains(&"hypertension") {
        push(
            "High Blood Pressure",
            &[
                "Reduce sodium to <2,300mg daily",
                "Follow DASH diet (fruits, vegetables, whole grains)",
                "Exercise regularly (lowers BP by 5-8 mmHg)",
                "Limit alcohol consumption",
                "Maintain healthy weight",
                "Manage stress",
                "Quit smoking",
            ],
        );
    }
    out
}

// ═══════════════════════════════════════════════════════════
// Resources and emergency signs
// ═══════════════════════════════════════════════════════════

pub fn medical_resources() -> MedicalResources {
    MedicalResources {
        general: vec![
            link(
                "Mayo Clinic",
                "https://www.mayoclinic.org",
                "Comprehensive medical information and health resources",
            ),
            link(
                "WebMD",
                "https://www.webmd.com",
                "Health information, symptom checker, and medical news",
            ),
            link(
                "MedlinePlus",
                "https://medlineplus.gov",
                "Trusted health information from the National Library of Medicine",
            ),
        ],
        specific: SpecificResources {
            diabetes: vec![link(
                "American Diabetes Association",
                "https://www.diabetes.org",
                "Diabetes education, research, and advocacy",
            )],
            heart: vec![link(
                "American Heart Association",
                "https://www.heart.org",
                "Heart health information and resources",
            )],
            kidney: vec![link(
                "National Kidney Foundation",
                "https://www.kidney.org",
                "Kidney disease information and support",
            )],
            thyroid: vec![link(
                "American Thyroid Association",
                "https://www.thyroid.org",
                "Thyroid health information and resources",
            )],
        },
    }
}

pub fn emergency_signs() -> EmergencySigns {
    EmergencySigns {
        cardiac: signs(
            "🚨 Heart Attack Warning Signs",
            &[
                "Chest pain or pressure",
                "Pain radiating to arm, jaw, or back",
                "Shortness of breath",
                "Cold sweat, nausea",
                "Lightheadedness or dizziness",
                "➡️ CALL 911 IMMEDIATELY",
            ],
        ),
        stroke: signs(
            "🚨 Stroke Warning Signs (FAST)",
            &[
                "Face drooping on one side",
                "Arm weakness or numbness",
                "Speech difficulty or slurred speech",
                "Time to call 911 immediately",
                "Sudden severe headache",
                "Vision problems in one or both eyes",
            ],
        ),
        diabetic: signs(
            "🚨 Diabetic Emergency",
            &[
                "Blood sugar <70 or >300 mg/dL",
                "Confusion or loss of consciousness",
                "Rapid breathing",
                "Fruity breath odor",
                "Severe dehydration",
                "➡️ Seek immediate medical care",
            ],
        ),
        kidney: signs(
            "🚨 Kidney Emergency",
            &[
                "Little or no urine output",
                "Blood in urine (large amounts)",
                "Severe back or side pain",
                "High fever with urinary symptoms",
                "Severe swelling",
                "➡️ Go to emergency room",
            ],
        ),
    }
}
