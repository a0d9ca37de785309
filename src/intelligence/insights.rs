//! Plain-language insight per (test, status).
//!
//! Lookup is a static table; tests without an entry get a templated
//! sentence built from the test name and status.

use serde::{Deserialize, Serialize};

use crate::models::{ComparisonResult, TestStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub test: String,
    pub insight: String,
    pub status: TestStatus,
}

pub fn generate_insights(results: &[ComparisonResult]) -> Vec<Insight> {
    results
        .iter()
        .map(|r| Insight {
            test: r.test.clone(),
            insight: insight_for(&r.test, r.status),
            status: r.status,
        })
        .collect()
}

pub fn insight_for(test: &str, status: TestStatus) -> String {
    if let Some(text) = template(test, status) {
        return text.to_string();
    }
    match status {
        TestStatus::Low => {
            format!("Your {test} is below the normal range. Consult a healthcare provider.")
        }
        TestStatus::High => {
            format!("Your {test} is above the normal range. Medical consultation recommended.")
        }
        TestStatus::Normal => format!("Your {test} is within the normal range."),
    }
}

// ═══════════════════════════════════════════════════════════
// Template table
// ═══════════════════════════════════════════════════════════

fn template(test: &str, status: TestStatus) -> Option<&'static str> {
    use TestStatus::*;
    let text = match (test, status) {
        ("Hemoglobin", Low) => "Your hemoglobin is below normal range, which may indicate anemia. Consider iron-rich foods and consult a doctor.",
        ("Hemoglobin", High) => "Your hemoglobin is elevated, which could be due to dehydration or other conditions. Stay hydrated and consult a doctor.",
        ("Hemoglobin", Normal) => "Your hemoglobin level is within the healthy range.",
        ("WBC", Low) => "Your white blood cell count is low, which may weaken your immune system. Consult a doctor.",
        ("WBC", High) => "Your WBC count is higher than normal, possibly indicating infection, inflammation, or stress. Medical evaluation recommended.",
        ("WBC", Normal) => "Your white blood cell count is healthy.",
        ("Platelets", Low) => "Your platelet count is low, which may affect blood clotting. Consult a doctor.",
        ("Platelets", High) => "Your platelet count is elevated. This may need medical evaluation.",
        ("Platelets", Normal) => "Your platelet count is within normal range.",
        ("Neutrophils", Low) => "Your neutrophil percentage is low, which may affect infection fighting ability.",
        ("Neutrophils", High) => "Your neutrophil percentage is elevated, possibly indicating infection or inflammation.",
        ("Neutrophils", Normal) => "Your neutrophil levels are normal.",
        ("Lymphocytes", Low) => "Your lymphocyte percentage is low, which may affect immune function.",
        ("Lymphocytes", High) => "Your lymphocyte percentage is elevated, which may indicate viral infection or immune response.",
        ("Lymphocytes", Normal) => "Your lymphocyte levels are normal.",
        ("Glucose", Low) => "Your blood sugar is low. Ensure regular meals and monitor for hypoglycemia symptoms.",
        ("Glucose", High) => "Your glucose level is elevated. This may indicate prediabetes or diabetes risk. Consult a doctor for further testing.",
        ("Glucose", Normal) => "Your blood sugar level is within the healthy range.",
        ("Cholesterol", Low) => "Your cholesterol is low, which is generally good, but extremely low levels may need evaluation.",
        ("Cholesterol", High) => "Your cholesterol is elevated, increasing cardiovascular risk. Consider dietary changes and exercise.",
        ("Cholesterol", Normal) => "Your cholesterol level is healthy.",
        ("Creatinine", Low) => "Your creatinine is low, which is usually not a concern but may indicate low muscle mass.",
        ("Creatinine", High) => "Elevated creatinine may indicate kidney function issues. Consult a doctor for kidney function tests.",
        ("Creatinine", Normal) => "Your kidney function markers are normal.",
        ("Hematocrit", Low) => "Your hematocrit is low, which may indicate anemia or blood loss.",
        ("Hematocrit", High) => "Your hematocrit is elevated, which may indicate dehydration or polycythemia.",
        ("Hematocrit", Normal) => "Your hematocrit level is normal.",
        ("MCV", Low) => "Your MCV is low, suggesting smaller red blood cells (microcytic anemia).",
        ("MCV", High) => "Your MCV is elevated, suggesting larger red blood cells (macrocytic anemia).",
        ("MCV", Normal) => "Your red blood cell size is normal.",
        ("MCH", Low) => "Your MCH is low, which may indicate iron deficiency.",
        ("MCH", High) => "Your MCH is elevated, which may need further evaluation.",
        ("MCH", Normal) => "Your MCH level is normal.",
        ("MCHC", Low) => "Your MCHC is low, which may indicate iron deficiency anemia.",
        ("MCHC", High) => "Your MCHC is elevated, which is rare and may need evaluation.",
        ("MCHC", Normal) => "Your MCHC level is normal.",
        // Urine
        ("Urine_pH", Low) => "Your urine pH is acidic. This may indicate metabolic acidosis, diabetes, or high-protein diet. Stay hydrated.",
        ("Urine_pH", High) => "Your urine pH is alkaline. This may indicate urinary tract infection, kidney stones, or vegetarian diet.",
        ("Urine_pH", Normal) => "Your urine pH is within normal range.",
        ("Urine_Specific_Gravity", Low) => "Your urine is dilute, which may indicate overhydration, diabetes insipidus, or kidney issues.",
        ("Urine_Specific_Gravity", High) => "Your urine is concentrated. This may indicate dehydration. Drink more water.",
        ("Urine_Specific_Gravity", Normal) => "Your urine concentration is normal.",
        ("Urine_Protein", Low) => "No protein detected in urine - this is normal.",
        ("Urine_Protein", High) => "Protein detected in urine. This may indicate kidney disease, infection, or high blood pressure. Consult a doctor.",
        ("Urine_Protein", Normal) => "No protein in urine - healthy kidney function.",
        ("Urine_Glucose", Low) => "No glucose in urine - this is normal.",
        ("Urine_Glucose", High) => "Glucose detected in urine. This may indicate diabetes or kidney issues. Check blood sugar levels.",
        ("Urine_Glucose", Normal) => "No glucose in urine - normal.",
        ("Urine_Ketones", Low) => "No ketones detected - this is normal.",
        ("Urine_Ketones", High) => "Ketones detected in urine. This may indicate diabetes, fasting, or low-carb diet. Monitor blood sugar.",
        ("Urine_Ketones", Normal) => "No ketones in urine - normal.",
        ("Urine_Blood", Low) => "No blood in urine - this is normal.",
        ("Urine_Blood", High) => "Blood detected in urine. This may indicate kidney stones, infection, or kidney disease. Consult a doctor immediately.",
        ("Urine_Blood", Normal) => "No blood in urine - normal.",
        ("Urine_Bilirubin", Low) => "No bilirubin in urine - this is normal.",
        ("Urine_Bilirubin", High) => "Bilirubin detected in urine. This may indicate liver disease or bile duct obstruction. Consult a doctor.",
        ("Urine_Bilirubin", Normal) => "No bilirubin in urine - normal liver function.",
        ("Urine_Urobilinogen", Low) => "Low urobilinogen may indicate bile duct obstruction.",
        ("Urine_Urobilinogen", High) => "Elevated urobilinogen may indicate liver disease or hemolytic anemia. Consult a doctor.",
        ("Urine_Urobilinogen", Normal) => "Urobilinogen level is normal.",
        ("Urine_WBC", Low) => "No white blood cells in urine - this is normal.",
        ("Urine_WBC", High) => "White blood cells detected in urine. This may indicate urinary tract infection or kidney infection. Consult a doctor.",
        ("Urine_WBC", Normal) => "No white blood cells in urine - normal.",
        ("Urine_RBC", Low) => "No red blood cells in urine - this is normal.",
        ("Urine_RBC", High) => "Red blood cells detected in urine. This may indicate kidney stones, infection, or kidney disease. Consult a doctor.",
        ("Urine_RBC", Normal) => "No red blood cells in urine - normal.",
        ("Urine_Epithelial_Cells", Low) => "Few epithelial cells - this is normal.",
        ("Urine_Epithelial_Cells", High) => "Elevated epithelial cells may indicate contamination or urinary tract infection.",
        ("Urine_Epithelial_Cells", Normal) => "Epithelial cell count is normal.",
        // Kidney
        ("BUN", Low) => "Low BUN may indicate liver disease or malnutrition.",
        ("BUN", High) => "Elevated BUN may indicate kidney dysfunction, dehydration, or high protein diet. Consult a doctor.",
        ("BUN", Normal) => "Your BUN level is normal - good kidney function.",
        // Electrolytes
        ("Sodium", Low) => "Low sodium (hyponatremia) can cause confusion, weakness. May indicate dehydration or kidney issues.",
        ("Sodium", High) => "High sodium (hypernatremia) may indicate dehydration. Drink more water and reduce salt intake.",
        ("Sodium", Normal) => "Your sodium level is balanced.",
        ("Potassium", Low) => "Low potassium can cause muscle weakness, cramps, irregular heartbeat. Eat bananas, potatoes.",
        ("Potassium", High) => "High potassium can be dangerous for heart rhythm. Avoid high-potassium foods and consult doctor immediately.",
        ("Potassium", Normal) => "Your potassium level is normal.",
        ("Calcium", Low) => "Low calcium may cause weak bones, muscle cramps. Increase dairy, leafy greens, vitamin D.",
        ("Calcium", High) => "High calcium may indicate hyperparathyroidism or excess vitamin D. Consult a doctor.",
        ("Calcium", Normal) => "Your calcium level is healthy.",
        // Liver
        ("Albumin", Low) => "Low albumin may indicate liver disease, kidney disease, or malnutrition.",
        ("Albumin", High) => "High albumin is rare, may indicate dehydration.",
        ("Albumin", Normal) => "Your albumin level is normal - good liver function.",
        ("Alkaline_Phosphatase", Low) => "Low ALP is rare, may indicate malnutrition or zinc deficiency.",
        ("Alkaline_Phosphatase", High) => "Elevated ALP may indicate liver disease, bone disorders, or bile duct obstruction. Consult a doctor.",
        ("Alkaline_Phosphatase", Normal) => "Your alkaline phosphatase is normal.",
        ("GGT", Low) => "Low GGT is normal.",
        ("GGT", High) => "Elevated GGT may indicate liver disease, alcohol use, or bile duct problems. Reduce alcohol intake.",
        ("GGT", Normal) => "Your GGT level is normal.",
        // Diabetes
        ("HbA1c", Low) => "Your HbA1c is excellent - no diabetes risk.",
        ("HbA1c", High) => "Elevated HbA1c indicates poor blood sugar control or diabetes. Consult doctor for diabetes management.",
        ("HbA1c", Normal) => "Your HbA1c is normal - good blood sugar control over 3 months.",
        // Thyroid
        ("T3", Low) => "Low T3 may indicate hypothyroidism. You may feel tired, cold, weight gain.",
        ("T3", High) => "High T3 may indicate hyperthyroidism. You may feel anxious, rapid heartbeat, weight loss.",
        ("T3", Normal) => "Your T3 level is normal.",
        ("T4", Low) => "Low T4 may indicate hypothyroidism. Consult doctor about thyroid medication.",
        ("T4", High) => "High T4 may indicate hyperthyroidism. Consult doctor for treatment.",
        ("T4", Normal) => "Your T4 level is normal.",
        ("Free_T4", Low) => "Low free T4 indicates hypothyroidism. You may need thyroid hormone replacement.",
        ("Free_T4", High) => "High free T4 indicates hyperthyroidism. Consult endocrinologist.",
        ("Free_T4", Normal) => "Your free T4 is normal - good thyroid function.",
        // Vitamins
        ("Vitamin_D", Low) => "Low vitamin D can cause weak bones, fatigue, depression. Get sun exposure and take supplements.",
        ("Vitamin_D", High) => "High vitamin D is rare but can cause calcium buildup. Reduce supplements.",
        ("Vitamin_D", Normal) => "Your vitamin D level is optimal.",
        ("Vitamin_B12", Low) => "Low B12 can cause anemia, fatigue, nerve damage. Eat meat, eggs, or take supplements.",
        ("Vitamin_B12", High) => "High B12 is usually not harmful but may indicate liver disease or excess supplementation.",
        ("Vitamin_B12", Normal) => "Your B12 level is healthy.",
        ("Folate", Low) => "Low folate can cause anemia, birth defects. Eat leafy greens, beans, fortified grains.",
        ("Folate", High) => "High folate is usually from supplements. Generally not harmful.",
        ("Folate", Normal) => "Your folate level is normal.",
        // Iron
        ("Iron", Low) => "Low iron causes anemia, fatigue. Eat red meat, spinach, beans. Take iron supplements.",
        ("Iron", High) => "High iron may indicate hemochromatosis or excess supplementation. Consult doctor.",
        ("Iron", Normal) => "Your iron level is normal.",
        ("Ferritin", Low) => "Low ferritin indicates depleted iron stores. You may develop anemia. Take iron supplements.",
        ("Ferritin", High) => "High ferritin may indicate inflammation, liver disease, or iron overload.",
        ("Ferritin", Normal) => "Your iron stores are adequate.",
        // Inflammation
        ("CRP", Low) => "Low CRP is excellent - no inflammation.",
        ("CRP", High) => "Elevated CRP indicates inflammation or infection. May increase heart disease risk.",
        ("CRP", Normal) => "Your CRP is normal - no significant inflammation.",
        ("ESR", Low) => "Low ESR is normal.",
        ("ESR", High) => "Elevated ESR indicates inflammation, infection, or autoimmune disease. Consult doctor.",
        ("ESR", Normal) => "Your ESR is normal.",
        ("Uric_Acid", Low) => "Low uric acid is rare and usually not concerning.",
        ("Uric_Acid", High) => "High uric acid can cause gout and kidney stones. Reduce alcohol, red meat, seafood. Drink more water.",
        ("Uric_Acid", Normal) => "Your uric acid level is normal.",
        // Cardiac
        ("Troponin", Low) => "No troponin detected - no heart damage.",
        ("Troponin", High) => "Elevated troponin indicates heart attack or heart damage. Seek emergency medical care immediately!",
        ("Troponin", Normal) => "No cardiac injury detected.",
        ("BNP", Low) => "Low BNP is normal - no heart failure.",
        ("BNP", High) => "Elevated BNP may indicate heart failure. Consult cardiologist.",
        ("BNP", Normal) => "Your BNP is normal - good heart function.",
        // Hormones
        ("Testosterone_Total", Low) => "Low testosterone can cause fatigue, low libido, muscle loss. Consult doctor about hormone therapy.",
        ("Testosterone_Total", High) => "High testosterone may indicate PCOS (women) or steroid use. Consult endocrinologist.",
        ("Testosterone_Total", Normal) => "Your testosterone level is normal.",
        ("Cortisol", Low) => "Low cortisol may indicate adrenal insufficiency. You may feel very tired, weak.",
        ("Cortisol", High) => "High cortisol may indicate Cushing syndrome or chronic stress. Manage stress levels.",
        ("Cortisol", Normal) => "Your cortisol level is normal.",
        // Tumour markers
        ("PSA", Low) => "Low PSA is normal.",
        ("PSA", High) => "Elevated PSA may indicate prostate enlargement or cancer. Consult urologist for further testing.",
        ("PSA", Normal) => "Your PSA is normal - healthy prostate.",
        ("CEA", Low) => "Low CEA is normal.",
        ("CEA", High) => "Elevated CEA may indicate cancer (colon, lung, breast) or smoking. Consult oncologist.",
        ("CEA", Normal) => "Your CEA is normal.",
        // Extended CBC
        ("Monocytes", Low) => "Low monocytes may indicate bone marrow issues.",
        ("Monocytes", High) => "High monocytes may indicate chronic infection or inflammation.",
        ("Monocytes", Normal) => "Your monocyte count is normal.",
        ("Eosinophils", Low) => "Low eosinophils is normal.",
        ("Eosinophils", High) => "High eosinophils may indicate allergies, parasites, or asthma.",
        ("Eosinophils", Normal) => "Your eosinophil count is normal.",
        ("Basophils", Low) => "Low basophils is normal.",
        ("Basophils", High) => "High basophils may indicate allergic reaction or blood disorder.",
        ("Basophils", Normal) => "Your basophil count is normal.",
        ("RDW", Low) => "Low RDW is normal.",
        ("RDW", High) => "High RDW indicates varied red blood cell sizes, may indicate anemia or nutritional deficiency.",
        ("RDW", Normal) => "Your RDW is normal - uniform red blood cell size.",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(test: &str, status: TestStatus) -> ComparisonResult {
        ComparisonResult {
            test: test.into(),
            value: 1.0,
            min: 0.0,
            max: 2.0,
            unit: "u".into(),
            status,
            color: status.color().into(),
            description: String::new(),
        }
    }

    #[test]
    fn known_pair_uses_table() {
        let text = insight_for("Hemoglobin", TestStatus::Low);
        assert!(text.contains("may indicate anemia"));
    }

    #[test]
    fn unknown_test_falls_back_to_template() {
        assert_eq!(
            insight_for("Lipase", TestStatus::High),
            "Your Lipase is above the normal range. Medical consultation recommended."
        );
        assert_eq!(
            insight_for("Lipase", TestStatus::Normal),
            "Your Lipase is within the normal range."
        );
    }

    #[test]
    fn one_insight_per_result_in_order() {
        let results = vec![
            result("Glucose", TestStatus::High),
            result("Urine_Protein", TestStatus::Normal),
        ];
        let insights = generate_insights(&results);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].test, "Glucose");
        assert_eq!(insights[0].status, TestStatus::High);
        assert_eq!(
            insights[1].insight,
            "No protein in urine - healthy kidney function."
        );
    }
}
