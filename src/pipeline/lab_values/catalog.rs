//! Static catalog of recognised lab tests.
//!
//! Order matters: the extractor walks definitions in this order, and the
//! keyword lists include the OCR misreads seen on real scanned reports.

use crate::models::TestDefinition;

macro_rules! def {
    ($name:literal, [$($kw:literal),+ $(,)?], ($min:expr, $max:expr)) => {
        TestDefinition {
            name: $name,
            keywords: &[$($kw),+],
            plausible_range: ($min as f64, $max as f64),
            special_pattern: None,
        }
    };
    ($name:literal, [$($kw:literal),+ $(,)?], ($min:expr, $max:expr), $pattern:literal) => {
        TestDefinition {
            name: $name,
            keywords: &[$($kw),+],
            plausible_range: ($min as f64, $max as f64),
            special_pattern: Some($pattern),
        }
    };
}

pub static TEST_DEFINITIONS: &[TestDefinition] = &[
    // Complete blood count
    def!("Hemoglobin", ["hemoglobin", "haemoglobin", "hb", "hgb", "haemo", "hemo"], (5, 20)),
    def!("WBC", ["wbc", "white", "leucocyte", "leukocyte", "w.b.c"], (1000, 20000)),
    def!("RBC", ["rbc", "red blood", "erythrocyte", "r.b.c"], (2, 7)),
    def!("Platelets", ["platelet", "plt"], (50000, 500000)),
    def!("Neutrophils", ["neutrophil", "neutro"], (20, 80)),
    def!("Lymphocytes", ["lymphocyte", "lympho", "litpiocr"], (15, 50)),
    def!("Glucose", ["glucose", "sugar", "fbs", "rbs"], (50, 400)),
    def!("Cholesterol", ["cholesterol", "chol"], (100, 400)),
    def!("Hematocrit", ["hematocrit", "haematocrit", "hct", "hot"], (30, 55)),
    def!("MCV", ["mcv", "mean corpuscular volume", "mean cell volume"], (70, 110)),
    def!("MCH", ["mch", "mean cell haemoglobin", "mean cell hemoglobin"], (20, 35)),
    def!("MCHC", ["mchc", "mean cell haemoglobin con", "waeoglogin"], (30, 37)),
    // Urinalysis
    def!(
        "Urine_pH",
        ["ph", "urine ph", "reaction", "p.h", "reaction ph", "ph level", "acidity", "alkalinity", "reaction (ph)"],
        (4.0, 9.0)
    ),
    def!(
        "Urine_Specific_Gravity",
        ["specific gravity", "sp gr", "sp. gr", "sg", "specir", "gramty", "gravity", "sp.gravity"],
        (1.000, 1.035),
        r"1\.0\d{2,3}"
    ),
    def!(
        "Urine_Protein",
        ["protein", "albumin", "protew", "alun", "prot", "pro", "nil protein", "protein nil"],
        (0, 30)
    ),
    def!(
        "Urine_Glucose",
        ["glucose", "sugar", "sveum", "cuvsose", "glu", "nil glucose", "glucose nil", "sugar (glucose)"],
        (0, 50)
    ),
    def!(
        "Urine_Ketones",
        ["ketone", "ketones", "acetone", "bodies", "ketone bodies", "nil ketones", "ketones nil"],
        (0, 20)
    ),
    def!(
        "Urine_Blood",
        ["blood", "hemoglobin", "occult blood", "bun", "nil blood", "blood nil", "haemoglobin"],
        (0, 10)
    ),
    def!(
        "Urine_Bilirubin",
        ["bilirubin", "bile", "name", "bile pigments", "nil bilirubin", "bilirubin nil"],
        (0, 2)
    ),
    def!(
        "Urine_Urobilinogen",
        ["urobilinogen", "urobil", "uro", "normal urobilinogen", "urobilinogen normal"],
        (0, 4)
    ),
    def!(
        "Urine_WBC",
        [
            "pus cells", "wbc", "leukocytes", "leucocytes", "rusceus", "pusceus", "pus",
            "pus cells /hpf", "wbc /hpf", "pus cells (wbc)",
        ],
        (0, 20)
    ),
    def!(
        "Urine_RBC",
        ["rbc", "red blood cells", "erythrocytes", "nec", "rbc /hpf", "red cells /hpf", "red blood cells (rbc)"],
        (0, 10)
    ),
    def!(
        "Urine_Epithelial_Cells",
        ["epithelial", "epithelial cells", "epi cells", "epi", "epithelial /hpf", "epi cells /hpf"],
        (0, 15)
    ),
    def!("Urine_Casts", ["casts", "cast", "nil casts", "casts nil", "casts /lpf"], (0, 5)),
    def!("Urine_Crystals", ["crystals", "crystal", "cresta", "nil crystals", "crystals nil"], (0, 5)),
    def!("Urine_Bacteria", ["bacteria", "bac", "nil bacteria", "bacteria nil", "no bacteria"], (0, 0)),
    def!(
        "Urine_Nitrite",
        ["nitrite", "nitrites", "nit", "negative nitrite", "nitrite negative", "nitrites: negative"],
        (0, 0)
    ),
    // Kidney
    def!("BUN", ["bun", "blood urea nitrogen", "urea nitrogen"], (5, 30)),
    // Electrolytes
    def!("Sodium", ["sodium", "na", "na+"], (130, 150)),
    def!("Potassium", ["potassium", "k", "k+"], (3.0, 6.0)),
    def!("Chloride", ["chloride", "cl", "cl-"], (90, 110)),
    def!("Calcium", ["calcium", "ca", "ca++"], (8.0, 11.0)),
    def!("Magnesium", ["magnesium", "mg", "mg++"], (1.5, 2.5)),
    def!("Phosphorus", ["phosphorus", "phosphate", "po4"], (2.0, 5.0)),
    // Liver
    def!("Albumin", ["albumin", "alb"], (3.0, 6.0)),
    def!("Total_Protein", ["total protein", "protein total", "tp"], (5.5, 9.0)),
    def!("Globulin", ["globulin", "glob"], (1.5, 4.0)),
    def!("Alkaline_Phosphatase", ["alkaline phosphatase", "alp", "alk phos"], (20, 140)),
    def!("GGT", ["ggt", "gamma gt", "gamma glutamyl"], (0, 60)),
    def!("Total_Bilirubin", ["total bilirubin", "bilirubin total", "tbil"], (0, 1.5)),
    def!("Direct_Bilirubin", ["direct bilirubin", "conjugated bilirubin", "dbil"], (0, 0.5)),
    // Diabetes
    def!("HbA1c", ["hba1c", "a1c", "glycated hemoglobin", "glycosylated"], (4.0, 14.0)),
    def!("Fasting_Insulin", ["fasting insulin", "insulin fasting", "insulin"], (2, 30)),
    // Lipids
    def!("VLDL", ["vldl", "very low density"], (2, 50)),
    // Thyroid
    def!("T3", ["t3", "triiodothyronine"], (70, 220)),
    def!("T4", ["t4", "thyroxine"], (4.0, 13.0)),
    def!("Free_T3", ["free t3", "ft3"], (2.0, 5.0)),
    def!("Free_T4", ["free t4", "ft4"], (0.7, 2.0)),
    // Vitamins
    def!("Vitamin_D", ["vitamin d", "vit d", "25-oh", "cholecalciferol"], (20, 120)),
    def!("Vitamin_B12", ["vitamin b12", "vit b12", "b12", "cobalamin"], (150, 1000)),
    def!("Folate", ["folate", "folic acid", "vitamin b9"], (2.0, 20.0)),
    // Iron studies
    def!("Iron", ["iron", "serum iron", "fe"], (50, 180)),
    def!("TIBC", ["tibc", "total iron binding"], (240, 460)),
    def!("Ferritin", ["ferritin"], (10, 350)),
    def!("Transferrin_Saturation", ["transferrin saturation", "tsat", "iron saturation"], (15, 55)),
    // Inflammation
    def!("CRP", ["crp", "c-reactive protein", "c reactive"], (0, 10)),
    def!("ESR", ["esr", "sed rate", "sedimentation rate"], (0, 30)),
    def!("Uric_Acid", ["uric acid", "urate"], (2.5, 8.0)),
    // Cardiac
    def!("Troponin", ["troponin", "trop"], (0, 0.1)),
    def!("BNP", ["bnp", "brain natriuretic"], (0, 150)),
    // Hormones
    def!("Testosterone_Total", ["testosterone", "total testosterone"], (250, 1100)),
    def!("Estradiol", ["estradiol", "e2", "estrogen"], (10, 400)),
    def!("Cortisol", ["cortisol"], (5, 25)),
    def!("TSH", ["tsh", "thyroid stimulating"], (0.3, 5.0)),
    // Tumour markers
    def!("PSA", ["psa", "prostate specific"], (0, 5)),
    def!("CEA", ["cea", "carcinoembryonic"], (0, 5)),
    // Extended CBC
    def!("Monocytes", ["monocytes", "mono"], (1, 10)),
    def!("Eosinophils", ["eosinophils", "eos", "eosino"], (0, 5)),
    def!("Basophils", ["basophils", "baso"], (0, 2)),
    def!("RDW", ["rdw", "red cell distribution"], (11, 16)),
    def!("MPV", ["mpv", "mean platelet volume"], (7, 12)),
];

pub fn find_definition(name: &str) -> Option<&'static TestDefinition> {
    TEST_DEFINITIONS.iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let mut seen = HashSet::new();
        for def in TEST_DEFINITIONS {
            assert!(seen.insert(def.name), "duplicate definition {}", def.name);
        }
    }

    #[test]
    fn ranges_are_ordered_and_keywords_lowercase() {
        for def in TEST_DEFINITIONS {
            let (min, max) = def.plausible_range;
            assert!(min <= max, "{} range inverted", def.name);
            assert!(!def.keywords.is_empty());
            for kw in def.keywords {
                assert_eq!(*kw, kw.to_lowercase(), "{} keyword not lowercase", def.name);
            }
        }
    }

    #[test]
    fn special_pattern_only_on_specific_gravity() {
        let with_pattern: Vec<_> = TEST_DEFINITIONS
            .iter()
            .filter(|d| d.special_pattern.is_some())
            .map(|d| d.name)
            .collect();
        assert_eq!(with_pattern, vec!["Urine_Specific_Gravity"]);
    }

    #[test]
    fn catalog_covers_every_panel() {
        assert_eq!(TEST_DEFINITIONS.len(), 71);
        assert_eq!(TEST_DEFINITIONS[0].name, "Hemoglobin");
        assert_eq!(TEST_DEFINITIONS.last().map(|d| d.name), Some("MPV"));
        assert!(find_definition("Troponin").is_some());
        assert!(find_definition("Creatinine").is_none());
    }
}
