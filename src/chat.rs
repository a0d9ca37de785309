//! Keyword FAQ chat bot.
//!
//! Answers are picked by plain substring checks on the lower-cased question,
//! in a fixed priority order:
//! 1. a personalised answer when one of the report's test names occurs
//! 2. knowledge base topics ("what is", low, high, improve)
//! 3. urine sub-topics
//! 4. canned general answers (ranges, frequency, diet, exercise, doctor)
//! 5. greetings, thanks, help, summary
//! 6. a random default reply

use std::collections::HashMap;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::models::{ComparisonResult, TestStatus};

const BUNDLED_KNOWLEDGE: &str = include_str!("../resources/chat_knowledge.json");

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Invalid chat knowledge base: {0}")]
    Knowledge(#[from] serde_json::Error),
}

/// Report context a client sends along with its question. A present but
/// empty `results` list still counts as an uploaded report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportData {
    #[serde(default)]
    pub results: Option<Vec<ComparisonResult>>,
}

#[derive(Debug, Clone, Deserialize)]
struct KnowledgeTopic {
    topic: String,
    answers: HashMap<String, String>,
}

// ═══════════════════════════════════════════
// Canned replies
// ═══════════════════════════════════════════

const NORMAL_RANGES: &str = "Normal ranges vary by test:\n\n**Blood Tests:**\n Hemoglobin: 12-16 g/dL (women), 14-18 g/dL (men)\n WBC: 4,000-11,000 cells/L\n Glucose: 70-100 mg/dL (fasting)\n Cholesterol: <200 mg/dL\n Platelets: 150,000-400,000 cells/L\n\n**Urine Tests:**\n pH: 4.5-8.0\n Specific Gravity: 1.005-1.030\n Protein: Negative (0 mg/dL)\n Glucose: Negative (0 mg/dL)\n Blood: Negative (0 cells/hpf)\n WBC: 0-5 cells/hpf\n RBC: 0-3 cells/hpf";

const TEST_FREQUENCY: &str = "Testing frequency depends on your health:\n Healthy adults: Annual checkup with basic tests\n Chronic conditions: Every 3-6 months\n Diabetes: HbA1c every 3 months\n High cholesterol: Every 4-6 months\nAlways follow your doctor's recommendations.";

const DIET: &str = "For optimal health:\n Eat plenty of fruits and vegetables\n Choose whole grains over refined carbs\n Include lean proteins (fish, chicken, beans)\n Limit processed foods and added sugars\n Stay hydrated with water\n Consider Mediterranean diet patterns\nConsult a nutritionist for personalized advice.";

const EXERCISE: &str = "Exercise recommendations:\n 150 minutes moderate activity per week\n Or 75 minutes vigorous activity\n Include strength training 2x/week\n Start slowly and build up gradually\n Walking, swimming, cycling are great options\nConsult your doctor before starting new exercise programs.";

const SEE_DOCTOR: &str = "See a doctor if:\n Any test results are significantly abnormal\n You have concerning symptoms\n Results show a sudden change from previous tests\n You have multiple abnormal results\n You're unsure about what results mean\nAlways consult healthcare professionals for medical advice.";

const GREETING: &str = " Hello! I'm your AI Health Assistant. I'm here to help you understand your medical test results and answer health questions.\n\n**I can help you with:**\n Blood tests (hemoglobin, WBC, glucose, cholesterol, etc.)\n Urine tests (protein, blood, pH, infection markers)\n Understanding what medical tests mean\n Explaining your specific test results\n Providing dietary and lifestyle recommendations\n Answering questions about normal ranges\n Offering health improvement tips\n\n**Try asking:**\n 'What is hemoglobin?'\n 'Why is my glucose high?'\n 'What is a urine test?'\n 'What does protein in urine mean?'\n 'Tell me about my results'";

const THANKS: &str = " You're very welcome! I'm happy to help you understand your health better. Feel free to ask me anything else about your medical results or health questions!";

const HELP: &str = " **I'm your AI Health Assistant!**\n\nI can help you:\n\n**Understand Medical Tests:**\n Blood tests: hemoglobin, WBC, glucose, cholesterol, platelets\n Urine tests: protein, blood, pH, infection markers\n What do these tests measure?\n Why are they important?\n\n**Explain Your Results:**\n Why is my [test] high or low?\n What does my result mean?\n Should I be concerned?\n\n**Provide Health Guidance:**\n How to improve [test]?\n What foods should I eat?\n What lifestyle changes help?\n When should I see a doctor?\n\n**General Health Info:**\n What are normal ranges?\n How often should I test?\n Diet and exercise tips\n Urinary health and kidney function\n\n **Tip:** Upload your medical report first, then ask me about your specific results!";

const NO_REPORT_YET: &str = " I don't have your test results yet. Please upload your medical report first, then I can provide a detailed summary of your results!";

pub const DEFAULT_REPLIES: [&str; 3] = [
    " I'm not sure I understood that question. Let me help you!\n\n**I can answer questions like:**\n 'What is hemoglobin?'\n 'Why is my glucose high?'\n 'How to improve WBC count?'\n 'What are normal ranges?'\n 'Give me a summary of my results'\n\n**Tip:** Try to be specific about which test or health topic you're asking about!",
    " I'm here to help with medical test questions! Try asking:\n About specific tests (hemoglobin, WBC, glucose, cholesterol, platelets)\n About your test results (if you've uploaded a report)\n How to improve specific health markers\n What normal ranges are\n\nWhat would you like to know?",
    " I specialize in explaining medical test results! You can ask me:\n What a specific test means\n Why your results are high or low\n How to improve your health markers\n General health and nutrition questions\n\nWhat's on your mind?",
];

const GREETINGS: [&str; 6] = ["hi", "hello", "hey", "good morning", "good afternoon", "good evening"];

fn contains_any(question: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| question.contains(n))
}

// ═══════════════════════════════════════════
// Bot
// ═══════════════════════════════════════════

pub struct ChatBot {
    topics: Vec<KnowledgeTopic>,
}

impl ChatBot {
    /// Bot backed by the knowledge base compiled into the binary.
    pub fn bundled() -> Result<Self, ChatError> {
        Self::from_json(BUNDLED_KNOWLEDGE)
    }

    pub fn from_json(json: &str) -> Result<Self, ChatError> {
        let topics: Vec<KnowledgeTopic> = serde_json::from_str(json)?;
        tracing::debug!(topics = topics.len(), "Chat knowledge base loaded");
        Ok(Self { topics })
    }

    pub fn topic_names(&self) -> Vec<&str> {
        self.topics.iter().map(|t| t.topic.as_str()).collect()
    }

    pub fn respond(&self, question: &str, report: Option<&ReportData>) -> String {
        let question = question.to_lowercase();
        let q = question.as_str();
        let results = report.and_then(|r| r.results.as_deref());

        if let Some(answer) = results
            .unwrap_or_default()
            .iter()
            .find(|r| q.contains(r.test.to_lowercase().as_str()))
            .map(personalised)
        {
            return answer;
        }

        let kinds: [(&[&str], &str); 4] = [
            (&["what is", "what are"], "what"),
            (&["low", "decrease"], "low"),
            (&["high", "increase", "elevated"], "high"),
            (&["improve", "increase", "how to", "what can i do"], "improve"),
        ];
        for (triggers, kind) in kinds {
            if contains_any(q, triggers) {
                if let Some(answer) = self.topic_answer(q, kind) {
                    return answer.to_string();
                }
            }
        }

        if contains_any(q, &["urine", "urinalysis"]) {
            if let Some(answer) = self.urine_answer(q) {
                return answer.to_string();
            }
        }

        if q.contains("normal range") {
            return NORMAL_RANGES.to_string();
        }
        if q.contains("how often") && q.contains("test") {
            return TEST_FREQUENCY.to_string();
        }
        if contains_any(q, &["diet", "food", "eat"]) {
            return DIET.to_string();
        }
        if contains_any(q, &["exercise", "workout"]) {
            return EXERCISE.to_string();
        }
        if contains_any(q, &["doctor", "when to see"]) {
            return SEE_DOCTOR.to_string();
        }
        if contains_any(q, &GREETINGS) {
            return GREETING.to_string();
        }
        if q.contains("thank") {
            return THANKS.to_string();
        }
        if contains_any(q, &["help", "what can you do"]) {
            return HELP.to_string();
        }
        if contains_any(q, &["summary", "overview", "all results", "my results"]) {
            return match results {
                Some(results) => summary(results),
                None => NO_REPORT_YET.to_string(),
            };
        }

        DEFAULT_REPLIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(DEFAULT_REPLIES[0])
            .to_string()
    }

    /// First topic named in the question that has an answer of this kind.
    fn topic_answer(&self, question: &str, kind: &str) -> Option<&str> {
        self.topics
            .iter()
            .filter(|t| question.contains(t.topic.as_str()))
            .find_map(|t| t.answers.get(kind))
            .map(String::as_str)
    }

    fn urine_answer(&self, q: &str) -> Option<&str> {
        let urine = self.topics.iter().find(|t| t.topic == "urine")?;
        let kind = if q.contains("protein") {
            "protein"
        } else if q.contains("blood") {
            "blood"
        } else if contains_any(q, &["infection", "uti"]) {
            "infection"
        } else if q.contains("ph") {
            "ph"
        } else if contains_any(q, &["what", "about"]) {
            "what"
        } else if contains_any(q, &["improve", "healthy"]) {
            "improve"
        } else {
            return None;
        };
        urine.answers.get(kind).map(String::as_str)
    }
}

fn personalised(r: &ComparisonResult) -> String {
    let name = r.test.to_lowercase();
    let (lead, position, next_steps) = match r.status {
        TestStatus::Normal => {
            return format!(
                " **Great news!** Your {} level is {} {}, which is within the healthy normal range of {}-{} {}.\n\n**What this means:**\n{}\n\n**Keep it up!** Continue your current healthy habits to maintain these good levels.",
                r.test, r.value, r.unit, r.min, r.max, r.unit, r.description
            );
        }
        TestStatus::Low => (
            " **Attention needed:**",
            "below",
            format!(
                " Consult your doctor for proper evaluation\n Ask me 'How to improve {name}?' for dietary and lifestyle tips\n Consider getting retested in 4-6 weeks"
            ),
        ),
        TestStatus::High => (
            " **Attention needed:**",
            "above",
            format!(
                " Consult your doctor for proper evaluation\n Ask me 'How to lower {name}?' for dietary and lifestyle tips\n Monitor your levels regularly"
            ),
        ),
    };
    format!(
        "{lead} Your {} level is {} {}, which is {position} the normal range of {}-{} {}.\n\n**What this means:**\n{}\n\n**Next steps:**\n{next_steps}",
        r.test, r.value, r.unit, r.min, r.max, r.unit, r.description
    )
}

fn summary(results: &[ComparisonResult]) -> String {
    let count = |status| results.iter().filter(|r| r.status == status).count();
    let (normal, high, low) = (
        count(TestStatus::Normal),
        count(TestStatus::High),
        count(TestStatus::Low),
    );

    let mut out = String::from(" **Your Medical Report Summary**\n\n**Overall Status:**\n");
    out.push_str(&format!("  Normal: {normal} tests\n"));
    out.push_str(&format!("  High: {high} tests\n"));
    out.push_str(&format!("  Low: {low} tests\n"));
    out.push_str(&format!("  Total: {} tests analyzed\n\n", results.len()));

    if high + low > 0 {
        out.push_str("**Tests Needing Attention:**\n");
        for r in results.iter().filter(|r| r.status.is_abnormal()) {
            out.push_str(&format!(" {}: {} {} ({})\n", r.test, r.value, r.unit, r.status));
        }
        out.push_str("\n Ask me about any specific test for detailed information!");
    } else {
        out.push_str(" **Excellent!** All your test results are within normal ranges. Keep up the great work with your health!");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot() -> ChatBot {
        ChatBot::bundled().unwrap()
    }

    fn result(test: &str, value: f64, status: TestStatus) -> ComparisonResult {
        ComparisonResult {
            test: test.into(),
            value,
            min: 12.0,
            max: 16.0,
            unit: "g/dL".into(),
            status,
            color: status.color().into(),
            description: "Oxygen-carrying protein".into(),
        }
    }

    fn answer(topic: &str, kind: &str) -> String {
        let b = bot();
        let t = b.topics.iter().find(|t| t.topic == topic).unwrap();
        t.answers[kind].clone()
    }

    #[test]
    fn bundled_knowledge_has_all_topics() {
        assert_eq!(
            bot().topic_names(),
            vec!["hemoglobin", "wbc", "glucose", "cholesterol", "platelets", "urine"]
        );
    }

    #[test]
    fn personalised_answer_wins() {
        let report = ReportData {
            results: Some(vec![result("Hemoglobin", 10.5, TestStatus::Low)]),
        };
        let reply = bot().respond("What is my HEMOGLOBIN?", Some(&report));
        assert!(reply.contains("Attention needed"));
        assert!(reply.contains("below the normal range of 12-16 g/dL"));
        assert!(reply.contains("How to improve hemoglobin?"));
    }

    #[test]
    fn personalised_normal_and_high() {
        let b = bot();
        let normal = ReportData {
            results: Some(vec![result("Hemoglobin", 14.0, TestStatus::Normal)]),
        };
        assert!(b.respond("hemoglobin?", Some(&normal)).contains("Great news!"));

        let high = ReportData {
            results: Some(vec![result("Hemoglobin", 18.0, TestStatus::High)]),
        };
        let reply = b.respond("hemoglobin?", Some(&high));
        assert!(reply.contains("above the normal range"));
        assert!(reply.contains("How to lower hemoglobin?"));
    }

    #[test]
    fn knowledge_base_by_intent() {
        let b = bot();
        assert_eq!(b.respond("What is glucose?", None), answer("glucose", "what"));
        assert_eq!(b.respond("why is my wbc low", None), answer("wbc", "low"));
        assert_eq!(b.respond("elevated cholesterol", None), answer("cholesterol", "high"));
        assert_eq!(b.respond("how to fix platelets", None), answer("platelets", "improve"));
    }

    #[test]
    fn urine_topic_without_low_answer_falls_through() {
        // The urine topic has no "low" entry; the question still gets a urine answer.
        let b = bot();
        assert_eq!(b.respond("low protein in urine", None), answer("urine", "protein"));
        assert_eq!(b.respond("urine ph", None), answer("urine", "ph"));
        assert_eq!(b.respond("urinalysis infection", None), answer("urine", "infection"));
    }

    #[test]
    fn general_questions() {
        let b = bot();
        assert_eq!(b.respond("What's the normal range?", None), NORMAL_RANGES);
        assert_eq!(b.respond("How often should I test?", None), TEST_FREQUENCY);
        assert_eq!(b.respond("Any diet tips", None), DIET);
        assert_eq!(b.respond("workout plan", None), EXERCISE);
        assert_eq!(b.respond("Hello there", None), GREETING);
        assert_eq!(b.respond("thanks!", None), THANKS);
    }

    #[test]
    fn summary_needs_a_report() {
        let b = bot();
        assert_eq!(b.respond("summary please", None), NO_REPORT_YET);

        let report = ReportData {
            results: Some(vec![
                result("Hemoglobin", 10.0, TestStatus::Low),
                result("Glucose", 90.0, TestStatus::Normal),
            ]),
        };
        let reply = b.respond("summary please", Some(&report));
        assert!(reply.contains("Normal: 1 tests"));
        assert!(reply.contains("Low: 1 tests"));
        assert!(reply.contains(" Hemoglobin: 10 g/dL (Low)"));
    }

    #[test]
    fn empty_results_list_still_counts_as_a_report() {
        let b = bot();
        let empty: ReportData = serde_json::from_str(r#"{"results": []}"#).unwrap();
        let reply = b.respond("summary please", Some(&empty));
        assert!(reply.contains("Total: 0 tests analyzed"));

        let missing: ReportData = serde_json::from_str("{}").unwrap();
        assert_eq!(b.respond("summary please", Some(&missing)), NO_REPORT_YET);
    }

    #[test]
    fn all_normal_summary_is_positive() {
        let report = ReportData {
            results: Some(vec![result("Glucose", 90.0, TestStatus::Normal)]),
        };
        assert!(bot()
            .respond("overview", Some(&report))
            .contains("**Excellent!**"));
    }

    #[test]
    fn unknown_question_gets_a_default() {
        let reply = bot().respond("zzz qqq", None);
        assert!(DEFAULT_REPLIES.contains(&reply.as_str()));
    }

    #[test]
    fn malformed_knowledge_is_an_error() {
        assert!(matches!(
            ChatBot::from_json("{not json"),
            Err(ChatError::Knowledge(_))
        ));
    }
}
