use serde::{Deserialize, Serialize};

use super::types::{Scene, Script, ScriptGenerator};
use super::VideoError;

// ═══════════════════════════════════════════════════════════
// Template generator
// ═══════════════════════════════════════════════════════════

/// Canned five-scene water-cycle script, used when no text model is
/// configured. The topic is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateScriptGenerator;

impl ScriptGenerator for TemplateScriptGenerator {
    fn generate(&self, _topic: &str) -> Script {
        Script {
            scenes: vec![
                Scene::new(
                    "A beautiful sunrise over mountains with flowing water",
                    "Welcome to our exploration of the water cycle, nature's incredible recycling system.",
                ),
                Scene::new(
                    "Water droplets forming on leaves and grass in the morning",
                    "It all begins with evaporation, as the sun's heat transforms water into invisible vapor.",
                ),
                Scene::new(
                    "Clouds forming and moving across a blue sky",
                    "This vapor rises and condenses into clouds, carried by wind across the globe.",
                ),
                Scene::new(
                    "Rain falling on a forest and flowing into streams",
                    "When clouds become heavy, precipitation occurs, returning water to Earth as rain or snow.",
                ),
                Scene::new(
                    "A river flowing through a valley toward the ocean",
                    "Water flows through rivers and streams, eventually reaching the ocean to begin the cycle again.",
                ),
            ],
        }
    }
}

/// Four scenes built around the topic.
pub fn topic_script(topic: &str) -> Script {
    Script {
        scenes: vec![
            Scene::new(
                format!("Introduction to {topic} with clear diagrams and visual elements"),
                format!("Welcome to our exploration of {topic}. Let's understand the key concepts."),
            ),
            Scene::new(
                format!("Detailed explanation of {topic} with examples and illustrations"),
                format!("The fundamentals of {topic} are important for understanding how it works."),
            ),
            Scene::new(
                format!("Real-world applications and examples of {topic}"),
                format!("Here are some practical examples of {topic} in everyday life."),
            ),
            Scene::new(
                format!("Summary and conclusion about {topic}"),
                format!("In conclusion, {topic} plays a crucial role in our understanding of the world."),
            ),
        ],
    }
}

/// Two-scene script returned when the text model fails.
pub fn fallback_script(topic: &str) -> Script {
    Script {
        scenes: vec![
            Scene::new(
                format!("An educational diagram about {topic}"),
                format!("Let's explore {topic} and understand its key concepts."),
            ),
            Scene::new(
                format!("Visual examples and illustrations of {topic}"),
                "This topic is important because it helps us understand our world better.",
            ),
        ],
    }
}

// ═══════════════════════════════════════════════════════════
// Text model
// ═══════════════════════════════════════════════════════════

/// A completion endpoint.
pub trait TextModel: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, VideoError>;
}

/// Ollama HTTP client for local text generation.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, VideoError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        })
    }
}

impl TextModel for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, VideoError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: 0.7,
                num_predict: 200,
            },
        };

        let response = self.client.post(&url).json(&body).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(VideoError::Script(format!("Ollama returned {status}: {body}")));
        }
        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| VideoError::Script(e.to_string()))?;
        Ok(parsed.response)
    }
}

/// Runs the text model for the topic, then returns the topic template.
/// The generated text is only logged; model errors give the fallback script.
pub struct OllamaScriptGenerator {
    model: Box<dyn TextModel>,
}

impl OllamaScriptGenerator {
    pub fn new(model: Box<dyn TextModel>) -> Self {
        Self { model }
    }
}

impl ScriptGenerator for OllamaScriptGenerator {
    fn generate(&self, topic: &str) -> Script {
        let prompt = format!("Educational video script about {topic}:\n\nScene 1: ");
        match self.model.generate(&prompt) {
            Ok(text) => {
                let preview: String = text.chars().take(100).collect();
                tracing::info!(topic, preview = %preview, "Generated script text");
                topic_script(topic)
            }
            Err(e) => {
                tracing::error!(topic, error = %e, "Script generation failed, using fallback");
                fallback_script(topic)
            }
        }
    }

    fn is_model_backed(&self) -> bool {
        true
    }
}

// ── Mock for testing ──────────────────────────────────────

/// Returns a fixed completion, or fails when built with `failing()`.
pub struct MockTextModel {
    response: Option<String>,
}

impl MockTextModel {
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { response: None }
    }
}

impl TextModel for MockTextModel {
    fn generate(&self, _prompt: &str) -> Result<String, VideoError> {
        self.response
            .clone()
            .ok_or_else(|| VideoError::Script("mock model offline".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_the_water_cycle() {
        let script = TemplateScriptGenerator.generate("volcanoes");
        assert_eq!(script.scenes.len(), 5);
        assert!(script.scenes[0].narration.contains("water cycle"));
        assert!(!TemplateScriptGenerator.is_model_backed());
    }

    #[test]
    fn model_success_uses_topic_template() {
        let gen = OllamaScriptGenerator::new(Box::new(MockTextModel::new("Scene 1: lava")));
        let script = gen.generate("volcanoes");
        assert_eq!(script, topic_script("volcanoes"));
        assert_eq!(script.scenes.len(), 4);
        assert_eq!(
            script.scenes[3].description,
            "Summary and conclusion about volcanoes"
        );
        assert!(gen.is_model_backed());
    }

    #[test]
    fn model_failure_uses_two_scene_fallback() {
        let gen = OllamaScriptGenerator::new(Box::new(MockTextModel::failing()));
        let script = gen.generate("tides");
        assert_eq!(script.scenes.len(), 2);
        assert_eq!(
            script.scenes[0].narration,
            "Let's explore tides and understand its key concepts."
        );
    }

    #[test]
    fn unreachable_ollama_is_an_http_error() {
        let client = OllamaClient::new("http://127.0.0.1:9", "llama3", 2).unwrap();
        assert!(matches!(client.generate("hi"), Err(VideoError::Http(_))));
    }

    #[test]
    fn script_json_shape() {
        let json = serde_json::to_value(fallback_script("x")).unwrap();
        assert_eq!(json["scenes"][1]["description"], "Visual examples and illustrations of x");
    }
}
