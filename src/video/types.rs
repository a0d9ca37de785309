use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::VideoError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub narration: String,
}

impl Scene {
    pub fn new(description: impl Into<String>, narration: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            narration: narration.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

/// Writes the scene list for a topic.
pub trait ScriptGenerator: Send + Sync {
    fn generate(&self, topic: &str) -> Script;

    /// `false` for the canned template generator.
    fn is_model_backed(&self) -> bool {
        false
    }
}

/// Renders one scene description into a video file at `output`.
pub trait VideoSynthesizer: Send + Sync {
    fn synthesize(&self, description: &str, output: &Path) -> Result<(), VideoError>;

    fn is_model_backed(&self) -> bool {
        false
    }
}

/// Speaks a narration into an audio file. Returns the path actually written,
/// which may differ from `output` in extension.
pub trait Narrator: Send + Sync {
    fn narrate(&self, text: &str, output: &Path) -> Result<PathBuf, VideoError>;

    fn is_model_backed(&self) -> bool {
        false
    }
}

/// Concatenates clips and narration into the final video at `output`.
pub trait VideoMerger: Send + Sync {
    fn merge(&self, videos: &[PathBuf], audios: &[PathBuf], output: &Path)
        -> Result<(), VideoError>;
}
