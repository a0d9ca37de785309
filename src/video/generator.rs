use std::path::PathBuf;

use super::types::{Narrator, Script, ScriptGenerator, VideoMerger, VideoSynthesizer};
use super::VideoError;

const DEFAULT_DESCRIPTION: &str = "Educational visual";

/// Finished video, ready to send as an attachment.
#[derive(Debug, Clone)]
pub struct GeneratedVideo {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub scene_count: usize,
}

/// `educational_video_<topic>.mp4` with spaces as underscores.
pub fn download_name(topic: &str) -> String {
    format!("educational_video_{}.mp4", topic.replace(' ', "_"))
}

/// Script, per-scene clip and narration, then merge. All intermediate files
/// live in a temp dir dropped when `generate` returns.
pub struct VideoPipeline {
    script: Box<dyn ScriptGenerator>,
    synthesizer: Box<dyn VideoSynthesizer>,
    narrator: Box<dyn Narrator>,
    merger: Box<dyn VideoMerger>,
}

impl VideoPipeline {
    pub fn new(
        script: Box<dyn ScriptGenerator>,
        synthesizer: Box<dyn VideoSynthesizer>,
        narrator: Box<dyn Narrator>,
        merger: Box<dyn VideoMerger>,
    ) -> Self {
        Self {
            script,
            synthesizer,
            narrator,
            merger,
        }
    }

    pub fn script_for(&self, topic: &str) -> Script {
        self.script.generate(topic)
    }

    pub fn script_generator(&self) -> &dyn ScriptGenerator {
        self.script.as_ref()
    }

    pub fn synthesizer(&self) -> &dyn VideoSynthesizer {
        self.synthesizer.as_ref()
    }

    pub fn narrator(&self) -> &dyn Narrator {
        self.narrator.as_ref()
    }

    pub fn generate(&self, topic: &str) -> Result<GeneratedVideo, VideoError> {
        let work = tempfile::Builder::new().prefix("labscope-video-").tempdir()?;
        tracing::info!(topic, dir = %work.path().display(), "Generating video");

        let script = self.script.generate(topic);
        if script.scenes.is_empty() {
            return Err(VideoError::NoScenes);
        }
        let total = script.scenes.len();
        tracing::info!(scenes = total, "Script ready");

        let mut videos: Vec<PathBuf> = Vec::new();
        let mut audios: Vec<PathBuf> = Vec::new();
        for (i, scene) in script.scenes.iter().enumerate() {
            tracing::info!(scene = i + 1, total, "Processing scene");

            let video_path = work.path().join(format!("scene_{i}_video.mp4"));
            let description = match scene.description.trim() {
                "" => DEFAULT_DESCRIPTION,
                d => d,
            };
            match self.synthesizer.synthesize(description, &video_path) {
                Ok(()) => videos.push(video_path),
                Err(e) => tracing::warn!(scene = i, error = %e, "Scene clip skipped"),
            }

            let audio_path = work.path().join(format!("scene_{i}_audio.wav"));
            match self.narrator.narrate(&scene.narration, &audio_path) {
                Ok(path) if path.exists() => audios.push(path),
                Ok(path) => {
                    tracing::warn!(scene = i, path = %path.display(), "Narration file missing")
                }
                Err(e) => tracing::warn!(scene = i, error = %e, "Scene narration skipped"),
            }
        }

        if videos.is_empty() {
            return Err(VideoError::NoClips);
        }

        let final_path = work.path().join("final_video.mp4");
        self.merger.merge(&videos, &audios, &final_path)?;
        if !final_path.exists() {
            return Err(VideoError::Merge("Final video file was not created".into()));
        }
        let bytes = std::fs::read(&final_path)?;

        tracing::info!(bytes = bytes.len(), "Video generated");
        Ok(GeneratedVideo {
            file_name: download_name(topic),
            bytes,
            scene_count: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::merge::MockMerger;
    use crate::video::narrator::SilentNarrator;
    use crate::video::script::TemplateScriptGenerator;
    use crate::video::synth::MockSynthesizer;

    struct EmptyScript;

    impl ScriptGenerator for EmptyScript {
        fn generate(&self, _topic: &str) -> Script {
            Script::default()
        }
    }

    fn pipeline(script: Box<dyn ScriptGenerator>, synth: MockSynthesizer) -> VideoPipeline {
        VideoPipeline::new(
            script,
            Box::new(synth),
            Box::new(SilentNarrator),
            Box::new(MockMerger),
        )
    }

    #[test]
    fn download_name_replaces_spaces() {
        assert_eq!(
            download_name("water cycle basics"),
            "educational_video_water_cycle_basics.mp4"
        );
    }

    #[test]
    fn generates_from_every_scene() {
        let video = pipeline(Box::new(TemplateScriptGenerator), MockSynthesizer::new())
            .generate("water cycle")
            .unwrap();
        assert_eq!(video.scene_count, 5);
        assert_eq!(video.file_name, "educational_video_water_cycle.mp4");
        // Mock merger output starts with the first scene description.
        assert!(video.bytes.starts_with(b"A beautiful sunrise"));
    }

    #[test]
    fn empty_script_is_no_scenes() {
        let result = pipeline(Box::new(EmptyScript), MockSynthesizer::new()).generate("x");
        assert!(matches!(result, Err(VideoError::NoScenes)));
    }

    #[test]
    fn all_clips_failing_is_no_clips() {
        let result =
            pipeline(Box::new(TemplateScriptGenerator), MockSynthesizer::failing()).generate("x");
        assert!(matches!(result, Err(VideoError::NoClips)));
    }
}
