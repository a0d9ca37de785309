use serde::{Deserialize, Serialize};

use super::generator::VideoPipeline;
use super::merge::FfmpegMerger;
use super::narrator::{EspeakNarrator, FallbackNarrator, SilentNarrator};
use super::script::{OllamaClient, OllamaScriptGenerator, TemplateScriptGenerator};
use super::synth::{
    FallbackSynthesizer, FalSynthesizer, FfmpegMockSynthesizer, WikipediaImageSynthesizer,
};
use super::types::{Narrator, ScriptGenerator, VideoSynthesizer};
use crate::config::AppConfig;

const OLLAMA_TIMEOUT_SECS: u64 = 120;

/// Which stages run on a real model rather than a local stand-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsLoaded {
    pub gpt2: bool,
    pub text_to_video: bool,
    pub tts: bool,
}

/// The capability set built once at start-up.
pub struct VideoCapabilities {
    pub pipeline: VideoPipeline,
    pub models_loaded: ModelsLoaded,
}

impl VideoCapabilities {
    pub fn from_pipeline(pipeline: VideoPipeline) -> Self {
        let models_loaded = ModelsLoaded {
            gpt2: pipeline.script_generator().is_model_backed(),
            text_to_video: pipeline.synthesizer().is_model_backed(),
            tts: pipeline.narrator().is_model_backed(),
        };
        Self {
            pipeline,
            models_loaded,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let pipeline = VideoPipeline::new(
            script_generator(config),
            synthesizer(config),
            narrator(config),
            Box::new(FfmpegMerger::new(&config.ffmpeg_bin)),
        );
        let caps = Self::from_pipeline(pipeline);
        tracing::info!(
            script_model = caps.models_loaded.gpt2,
            text_to_video = caps.models_loaded.text_to_video,
            tts = caps.models_loaded.tts,
            "Video capabilities ready"
        );
        caps
    }
}

fn script_generator(config: &AppConfig) -> Box<dyn ScriptGenerator> {
    let Some(model) = config.ollama_model.as_deref() else {
        tracing::info!("No script model configured, using template script");
        return Box::new(TemplateScriptGenerator);
    };
    match OllamaClient::new(&config.ollama_url, model, OLLAMA_TIMEOUT_SECS) {
        Ok(client) => {
            tracing::info!(model, url = %config.ollama_url, "Using Ollama for scripts");
            Box::new(OllamaScriptGenerator::new(Box::new(client)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Ollama client setup failed, using template script");
            Box::new(TemplateScriptGenerator)
        }
    }
}

/// Offline chain: Wikipedia image clip when enabled, then the plain clip.
fn local_synthesizer(config: &AppConfig) -> Box<dyn VideoSynthesizer> {
    let plain = Box::new(FfmpegMockSynthesizer::new(&config.ffmpeg_bin));
    if !config.image_search {
        return plain;
    }
    match WikipediaImageSynthesizer::new(&config.ffmpeg_bin) {
        Ok(wiki) => Box::new(FallbackSynthesizer::new(Box::new(wiki), plain)),
        Err(e) => {
            tracing::warn!(error = %e, "Image search client setup failed");
            plain
        }
    }
}

fn synthesizer(config: &AppConfig) -> Box<dyn VideoSynthesizer> {
    let local = local_synthesizer(config);
    let Some(key) = config.fal_key.as_deref() else {
        tracing::info!("Using local text-to-video clips");
        return local;
    };
    match FalSynthesizer::new(key) {
        Ok(fal) => {
            tracing::info!("Configuring WAN 2.2 T2V via FAL API");
            Box::new(FallbackSynthesizer::new(Box::new(fal), local))
        }
        Err(e) => {
            tracing::error!(error = %e, "FAL client setup failed, using local clips");
            local
        }
    }
}

fn narrator(config: &AppConfig) -> Box<dyn Narrator> {
    let espeak = EspeakNarrator::new(&config.espeak_bin);
    if espeak.is_available() {
        tracing::info!(binary = %config.espeak_bin.display(), "Using espeak narration");
        Box::new(FallbackNarrator::new(Box::new(espeak), Box::new(SilentNarrator)))
    } else {
        tracing::info!("No TTS binary found, narration will be silent");
        Box::new(SilentNarrator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::merge::MockMerger;
    use crate::video::script::MockTextModel;
    use crate::video::synth::MockSynthesizer;

    fn offline_config() -> AppConfig {
        AppConfig {
            ollama_model: None,
            fal_key: None,
            espeak_bin: "labscope-no-such-espeak".into(),
            ffmpeg_bin: "labscope-no-such-ffmpeg".into(),
            image_search: false,
            ..AppConfig::default()
        }
    }

    #[test]
    fn offline_config_reports_no_models() {
        let caps = VideoCapabilities::from_config(&offline_config());
        assert_eq!(
            caps.models_loaded,
            ModelsLoaded {
                gpt2: false,
                text_to_video: false,
                tts: false
            }
        );
    }

    #[test]
    fn configured_services_report_loaded() {
        let config = AppConfig {
            ollama_model: Some("llama3".into()),
            fal_key: Some("key".into()),
            ..offline_config()
        };
        let caps = VideoCapabilities::from_config(&config);
        assert!(caps.models_loaded.gpt2);
        assert!(caps.models_loaded.text_to_video);
        assert!(!caps.models_loaded.tts);
    }

    #[test]
    fn image_search_stays_a_local_stand_in() {
        let config = AppConfig {
            image_search: true,
            ..offline_config()
        };
        let caps = VideoCapabilities::from_config(&config);
        assert!(!caps.models_loaded.text_to_video);
        assert!(!local_synthesizer(&config).is_model_backed());
    }

    #[test]
    fn flags_follow_the_pipeline_parts() {
        let pipeline = VideoPipeline::new(
            Box::new(OllamaScriptGenerator::new(Box::new(MockTextModel::new("ok")))),
            Box::new(MockSynthesizer::new()),
            Box::new(SilentNarrator),
            Box::new(MockMerger),
        );
        let caps = VideoCapabilities::from_pipeline(pipeline);
        assert!(caps.models_loaded.gpt2);
        assert!(!caps.models_loaded.text_to_video);

        let json = serde_json::to_value(caps.models_loaded).unwrap();
        assert_eq!(json["gpt2"], true);
        assert_eq!(json["tts"], false);
    }
}
