use std::path::{Path, PathBuf};
use std::process::Command;

use super::types::Narrator;
use super::{run_tool, tool_available, VideoError};

pub const SILENCE_SAMPLE_RATE: u32 = 22_050;
pub const SILENCE_SECONDS: u32 = 3;
const DEFAULT_NARRATION: &str = "This is an educational narration generated by the app.";
const SPEECH_RATE_WPM: u32 = 175;

/// `output` with a `.wav` extension, unless it already has one.
fn wav_path(output: &Path) -> PathBuf {
    let is_wav = output
        .extension()
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);
    if is_wav {
        output.to_path_buf()
    } else {
        let mut name = output.as_os_str().to_owned();
        name.push(".wav");
        PathBuf::from(name)
    }
}

/// Offline speech through the `espeak-ng` command line.
pub struct EspeakNarrator {
    binary: PathBuf,
}

impl EspeakNarrator {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        tool_available(&self.binary, "--version")
    }
}

impl Narrator for EspeakNarrator {
    fn narrate(&self, text: &str, output: &Path) -> Result<PathBuf, VideoError> {
        let wav = wav_path(output);
        let text = match text.trim() {
            "" => DEFAULT_NARRATION,
            t => t,
        };
        run_tool(
            Command::new(&self.binary)
                .arg("-w")
                .arg(&wav)
                .arg("-s")
                .arg(SPEECH_RATE_WPM.to_string())
                .arg("-v")
                .arg("en")
                .arg("--")
                .arg(text),
        )?;

        let written = std::fs::metadata(&wav).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            return Err(VideoError::Narration(format!(
                "{} wrote no audio",
                self.binary.display()
            )));
        }
        Ok(wav)
    }

    fn is_model_backed(&self) -> bool {
        true
    }
}

/// Three seconds of 16-bit mono silence, whatever the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    fn narrate(&self, _text: &str, output: &Path) -> Result<PathBuf, VideoError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: SILENCE_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let to_err = |e: hound::Error| VideoError::Narration(e.to_string());

        let mut writer = hound::WavWriter::create(output, spec).map_err(to_err)?;
        for _ in 0..SILENCE_SAMPLE_RATE * SILENCE_SECONDS {
            writer.write_sample(0i16).map_err(to_err)?;
        }
        writer.finalize().map_err(to_err)?;
        Ok(output.to_path_buf())
    }
}

/// Tries `primary`, then `fallback` on any error.
pub struct FallbackNarrator {
    primary: Box<dyn Narrator>,
    fallback: Box<dyn Narrator>,
}

impl FallbackNarrator {
    pub fn new(primary: Box<dyn Narrator>, fallback: Box<dyn Narrator>) -> Self {
        Self { primary, fallback }
    }
}

impl Narrator for FallbackNarrator {
    fn narrate(&self, text: &str, output: &Path) -> Result<PathBuf, VideoError> {
        match self.primary.narrate(text, output) {
            Ok(path) => Ok(path),
            Err(e) => {
                tracing::warn!(error = %e, "Narration failed, falling back to silent audio");
                self.fallback.narrate(text, output)
            }
        }
    }

    fn is_model_backed(&self) -> bool {
        self.primary.is_model_backed()
    }
}
