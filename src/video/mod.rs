//! Topic-to-video pipeline.
//!
//! A script generator writes a few scenes, each scene becomes a short clip
//! plus a narration track, and ffmpeg stitches everything into one MP4.
//! Every external capability has a local stand-in so the pipeline always
//! produces something.

pub mod capabilities;
pub mod generator;
pub mod merge;
pub mod narrator;
pub mod script;
pub mod synth;
pub mod types;

use std::process::Command;

pub use capabilities::{ModelsLoaded, VideoCapabilities};
pub use generator::{download_name, GeneratedVideo, VideoPipeline};
pub use types::*;

#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("{tool} failed: {reason}")]
    Tool { tool: String, reason: String },

    #[error("Script generation failed: {0}")]
    Script(String),

    #[error("Clip synthesis failed: {0}")]
    Synthesis(String),

    #[error("Narration failed: {0}")]
    Narration(String),

    #[error("Failed to generate script")]
    NoScenes,

    #[error("Failed to generate any video clips")]
    NoClips,

    #[error("Failed to create final video: {0}")]
    Merge(String),
}

impl From<reqwest::Error> for VideoError {
    fn from(e: reqwest::Error) -> Self {
        VideoError::Http(e.to_string())
    }
}

/// Run an external tool to completion, turning a spawn failure or non-zero
/// exit into `VideoError::Tool` with the tail of stderr.
pub(crate) fn run_tool(cmd: &mut Command) -> Result<(), VideoError> {
    let tool = cmd.get_program().to_string_lossy().into_owned();
    let out = cmd.output().map_err(|e| VideoError::Tool {
        tool: tool.clone(),
        reason: e.to_string(),
    })?;
    if out.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&out.stderr);
    let tail: Vec<&str> = stderr.lines().rev().take(3).collect();
    Err(VideoError::Tool {
        tool,
        reason: format!(
            "exit {}: {}",
            out.status.code().unwrap_or(-1),
            tail.into_iter().rev().collect::<Vec<_>>().join(" | ")
        ),
    })
}

/// `true` when `<binary> <probe_arg>` runs and exits cleanly.
pub(crate) fn tool_available(binary: &std::path::Path, probe_arg: &str) -> bool {
    Command::new(binary)
        .arg(probe_arg)
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}
