use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::types::VideoSynthesizer;
use super::{run_tool, VideoError};
use crate::config::{APP_NAME, APP_VERSION};

pub const FAL_ENDPOINT: &str = "https://fal.run/fal-ai/wans/api/generate";
const FAL_MODEL: &str = "Wan2.2-T2V-A14B";
const FAL_TIMEOUT_SECS: u64 = 60;

/// Length of one locally rendered clip.
pub const CLIP_SECONDS: u32 = 3;
const CLIP_SIZE: u32 = 512;
const CLIP_FPS: u32 = 8;
const BACKGROUNDS: [&str; 4] = ["0x4682B4", "0x6496C8", "0x78AADC", "0x5A8CBE"];

pub const WIKIPEDIA_API: &str = "https://en.wikipedia.org/w/api.php";
const WIKIPEDIA_TIMEOUT_SECS: u64 = 10;
const PAN_FPS: u32 = 24;
/// Zoom gained per output frame: 6 % per second at `PAN_FPS`.
const PAN_ZOOM_STEP: f64 = 0.0025;

// ═══════════════════════════════════════════════════════════
// FAL text-to-video
// ═══════════════════════════════════════════════════════════

#[derive(Serialize)]
struct FalRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    seconds: u32,
    width: u32,
    height: u32,
    fps: u32,
}

#[derive(Deserialize)]
struct FalResponse {
    video_url: Option<String>,
    url: Option<String>,
}

/// WAN 2.2 text-to-video through the FAL hosted API.
pub struct FalSynthesizer {
    api_key: String,
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl FalSynthesizer {
    pub fn new(api_key: &str) -> Result<Self, VideoError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(FAL_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            api_key: api_key.to_string(),
            endpoint: FAL_ENDPOINT.to_string(),
            client,
        })
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

impl VideoSynthesizer for FalSynthesizer {
    fn synthesize(&self, description: &str, output: &Path) -> Result<(), VideoError> {
        tracing::info!("Calling FAL WAN 2.2 T2V");
        let body = FalRequest {
            prompt: description,
            model: FAL_MODEL,
            seconds: CLIP_SECONDS,
            width: 1280,
            height: 720,
            fps: 24,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&body)
            .send()?
            .error_for_status()?;

        let parsed: FalResponse = response.json()?;
        let video_url = parsed.video_url.or(parsed.url).ok_or_else(|| {
            VideoError::Synthesis("FAL response missing video_url".into())
        })?;

        let bytes = self.client.get(&video_url).send()?.error_for_status()?.bytes()?;
        std::fs::write(output, &bytes)?;
        tracing::debug!(bytes = bytes.len(), "Downloaded FAL clip");
        Ok(())
    }

    fn is_model_backed(&self) -> bool {
        true
    }
}

// ═══════════════════════════════════════════════════════════
// Wikipedia still image, slow zoom
// ═══════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct WikiResponse {
    query: Option<WikiQuery>,
}

#[derive(Deserialize)]
struct WikiQuery {
    #[serde(default)]
    pages: BTreeMap<String, WikiPage>,
}

#[derive(Deserialize)]
struct WikiPage {
    original: Option<WikiImage>,
}

#[derive(Deserialize)]
struct WikiImage {
    source: String,
}

/// Looks up the lead image of the best Wikipedia search hit for the scene
/// description and renders it as a 3 s 1280×720 clip with a slow zoom and
/// short fades.
pub struct WikipediaImageSynthesizer {
    endpoint: String,
    ffmpeg: PathBuf,
    client: reqwest::blocking::Client,
}

impl WikipediaImageSynthesizer {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Result<Self, VideoError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(WIKIPEDIA_TIMEOUT_SECS))
            .user_agent(format!("{APP_NAME}/{APP_VERSION}"))
            .build()?;
        Ok(Self {
            endpoint: WIKIPEDIA_API.to_string(),
            ffmpeg: ffmpeg.into(),
            client,
        })
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// URL of the original-size lead image of the top search hit, if any.
    pub fn image_url(&self, query: &str) -> Result<Option<String>, VideoError> {
        let url = reqwest::Url::parse_with_params(
            &self.endpoint,
            [
                ("action", "query"),
                ("format", "json"),
                ("prop", "pageimages"),
                ("piprop", "original"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", "1"),
            ],
        )
        .map_err(|e| VideoError::Http(e.to_string()))?;

        let parsed: WikiResponse = self.client.get(url).send()?.error_for_status()?.json()?;
        Ok(parsed
            .query
            .into_iter()
            .flat_map(|q| q.pages.into_values())
            .find_map(|page| page.original.map(|img| img.source)))
    }

    /// Saves the image next to `output`, keeping the URL's extension.
    pub fn download(&self, image_url: &str, output: &Path) -> Result<PathBuf, VideoError> {
        let bytes = self.client.get(image_url).send()?.error_for_status()?.bytes()?;
        let path = output.with_extension(format!("source.{}", image_extension(image_url)));
        std::fs::write(&path, &bytes)?;
        tracing::debug!(bytes = bytes.len(), path = %path.display(), "Downloaded scene image");
        Ok(path)
    }

    fn render_command(&self, image: &Path, output: &Path) -> Command {
        let fade_out = f64::from(CLIP_SECONDS) - 0.25;
        let filter = format!(
            "scale=1280:720:force_original_aspect_ratio=increase,crop=1280:720,\
             zoompan=z='1+{PAN_ZOOM_STEP}*on':x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':d=1:s=1280x720:fps={PAN_FPS},\
             fade=t=in:st=0:d=0.25,fade=t=out:st={fade_out}:d=0.25,setsar=1"
        );
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-y", "-loglevel", "error", "-loop", "1", "-framerate"])
            .arg(PAN_FPS.to_string())
            .arg("-i")
            .arg(image)
            .arg("-vf")
            .arg(filter)
            .arg("-t")
            .arg(CLIP_SECONDS.to_string())
            .args(["-an", "-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .arg(output);
        cmd
    }
}

/// Short alphanumeric extension from the URL path, `jpg` otherwise.
fn image_extension(image_url: &str) -> String {
    reqwest::Url::parse(image_url)
        .ok()
        .and_then(|url| {
            Path::new(url.path())
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
        })
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| "jpg".to_string())
}

impl VideoSynthesizer for WikipediaImageSynthesizer {
    fn synthesize(&self, description: &str, output: &Path) -> Result<(), VideoError> {
        let image_url = self
            .image_url(description)?
            .ok_or_else(|| VideoError::Synthesis("No related image found".into()))?;
        tracing::info!(url = %image_url, "Using Wikipedia image for scene");

        let image = self.download(&image_url, output)?;
        let rendered = run_tool(&mut self.render_command(&image, output));
        let _ = std::fs::remove_file(&image);
        rendered
    }
}

// ═══════════════════════════════════════════════════════════
// Local ffmpeg clip
// ═══════════════════════════════════════════════════════════

/// Renders a short placeholder clip with ffmpeg's `lavfi` sources: a solid
/// background, a white square sliding along the bottom and a caption made
/// of the first words of the description. When the caption cannot be drawn
/// (no fonts), the clip is rendered without it.
pub struct FfmpegMockSynthesizer {
    ffmpeg: PathBuf,
}

impl FfmpegMockSynthesizer {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    fn command(&self, background: &str, caption_file: Option<&Path>, output: &Path) -> Command {
        let mut filter = "[0][1]overlay=x='50+t*100':y=H-100:shortest=1".to_string();
        if let Some(file) = caption_file {
            filter.push_str(&format!(
                ",drawtext=textfile='{}':fontcolor=white:fontsize=24:x=(w-text_w)/2:y=(h-text_h)/2",
                escape_filter_path(file)
            ));
        }

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-y", "-loglevel", "error", "-f", "lavfi", "-i"])
            .arg(format!(
                "color=c={background}:s={CLIP_SIZE}x{CLIP_SIZE}:d={CLIP_SECONDS}:r={CLIP_FPS}"
            ))
            .args(["-f", "lavfi", "-i"])
            .arg(format!("color=c=white:s=50x50:d={CLIP_SECONDS}:r={CLIP_FPS}"))
            .arg("-filter_complex")
            .arg(&filter)
            .args(["-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .arg(output);
        cmd
    }
}

/// First four words, cut to 25 characters with an ellipsis.
pub fn caption(description: &str) -> String {
    let words = description.split_whitespace().take(4).collect::<Vec<_>>().join(" ");
    if words.chars().count() > 25 {
        format!("{}...", words.chars().take(25).collect::<String>())
    } else {
        words
    }
}

/// Escape a path for use inside a quoted filtergraph option.
fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

impl VideoSynthesizer for FfmpegMockSynthesizer {
    fn synthesize(&self, description: &str, output: &Path) -> Result<(), VideoError> {
        let background = BACKGROUNDS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(BACKGROUNDS[0]);

        let caption_file = output.with_extension("caption.txt");
        std::fs::write(&caption_file, caption(description))?;

        let with_caption = run_tool(&mut self.command(background, Some(&caption_file), output));
        let _ = std::fs::remove_file(&caption_file);
        match with_caption {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "Caption overlay failed, rendering plain clip");
                run_tool(&mut self.command(background, None, output))
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Chain
// ═══════════════════════════════════════════════════════════

/// Tries `primary`, then `fallback` on any error.
pub struct FallbackSynthesizer {
    primary: Box<dyn VideoSynthesizer>,
    fallback: Box<dyn VideoSynthesizer>,
}

impl FallbackSynthesizer {
    pub fn new(primary: Box<dyn VideoSynthesizer>, fallback: Box<dyn VideoSynthesizer>) -> Self {
        Self { primary, fallback }
    }
}

impl VideoSynthesizer for FallbackSynthesizer {
    fn synthesize(&self, description: &str, output: &Path) -> Result<(), VideoError> {
        match self.primary.synthesize(description, output) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "Clip synthesis failed, falling back");
                self.fallback.synthesize(description, output)
            }
        }
    }

    fn is_model_backed(&self) -> bool {
        self.primary.is_model_backed()
    }
}

// ── Mock for testing ──────────────────────────────────────

/// Writes the description bytes as the "clip", or fails on request.
pub struct MockSynthesizer {
    fail: bool,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSynthesizer for MockSynthesizer {
    fn synthesize(&self, description: &str, output: &Path) -> Result<(), VideoError> {
        if self.fail {
            return Err(VideoError::Synthesis("mock synthesizer offline".into()));
        }
        std::fs::write(output, description.as_bytes())?;
        Ok(())
    }
}
