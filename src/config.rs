use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Labscope";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest accepted report upload (16 MiB).
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Report upload extensions, lower-case.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "pdf"];

pub const DEFAULT_REPORT_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_VIDEO_ADDR: &str = "127.0.0.1:5001";
pub const DEFAULT_REFERENCE_CSV: &str = "resources/reference_data.csv";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "labscope=info,labscope_lib=info,tower_http=warn"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddr { var: &'static str, value: String },
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub report_addr: SocketAddr,
    pub video_addr: SocketAddr,
    pub reference_csv: PathBuf,
    pub tesseract_bin: PathBuf,
    pub ffmpeg_bin: PathBuf,
    pub espeak_bin: PathBuf,
    pub ollama_url: String,
    /// Unset means scripts come from the built-in template.
    pub ollama_model: Option<String>,
    /// Unset means clips are rendered locally.
    pub fal_key: Option<String>,
    /// Try a Wikipedia image clip before the plain local clip.
    pub image_search: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            report_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            video_addr: SocketAddr::from(([127, 0, 0, 1], 5001)),
            reference_csv: PathBuf::from(DEFAULT_REFERENCE_CSV),
            tesseract_bin: PathBuf::from("tesseract"),
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            espeak_bin: PathBuf::from("espeak-ng"),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: None,
            fal_key: None,
            image_search: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let addr = |var: &'static str, fallback: SocketAddr| match get(var) {
            None => Ok(fallback),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidAddr { var, value }),
        };

        Ok(Self {
            report_addr: addr("LABSCOPE_REPORT_ADDR", defaults.report_addr)?,
            video_addr: addr("LABSCOPE_VIDEO_ADDR", defaults.video_addr)?,
            reference_csv: get("LABSCOPE_REFERENCE_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.reference_csv),
            tesseract_bin: get("LABSCOPE_TESSERACT_BIN")
                .map(PathBuf::from)
                .unwrap_or(defaults.tesseract_bin),
            ffmpeg_bin: get("LABSCOPE_FFMPEG_BIN")
                .map(PathBuf::from)
                .unwrap_or(defaults.ffmpeg_bin),
            espeak_bin: get("LABSCOPE_ESPEAK_BIN")
                .map(PathBuf::from)
                .unwrap_or(defaults.espeak_bin),
            ollama_url: get("LABSCOPE_OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: get("LABSCOPE_OLLAMA_MODEL"),
            fal_key: get("FAL_KEY"),
            image_search: get("LABSCOPE_IMAGE_SEARCH")
                .map(|v| {
                    !matches!(
                        v.trim().to_lowercase().as_str(),
                        "0" | "false" | "off" | "no"
                    )
                })
                .unwrap_or(defaults.image_search),
        })
    }
}
