pub mod api;
pub mod charts;
pub mod chat;
pub mod config;
pub mod intelligence;
pub mod models;
pub mod pipeline;
pub mod video;

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::api::{report_router, video_router, ReportContext, VideoContext};
use crate::charts::PlotlyRenderer;
use crate::chat::{ChatBot, ChatError};
use crate::config::{AppConfig, ConfigError};
use crate::pipeline::extraction::{
    OtsuPreprocessor, PdfiumRenderer, ReportTextExtractor, TesseractCli,
};
use crate::pipeline::lab_values::{ReferenceError, ReferenceTable, TEST_DEFINITIONS};
use crate::video::VideoCapabilities;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Server(#[from] api::ServerError),
    #[error("Start-up task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// OCR front-end with PDF support when PDFium can be loaded.
fn build_extractor(config: &AppConfig) -> ReportTextExtractor {
    let tesseract = TesseractCli::new(&config.tesseract_bin);
    if !tesseract.is_available() {
        tracing::warn!(
            binary = %config.tesseract_bin.display(),
            "Tesseract not found, /analyze will fail until it is installed"
        );
    }
    let extractor = ReportTextExtractor::new(Box::new(tesseract), Box::new(OtsuPreprocessor));
    match PdfiumRenderer::new() {
        Ok(renderer) => extractor.with_pdf_renderer(Box::new(renderer)),
        Err(e) => {
            tracing::warn!(error = %e, "PDFium unavailable, PDF uploads disabled");
            extractor
        }
    }
}

pub fn build_report_context(config: &AppConfig) -> Result<ReportContext, StartupError> {
    let reference = ReferenceTable::load_or_bundled(&config.reference_csv)?;
    tracing::info!(rows = reference.len(), "Reference table ready");

    Ok(ReportContext::new(
        reference,
        TEST_DEFINITIONS,
        Arc::new(build_extractor(config)),
        Arc::new(PlotlyRenderer::new()),
        ChatBot::bundled()?,
    ))
}

pub fn build_video_context(config: &AppConfig) -> VideoContext {
    VideoContext::new(VideoCapabilities::from_config(config))
}

/// Start both services and run until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    let report = build_report_context(&config)?;
    // Probes external tools, keep it off the runtime threads.
    let video_config = config.clone();
    let video = tokio::task::spawn_blocking(move || build_video_context(&video_config)).await?;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        api::server::ctrl_c().await;
        let _ = stop_tx.send(true);
    });
    let stopped = |mut rx: watch::Receiver<bool>| async move {
        let _ = rx.changed().await;
    };

    // Blocking HTTP clients inside must be dropped off the runtime.
    let caps = video.caps.clone();
    let served = tokio::try_join!(
        api::serve(
            "report",
            config.report_addr,
            report_router(report),
            stopped(stop_rx.clone()),
        ),
        api::serve(
            "video",
            config.video_addr,
            video_router(video),
            stopped(stop_rx),
        ),
    );
    tokio::task::spawn_blocking(move || drop(caps)).await?;
    served?;

    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
