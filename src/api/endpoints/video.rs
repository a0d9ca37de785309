//! Video service endpoints: `/generate` and `/test-script/:topic`.

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::VideoContext;
use crate::video::Script;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    pub topic: String,
}

/// `POST /generate`: form field `topic`, answers with an MP4 attachment.
pub async fn generate(
    State(ctx): State<VideoContext>,
    form: Result<Form<GenerateForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let topic = form
        .map(|Form(f)| f.topic)
        .unwrap_or_default()
        .trim()
        .to_string();
    if topic.is_empty() {
        tracing::error!("No topic provided");
        return Err(ApiError::BadRequest("Topic is required".into()));
    }
    tracing::info!(%topic, "Generating content for topic");

    let caps = ctx.caps.clone();
    let video = tokio::task::spawn_blocking(move || caps.pipeline.generate(&topic)).await??;

    let disposition = HeaderValue::from_str(&attachment_header(&video.file_name))
        .map_err(|e| ApiError::Internal(format!("Bad download name: {e}")))?;
    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static("video/mp4")),
            (CONTENT_DISPOSITION, disposition),
        ],
        video.bytes,
    )
        .into_response())
}

/// `attachment; filename="..."` with quotes, backslashes and anything
/// outside printable ASCII made safe for a header.
pub fn attachment_header(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

#[derive(Debug, Serialize)]
pub struct TestScriptResponse {
    pub success: bool,
    pub topic: String,
    pub script: Script,
}

/// `GET /test-script/:topic`: the script alone, no rendering.
pub async fn test_script(
    State(ctx): State<VideoContext>,
    Path(topic): Path<String>,
) -> Result<Json<TestScriptResponse>, ApiError> {
    tracing::info!(%topic, "Testing script generation");
    let caps = ctx.caps.clone();
    let for_topic = topic.clone();
    let script = tokio::task::spawn_blocking(move || caps.pipeline.script_for(&for_topic)).await?;
    Ok(Json(TestScriptResponse {
        success: true,
        topic,
        script,
    }))
}
