//! `POST /chat`: keyword FAQ answers, personalised when report data is sent.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ReportContext;
use crate::chat::ReportData;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub report_data: Option<ReportData>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
}

pub async fn send(
    State(ctx): State<ReportContext>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    tracing::debug!(
        chars = payload.question.len(),
        with_report = payload.report_data.is_some(),
        "Chat question"
    );
    let response = ctx
        .chat
        .respond(&payload.question, payload.report_data.as_ref());
    Ok(Json(ChatResponse {
        success: true,
        response,
    }))
}
