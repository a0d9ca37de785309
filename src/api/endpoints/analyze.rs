//! `POST /analyze`: OCR an uploaded report and build the full analysis.

use std::collections::BTreeMap;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::{prefix_chars, ApiError};
use crate::api::types::ReportContext;
use crate::charts::ChartSet;
use crate::intelligence::resources::{food_recommendations, relevant_news, FoodRecommendation, NewsItem};
use crate::intelligence::{generate_insights, health_tips, recommend, Insight, SpecialistRecommendations, TipCard};
use crate::models::ComparisonResult;
use crate::pipeline::extraction::UploadedReport;
use crate::pipeline::lab_values::analyze_text;

/// OCR text echoed back on success.
pub const EXTRACTED_TEXT_CHARS: usize = 500;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub results: Vec<ComparisonResult>,
    pub insights: Vec<Insight>,
    pub chart: Option<ChartSet>,
    pub doctor_recommendations: SpecialistRecommendations,
    pub health_tips: Vec<TipCard>,
    pub relevant_news: Vec<NewsItem>,
    pub food_recommendations: BTreeMap<String, FoodRecommendation>,
    pub extracted_text: String,
}

pub async fn analyze(
    State(ctx): State<ReportContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::BadRequest("No file uploaded".into()))?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => return Err(ApiError::TooLarge),
            Err(e) => return Err(ApiError::BadRequest(format!("Malformed upload: {e}"))),
        };
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::TooLarge
            } else {
                ApiError::BadRequest(format!("Malformed upload: {e}"))
            }
        })?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) = upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".into()))?;
    if filename.is_empty() {
        return Err(ApiError::BadRequest("No file selected".into()));
    }
    let report = UploadedReport::new(&filename, bytes)?;

    let extractor = ctx.extractor.clone();
    let extracted = tokio::task::spawn_blocking(move || extractor.extract(&report)).await??;
    let text = extracted.text;
    tracing::info!(chars = text.len(), pages = extracted.page_count, "Report text extracted");
    tracing::debug!(preview = %prefix_chars(&text, EXTRACTED_TEXT_CHARS), "OCR preview");

    let Some(results) = analyze_text(&text, ctx.definitions, &ctx.reference) else {
        tracing::warn!("No medical values detected");
        return Err(ApiError::no_values(&text));
    };
    tracing::info!(values = results.len(), "Values classified");

    Ok(Json(build_response(&ctx, results, &text)))
}

fn build_response(ctx: &ReportContext, results: Vec<ComparisonResult>, text: &str) -> AnalyzeResponse {
    let food = results
        .iter()
        .filter(|r| r.status.is_abnormal())
        .filter_map(|r| {
            let rec = food_recommendations(&r.test, r.status.as_str());
            (!rec.is_empty()).then(|| (r.test.clone(), rec))
        })
        .collect();

    AnalyzeResponse {
        success: true,
        insights: generate_insights(&results),
        chart: ctx.charts.render(&results),
        doctor_recommendations: recommend(&results),
        health_tips: health_tips(&results),
        relevant_news: relevant_news(&results),
        food_recommendations: food,
        extracted_text: prefix_chars(text, EXTRACTED_TEXT_CHARS),
        results,
    }
}
