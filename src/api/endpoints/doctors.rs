//! Specialist referral endpoints.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::intelligence::resources::{
    emergency_signs, lifestyle_modifications, relevant_news, EmergencySigns,
    LifestyleModification, NewsItem,
};
use crate::intelligence::{
    detected_conditions, finder_urls, health_tips, recommend, search_keywords, FinderUrls,
    SpecialistRecommendations, TipCard, PRIMARY_CARE,
};
use crate::models::{ComparisonResult, Urgency};

// ═══════════════════════════════════════════════════════════
// POST /get_doctor_suggestions
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct SuggestionsRequest {
    #[serde(default)]
    pub results: Vec<ComparisonResult>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub success: bool,
    pub recommendations: SpecialistRecommendations,
    pub health_tips: Vec<TipCard>,
    pub lifestyle: Vec<LifestyleModification>,
    pub news: Vec<NewsItem>,
    /// Present (non-null) only for urgent and emergency cases.
    pub emergency_info: Option<EmergencySigns>,
}

pub async fn suggestions(
    Json(payload): Json<SuggestionsRequest>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let results = payload.results;
    if results.is_empty() {
        return Err(ApiError::BadRequest("No test results provided".into()));
    }

    let recommendations = recommend(&results);
    let emergency_info = match recommendations.urgency {
        Urgency::Urgent | Urgency::Emergency => Some(emergency_signs()),
        Urgency::Routine => None,
    };
    tracing::info!(
        urgency = recommendations.urgency.as_str(),
        specialists = recommendations.specialists.len(),
        "Doctor suggestions built"
    );

    Ok(Json(SuggestionsResponse {
        success: true,
        health_tips: health_tips(&results),
        lifestyle: lifestyle_modifications(&detected_conditions(&results)),
        news: relevant_news(&results),
        recommendations,
        emergency_info,
    }))
}

// ═══════════════════════════════════════════════════════════
// POST /find_doctors
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct FindDoctorsRequest {
    #[serde(default)]
    pub specialist: Option<String>,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct FindDoctorsResponse {
    pub success: bool,
    pub specialist: String,
    pub location: String,
    pub search_urls: FinderUrls,
    pub keywords: Vec<String>,
}

pub async fn find(
    Json(payload): Json<FindDoctorsRequest>,
) -> Result<Json<FindDoctorsResponse>, ApiError> {
    let specialist = payload
        .specialist
        .unwrap_or_else(|| PRIMARY_CARE.to_string());
    let location = payload.location;

    Ok(Json(FindDoctorsResponse {
        success: true,
        search_urls: finder_urls(&specialist, &location),
        keywords: search_keywords([specialist.as_str()]),
        specialist,
        location,
    }))
}
