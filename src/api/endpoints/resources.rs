//! Static health content endpoints.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::intelligence::resources::{
    emergency_signs, food_recommendations, health_news, medical_resources, preventive_tips,
    EmergencySigns, FoodRecommendation, MedicalResources, NewsItem, PreventiveTips,
};

#[derive(Debug, Serialize)]
pub struct HealthResourcesResponse {
    pub success: bool,
    pub resources: MedicalResources,
    pub preventive_tips: PreventiveTips,
    pub health_news: Vec<NewsItem>,
    pub emergency_signs: EmergencySigns,
}

/// `GET /get_health_resources`
pub async fn health_resources() -> Json<HealthResourcesResponse> {
    Json(HealthResourcesResponse {
        success: true,
        resources: medical_resources(),
        preventive_tips: preventive_tips(),
        health_news: health_news(),
        emergency_signs: emergency_signs(),
    })
}

#[derive(Debug, Deserialize)]
pub struct FoodRequest {
    #[serde(default)]
    pub test_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FoodResponse {
    pub success: bool,
    pub test_name: String,
    pub status: String,
    pub recommendations: FoodRecommendation,
}

/// `POST /get_food_recommendations`
pub async fn food(Json(payload): Json<FoodRequest>) -> Result<Json<FoodResponse>, ApiError> {
    let (Some(test_name), Some(status)) = (
        payload.test_name.filter(|s| !s.is_empty()),
        payload.status.filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("Test name and status required".into()));
    };

    let recommendations = food_recommendations(&test_name, &status);
    Ok(Json(FoodResponse {
        success: true,
        test_name,
        status,
        recommendations,
    }))
}
