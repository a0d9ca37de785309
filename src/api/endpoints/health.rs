//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::VideoContext;
use crate::video::ModelsLoaded;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub models_loaded: ModelsLoaded,
}

/// `GET /health`: always 200; reports which stages run on real models.
pub async fn check(State(ctx): State<VideoContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        models_loaded: ctx.caps.models_loaded,
    })
}
