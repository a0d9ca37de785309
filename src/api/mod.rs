//! HTTP layer for both services.
//!
//! `report_router` serves report analysis, chat and health content;
//! `video_router` serves topic-to-video generation. Each router owns its
//! state and carries the access-log middleware, so either can be mounted
//! on any axum server.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::{report_router, video_router};
pub use server::{serve, ServerError};
pub use types::{ReportContext, VideoContext};
