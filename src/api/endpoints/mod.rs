pub mod analyze;
pub mod chat;
pub mod doctors;
pub mod health;
pub mod resources;
pub mod video;
