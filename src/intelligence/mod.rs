pub mod insights;
pub mod resources;
pub mod specialists;

pub use insights::{generate_insights, Insight};
pub use specialists::{
    detected_conditions, finder_urls, health_tips, recommend, search_keywords, FinderUrls,
    SpecialistRecommendations, TipCard, PRIMARY_CARE,
};
