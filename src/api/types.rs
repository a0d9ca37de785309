//! Router state for the two services.

use std::sync::Arc;

use crate::charts::ChartRenderer;
use crate::chat::ChatBot;
use crate::models::TestDefinition;
use crate::pipeline::extraction::TextExtractor;
use crate::pipeline::lab_values::ReferenceTable;
use crate::video::VideoCapabilities;

// ═══════════════════════════════════════════════════════════
// Report service
// ═══════════════════════════════════════════════════════════

/// Everything the report endpoints need, built once at start-up.
#[derive(Clone)]
pub struct ReportContext {
    pub reference: Arc<ReferenceTable>,
    pub definitions: &'static [TestDefinition],
    pub extractor: Arc<dyn TextExtractor>,
    pub charts: Arc<dyn ChartRenderer>,
    pub chat: Arc<ChatBot>,
}

impl ReportContext {
    pub fn new(
        reference: ReferenceTable,
        definitions: &'static [TestDefinition],
        extractor: Arc<dyn TextExtractor>,
        charts: Arc<dyn ChartRenderer>,
        chat: ChatBot,
    ) -> Self {
        Self {
            reference: Arc::new(reference),
            definitions,
            extractor,
            charts,
            chat: Arc::new(chat),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Video service
// ═══════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct VideoContext {
    pub caps: Arc<VideoCapabilities>,
}

impl VideoContext {
    pub fn new(caps: VideoCapabilities) -> Self {
        Self {
            caps: Arc::new(caps),
        }
    }
}
