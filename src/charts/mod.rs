//! Chart payloads for analysed reports.
//!
//! Renderers turn comparison results into front-end ready figure JSON. The
//! only renderer today emits Plotly `{data, layout}` figures.

pub mod plotly;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::ComparisonResult;

pub use plotly::PlotlyRenderer;

/// One Plotly figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
}

/// Every chart produced for one report.
///
/// `heatmap` needs at least four results and `scatter3d` at least three;
/// both are omitted from the JSON otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSet {
    pub bar: Figure,
    pub gauges: Vec<Figure>,
    pub pie: Figure,
    pub radar: Figure,
    pub trend: Figure,
    #[serde(rename = "box")]
    pub box_plot: Figure,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heatmap: Option<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scatter3d: Option<Figure>,
    pub waterfall: Figure,
    pub funnel: Figure,
    pub polar: Figure,
    pub sunburst: Figure,
    pub violin: Figure,
    pub kpi: Vec<Figure>,
    pub sankey: Figure,
}

pub trait ChartRenderer: Send + Sync {
    /// `None` when there is nothing to plot.
    fn render(&self, results: &[ComparisonResult]) -> Option<ChartSet>;
}
