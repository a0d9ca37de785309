use rand::prelude::*;
use rand_distr::StandardNormal;
use serde_json::{json, Value};

use super::{ChartRenderer, ChartSet, Figure};
use crate::models::{ComparisonResult, TestStatus};

const ACCENT: &str = "#667eea";
const MONTHS: [&str; 7] = [
    "6 months ago",
    "5 months ago",
    "4 months ago",
    "3 months ago",
    "2 months ago",
    "Last month",
    "Current",
];
const SAMPLE_COUNT: usize = 100;
const RANGE_HEADROOM: f64 = 1.2;

/// Builds Plotly figures. Trend, box, heatmap and violin charts use synthetic
/// data; pass a seed for reproducible output.
#[derive(Debug, Clone, Default)]
pub struct PlotlyRenderer {
    seed: Option<u64>,
}

impl PlotlyRenderer {
    pub fn new() -> Self {
        Self { seed: None }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        }
    }
}

impl ChartRenderer for PlotlyRenderer {
    fn render(&self, results: &[ComparisonResult]) -> Option<ChartSet> {
        if results.is_empty() {
            return None;
        }
        let mut rng = self.rng();

        Some(ChartSet {
            bar: bar(results),
            gauges: results.iter().take(6).map(gauge).collect(),
            pie: pie(results),
            radar: radar(results),
            trend: trend(results, &mut rng),
            box_plot: box_plot(results, &mut rng),
            heatmap: (results.len() >= 4).then(|| heatmap(results, &mut rng)),
            scatter3d: (results.len() >= 3).then(|| scatter3d(results)),
            waterfall: waterfall(results),
            funnel: funnel(results),
            polar: polar(results),
            sunburst: sunburst(results),
            violin: violin(results, &mut rng),
            kpi: results.iter().take(4).map(kpi).collect(),
            sankey: sankey(results),
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════

fn figure(data: Vec<Value>, layout: Value) -> Figure {
    Figure { data, layout }
}

fn names(results: &[ComparisonResult]) -> Vec<&str> {
    results.iter().map(|r| r.test.as_str()).collect()
}

/// `value` as a percentage of `base`; 0 when the base is zero.
fn percent_of(value: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        value / base * 100.0
    }
}

/// `#rrggbb` to `rgba(r, g, b, alpha)`. Malformed input yields grey.
fn rgba(hex: &str, alpha: f64) -> String {
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .unwrap_or(128)
    };
    format!("rgba({}, {}, {}, {alpha})", channel(1..3), channel(3..5), channel(5..7))
}

/// `n` samples from a normal distribution centred on `mean`.
fn normal_samples(rng: &mut StdRng, mean: f64, sigma: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let z: f64 = rng.sample(StandardNormal);
            mean + z * sigma.abs()
        })
        .collect()
}

fn status_count(results: &[ComparisonResult], status: TestStatus) -> usize {
    results.iter().filter(|r| r.status == status).count()
}

fn title_with_unit(r: &ComparisonResult) -> String {
    format!("{}<br><span style='font-size:0.8em'>{}</span>", r.test, r.unit)
}

fn range_steps(r: &ComparisonResult) -> Value {
    json!([
        {"range": [0, r.min], "color": "lightblue"},
        {"range": [r.min, r.max], "color": "lightgreen"},
        {"range": [r.max, r.max * RANGE_HEADROOM], "color": "lightcoral"},
    ])
}

// ═══════════════════════════════════════════════════════════
// Figures
// ═══════════════════════════════════════════════════════════

fn bar(results: &[ComparisonResult]) -> Figure {
    let trace = json!({
        "type": "bar",
        "x": names(results),
        "y": results.iter().map(|r| r.value).collect::<Vec<_>>(),
        "marker": {"color": results.iter().map(|r| r.color.as_str()).collect::<Vec<_>>()},
        "text": results.iter().map(|r| format!("{} {}", r.value, r.unit)).collect::<Vec<_>>(),
        "textposition": "outside",
        "customdata": results.iter().map(|r| [r.min, r.max]).collect::<Vec<_>>(),
        "hovertemplate": "<b>%{x}</b><br>Value: %{y}<br>Normal: %{customdata[0]} - %{customdata[1]}<extra></extra>",
        "name": "Your Value",
    });
    figure(
        vec![trace],
        json!({
            "title": {"text": "Medical Test Results Overview"},
            "xaxis": {"title": {"text": "Test Name"}, "tickangle": -45},
            "yaxis": {"title": {"text": "Value"}},
            "template": "plotly_white",
            "height": 450,
            "showlegend": false,
        }),
    )
}

fn gauge(r: &ComparisonResult) -> Figure {
    let trace = json!({
        "type": "indicator",
        "mode": "gauge+number+delta",
        "value": r.value,
        "domain": {"x": [0, 1], "y": [0, 1]},
        "title": {"text": title_with_unit(r)},
        "delta": {"reference": r.midpoint()},
        "gauge": {
            "axis": {"range": [null, r.max * RANGE_HEADROOM]},
            "bar": {"color": r.color},
            "steps": range_steps(r),
            "threshold": {
                "line": {"color": "red", "width": 4},
                "thickness": 0.75,
                "value": r.max,
            },
        },
    });
    figure(
        vec![trace],
        json!({"height": 250, "margin": {"t": 50, "b": 0, "l": 0, "r": 0}}),
    )
}

fn pie(results: &[ComparisonResult]) -> Figure {
    // Statuses in first-seen order.
    let mut counts: Vec<(TestStatus, usize)> = Vec::new();
    for r in results {
        match counts.iter_mut().find(|(s, _)| *s == r.status) {
            Some((_, n)) => *n += 1,
            None => counts.push((r.status, 1)),
        }
    }
    let trace = json!({
        "type": "pie",
        "labels": counts.iter().map(|(s, _)| s.as_str()).collect::<Vec<_>>(),
        "values": counts.iter().map(|(_, n)| *n).collect::<Vec<_>>(),
        "marker": {"colors": ["#2ecc71", "#e74c3c", "#3498db"]},
        "hole": 0.4,
        "textinfo": "label+percent",
        "hovertemplate": "<b>%{label}</b><br>Count: %{value}<br>Percentage: %{percent}<extra></extra>",
    });
    figure(
        vec![trace],
        json!({"title": {"text": "Health Status Distribution"}, "height": 350, "showlegend": true}),
    )
}

fn radar(results: &[ComparisonResult]) -> Figure {
    let first = &results[..results.len().min(8)];
    let theta = names(first);
    let r: Vec<f64> = first
        .iter()
        .map(|res| percent_of(res.value, res.midpoint()))
        .collect();
    let yours = json!({
        "type": "scatterpolar",
        "r": r,
        "theta": theta,
        "fill": "toself",
        "name": "Your Results",
        "line": {"color": ACCENT, "width": 2},
        "fillcolor": "rgba(102, 126, 234, 0.3)",
    });
    let normal = json!({
        "type": "scatterpolar",
        "r": vec![100; theta.len()],
        "theta": theta,
        "name": "Normal Range",
        "line": {"color": "#2ecc71", "width": 2, "dash": "dash"},
    });
    figure(
        vec![yours, normal],
        json!({
            "polar": {"radialaxis": {"visible": true, "range": [0, 150], "ticksuffix": "%"}},
            "showlegend": true,
            "title": {"text": "Health Parameters Radar View"},
            "height": 500,
        }),
    )
}

/// Six months of made-up history within ±15 % of today's value, plus the
/// reference band.
fn trend(results: &[ComparisonResult], rng: &mut StdRng) -> Figure {
    let mut data = Vec::new();
    for r in results.iter().take(4) {
        let mut history: Vec<f64> = (0..MONTHS.len() - 1)
            .map(|_| r.value * (1.0 + rng.gen_range(-0.15..0.15)))
            .collect();
        history.push(r.value);

        data.push(json!({
            "type": "scatter",
            "x": MONTHS,
            "y": history,
            "mode": "lines+markers",
            "name": r.test,
            "line": {"width": 3},
            "marker": {"size": 8},
            "hovertemplate": "<b>%{fullData.name}</b><br>%{x}<br>Value: %{y:.2f}<extra></extra>",
        }));
        data.push(json!({
            "type": "scatter",
            "x": MONTHS,
            "y": vec![r.max; MONTHS.len()],
            "mode": "lines",
            "name": format!("{} Max", r.test),
            "line": {"color": r.color, "width": 1, "dash": "dash"},
            "showlegend": false,
            "hoverinfo": "skip",
        }));
        data.push(json!({
            "type": "scatter",
            "x": MONTHS,
            "y": vec![r.min; MONTHS.len()],
            "mode": "lines",
            "name": format!("{} Min", r.test),
            "line": {"color": r.color, "width": 1, "dash": "dash"},
            "fill": "tonexty",
            "fillcolor": rgba(&r.color, 0.1),
            "showlegend": false,
            "hoverinfo": "skip",
        }));
    }
    figure(
        data,
        json!({
            "title": {"text": "Simulated Health Trends Over Time"},
            "xaxis": {"title": {"text": "Time Period"}},
            "yaxis": {"title": {"text": "Value"}},
            "template": "plotly_white",
            "height": 450,
            "hovermode": "x unified",
        }),
    )
}

fn box_plot(results: &[ComparisonResult], rng: &mut StdRng) -> Figure {
    let data = results
        .iter()
        .take(6)
        .map(|r| {
            json!({
                "type": "box",
                "y": normal_samples(rng, r.value, r.value * 0.1, SAMPLE_COUNT),
                "name": r.test,
                "marker": {"color": r.color},
                "boxmean": "sd",
                "hovertemplate": "<b>%{fullData.name}</b><br>Value: %{y:.2f}<extra></extra>",
            })
        })
        .collect();
    figure(
        data,
        json!({
            "title": {"text": "Test Results Distribution Analysis"},
            "yaxis": {"title": {"text": "Value"}},
            "template": "plotly_white",
            "height": 450,
            "showlegend": false,
        }),
    )
}

/// Symmetric random matrix with a unit diagonal over the first six tests.
fn heatmap(results: &[ComparisonResult], rng: &mut StdRng) -> Figure {
    let first = &results[..results.len().min(6)];
    let n = first.len();
    let raw: Vec<Vec<f64>> = (0..n)
        .map(|_| (0..n).map(|_| rng.gen::<f64>()).collect())
        .collect();
    let z: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if i == j { 1.0 } else { (raw[i][j] + raw[j][i]) / 2.0 })
                .collect()
        })
        .collect();
    let text: Vec<Vec<f64>> = z
        .iter()
        .map(|row| row.iter().map(|v| (v * 100.0).round() / 100.0).collect())
        .collect();
    let trace = json!({
        "type": "heatmap",
        "z": z,
        "x": names(first),
        "y": names(first),
        "colorscale": "RdYlGn",
        "zmid": 0.5,
        "text": text,
        "texttemplate": "%{text}",
        "textfont": {"size": 10},
        "hovertemplate": "%{x} vs %{y}<br>Correlation: %{z:.2f}<extra></extra>",
    });
    figure(
        vec![trace],
        json!({
            "title": {"text": "Test Parameters Correlation Matrix"},
            "height": 450,
            "xaxis": {"tickangle": -45},
        }),
    )
}

fn scatter3d(results: &[ComparisonResult]) -> Figure {
    let (a, b, c) = (&results[0], &results[1], &results[2]);
    let yours = json!({
        "type": "scatter3d",
        "x": [a.value],
        "y": [b.value],
        "z": [c.value],
        "mode": "markers",
        "marker": {"size": 20, "color": ACCENT, "symbol": "diamond", "line": {"color": "white", "width": 2}},
        "text": ["Your Results"],
        "hovertemplate": format!(
            "<b>Your Results</b><br>{}: %{{x}}<br>{}: %{{y}}<br>{}: %{{z}}<extra></extra>",
            a.test, b.test, c.test
        ),
        "name": "Your Results",
    });
    let centre = json!({
        "type": "scatter3d",
        "x": [a.midpoint()],
        "y": [b.midpoint()],
        "z": [c.midpoint()],
        "mode": "markers",
        "marker": {"size": 15, "color": "#2ecc71", "symbol": "circle", "line": {"color": "white", "width": 2}},
        "text": ["Normal Range Center"],
        "hovertemplate": "<b>Normal Range Center</b><extra></extra>",
        "name": "Normal Center",
    });
    figure(
        vec![yours, centre],
        json!({
            "title": {"text": "3D Health Parameters Visualization"},
            "scene": {
                "xaxis": {"title": {"text": a.test}},
                "yaxis": {"title": {"text": b.test}},
                "zaxis": {"title": {"text": c.test}},
            },
            "height": 500,
        }),
    )
}

fn waterfall(results: &[ComparisonResult]) -> Figure {
    let first = &results[..results.len().min(6)];
    let trace = json!({
        "type": "waterfall",
        "name": "Deviation",
        "orientation": "v",
        "x": names(first),
        "y": first.iter().map(|r| r.value - r.midpoint()).collect::<Vec<_>>(),
        "connector": {"line": {"color": "rgb(63, 63, 63)"}},
        "decreasing": {"marker": {"color": TestStatus::Low.color()}},
        "increasing": {"marker": {"color": TestStatus::High.color()}},
        "totals": {"marker": {"color": ACCENT}},
        "hovertemplate": "<b>%{x}</b><br>Deviation: %{y:.2f}<extra></extra>",
    });
    figure(
        vec![trace],
        json!({
            "title": {"text": "Deviation from Normal Range Midpoint"},
            "xaxis": {"title": {"text": "Test Name"}, "tickangle": -45},
            "yaxis": {"title": {"text": "Deviation"}},
            "template": "plotly_white",
            "height": 450,
            "showlegend": false,
        }),
    )
}

fn funnel(results: &[ComparisonResult]) -> Figure {
    let normal = status_count(results, TestStatus::Normal);
    let attention = results.len() - normal;
    let trace = json!({
        "type": "funnel",
        "y": ["Total Tests", "Normal", "Needs Attention"],
        "x": [results.len(), normal, attention],
        "textposition": "inside",
        "textinfo": "value+percent initial",
        "marker": {"color": [ACCENT, "#2ecc71", "#e74c3c"]},
        "connector": {"line": {"color": "royalblue", "dash": "dot", "width": 3}},
        "hovertemplate": "<b>%{y}</b><br>Count: %{x}<extra></extra>",
    });
    figure(
        vec![trace],
        json!({"title": {"text": "Health Status Funnel"}, "height": 400}),
    )
}

fn polar(results: &[ComparisonResult]) -> Figure {
    let first = &results[..results.len().min(8)];
    let trace = json!({
        "type": "barpolar",
        "r": first.iter().map(|r| percent_of(r.value, r.max * RANGE_HEADROOM)).collect::<Vec<_>>(),
        "theta": names(first),
        "marker": {
            "color": first.iter().map(|r| r.color.as_str()).collect::<Vec<_>>(),
            "line": {"color": "white", "width": 2},
        },
        "hovertemplate": "<b>%{theta}</b><br>%{r:.1f}%<extra></extra>",
        "name": "Test Values",
    });
    figure(
        vec![trace],
        json!({
            "title": {"text": "Circular Test Comparison"},
            "polar": {
                "radialaxis": {"visible": true, "range": [0, 100], "ticksuffix": "%"},
                "angularaxis": {"direction": "clockwise"},
            },
            "height": 500,
            "showlegend": false,
        }),
    )
}

const STATUS_ORDER: [TestStatus; 3] = [TestStatus::Normal, TestStatus::High, TestStatus::Low];

fn sunburst(results: &[ComparisonResult]) -> Figure {
    let mut labels = vec!["All Tests".to_string()];
    let mut parents = vec![String::new()];
    let mut values = vec![results.len()];
    let mut colors = vec![ACCENT.to_string()];

    for status in STATUS_ORDER {
        let count = status_count(results, status);
        if count == 0 {
            continue;
        }
        labels.push(status.as_str().to_string());
        parents.push("All Tests".to_string());
        values.push(count);
        colors.push(status.color().to_string());

        for r in results.iter().filter(|r| r.status == status) {
            labels.push(r.test.clone());
            parents.push(status.as_str().to_string());
            values.push(1);
            colors.push(r.color.clone());
        }
    }

    let trace = json!({
        "type": "sunburst",
        "labels": labels,
        "parents": parents,
        "values": values,
        "marker": {"colors": colors},
        "branchvalues": "total",
        "hovertemplate": "<b>%{label}</b><br>Count: %{value}<extra></extra>",
    });
    figure(
        vec![trace],
        json!({"title": {"text": "Hierarchical Test Results View"}, "height": 500}),
    )
}

fn violin(results: &[ComparisonResult], rng: &mut StdRng) -> Figure {
    let data = results
        .iter()
        .take(6)
        .map(|r| {
            json!({
                "type": "violin",
                "y": normal_samples(rng, r.value, r.value * 0.08, SAMPLE_COUNT),
                "name": r.test,
                "box": {"visible": true},
                "meanline": {"visible": true},
                "fillcolor": r.color,
                "opacity": 0.6,
                "x0": r.test,
                "hovertemplate": "<b>%{fullData.name}</b><br>Value: %{y:.2f}<extra></extra>",
            })
        })
        .collect();
    figure(
        data,
        json!({
            "title": {"text": "Test Results Distribution (Violin Plot)"},
            "yaxis": {"title": {"text": "Value"}},
            "template": "plotly_white",
            "height": 450,
            "showlegend": false,
        }),
    )
}

fn kpi(r: &ComparisonResult) -> Figure {
    let trace = json!({
        "type": "indicator",
        "mode": "number+delta+gauge",
        "value": r.value,
        "title": {"text": title_with_unit(r)},
        "delta": {"reference": r.midpoint(), "relative": false, "valueformat": ".2f"},
        "gauge": {
            "shape": "bullet",
            "axis": {"range": [null, r.max * RANGE_HEADROOM]},
            "threshold": {
                "line": {"color": r.color, "width": 2},
                "thickness": 0.75,
                "value": r.value,
            },
            "steps": range_steps(r),
            "bar": {"color": r.color},
        },
        "domain": {"x": [0, 1], "y": [0, 1]},
    });
    figure(
        vec![trace],
        json!({"height": 150, "margin": {"t": 40, "b": 0, "l": 0, "r": 0}}),
    )
}

fn sankey(results: &[ComparisonResult]) -> Figure {
    let mut sources = Vec::new();
    let mut targets = Vec::new();
    let mut values = Vec::new();
    let mut colors = Vec::new();

    for (index, status) in STATUS_ORDER.into_iter().enumerate() {
        let count = status_count(results, status);
        if count == 0 {
            continue;
        }
        sources.push(0);
        targets.push(index + 1);
        values.push(count);
        colors.push(rgba(status.color(), 0.4));
    }

    let trace = json!({
        "type": "sankey",
        "node": {
            "pad": 15,
            "thickness": 20,
            "line": {"color": "black", "width": 0.5},
            "label": ["All Tests", "Normal", "High", "Low"],
            "color": [ACCENT, "#2ecc71", "#e74c3c", "#3498db"],
        },
        "link": {"source": sources, "target": targets, "value": values, "color": colors},
    });
    figure(
        vec![trace],
        json!({"title": {"text": "Test Results Flow Diagram"}, "height": 400}),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(test: &str, value: f64, min: f64, max: f64, status: TestStatus) -> ComparisonResult {
        ComparisonResult {
            test: test.into(),
            value,
            min,
            max,
            unit: "u".into(),
            status,
            color: status.color().into(),
            description: String::new(),
        }
    }

    fn sample() -> Vec<ComparisonResult> {
        vec![
            result("Hemoglobin", 10.0, 12.0, 16.0, TestStatus::Low),
            result("Glucose", 85.0, 70.0, 100.0, TestStatus::Normal),
            result("Potassium", 6.0, 3.5, 5.0, TestStatus::High),
            result("Sodium", 140.0, 135.0, 145.0, TestStatus::Normal),
            result("Calcium", 9.5, 8.5, 10.5, TestStatus::Normal),
        ]
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(PlotlyRenderer::seeded(1).render(&[]).is_none());
    }

    #[test]
    fn full_set_for_five_results() {
        let charts = PlotlyRenderer::seeded(7).render(&sample()).unwrap();
        assert_eq!(charts.gauges.len(), 5);
        assert_eq!(charts.kpi.len(), 4);
        assert!(charts.heatmap.is_some());
        assert!(charts.scatter3d.is_some());
        // Three traces (value, max, min) per trended test.
        assert_eq!(charts.trend.data.len(), 12);
        assert_eq!(charts.box_plot.data.len(), 5);
        assert_eq!(charts.violin.data.len(), 5);
    }

    #[test]
    fn small_inputs_skip_heatmap_and_3d() {
        let two = &sample()[..2];
        let charts = PlotlyRenderer::seeded(7).render(two).unwrap();
        assert!(charts.heatmap.is_none());
        assert!(charts.scatter3d.is_none());
        let json = serde_json::to_value(&charts).unwrap();
        assert!(json.get("heatmap").is_none());
        assert!(json.get("box").is_some());
    }

    #[test]
    fn seeded_renders_are_reproducible() {
        let renderer = PlotlyRenderer::seeded(42);
        assert_eq!(renderer.render(&sample()), renderer.render(&sample()));
    }

    #[test]
    fn heatmap_is_symmetric_with_unit_diagonal() {
        let charts = PlotlyRenderer::seeded(3).render(&sample()).unwrap();
        let z = &charts.heatmap.unwrap().data[0]["z"];
        for i in 0..5 {
            assert_eq!(z[i][i], 1.0);
            for j in 0..5 {
                assert_eq!(z[i][j], z[j][i]);
            }
        }
    }

    #[test]
    fn trend_history_stays_within_fifteen_percent() {
        let charts = PlotlyRenderer::seeded(9).render(&sample()).unwrap();
        let ys = charts.trend.data[0]["y"].as_array().unwrap();
        assert_eq!(ys.len(), 7);
        assert_eq!(ys[6], 10.0);
        for y in ys {
            let y = y.as_f64().unwrap();
            assert!((8.5..=11.5).contains(&y));
        }
    }

    #[test]
    fn funnel_and_sunburst_counts() {
        let charts = PlotlyRenderer::seeded(1).render(&sample()).unwrap();
        assert_eq!(charts.funnel.data[0]["x"], json!([5, 3, 2]));

        let sun = &charts.sunburst.data[0];
        assert_eq!(sun["labels"][0], "All Tests");
        assert_eq!(sun["values"][0], 5);
        assert_eq!(sun["labels"][1], "Normal");
        assert_eq!(sun["values"][1], 3);
        // Root, 3 status nodes, 5 tests.
        assert_eq!(sun["labels"].as_array().unwrap().len(), 9);
    }

    #[test]
    fn sankey_links_only_present_statuses() {
        let only_normal = vec![result("Glucose", 85.0, 70.0, 100.0, TestStatus::Normal)];
        let charts = PlotlyRenderer::seeded(1).render(&only_normal).unwrap();
        let link = &charts.sankey.data[0]["link"];
        assert_eq!(link["target"], json!([1]));
        assert_eq!(link["color"], json!(["rgba(46, 204, 113, 0.4)"]));
    }

    #[test]
    fn radar_guards_zero_midpoint() {
        let zero = vec![result("Urine_Protein", 0.0, 0.0, 0.0, TestStatus::Normal)];
        let charts = PlotlyRenderer::seeded(1).render(&zero).unwrap();
        assert_eq!(charts.radar.data[0]["r"], json!([0.0]));
    }

    #[test]
    fn pie_labels_follow_first_seen_order() {
        let charts = PlotlyRenderer::seeded(1).render(&sample()).unwrap();
        assert_eq!(charts.pie.data[0]["labels"], json!(["Low", "Normal", "High"]));
        assert_eq!(charts.pie.data[0]["values"], json!([1, 3, 1]));
    }

    #[test]
    fn rgba_parses_hex() {
        assert_eq!(rgba("#e74c3c", 0.1), "rgba(231, 76, 60, 0.1)");
        assert_eq!(rgba("nope", 0.5), "rgba(128, 128, 128, 0.5)");
    }
}
