//! Completion Chart
//!
//! A bar chart with one bar per objective, valued 1 when complete and 0
//! otherwise. [`ChartView`] owns the single chart instance: the first render
//! creates it, later renders update its data in place.

use serde::Serialize;
use serde_json::json;
use std::fmt::Write;

use crate::objectives::{self, OBJECTIVES};
use crate::progress::UserProgress;

/// Dataset label shown in the legend
pub const DATASET_LABEL: &str = "Goal Progress";

/// Bar fill colours, one per objective
pub const BACKGROUND_COLORS: [&str; 3] = [
    "rgba(75, 192, 192, 0.2)",
    "rgba(255, 159, 64, 0.2)",
    "rgba(54, 162, 235, 0.2)",
];

/// Bar border colours, one per objective
pub const BORDER_COLORS: [&str; 3] = [
    "rgba(75, 192, 192, 1)",
    "rgba(255, 159, 64, 1)",
    "rgba(54, 162, 235, 1)",
];

/// The single dataset of the chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<u8>,
    pub background_color: Vec<&'static str>,
    pub border_color: Vec<&'static str>,
    pub border_width: u32,
}

/// Labels and values of the chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub labels: Vec<&'static str>,
    pub dataset: Dataset,
    pub total_completed: usize,
    pub total: usize,
}

impl ChartData {
    /// Project progress onto one 0/1 value per objective
    pub fn from_progress(progress: &UserProgress) -> Self {
        let data: Vec<u8> = OBJECTIVES
            .iter()
            .map(|o| u8::from(progress.is_completed(o.id)))
            .collect();
        let total_completed = data.iter().filter(|v| **v == 1).count();

        Self {
            labels: OBJECTIVES.iter().map(|o| o.label()).collect(),
            dataset: Dataset {
                label: DATASET_LABEL,
                data,
                background_color: BACKGROUND_COLORS.to_vec(),
                border_color: BORDER_COLORS.to_vec(),
                border_width: 1,
            },
            total_completed,
            total: objectives::total(),
        }
    }

    pub fn title(&self) -> String {
        format!(
            "Total goals completed: {} / {}",
            self.total_completed, self.total
        )
    }
}

/// Y-axis tick label
pub fn tick_label(value: u8) -> &'static str {
    if value == 1 {
        "Completed"
    } else {
        "Not completed"
    }
}

/// A drawn chart instance
///
/// Two charts are equal when they draw the same thing; `revision` only
/// tracks how often this instance was redrawn.
#[derive(Debug, Clone, Serialize)]
pub struct BarChart {
    pub data: ChartData,
    pub title: String,
    /// 0 when created, incremented on every update
    #[serde(skip)]
    pub revision: u64,
}

impl PartialEq for BarChart {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data && self.title == other.title
    }
}

impl Eq for BarChart {}

impl BarChart {
    fn create(data: ChartData) -> Self {
        let title = data.title();
        Self {
            data,
            title,
            revision: 0,
        }
    }

    fn update(&mut self, data: ChartData) {
        self.title = data.title();
        self.data = data;
        self.revision += 1;
    }

    /// Value of the bar for an objective
    pub fn value_of(&self, objective_id: &str) -> Option<u8> {
        OBJECTIVES
            .iter()
            .position(|o| o.id == objective_id)
            .and_then(|idx| self.data.dataset.data.get(idx).copied())
    }

    /// Chart.js-compatible configuration
    ///
    /// Plain JSON cannot carry a tick callback, so the y ticks stop at 0 and 1
    /// and the client maps them through [`tick_label`].
    pub fn to_chartjs_config(&self) -> serde_json::Value {
        let dataset = &self.data.dataset;
        json!({
            "type": "bar",
            "data": {
                "labels": self.data.labels,
                "datasets": [{
                    "label": dataset.label,
                    "data": dataset.data,
                    "backgroundColor": dataset.background_color,
                    "borderColor": dataset.border_color,
                    "borderWidth": dataset.border_width,
                }]
            },
            "options": {
                "scales": {
                    "y": {
                        "beginAtZero": true,
                        "max": 1,
                        "ticks": {"stepSize": 1}
                    }
                },
                "plugins": {
                    "title": {"display": true, "text": self.title}
                }
            }
        })
    }

    /// Standalone SVG rendering
    pub fn to_svg(&self) -> String {
        const WIDTH: u32 = 480;
        const HEIGHT: u32 = 260;
        const LEFT: u32 = 110;
        const TOP: u32 = 40;
        const PLOT_HEIGHT: u32 = 160;

        let bars = self.data.dataset.data.len().max(1) as u32;
        let slot = (WIDTH - LEFT - 20) / bars;
        let bar_width = slot * 3 / 5;
        let baseline = TOP + PLOT_HEIGHT;

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
        );
        let _ = write!(
            svg,
            r#"<text x="{}" y="20" text-anchor="middle" font-size="14">{}</text>"#,
            WIDTH / 2,
            super::escape_html(&self.title)
        );

        // Axis with the two tick labels
        let _ = write!(
            svg,
            r##"<line x1="{LEFT}" y1="{TOP}" x2="{LEFT}" y2="{baseline}" stroke="#999"/>"##
        );
        let _ = write!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="end" font-size="11">{}</text>"#,
            LEFT - 6,
            TOP + 4,
            tick_label(1)
        );
        let _ = write!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="end" font-size="11">{}</text>"#,
            LEFT - 6,
            baseline + 4,
            tick_label(0)
        );

        for (idx, value) in self.data.dataset.data.iter().enumerate() {
            let x = LEFT + 10 + slot * idx as u32 + (slot - bar_width) / 2;
            let height = u32::from(*value) * PLOT_HEIGHT;
            let fill = self.data.dataset.background_color[idx % BACKGROUND_COLORS.len()];
            let stroke = self.data.dataset.border_color[idx % BORDER_COLORS.len()];
            let label = self.data.labels.get(idx).copied().unwrap_or("");

            let _ = write!(
                svg,
                r#"<rect x="{x}" y="{}" width="{bar_width}" height="{height}" fill="{fill}" stroke="{stroke}" stroke-width="{}"/>"#,
                baseline - height,
                self.data.dataset.border_width
            );
            let _ = write!(
                svg,
                r#"<text x="{}" y="{}" text-anchor="middle" font-size="12">{}</text>"#,
                x + bar_width / 2,
                baseline + 18,
                super::escape_html(label)
            );
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Owner of the single chart instance
#[derive(Debug, Default)]
pub struct ChartView {
    chart: Option<BarChart>,
}

impl ChartView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the chart on first use, update it afterwards
    pub fn render(&mut self, progress: &UserProgress) -> &BarChart {
        let data = ChartData::from_progress(progress);
        let chart = match self.chart.take() {
            Some(mut chart) => {
                chart.update(data);
                chart
            }
            None => BarChart::create(data),
        };
        tracing::trace!(revision = chart.revision, "Chart drawn");
        self.chart.insert(chart)
    }

    /// The current chart, if one has been drawn
    pub fn chart(&self) -> Option<&BarChart> {
        self.chart.as_ref()
    }
}
