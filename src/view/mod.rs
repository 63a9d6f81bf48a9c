//! # View
//!
//! Stateless projections of a [`UserProgress`] onto the objective list and
//! the completion chart. Both are re-run on every snapshot; rendering the
//! same state twice yields the same output.

mod chart;
mod goals;

pub use chart::{
    tick_label, BarChart, ChartData, ChartView, Dataset, BACKGROUND_COLORS, BORDER_COLORS,
    DATASET_LABEL,
};
pub use goals::{render_goals, GoalItem, LABEL_COMPLETED, LABEL_INCOMPLETE};

use serde::Serialize;
use std::fmt::Write;

use crate::progress::UserProgress;

/// Everything drawn for one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedView {
    pub goals: Vec<GoalItem>,
    pub chart: BarChart,
}

impl RenderedView {
    /// Complete HTML page with the list and an inline SVG chart
    pub fn to_html_page(&self) -> String {
        let mut page = String::new();
        page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Goals</title></head>\n<body>\n");
        page.push_str("<ul id=\"objectives-list\" class=\"list-group\">\n");
        page.push_str(&goals_to_html(&self.goals));
        page.push_str("</ul>\n<div id=\"progress-chart\">");
        page.push_str(&self.chart.to_svg());
        page.push_str("</div>\n</body>\n</html>\n");
        page
    }
}

/// Owns the chart instance and renders both projections together
#[derive(Debug, Default)]
pub struct GoalView {
    chart: ChartView,
}

impl GoalView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, progress: &UserProgress) -> RenderedView {
        RenderedView {
            goals: render_goals(progress),
            chart: self.chart.render(progress).clone(),
        }
    }

    pub fn chart(&self) -> Option<&BarChart> {
        self.chart.chart()
    }
}

/// `<li>` elements for the objective list
pub fn goals_to_html(goals: &[GoalItem]) -> String {
    let mut html = String::new();
    for goal in goals {
        let _ = writeln!(
            html,
            r#"<li class="list-group-item d-flex justify-content-between align-items-center"><span>{}</span><button class="btn btn-sm {}" data-goal-id="{}"{}>{}</button></li>"#,
            escape_html(goal.text),
            goal.button_class,
            escape_html(goal.id),
            if goal.disabled { " disabled" } else { "" },
            goal.button_label,
        );
    }
    html
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
