//! Chart Plotter Module
//! Draws the dashboard charts interactively using egui_plot.

use crate::charts::model::{
    BarChartModel, ColorScale, Rgb, ScatterChart, BAR_COLOR, TREND_COLOR,
};
use egui::Color32;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

fn color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Draws chart models with egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Scatter of asthma prevalence against one metric, with the OLS line
    /// when the model carries one.
    pub fn draw_scatter_chart(ui: &mut egui::Ui, chart: &ScatterChart, height: f32) {
        ui.label(egui::RichText::new(chart.title).strong().size(15.0));

        let mut plot = Plot::new(chart.id)
            .height(height)
            .allow_scroll(false)
            .x_axis_label(chart.x_label)
            .y_axis_label(chart.y_label);
        if chart.color_scale == ColorScale::ByState || chart.trend.is_some() {
            plot = plot.legend(Legend::default());
        }

        plot.show(ui, |plot_ui| {
            for point in &chart.points {
                let mut marker = Points::new(vec![[point.x, point.y]])
                    .radius(point.radius)
                    .color(color(point.color))
                    .filled(true);
                if chart.color_scale == ColorScale::ByState {
                    marker = marker.name(&point.state);
                }
                plot_ui.points(marker);
            }

            if let Some(segment) = chart.trend_segment() {
                let line: PlotPoints = segment.iter().map(|&(x, y)| [x, y]).collect();
                plot_ui.line(
                    Line::new(line)
                        .color(color(TREND_COLOR))
                        .width(2.0)
                        .name("OLS trendline"),
                );
            }
        });
    }

    /// One bar per state in model order, labelled with the state name.
    pub fn draw_bar_chart(ui: &mut egui::Ui, chart: &BarChartModel, height: f32) {
        ui.label(egui::RichText::new(chart.title).strong().size(15.0));

        let labels: Vec<String> = chart.bars.iter().map(|(state, _)| state.clone()).collect();
        let bars: Vec<Bar> = chart
            .drawn_bars()
            .map(|(i, value)| {
                Bar::new(i as f64, value)
                    .name(&chart.bars[i].0)
                    .width(0.7)
                    .fill(color(BAR_COLOR))
            })
            .collect();

        let slots = chart.bars.len() as f64;
        Plot::new(chart.id)
            .height(height)
            .allow_scroll(false)
            .include_x(-0.5)
            .include_x(slots - 0.5)
            .x_axis_label("State")
            .y_axis_label(chart.y_label)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx < 0.0 || (mark.value - idx).abs() > f64::EPSILON {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(color(BAR_COLOR))
                        .name("CO\u{2082} per capita"),
                );
            });
    }
}
