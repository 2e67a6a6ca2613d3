//! Chart Viewer Widget
//! Scrollable dashboard page: research questions, the four chart cards with
//! their commentary, the conclusion and the data notes.
//! The first two charts sit side by side when the window is wide enough.

use crate::charts::{BarChartModel, ChartPlotter, DashboardCharts, ScatterChart};
use crate::data::StateTable;
use crate::gui::narrative;
use egui::{Color32, RichText, ScrollArea};

/// Chart card configuration
const CHART_SPACING: f32 = 15.0;
const CHART_HEIGHT: f32 = 340.0;
const WIDE_CHART_HEIGHT: f32 = 400.0;
const TWO_COLUMN_MIN_WIDTH: f32 = 1100.0;

const CARD_BORDER: Color32 = Color32::from_rgb(180, 180, 190);
const MUTED_TEXT: Color32 = Color32::GRAY;

struct PageContent {
    charts: DashboardCharts,
    notes: Vec<String>,
}

/// Central dashboard page.
#[derive(Default)]
pub struct ChartViewer {
    content: Option<PageContent>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.content = None;
    }

    /// Build the chart models and notes for a freshly loaded table.
    pub fn set_table(&mut self, table: &StateTable) {
        let charts = DashboardCharts::from_table(table);
        let notes = narrative::data_notes(table);
        self.content = Some(PageContent { charts, notes });
    }

    pub fn charts(&self) -> Option<&DashboardCharts> {
        self.content.as_ref().map(|c| &c.charts)
    }

    /// Draw the page, or a placeholder while nothing is loaded.
    pub fn show(&self, ui: &mut egui::Ui, placeholder: &str) {
        let Some(content) = &self.content else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(placeholder).size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::draw_intro(ui);
                ui.add_space(CHART_SPACING);

                let charts = &content.charts;
                if ui.available_width() >= TWO_COLUMN_MIN_WIDTH {
                    ui.columns(2, |cols| {
                        Self::draw_scatter_card(&mut cols[0], &charts.aqi, narrative::AQI_CAPTION);
                        Self::draw_scatter_card(
                            &mut cols[1],
                            &charts.income,
                            narrative::INCOME_CAPTION,
                        );
                    });
                } else {
                    Self::draw_scatter_card(ui, &charts.aqi, narrative::AQI_CAPTION);
                    ui.add_space(CHART_SPACING);
                    Self::draw_scatter_card(ui, &charts.income, narrative::INCOME_CAPTION);
                }

                ui.add_space(CHART_SPACING);
                ui.separator();
                ui.heading(narrative::EMISSIONS_HEADER);
                ui.add_space(8.0);

                Self::draw_bar_card(ui, &charts.carbon, narrative::CARBON_CAPTION);
                ui.add_space(CHART_SPACING);
                Self::draw_scatter_card(ui, &charts.pm25, narrative::PM25_CAPTION);

                ui.add_space(CHART_SPACING);
                ui.separator();
                Self::draw_conclusion(ui);

                ui.add_space(CHART_SPACING);
                Self::draw_data_notes(ui, &content.notes);

                ui.add_space(CHART_SPACING);
                ui.separator();
                Self::draw_footer(ui);
            });
    }

    fn draw_intro(ui: &mut egui::Ui) {
        ui.label(RichText::new(narrative::PAGE_TITLE).size(26.0).strong());
        ui.add_space(10.0);
        ui.label(
            RichText::new(narrative::RESEARCH_QUESTIONS_HEADER)
                .size(18.0)
                .strong(),
        );
        for (i, question) in narrative::RESEARCH_QUESTIONS.iter().enumerate() {
            ui.label(RichText::new(format!("{}. {question}", i + 1)).size(14.0));
        }
    }

    fn draw_scatter_card(ui: &mut egui::Ui, chart: &ScatterChart, caption: &str) {
        Self::card(ui, |ui| {
            ChartPlotter::draw_scatter_chart(ui, chart, CHART_HEIGHT);
            if chart.trend.is_some() {
                ui.add_space(4.0);
                ui.label(
                    RichText::new(narrative::fit_caption(chart.trend.as_ref()))
                        .size(12.0)
                        .monospace()
                        .color(MUTED_TEXT),
                );
            }
            ui.add_space(6.0);
            Self::rich_line(ui, caption, 14.0);
        });
    }

    fn draw_bar_card(ui: &mut egui::Ui, chart: &BarChartModel, caption: &str) {
        Self::card(ui, |ui| {
            ChartPlotter::draw_bar_chart(ui, chart, WIDE_CHART_HEIGHT);
            ui.add_space(6.0);
            Self::rich_line(ui, caption, 14.0);
        });
    }

    fn draw_conclusion(ui: &mut egui::Ui) {
        ui.label(RichText::new(narrative::CONCLUSION_HEADER).size(20.0).strong());
        ui.add_space(6.0);
        for paragraph in narrative::CONCLUSION {
            Self::rich_line(ui, paragraph, 14.0);
            ui.add_space(4.0);
        }
        ui.label(RichText::new(narrative::NEXT_STEPS_HEADER).size(14.0).strong());
        for step in narrative::NEXT_STEPS {
            ui.label(RichText::new(format!("\u{2022} {step}")).size(14.0));
        }
    }

    fn draw_data_notes(ui: &mut egui::Ui, notes: &[String]) {
        egui::CollapsingHeader::new(RichText::new("Data notes").size(14.0).strong())
            .default_open(false)
            .show(ui, |ui| {
                for note in notes {
                    ui.label(RichText::new(note).size(12.0).color(MUTED_TEXT));
                }
            });
    }

    fn draw_footer(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            for line in narrative::FOOTER {
                Self::rich_line(ui, line, 12.0);
            }
        });
    }

    /// Wrapped label honouring `**bold**` spans.
    fn rich_line(ui: &mut egui::Ui, text: &str, size: f32) {
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            for (span, bold) in narrative::emphasis_spans(text) {
                let rich = RichText::new(span).size(size);
                ui.label(if bold { rich.strong() } else { rich });
            }
        });
    }

    fn card(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, CARD_BORDER))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                add_contents(ui);
            });
    }
}
