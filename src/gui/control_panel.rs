//! Control Panel Widget
//! Left side panel listing the data sources with reload and export controls.

use crate::config::SourcePaths;
use crate::data::is_csv;
use egui::{Color32, RichText};
use std::path::Path;

/// Tone of the status line under the controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Busy,
    Done,
    Error,
}

/// Left side control panel with source info and dashboard actions.
pub struct ControlPanel {
    pub status: String,
    pub status_kind: StatusKind,
    pub busy: bool,
    pub export_enabled: bool,
    pub state_count: Option<usize>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            status: "Ready".to_string(),
            status_kind: StatusKind::Done,
            busy: false,
            export_enabled: false,
            state_count: None,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, sources: &SourcePaths) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.add_space(10.0);
        ui.label(RichText::new("\u{1f4ca} Asthma Dashboard").size(20.0).strong());
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Sources Section =====
        ui.label(RichText::new("\u{1f4c1} Data Sources").size(14.0).strong());
        ui.add_space(5.0);

        Self::source_row(ui, "AQI by county", &sources.aqi_csv);
        Self::source_row(ui, "Asthma by income", &sources.income_csv);
        Self::source_row(ui, "Carbon intensity", &sources.carbon_workbook);
        if !is_csv(&sources.carbon_workbook) {
            ui.label(
                RichText::new(format!("Sheet: {}", sources.carbon_sheet))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }

        if let Some(count) = self.state_count {
            ui.add_space(5.0);
            ui.label(RichText::new(format!("{count} states merged")).size(12.0));
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Actions Section =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.busy, |ui| {
                let button = egui::Button::new(RichText::new("\u{27f3} Reload Data").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Reload;
                }
            });

            ui.add_space(8.0);

            ui.add_enabled_ui(self.export_enabled && !self.busy, |ui| {
                let png_button =
                    egui::Button::new(RichText::new("\u{1f5bc} Save Charts as PNG").size(14.0))
                        .min_size(egui::vec2(200.0, 30.0));
                if ui.add(png_button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("Status").size(14.0).strong());
        ui.add_space(5.0);

        if self.busy {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new(&self.status).size(11.0));
            });
        } else {
            let status_color = match self.status_kind {
                StatusKind::Error => Color32::from_rgb(220, 53, 69),
                StatusKind::Done => Color32::from_rgb(40, 167, 69),
                StatusKind::Busy => Color32::GRAY,
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        }

        action
    }

    /// Set status text and tone
    pub fn set_status(&mut self, kind: StatusKind, status: &str) {
        self.busy = kind == StatusKind::Busy;
        self.status_kind = kind;
        self.status = status.to_string();
    }

    fn source_row(ui: &mut egui::Ui, label: &str, path: &Path) {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("{label}:")).size(12.0));
            ui.label(RichText::new(file_name).size(12.0).monospace())
                .on_hover_text(path.display().to_string());
        });
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    Reload,
    ExportPng,
}
