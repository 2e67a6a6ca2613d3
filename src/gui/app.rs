//! Asthma Dashboard Main Application
//! Main window with control panel and the dashboard page.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::{global_cache, PipelineCache, StateTable};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, StatusKind};
use egui::SidePanel;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};

/// Table loading result from background thread
enum LoadResult {
    Complete(Arc<StateTable>),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    cache: &'static PipelineCache,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async table loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
    load_error: Option<String>,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let cache = global_cache(&config.sources);
        let mut app = Self {
            config,
            cache,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
            load_error: None,
        };
        app.start_loading();
        app
    }

    /// Build (or fetch the memoized) table on a background thread.
    fn start_loading(&mut self) {
        if self.is_loading {
            return;
        }

        self.control_panel
            .set_status(StatusKind::Busy, "Loading data sources...");
        self.control_panel.export_enabled = false;
        self.is_loading = true;
        self.load_error = None;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let cache = self.cache;
        thread::spawn(move || {
            let result = match cache.get_or_load() {
                Ok(table) => LoadResult::Complete(table),
                Err(e) => {
                    error!(error = %e, "Failed to build state table");
                    LoadResult::Error(e.to_string())
                }
            };
            let _ = tx.send(result);
        });
    }

    /// Check for table loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Complete(table) => {
                        let count = table.len();
                        self.chart_viewer.set_table(&table);
                        self.control_panel.state_count = Some(count);
                        self.control_panel.export_enabled = true;
                        self.control_panel.set_status(
                            StatusKind::Done,
                            &format!("Complete: {count} states loaded"),
                        );
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        self.chart_viewer.clear();
                        self.control_panel.state_count = None;
                        self.control_panel
                            .set_status(StatusKind::Error, "Error: data could not be loaded");
                        self.load_error = Some(error);
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Drop the memoized table and rebuild it from the source files.
    fn handle_reload(&mut self) {
        if self.is_loading {
            return;
        }
        info!("Reloading data sources");
        self.cache.invalidate();
        self.chart_viewer.clear();
        self.start_loading();
    }

    /// Render every chart to PNG in a folder picked by the user.
    fn handle_export_png(&mut self) {
        let Some(charts) = self.chart_viewer.charts() else {
            self.control_panel
                .set_status(StatusKind::Error, "No charts to export");
            return;
        };

        // Ask user for output location
        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        match StaticChartRenderer::export_png(charts, &dir, &self.config.export) {
            Ok(paths) => {
                self.control_panel.set_status(
                    StatusKind::Done,
                    &format!("Saved {} charts to {}", paths.len(), dir.display()),
                );
                if let Err(e) = open::that(&dir) {
                    warn!(error = %e, dir = %dir.display(), "Could not open export folder");
                }
            }
            Err(e) => {
                error!(error = %e, "Chart export failed");
                self.control_panel
                    .set_status(StatusKind::Error, &format!("Export error: {e}"));
            }
        }
    }

    fn placeholder(&self) -> String {
        match (&self.load_error, self.is_loading) {
            (_, true) => "Loading...".to_string(),
            (Some(error), false) => format!("\u{26a0} {error}"),
            (None, false) => "No Data".to_string(),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui, &self.config.sources);

                    match action {
                        ControlPanelAction::Reload => self.handle_reload(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard page
        let placeholder = self.placeholder();
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, &placeholder);
        });
    }
}
