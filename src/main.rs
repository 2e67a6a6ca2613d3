//! Asthma Dashboard - State-Level Asthma & Pollution Dashboard (2021)
//!
//! Loads the AQI, income-stratified asthma and carbon intensity tables,
//! merges them per state and shows the charts in a native window.

use anyhow::Context;
use asthma_dashboard::config::{DashboardConfig, CONFIG_FILE};
use asthma_dashboard::gui::DashboardApp;
use eframe::egui;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let config = DashboardConfig::load_default()
        .inspect_err(|e| error!(error = %e, "Invalid configuration"))
        .with_context(|| format!("Failed to load {CONFIG_FILE}"))?;
    info!(
        aqi = %config.sources.aqi_csv.display(),
        income = %config.sources.income_csv.display(),
        carbon = %config.sources.carbon_workbook.display(),
        "Starting dashboard"
    );

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("State-Level Asthma & Pollution Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Asthma Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {e}"))
}
