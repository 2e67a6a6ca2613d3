//! Configuration file handling.
//!
//! Every setting has a default, so the dashboard runs with no config file at
//! all. An optional `dashboard.json` in the working directory overrides the
//! source paths and the PNG export size.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub sources: SourcePaths,

    #[serde(default)]
    pub export: ExportConfig,
}

/// Locations of the three input tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePaths {
    /// County-level annual AQI day counts.
    #[serde(default = "default_aqi_csv")]
    pub aqi_csv: PathBuf,

    /// Income-stratified asthma prevalence.
    #[serde(default = "default_income_csv")]
    pub income_csv: PathBuf,

    /// Per-state carbon workbook (`.xlsx`), or a `.csv` export of the sheet.
    #[serde(default = "default_carbon_workbook")]
    pub carbon_workbook: PathBuf,

    /// Sheet holding the carbon table.
    #[serde(default = "default_carbon_sheet")]
    pub carbon_sheet: String,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            aqi_csv: default_aqi_csv(),
            income_csv: default_income_csv(),
            carbon_workbook: default_carbon_workbook(),
            carbon_sheet: default_carbon_sheet(),
        }
    }
}

fn default_aqi_csv() -> PathBuf {
    PathBuf::from("annual_aqi_by_county_2021.csv")
}

fn default_income_csv() -> PathBuf {
    PathBuf::from("tableL6.csv")
}

fn default_carbon_workbook() -> PathBuf {
    PathBuf::from("table4_shorter.xlsx")
}

fn default_carbon_sheet() -> String {
    "Table 4".to_string()
}

/// PNG export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_width")]
    pub width: u32,

    #[serde(default = "default_export_height")]
    pub height: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: default_export_width(),
            height: default_export_height(),
        }
    }
}

fn default_export_width() -> u32 {
    1400
}

fn default_export_height() -> u32 {
    900
}

impl DashboardConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), "Loaded dashboard config");
        Ok(config)
    }

    /// Load `dashboard.json` from the working directory.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(Path::new(CONFIG_FILE))
    }
}
