//! Source Loader Module
//! Reads the three dashboard sources into typed rows using Polars (CSV) and
//! calamine (workbook).

use crate::config::SourcePaths;
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

pub const AQI_STATE_COL: &str = "State";
pub const AQI_DAYS_COLS: [&str; 6] = [
    "Days with AQI",
    "Days PM2.5",
    "Days Ozone",
    "Days NO2",
    "Days CO",
    "Days PM10",
];

pub const INCOME_STATE_COL: &str = "State";
pub const INCOME_BRACKET_COL: &str = "Income";
pub const INCOME_WEIGHT_COL: &str = "Weighted Numbere";
pub const INCOME_PREVALENCE_COL: &str = "Prevalence (Percent)";

pub const CARBON_STATE_COL: &str = "State";
pub const CARBON_VALUE_COL: &str = "CarbonPerCapita2021";

/// Which input a row or an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    Aqi,
    Income,
    Carbon,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Aqi => "AQI",
            SourceKind::Income => "income/asthma",
            SourceKind::Carbon => "carbon",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to open workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("Workbook {path} has no sheet named {sheet:?}")]
    MissingSheet { path: PathBuf, sheet: String },
    #[error("Sheet {sheet:?} is empty")]
    EmptySheet { sheet: String },
    #[error("{source_kind} source is missing column {column:?}")]
    MissingColumn {
        source_kind: SourceKind,
        column: String,
    },
    #[error("{source_kind} source has non-numeric value {value:?} in column {column:?}")]
    InvalidNumber {
        source_kind: SourceKind,
        column: String,
        value: String,
    },
}

/// One county row of the annual AQI table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AqiCountyRow {
    pub state: Option<String>,
    pub days_with_aqi: Option<f64>,
    pub days_pm25: Option<f64>,
    pub days_ozone: Option<f64>,
    pub days_no2: Option<f64>,
    pub days_co: Option<f64>,
    pub days_pm10: Option<f64>,
}

/// One raw row of the income-stratified prevalence table. All cells are
/// kept as text; validation happens in the processor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomeRow {
    pub state_code: Option<String>,
    pub bracket: Option<String>,
    pub weighted_n: Option<String>,
    pub prevalence: Option<String>,
}

/// One row of the carbon intensity table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarbonRow {
    pub state: Option<String>,
    pub carbon_per_capita_2021: Option<f64>,
}

/// Loads the dashboard sources from their configured paths.
pub struct DataLoader<'a> {
    sources: &'a SourcePaths,
}

impl<'a> DataLoader<'a> {
    pub fn new(sources: &'a SourcePaths) -> Self {
        Self { sources }
    }

    /// Load the county-level AQI table.
    #[instrument(skip(self), fields(path = %self.sources.aqi_csv.display()))]
    pub fn load_aqi(&self) -> Result<Vec<AqiCountyRow>, LoaderError> {
        let df = read_csv(&self.sources.aqi_csv, Some(0))?;
        let mut required = vec![AQI_STATE_COL];
        required.extend(AQI_DAYS_COLS);
        require_columns(&df, SourceKind::Aqi, &required)?;

        let states = string_column(&df, AQI_STATE_COL)?;
        let mut days: Vec<Vec<Option<f64>>> = Vec::with_capacity(AQI_DAYS_COLS.len());
        for name in AQI_DAYS_COLS {
            days.push(number_column(&df, SourceKind::Aqi, name)?);
        }

        let rows: Vec<AqiCountyRow> = states
            .into_iter()
            .enumerate()
            .map(|(i, state)| AqiCountyRow {
                state,
                days_with_aqi: days[0][i],
                days_pm25: days[1][i],
                days_ozone: days[2][i],
                days_no2: days[3][i],
                days_co: days[4][i],
                days_pm10: days[5][i],
            })
            .collect();

        info!(rows = rows.len(), "Loaded AQI county table");
        Ok(rows)
    }

    /// Load the income-stratified asthma table with every column as text.
    #[instrument(skip(self), fields(path = %self.sources.income_csv.display()))]
    pub fn load_income(&self) -> Result<Vec<IncomeRow>, LoaderError> {
        // Schema length 0 reads every column as String, so comma-formatted
        // counts and footnote markers survive untouched.
        let df = read_csv(&self.sources.income_csv, Some(0))?;
        require_columns(
            &df,
            SourceKind::Income,
            &[
                INCOME_STATE_COL,
                INCOME_BRACKET_COL,
                INCOME_WEIGHT_COL,
                INCOME_PREVALENCE_COL,
            ],
        )?;

        let codes = string_column(&df, INCOME_STATE_COL)?;
        let brackets = string_column(&df, INCOME_BRACKET_COL)?;
        let weights = string_column(&df, INCOME_WEIGHT_COL)?;
        let prevalence = string_column(&df, INCOME_PREVALENCE_COL)?;

        let rows: Vec<IncomeRow> = codes
            .into_iter()
            .zip(brackets)
            .zip(weights)
            .zip(prevalence)
            .map(|(((state_code, bracket), weighted_n), prevalence)| IncomeRow {
                state_code,
                bracket,
                weighted_n,
                prevalence,
            })
            .collect();

        info!(rows = rows.len(), "Loaded income/asthma table");
        Ok(rows)
    }

    /// Load the carbon table from the workbook sheet, or from a CSV export
    /// when the configured path ends in `.csv`.
    #[instrument(skip(self), fields(path = %self.sources.carbon_workbook.display()))]
    pub fn load_carbon(&self) -> Result<Vec<CarbonRow>, LoaderError> {
        let path = &self.sources.carbon_workbook;
        let rows = if is_csv(path) {
            load_carbon_csv(path)?
        } else {
            load_carbon_sheet(path, &self.sources.carbon_sheet)?
        };

        info!(rows = rows.len(), "Loaded carbon table");
        Ok(rows)
    }
}

/// True when `path` has a `.csv` extension (any case).
pub fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

fn read_csv(path: &Path, infer_schema_length: Option<usize>) -> Result<DataFrame, LoaderError> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(infer_schema_length)
        .with_ignore_errors(true)
        .finish()?
        .collect()?;
    debug!(rows = df.height(), cols = df.width(), "Read CSV");
    Ok(df)
}

fn require_columns(
    df: &DataFrame,
    source_kind: SourceKind,
    columns: &[&str],
) -> Result<(), LoaderError> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    match columns.iter().find(|c| !present.iter().any(|p| p == *c)) {
        Some(missing) => Err(LoaderError::MissingColumn {
            source_kind,
            column: missing.to_string(),
        }),
        None => Ok(()),
    }
}

/// Extract a column as optional strings. Nulls stay `None`.
fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoaderError> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

/// Extract a text column as optional floats. Empty cells become `None`;
/// any other cell that does not parse is an error.
fn number_column(
    df: &DataFrame,
    source_kind: SourceKind,
    name: &str,
) -> Result<Vec<Option<f64>>, LoaderError> {
    string_column(df, name)?
        .into_iter()
        .map(|cell| match cell {
            Some(text) => parse_number(source_kind, name, &text),
            None => Ok(None),
        })
        .collect()
}

fn parse_number(
    source_kind: SourceKind,
    column: &str,
    text: &str,
) -> Result<Option<f64>, LoaderError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(LoaderError::InvalidNumber {
            source_kind,
            column: column.to_string(),
            value: text.to_string(),
        }),
    }
}

fn load_carbon_csv(path: &Path) -> Result<Vec<CarbonRow>, LoaderError> {
    let df = read_csv(path, Some(0))?;
    require_columns(&df, SourceKind::Carbon, &[CARBON_STATE_COL, CARBON_VALUE_COL])?;

    let states = string_column(&df, CARBON_STATE_COL)?;
    let values = number_column(&df, SourceKind::Carbon, CARBON_VALUE_COL)?;

    Ok(states
        .into_iter()
        .zip(values)
        .map(|(state, carbon_per_capita_2021)| CarbonRow {
            state,
            carbon_per_capita_2021,
        })
        .collect())
}

fn load_carbon_sheet(path: &Path, sheet: &str) -> Result<Vec<CarbonRow>, LoaderError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| LoaderError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(LoaderError::MissingSheet {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|source| LoaderError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| LoaderError::EmptySheet {
        sheet: sheet.to_string(),
    })?;

    let state_idx = header_index(header, CARBON_STATE_COL)?;
    let value_idx = header_index(header, CARBON_VALUE_COL)?;

    rows.map(|row| -> Result<CarbonRow, LoaderError> {
        Ok(CarbonRow {
            state: row.get(state_idx).and_then(cell_text),
            carbon_per_capita_2021: match row.get(value_idx) {
                Some(cell) => cell_number(cell)?,
                None => None,
            },
        })
    })
    .collect()
}

fn header_index(header: &[Data], column: &str) -> Result<usize, LoaderError> {
    header
        .iter()
        .position(|cell| cell_text(cell).as_deref().map(str::trim) == Some(column))
        .ok_or_else(|| LoaderError::MissingColumn {
            source_kind: SourceKind::Carbon,
            column: column.to_string(),
        })
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn cell_number(cell: &Data) -> Result<Option<f64>, LoaderError> {
    match cell {
        Data::Empty => Ok(None),
        Data::Float(f) => Ok(Some(*f)),
        Data::Int(i) => Ok(Some(*i as f64)),
        Data::String(s) => parse_number(SourceKind::Carbon, CARBON_VALUE_COL, s),
        other => Err(LoaderError::InvalidNumber {
            source_kind: SourceKind::Carbon,
            column: CARBON_VALUE_COL.to_string(),
            value: other.to_string(),
        }),
    }
}
