//! Data Processor Module
//! Cleaning and per-state aggregation of the typed source rows.

use crate::data::loader::{AqiCountyRow, CarbonRow, IncomeRow};
use crate::data::lookup::{income_midpoint, state_name, TERRITORIES_BRACKET};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Unparsable prevalence {value:?} for state code {state_code:?}")]
    InvalidPrevalence {
        state_code: Option<String>,
        value: String,
    },
    #[error("Weights for {state} sum to zero")]
    ZeroWeight { state: String },
    #[error("State {0:?} appears more than once in the carbon table")]
    DuplicateState(String),
}

/// Counts of rows removed or degraded while cleaning the income table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub input_rows: usize,
    /// Weighted count missing or not a non-negative integer.
    pub malformed_weight: usize,
    /// Bracket equal to the territories sentinel.
    pub territories: usize,
    /// Retained, but the state code has no full name (dropped at merge).
    pub unmapped_state: usize,
    /// Retained, but the bracket has no midpoint (state income becomes NaN).
    pub unknown_bracket: usize,
}

impl FilterReport {
    pub fn retained(&self) -> usize {
        self.input_rows - self.malformed_weight - self.territories
    }
}

/// A validated row of the income-stratified prevalence table.
#[derive(Debug, Clone, PartialEq)]
pub struct PrevalenceRow {
    pub state_code: Option<String>,
    pub state: Option<&'static str>,
    pub bracket: Option<String>,
    pub weighted_n: u64,
    pub prev_pct: f64,
    pub income_mid: Option<f64>,
}

/// Per-state county means of the AQI day counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AqiAggregate {
    pub avg_days_with_aqi: f64,
    pub avg_days_pm25: f64,
    pub avg_days_ozone: f64,
    pub avg_days_no2: f64,
    pub avg_days_co: f64,
    pub avg_days_pm10: f64,
}

/// Per-state sample-weighted prevalence and income.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedState {
    pub asthma_prev: f64,
    pub avg_income: f64,
}

/// Handles data cleaning and aggregation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Parse a comma-formatted weighted count. Anything other than digits
    /// (after dropping thousands separators) is rejected.
    pub fn parse_weighted_n(raw: &str) -> Option<u64> {
        let digits: String = raw.chars().filter(|c| *c != ',').collect();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Apply the income-table filters in order: malformed weight, then the
    /// territories sentinel. Surviving rows get their state name and income
    /// midpoint attached.
    pub fn clean_income_rows(
        rows: &[IncomeRow],
    ) -> Result<(Vec<PrevalenceRow>, FilterReport), ProcessorError> {
        let mut report = FilterReport {
            input_rows: rows.len(),
            ..Default::default()
        };
        let mut cleaned = Vec::with_capacity(rows.len());

        for row in rows {
            let Some(weighted_n) = row.weighted_n.as_deref().and_then(Self::parse_weighted_n)
            else {
                report.malformed_weight += 1;
                debug!(state_code = ?row.state_code, weighted_n = ?row.weighted_n, "Skipping malformed weighted count");
                continue;
            };

            if row.bracket.as_deref() == Some(TERRITORIES_BRACKET) {
                report.territories += 1;
                continue;
            }

            let prev_pct = match row.prevalence.as_deref().map(str::trim) {
                None | Some("") => f64::NAN,
                Some(text) => text
                    .parse::<f64>()
                    .map_err(|_| ProcessorError::InvalidPrevalence {
                        state_code: row.state_code.clone(),
                        value: text.to_string(),
                    })?,
            };

            let state = row.state_code.as_deref().and_then(state_name);
            if state.is_none() {
                report.unmapped_state += 1;
            }

            let income_mid = row.bracket.as_deref().and_then(income_midpoint);
            if income_mid.is_none() {
                report.unknown_bracket += 1;
            }

            cleaned.push(PrevalenceRow {
                state_code: row.state_code.clone(),
                state,
                bracket: row.bracket.clone(),
                weighted_n,
                prev_pct,
                income_mid,
            });
        }

        if report.unmapped_state > 0 || report.unknown_bracket > 0 {
            warn!(
                unmapped_state = report.unmapped_state,
                unknown_bracket = report.unknown_bracket,
                "Income rows without a state name or bracket midpoint"
            );
        }

        Ok((cleaned, report))
    }

    /// Sample-weighted mean: sum(v * w) / sum(w). `None` when weights sum to zero.
    pub fn weighted_mean(pairs: impl IntoIterator<Item = (f64, u64)>) -> Option<f64> {
        let (num, den) = pairs
            .into_iter()
            .fold((0.0, 0.0), |(num, den), (value, weight)| {
                let w = weight as f64;
                (num + value * w, den + w)
            });
        if den == 0.0 {
            None
        } else {
            Some(num / den)
        }
    }

    /// Group the cleaned rows by state and compute the weighted prevalence
    /// and weighted income midpoint. Rows without a state name are ignored.
    pub fn weighted_by_state(
        rows: &[PrevalenceRow],
    ) -> Result<BTreeMap<String, WeightedState>, ProcessorError> {
        let mut groups: BTreeMap<&str, Vec<&PrevalenceRow>> = BTreeMap::new();
        for row in rows {
            if let Some(state) = row.state {
                groups.entry(state).or_default().push(row);
            }
        }

        groups
            .into_iter()
            .map(|(state, rows)| {
                let zero_weight = || ProcessorError::ZeroWeight {
                    state: state.to_string(),
                };
                let asthma_prev =
                    Self::weighted_mean(rows.iter().map(|r| (r.prev_pct, r.weighted_n)))
                        .ok_or_else(zero_weight)?;
                let avg_income = Self::weighted_mean(
                    rows.iter()
                        .map(|r| (r.income_mid.unwrap_or(f64::NAN), r.weighted_n)),
                )
                .ok_or_else(zero_weight)?;

                Ok((
                    state.to_string(),
                    WeightedState {
                        asthma_prev,
                        avg_income,
                    },
                ))
            })
            .collect()
    }

    /// Arithmetic mean that skips missing values; NaN when nothing is left.
    pub fn mean_skip_missing(values: impl IntoIterator<Item = Option<f64>>) -> f64 {
        let (sum, count) = values
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    }

    /// Unweighted per-state mean of the county AQI day counts.
    pub fn aggregate_aqi(rows: &[AqiCountyRow]) -> BTreeMap<String, AqiAggregate> {
        let mut groups: BTreeMap<String, Vec<&AqiCountyRow>> = BTreeMap::new();
        for row in rows {
            if let Some(state) = row.state.as_deref() {
                groups.entry(state.trim().to_string()).or_default().push(row);
            }
        }

        groups
            .into_iter()
            .map(|(state, rows)| {
                let mean = |f: fn(&AqiCountyRow) -> Option<f64>| {
                    Self::mean_skip_missing(rows.iter().map(|r| f(r)))
                };
                let aggregate = AqiAggregate {
                    avg_days_with_aqi: mean(|r| r.days_with_aqi),
                    avg_days_pm25: mean(|r| r.days_pm25),
                    avg_days_ozone: mean(|r| r.days_ozone),
                    avg_days_no2: mean(|r| r.days_no2),
                    avg_days_co: mean(|r| r.days_co),
                    avg_days_pm10: mean(|r| r.days_pm10),
                };
                (state, aggregate)
            })
            .collect()
    }

    /// Trim state names and index the carbon table by state.
    pub fn carbon_by_state(rows: &[CarbonRow]) -> Result<BTreeMap<String, f64>, ProcessorError> {
        let mut by_state = BTreeMap::new();
        for row in rows {
            let Some(state) = row.state.as_deref().map(str::trim) else {
                continue;
            };
            let value = row.carbon_per_capita_2021.unwrap_or(f64::NAN);
            if by_state.insert(state.to_string(), value).is_some() {
                return Err(ProcessorError::DuplicateState(state.to_string()));
            }
        }
        Ok(by_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn income(code: &str, bracket: &str, weight: &str, prev: &str) -> IncomeRow {
        IncomeRow {
            state_code: Some(code.to_string()),
            bracket: Some(bracket.to_string()),
            weighted_n: Some(weight.to_string()),
            prevalence: Some(prev.to_string()),
        }
    }

    #[test]
    fn test_parse_weighted_n() {
        assert_eq!(DataProcessor::parse_weighted_n("12,345"), Some(12345));
        assert_eq!(DataProcessor::parse_weighted_n("0"), Some(0));
        assert_eq!(DataProcessor::parse_weighted_n("1,234,567"), Some(1234567));
        assert_eq!(DataProcessor::parse_weighted_n(""), None);
        assert_eq!(DataProcessor::parse_weighted_n("N/A*"), None);
        assert_eq!(DataProcessor::parse_weighted_n("-5"), None);
        assert_eq!(DataProcessor::parse_weighted_n("12.5"), None);
        assert_eq!(DataProcessor::parse_weighted_n(" 12"), None);
    }

    #[test]
    fn test_clean_income_rows_filters_in_order() {
        let rows = vec![
            income("AL", "< $15,000", "1,000", "12.0"),
            income("AL", "Territories", "500", "9.0"),
            income("AL", "Territories", "***", "9.0"),
            income("GU", "< $15,000", "300", "8.0"),
            income("AK", "unknown bracket", "200", "7.5"),
            IncomeRow {
                weighted_n: None,
                ..income("AK", "< $15,000", "", "")
            },
        ];

        let (cleaned, report) = DataProcessor::clean_income_rows(&rows).unwrap();

        assert_eq!(report.input_rows, 6);
        assert_eq!(report.malformed_weight, 2);
        assert_eq!(report.territories, 1);
        assert_eq!(report.unmapped_state, 1);
        assert_eq!(report.unknown_bracket, 1);
        assert_eq!(report.retained(), cleaned.len());
        assert_eq!(cleaned[0].state, Some("Alabama"));
        assert_eq!(cleaned[0].income_mid, Some(7500.0));
        assert_eq!(cleaned[1].state, None);
        assert_eq!(cleaned[2].income_mid, None);
    }

    #[test]
    fn test_padded_state_code_is_unmapped() {
        let rows = vec![
            income(" AL", "< $15,000", "1,000", "12.0"),
            income("AL", "< $15,000", "1,000", "10.0"),
        ];

        let (cleaned, report) = DataProcessor::clean_income_rows(&rows).unwrap();

        assert_eq!(report.unmapped_state, 1);
        assert_eq!(cleaned[0].state, None);
        let weighted = DataProcessor::weighted_by_state(&cleaned).unwrap();
        assert_eq!(weighted["Alabama"].asthma_prev, 10.0);
    }

    #[test]
    fn test_weight_filter_is_idempotent() {
        let rows = vec![
            income("AL", "< $15,000", "1,000", "12.0"),
            income("AL", ">=$75,000", "n/a", "12.0"),
            income("AK", ">=$75,000", "2,500", "6.0"),
        ];
        let (once, _) = DataProcessor::clean_income_rows(&rows).unwrap();

        let again: Vec<IncomeRow> = once
            .iter()
            .map(|r| IncomeRow {
                state_code: r.state_code.clone(),
                bracket: r.bracket.clone(),
                weighted_n: Some(r.weighted_n.to_string()),
                prevalence: Some(r.prev_pct.to_string()),
            })
            .collect();
        let (twice, report) = DataProcessor::clean_income_rows(&again).unwrap();

        assert_eq!(once, twice);
        assert_eq!(report.malformed_weight, 0);
    }

    #[test]
    fn test_invalid_prevalence_is_fatal() {
        let rows = vec![income("AL", "< $15,000", "1,000", "twelve")];
        let err = DataProcessor::clean_income_rows(&rows).unwrap_err();
        assert!(matches!(err, ProcessorError::InvalidPrevalence { .. }));
    }

    #[test]
    fn test_weighted_mean() {
        let mean = DataProcessor::weighted_mean([(10.0, 1), (20.0, 3)]).unwrap();
        assert!((mean - 17.5).abs() < 1e-12);
        assert_eq!(DataProcessor::weighted_mean([(10.0, 0)]), None);
        assert_eq!(DataProcessor::weighted_mean(Vec::new()), None);
    }

    #[test]
    fn test_weighted_by_state_unknown_bracket_gives_nan_income() {
        let rows = vec![
            income("AL", "< $15,000", "100", "10.0"),
            income("AL", "mystery", "100", "20.0"),
        ];
        let (cleaned, _) = DataProcessor::clean_income_rows(&rows).unwrap();
        let by_state = DataProcessor::weighted_by_state(&cleaned).unwrap();

        let alabama = by_state["Alabama"];
        assert!((alabama.asthma_prev - 15.0).abs() < 1e-12);
        assert!(alabama.avg_income.is_nan());
    }

    #[test]
    fn test_zero_weight_is_fatal() {
        let rows = vec![income("AL", "< $15,000", "0", "10.0")];
        let (cleaned, _) = DataProcessor::clean_income_rows(&rows).unwrap();
        let err = DataProcessor::weighted_by_state(&cleaned).unwrap_err();
        assert!(matches!(err, ProcessorError::ZeroWeight { .. }));
    }

    #[test]
    fn test_aggregate_aqi_trims_and_skips_missing() {
        let rows = vec![
            AqiCountyRow {
                state: Some("Ohio ".into()),
                days_with_aqi: Some(300.0),
                days_pm25: Some(10.0),
                ..Default::default()
            },
            AqiCountyRow {
                state: Some("Ohio".into()),
                days_with_aqi: Some(100.0),
                days_pm25: None,
                ..Default::default()
            },
            AqiCountyRow {
                state: None,
                days_with_aqi: Some(5.0),
                ..Default::default()
            },
        ];

        let by_state = DataProcessor::aggregate_aqi(&rows);

        assert_eq!(by_state.len(), 1);
        let ohio = by_state["Ohio"];
        assert_eq!(ohio.avg_days_with_aqi, 200.0);
        assert_eq!(ohio.avg_days_pm25, 10.0);
        assert!(ohio.avg_days_co.is_nan());
    }

    #[test]
    fn test_carbon_by_state_rejects_duplicates() {
        let rows = vec![
            CarbonRow {
                state: Some(" Texas".into()),
                carbon_per_capita_2021: Some(22.0),
            },
            CarbonRow {
                state: Some("Texas ".into()),
                carbon_per_capita_2021: Some(23.0),
            },
        ];
        let err = DataProcessor::carbon_by_state(&rows).unwrap_err();
        assert!(matches!(err, ProcessorError::DuplicateState(s) if s == "Texas"));
    }
}
