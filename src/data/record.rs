//! The merged per-state table handed to the presentation layer.

use crate::data::loader::SourceKind;
use crate::data::processor::FilterReport;

/// One row of the merged table.
#[derive(Debug, Clone, PartialEq)]
pub struct StateRecord {
    pub state: String,
    pub asthma_prev: f64,
    pub avg_income: f64,
    pub avg_days_with_aqi: f64,
    pub avg_days_pm25: f64,
    pub avg_days_ozone: f64,
    pub avg_days_no2: f64,
    pub avg_days_co: f64,
    pub avg_days_pm10: f64,
    pub carbon_per_capita_2021: f64,
}

/// Numeric columns of [`StateRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    AsthmaPrev,
    AvgIncome,
    AvgDaysWithAqi,
    AvgDaysPm25,
    AvgDaysOzone,
    AvgDaysNo2,
    AvgDaysCo,
    AvgDaysPm10,
    CarbonPerCapita2021,
}

impl Metric {
    pub fn value(self, record: &StateRecord) -> f64 {
        match self {
            Metric::AsthmaPrev => record.asthma_prev,
            Metric::AvgIncome => record.avg_income,
            Metric::AvgDaysWithAqi => record.avg_days_with_aqi,
            Metric::AvgDaysPm25 => record.avg_days_pm25,
            Metric::AvgDaysOzone => record.avg_days_ozone,
            Metric::AvgDaysNo2 => record.avg_days_no2,
            Metric::AvgDaysCo => record.avg_days_co,
            Metric::AvgDaysPm10 => record.avg_days_pm10,
            Metric::CarbonPerCapita2021 => record.carbon_per_capita_2021,
        }
    }

    /// Axis label.
    pub fn label(self) -> &'static str {
        match self {
            Metric::AsthmaPrev => "Asthma Prevalence (%)",
            Metric::AvgIncome => "Avg Income (USD)",
            Metric::AvgDaysWithAqi => "Average Days with AQI",
            Metric::AvgDaysPm25 => "Avg Days PM\u{2082}.\u{2085}",
            Metric::AvgDaysOzone => "Avg Days Ozone",
            Metric::AvgDaysNo2 => "Avg Days NO\u{2082}",
            Metric::AvgDaysCo => "Avg Days CO",
            Metric::AvgDaysPm10 => "Avg Days PM10",
            Metric::CarbonPerCapita2021 => "CO\u{2082} per Capita (metric tons)",
        }
    }
}

/// A state that did not make it through the inner join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedState {
    pub state: String,
    pub missing_from: Vec<SourceKind>,
}

/// States lost by the inner join, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinReport {
    pub dropped: Vec<DroppedState>,
}

impl JoinReport {
    pub fn is_lossless(&self) -> bool {
        self.dropped.is_empty()
    }

    pub fn dropped_from(&self, source: SourceKind) -> impl Iterator<Item = &str> {
        self.dropped
            .iter()
            .filter(move |d| d.missing_from.contains(&source))
            .map(|d| d.state.as_str())
    }
}

/// Immutable merged table, one record per state sorted by state name.
#[derive(Debug, Clone, Default)]
pub struct StateTable {
    records: Vec<StateRecord>,
    filter: FilterReport,
    join: JoinReport,
}

impl StateTable {
    pub(crate) fn new(records: Vec<StateRecord>, filter: FilterReport, join: JoinReport) -> Self {
        Self {
            records,
            filter,
            join,
        }
    }

    pub fn records(&self) -> &[StateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, state: &str) -> Option<&StateRecord> {
        self.records
            .binary_search_by(|r| r.state.as_str().cmp(state))
            .ok()
            .map(|idx| &self.records[idx])
    }

    pub fn filter_report(&self) -> &FilterReport {
        &self.filter
    }

    pub fn join_report(&self) -> &JoinReport {
        &self.join
    }
}
