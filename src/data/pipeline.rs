//! Data Pipeline Module
//! Loads the three sources, cleans them and inner-joins the per-state
//! aggregates into one [`StateTable`].

use crate::config::SourcePaths;
use crate::data::loader::{
    AqiCountyRow, CarbonRow, DataLoader, IncomeRow, LoaderError, SourceKind,
};
use crate::data::processor::{
    AqiAggregate, DataProcessor, FilterReport, ProcessorError, WeightedState,
};
use crate::data::record::{DroppedState, JoinReport, StateRecord, StateTable};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

/// Builds the merged per-state table from the configured sources.
#[derive(Debug, Clone)]
pub struct DataPipeline {
    sources: SourcePaths,
}

impl DataPipeline {
    pub fn new(sources: SourcePaths) -> Self {
        Self { sources }
    }

    /// Read every source and build the table. The reads are independent and
    /// run concurrently; any read or validation failure aborts the build.
    #[instrument(skip(self))]
    pub fn run(&self) -> Result<StateTable, PipelineError> {
        let loader = DataLoader::new(&self.sources);
        let (aqi, (income, carbon)) = rayon::join(
            || loader.load_aqi(),
            || rayon::join(|| loader.load_income(), || loader.load_carbon()),
        );

        Self::build(&aqi?, &income?, &carbon?)
    }

    /// Build the table from already loaded rows.
    pub fn build(
        aqi: &[AqiCountyRow],
        income: &[IncomeRow],
        carbon: &[CarbonRow],
    ) -> Result<StateTable, PipelineError> {
        let state_aqi = DataProcessor::aggregate_aqi(aqi);

        let (prevalence_rows, filter) = DataProcessor::clean_income_rows(income)?;
        log_filter_report(&filter);
        let weighted = DataProcessor::weighted_by_state(&prevalence_rows)?;

        let state_carbon = DataProcessor::carbon_by_state(carbon)?;

        let (records, join) = inner_join(&weighted, &state_aqi, &state_carbon);
        if !join.is_lossless() {
            let names: Vec<&str> = join.dropped.iter().map(|d| d.state.as_str()).collect();
            warn!(
                dropped = join.dropped.len(),
                states = ?names,
                "States missing from at least one source were dropped"
            );
        }

        info!(states = records.len(), "Built merged state table");
        Ok(StateTable::new(records, filter, join))
    }
}

fn log_filter_report(report: &FilterReport) {
    debug!(
        input_rows = report.input_rows,
        malformed_weight = report.malformed_weight,
        territories = report.territories,
        retained = report.retained(),
        "Filtered income table"
    );
}

/// Inner-join the per-state aggregates on the state name, in the order
/// prevalence/income, AQI, carbon. Every state seen in any source but not in
/// all of them is reported in the [`JoinReport`].
pub fn inner_join(
    weighted: &BTreeMap<String, WeightedState>,
    aqi: &BTreeMap<String, AqiAggregate>,
    carbon: &BTreeMap<String, f64>,
) -> (Vec<StateRecord>, JoinReport) {
    let mut records = Vec::new();
    for (state, w) in weighted {
        let (Some(a), Some(&c)) = (aqi.get(state), carbon.get(state)) else {
            continue;
        };
        records.push(StateRecord {
            state: state.clone(),
            asthma_prev: w.asthma_prev,
            avg_income: w.avg_income,
            avg_days_with_aqi: a.avg_days_with_aqi,
            avg_days_pm25: a.avg_days_pm25,
            avg_days_ozone: a.avg_days_ozone,
            avg_days_no2: a.avg_days_no2,
            avg_days_co: a.avg_days_co,
            avg_days_pm10: a.avg_days_pm10,
            carbon_per_capita_2021: c,
        });
    }

    let all_states: BTreeSet<&String> = weighted
        .keys()
        .chain(aqi.keys())
        .chain(carbon.keys())
        .collect();

    let dropped = all_states
        .into_iter()
        .filter_map(|state| {
            let missing_from: Vec<SourceKind> = [
                (SourceKind::Income, weighted.contains_key(state)),
                (SourceKind::Aqi, aqi.contains_key(state)),
                (SourceKind::Carbon, carbon.contains_key(state)),
            ]
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(kind, _)| kind)
            .collect();

            (!missing_from.is_empty()).then(|| DroppedState {
                state: state.clone(),
                missing_from,
            })
        })
        .collect();

    (records, JoinReport { dropped })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aqi_row(state: &str, days: f64, pm25: f64) -> AqiCountyRow {
        AqiCountyRow {
            state: Some(state.to_string()),
            days_with_aqi: Some(days),
            days_pm25: Some(pm25),
            days_ozone: Some(1.0),
            days_no2: Some(0.0),
            days_co: Some(0.0),
            days_pm10: Some(2.0),
        }
    }

    fn income_row(code: &str, bracket: &str, weight: &str, prev: &str) -> IncomeRow {
        IncomeRow {
            state_code: Some(code.to_string()),
            bracket: Some(bracket.to_string()),
            weighted_n: Some(weight.to_string()),
            prevalence: Some(prev.to_string()),
        }
    }

    fn carbon_row(state: &str, value: f64) -> CarbonRow {
        CarbonRow {
            state: Some(state.to_string()),
            carbon_per_capita_2021: Some(value),
        }
    }

    /// Two states, two brackets each, matching AQI and carbon rows.
    fn fixture() -> (Vec<AqiCountyRow>, Vec<IncomeRow>, Vec<CarbonRow>) {
        let aqi = vec![
            aqi_row("Alabama", 300.0, 10.0),
            aqi_row("Alabama", 200.0, 20.0),
            aqi_row("Alaska", 150.0, 5.0),
        ];
        let income = vec![
            income_row("AL", "< $15,000", "1,000", "12.0"),
            income_row("AL", ">=$75,000", "3,000", "8.0"),
            income_row("AK", "$25,000\u{2013}<$50,000", "200", "10.0"),
            income_row("AK", "$50,000\u{2013}<$75,000", "600", "6.0"),
        ];
        let carbon = vec![carbon_row("Alabama ", 20.5), carbon_row("Alaska", 45.0)];
        (aqi, income, carbon)
    }

    #[test]
    fn test_build_matches_hand_computed_averages() {
        let (aqi, income, carbon) = fixture();
        let table = DataPipeline::build(&aqi, &income, &carbon).unwrap();

        assert_eq!(table.len(), 2);

        let alabama = table.get("Alabama").unwrap();
        // (12*1000 + 8*3000) / 4000
        assert_eq!(alabama.asthma_prev, 9.0);
        // (7500*1000 + 87500*3000) / 4000
        assert_eq!(alabama.avg_income, 67500.0);
        assert_eq!(alabama.avg_days_with_aqi, 250.0);
        assert_eq!(alabama.avg_days_pm25, 15.0);
        assert_eq!(alabama.carbon_per_capita_2021, 20.5);

        let alaska = table.get("Alaska").unwrap();
        // (10*200 + 6*600) / 800
        assert_eq!(alaska.asthma_prev, 7.0);
        // (37500*200 + 62500*600) / 800
        assert_eq!(alaska.avg_income, 56250.0);
        assert!(table.join_report().is_lossless());
    }

    #[test]
    fn test_state_missing_from_carbon_is_dropped() {
        let (aqi, income, mut carbon) = fixture();
        carbon.retain(|r| r.state.as_deref() != Some("Alaska"));

        let table = DataPipeline::build(&aqi, &income, &carbon).unwrap();

        assert!(table.get("Alaska").is_none());
        assert_eq!(table.len(), 1);
        let dropped: Vec<&str> = table.join_report().dropped_from(SourceKind::Carbon).collect();
        assert_eq!(dropped, vec!["Alaska"]);
    }

    #[test]
    fn test_states_are_unique_and_sorted() {
        let (mut aqi, income, mut carbon) = fixture();
        aqi.push(aqi_row("District Of Columbia", 365.0, 30.0));
        carbon.push(carbon_row("Wyoming", 96.0));

        let table = DataPipeline::build(&aqi, &income, &carbon).unwrap();
        let states: Vec<&str> = table.records().iter().map(|r| r.state.as_str()).collect();

        assert_eq!(states, vec!["Alabama", "Alaska"]);
        assert_eq!(table.join_report().dropped.len(), 2);
        let dc = &table.join_report().dropped[0];
        assert_eq!(dc.state, "District Of Columbia");
        assert_eq!(dc.missing_from, vec![SourceKind::Income, SourceKind::Carbon]);
    }

    #[test]
    fn test_weighted_mean_invariant_over_retained_rows() {
        let (aqi, mut income, carbon) = fixture();
        income.push(income_row("AL", "$15,000\u{2013}<$25,000", "footnote", "50.0"));
        income.push(income_row("AL", "Territories", "9,999", "50.0"));

        let table = DataPipeline::build(&aqi, &income, &carbon).unwrap();

        let (rows, _) = DataProcessor::clean_income_rows(&income).unwrap();
        let retained: Vec<_> = rows.iter().filter(|r| r.state == Some("Alabama")).collect();
        let num: f64 = retained.iter().map(|r| r.prev_pct * r.weighted_n as f64).sum();
        let den: f64 = retained.iter().map(|r| r.weighted_n as f64).sum();

        let alabama = table.get("Alabama").unwrap();
        assert!((alabama.asthma_prev - num / den).abs() < 1e-9);
        assert_eq!(table.filter_report().malformed_weight, 1);
        assert_eq!(table.filter_report().territories, 1);
    }

    #[test]
    fn test_fixed_brackets_never_produce_missing_income() {
        let (aqi, income, carbon) = fixture();
        let (rows, report) = DataProcessor::clean_income_rows(&income).unwrap();
        assert!(rows.iter().all(|r| r.income_mid.is_some()));
        assert_eq!(report.unknown_bracket, 0);

        let table = DataPipeline::build(&aqi, &income, &carbon).unwrap();
        assert!(table.records().iter().all(|r| r.avg_income.is_finite()));
    }
}
