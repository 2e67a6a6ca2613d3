use asthma_dashboard::charts::DashboardCharts;
use asthma_dashboard::config::{DashboardConfig, SourcePaths};
use asthma_dashboard::data::{
    DataPipeline, LoaderError, PipelineCache, PipelineError, SourceKind,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const AQI_CSV: &str = "\
State,County,Year,Days with AQI,Days PM2.5,Days Ozone,Days NO2,Days CO,Days PM10
Alabama,Baldwin,2021,300,10,250,0,0,2
Alabama,Clay,2021,200,20,150,0,0,4
Alaska,Anchorage,2021,150,5,100,0,1,
Puerto Rico,Bayamon,2021,90,40,0,0,0,0
";

const CARBON_CSV: &str = "\
State,CarbonPerCapita2021
Alabama ,20.5
Alaska,45.0
Texas,30.0
";

fn income_csv() -> String {
    [
        "State,Income,Weighted Numbere,Prevalence (Percent)",
        "AL,\"< $15,000\",\"1,000\",12.0",
        "AL,\">=$75,000\",\"3,000\",8.0",
        "AL,Territories,500,9.0",
        "AK,\"$25,000\u{2013}<$50,000\",200,10.0",
        "AK,\"$50,000\u{2013}<$75,000\",600,6.0",
        "AK,\"< $15,000\",N/A*,5.0",
        "PR,\"< $15,000\",100,9.0",
    ]
    .join("\n")
}

fn write_sources(dir: &TempDir) -> SourcePaths {
    let sources = SourcePaths {
        aqi_csv: dir.path().join("aqi.csv"),
        income_csv: dir.path().join("income.csv"),
        carbon_workbook: dir.path().join("carbon.csv"),
        carbon_sheet: "Table 4".to_string(),
    };
    fs::write(&sources.aqi_csv, AQI_CSV).unwrap();
    fs::write(&sources.income_csv, income_csv()).unwrap();
    fs::write(&sources.carbon_workbook, CARBON_CSV).unwrap();
    sources
}

#[test]
fn test_full_pipeline() {
    let dir = TempDir::new().unwrap();
    let sources = write_sources(&dir);

    let table = DataPipeline::new(sources).run().expect("pipeline failed");

    let states: Vec<&str> = table.records().iter().map(|r| r.state.as_str()).collect();
    assert_eq!(states, vec!["Alabama", "Alaska"]);

    let alabama = table.get("Alabama").unwrap();
    assert!((alabama.asthma_prev - 9.0).abs() < 1e-9);
    assert!((alabama.avg_income - 67_500.0).abs() < 1e-6);
    assert!((alabama.avg_days_with_aqi - 250.0).abs() < 1e-9);
    assert!((alabama.avg_days_pm25 - 15.0).abs() < 1e-9);
    assert!((alabama.carbon_per_capita_2021 - 20.5).abs() < 1e-9);

    let alaska = table.get("Alaska").unwrap();
    assert!((alaska.asthma_prev - 7.0).abs() < 1e-9);
    assert!((alaska.avg_income - 56_250.0).abs() < 1e-6);
    assert!(alaska.avg_days_pm10.is_nan());

    let filter = table.filter_report();
    assert_eq!(filter.input_rows, 7);
    assert_eq!(filter.malformed_weight, 1);
    assert_eq!(filter.territories, 1);
    assert_eq!(filter.unmapped_state, 1);
    assert_eq!(filter.unknown_bracket, 0);

    let join = table.join_report();
    let missing_income: Vec<&str> = join.dropped_from(SourceKind::Income).collect();
    assert_eq!(missing_income, vec!["Puerto Rico", "Texas"]);
    let missing_aqi: Vec<&str> = join.dropped_from(SourceKind::Aqi).collect();
    assert_eq!(missing_aqi, vec!["Texas"]);
}

#[test]
fn test_config_file_drives_pipeline() {
    let dir = TempDir::new().unwrap();
    let sources = write_sources(&dir);

    let config_path = dir.path().join("dashboard.json");
    let json = serde_json::json!({
        "sources": {
            "aqi_csv": sources.aqi_csv,
            "income_csv": sources.income_csv,
            "carbon_workbook": sources.carbon_workbook,
        }
    });
    fs::write(&config_path, json.to_string()).unwrap();

    let config = DashboardConfig::load(&config_path).unwrap();
    assert_eq!(config.sources, sources);
    assert_eq!(config.export.width, 1400);

    let table = DataPipeline::new(config.sources).run().unwrap();
    assert_eq!(table.len(), 2);
}

#[test]
fn test_cache_serves_same_table_until_invalidated() {
    let dir = TempDir::new().unwrap();
    let sources = write_sources(&dir);
    let cache = PipelineCache::new(DataPipeline::new(sources.clone()));

    let first = cache.get_or_load().unwrap();
    fs::remove_file(&sources.carbon_workbook).unwrap();
    let second = cache.get_or_load().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    cache.invalidate();
    assert!(cache.get_or_load().is_err());
    assert!(!cache.is_loaded());
}

#[test]
fn test_missing_source_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut sources = write_sources(&dir);
    sources.aqi_csv = dir.path().join("nope.csv");

    assert!(DataPipeline::new(sources).run().is_err());
}

#[test]
fn test_charts_from_loaded_table() {
    let dir = TempDir::new().unwrap();
    let table = DataPipeline::new(write_sources(&dir)).run().unwrap();
    let charts = DashboardCharts::from_table(&table);

    assert_eq!(charts.aqi.points.len(), 2);
    let bar_states: Vec<&str> = charts.carbon.bars.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(bar_states, vec!["Alaska", "Alabama"]);
    // Two states are too few for a trendline.
    assert!(charts.income.trend.is_none());
}

#[test]
fn test_non_numeric_aqi_cell_aborts_pipeline() {
    let dir = TempDir::new().unwrap();
    let sources = write_sources(&dir);
    fs::write(
        &sources.aqi_csv,
        "State,County,Year,Days with AQI,Days PM2.5,Days Ozone,Days NO2,Days CO,Days PM10\n\
         Alabama,Baldwin,2021,300,10,250,0,0,2\n\
         Alabama,Clay,2021,200,abc,150,0,0,4\n\
         Alaska,Anchorage,2021,150,5,100,0,1,\n",
    )
    .unwrap();

    let err = DataPipeline::new(sources).run().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Loader(LoaderError::InvalidNumber { .. })
    ));
}
