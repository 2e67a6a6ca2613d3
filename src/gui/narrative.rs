//! Page text: research questions, chart commentary, conclusion and the
//! data-quality notes derived from the merged table.

use crate::data::{SourceKind, StateTable};
use crate::stats::{LinearFit, SIGNIFICANCE_THRESHOLD};

pub const PAGE_TITLE: &str = "\u{1f4ca} State-Level Asthma & Pollution Dashboard (2021)";

pub const RESEARCH_QUESTIONS_HEADER: &str = "Research Questions";
pub const RESEARCH_QUESTIONS: [&str; 3] = [
    "How does the number of days with poor air quality (AQI) relate to adult asthma prevalence?",
    "What role does average household income play in state asthma rates?",
    "Are CO\u{2082} emissions or fine-particle (PM\u{2082}.\u{2085}) exposure significant predictors of asthma?",
];

pub const AQI_CAPTION: &str = "States with more days in the year having any AQI reading do **not** show a clear increase in adult asthma prevalence.";
pub const INCOME_CAPTION: &str = "There's no obvious linear trend between higher income and lower asthma prevalence at the state level (p > 0.4).";
pub const EMISSIONS_HEADER: &str = "CO\u{2082} Emissions & PM\u{2082}.\u{2085} Exposure";
pub const CARBON_CAPTION: &str = "CO\u{2082} emissions vary widely across states, but they alone do not explain differences in asthma prevalence (p > 0.2).";
pub const PM25_CAPTION: &str = "More days with elevated PM\u{2082}.\u{2085} show a slight negative slope, but it's not statistically significant in a linear model (p \u{2248} 0.6).";

pub const CONCLUSION_HEADER: &str = "\u{1f50d} Final Conclusion";
pub const CONCLUSION: [&str; 2] = [
    "Across all of our state-level linear models (AQI days, income, CO\u{2082} emissions and specific pollutant-days), **none** of the covariates reached statistical significance (all p \u{226b} 0.05).",
    "\u{1f539} **R\u{b2} values** never rose above ~18 % (Adj R\u{b2} near zero), indicating that state-level aggregation washes out the environmental or socioeconomic signals driving asthma.",
];
pub const NEXT_STEPS_HEADER: &str = "Next Steps:";
pub const NEXT_STEPS: [&str; 3] = [
    "Move to county-level or panel data across multiple years",
    "Incorporate health/demographic covariates (smoking, age, healthcare access)",
    "Use regularized or non-linear models to handle multicollinearity",
];

pub const FOOTER: [&str; 3] = [
    "**INFOSCI 301 | Duke Kunshan University, 2025**",
    "Authors: Nazirjon Ismoiljonov & Jiean Zhou",
    "Professor: Luyao Zhang",
];

/// Split `**bold**` markup into (text, is_bold) spans. Empty spans are dropped.
pub fn emphasis_spans(text: &str) -> Vec<(&str, bool)> {
    text.split("**")
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| (part, i % 2 == 1))
        .collect()
}

/// One-line summary of the live trendline fit shown under a chart.
pub fn fit_caption(fit: Option<&LinearFit>) -> String {
    match fit {
        Some(fit) => {
            let verdict = if fit.is_significant() {
                "significant"
            } else {
                "not significant"
            };
            format!("{fit} ({verdict} at {SIGNIFICANCE_THRESHOLD})")
        }
        None => "Not enough data for a trendline.".to_string(),
    }
}

/// Human-readable notes about rows filtered out while building the table.
pub fn data_notes(table: &StateTable) -> Vec<String> {
    let filter = table.filter_report();
    let mut notes = vec![
        format!("{} states in the merged table.", table.len()),
        format!(
            "Income table: {} rows read, {} with a malformed weighted count, {} territories rows.",
            filter.input_rows, filter.malformed_weight, filter.territories
        ),
    ];

    if filter.unmapped_state > 0 {
        notes.push(format!(
            "{} income rows had a state code outside the 50-state lookup.",
            filter.unmapped_state
        ));
    }
    if filter.unknown_bracket > 0 {
        notes.push(format!(
            "{} income rows had an unrecognized income bracket; their states show no average income.",
            filter.unknown_bracket
        ));
    }

    for source in [SourceKind::Income, SourceKind::Aqi, SourceKind::Carbon] {
        let missing: Vec<&str> = table.join_report().dropped_from(source).collect();
        if !missing.is_empty() {
            notes.push(format!(
                "Missing from the {source} source (dropped): {}.",
                missing.join(", ")
            ));
        }
    }

    notes
}
