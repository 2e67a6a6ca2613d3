//! Asthma Dashboard - state-level asthma prevalence against air quality,
//! household income and carbon emissions.
//!
//! The `data` module builds the merged per-state table from three public
//! sources; `charts` and `gui` present it.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod stats;
