//! Data module - source loading, cleaning and the merged state table

mod cache;
mod loader;
mod lookup;
mod pipeline;
mod processor;
mod record;

pub use cache::{global_cache, PipelineCache};
pub use loader::{
    is_csv, AqiCountyRow, CarbonRow, DataLoader, IncomeRow, LoaderError, SourceKind,
};
pub use lookup::{income_midpoint, state_name, INCOME_BRACKETS, TERRITORIES_BRACKET};
pub use pipeline::{inner_join, DataPipeline, PipelineError};
pub use processor::{
    AqiAggregate, DataProcessor, FilterReport, PrevalenceRow, ProcessorError, WeightedState,
};
pub use record::{DroppedState, JoinReport, Metric, StateRecord, StateTable};
