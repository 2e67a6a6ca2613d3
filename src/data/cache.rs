//! Process-wide memoization of the merged table.

use crate::config::SourcePaths;
use crate::data::pipeline::{DataPipeline, PipelineError};
use crate::data::record::StateTable;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, info};

/// Holds the pipeline result once it has been built. Every caller gets the
/// same `Arc` until [`PipelineCache::invalidate`] is called.
pub struct PipelineCache {
    pipeline: DataPipeline,
    table: Mutex<Option<Arc<StateTable>>>,
}

impl PipelineCache {
    pub fn new(pipeline: DataPipeline) -> Self {
        Self {
            pipeline,
            table: Mutex::new(None),
        }
    }

    /// Return the cached table, building it first if needed. The lock is
    /// held across the build so concurrent callers never compute twice.
    /// Failures are not cached.
    pub fn get_or_load(&self) -> Result<Arc<StateTable>, PipelineError> {
        let mut slot = self.table.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(table) = slot.as_ref() {
            debug!("Using cached state table");
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(self.pipeline.run()?);
        *slot = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Drop the cached table; the next `get_or_load` rebuilds it.
    pub fn invalidate(&self) {
        let mut slot = self.table.lock().unwrap_or_else(|e| e.into_inner());
        if slot.take().is_some() {
            info!("Invalidated cached state table");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

static CACHE: OnceLock<PipelineCache> = OnceLock::new();

/// The process-wide cache. The sources passed on the first call win.
pub fn global_cache(sources: &SourcePaths) -> &'static PipelineCache {
    CACHE.get_or_init(|| PipelineCache::new(DataPipeline::new(sources.clone())))
}
