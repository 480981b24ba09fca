use crate::ingest::CsvSource;
use crate::loader::records_from_csv;
use crate::record::Record;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info};

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// Nothing fetched since start-up or the last reset
    Idle,
    Loading,
    Ready,
}

struct DataView {
    status: LoadStatus,
    records: Arc<Vec<Record>>,
    generation: u64,
    loaded_at: Option<DateTime<Utc>>,
}

/// Point-in-time copy of the dashboard's data
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub status: LoadStatus,
    pub records: Arc<Vec<Record>>,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// In-memory record store behind the dashboard page
///
/// The record list is only ever replaced as a whole. Each load is tagged
/// with a generation; a reset moves to a new generation so results of a
/// load started before it are dropped on arrival.
pub struct Dashboard {
    view: RwLock<DataView>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Dashboard {
            view: RwLock::new(DataView {
                status: LoadStatus::Idle,
                records: Arc::new(Vec::new()),
                generation: 0,
                loaded_at: None,
            }),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let view = self.view.read().unwrap_or_else(PoisonError::into_inner);
        Snapshot {
            status: view.status,
            records: Arc::clone(&view.records),
            loaded_at: view.loaded_at,
        }
    }

    /// Discard the records and go back to `Idle`
    pub fn reset(&self) {
        let mut view = self.view.write().unwrap_or_else(PoisonError::into_inner);
        view.generation += 1;
        view.status = LoadStatus::Idle;
        view.records = Arc::new(Vec::new());
        view.loaded_at = None;
    }

    /// Enter `Loading` under a fresh generation and return it
    fn begin_load(&self) -> u64 {
        let mut view = self.view.write().unwrap_or_else(PoisonError::into_inner);
        view.generation += 1;
        view.status = LoadStatus::Loading;
        view.records = Arc::new(Vec::new());
        view.generation
    }

    /// Like `begin_load`, but only when nothing is loaded or in flight
    fn begin_load_if_idle(&self) -> Option<u64> {
        let mut view = self.view.write().unwrap_or_else(PoisonError::into_inner);
        if view.status != LoadStatus::Idle {
            return None;
        }
        view.generation += 1;
        view.status = LoadStatus::Loading;
        Some(view.generation)
    }

    /// Install the outcome of load `generation`
    ///
    /// Returns false, leaving the store untouched, when a newer generation
    /// has started since.
    fn finish_load(&self, generation: u64, records: Option<Vec<Record>>) -> bool {
        let mut view = self.view.write().unwrap_or_else(PoisonError::into_inner);
        if view.generation != generation {
            return false;
        }
        view.status = LoadStatus::Ready;
        if let Some(records) = records {
            view.records = Arc::new(records);
            view.loaded_at = Some(Utc::now());
        }
        true
    }

    /// Fetch, parse and install a fresh record list
    ///
    /// Failures are logged and leave the list empty; either way the store
    /// ends up `Ready` unless it was reset meanwhile.
    pub async fn load_records(&self, source: &dyn CsvSource) {
        let generation = self.begin_load();
        self.run_load(generation, source).await;
    }

    /// Start a background load if the store is idle
    ///
    /// Returns the snapshot as it stands after the check, so a caller sees
    /// `Loading` on the first visit.
    pub fn ensure_loaded(self: &Arc<Self>, source: Arc<dyn CsvSource>) -> Snapshot {
        if let Some(generation) = self.begin_load_if_idle() {
            let dashboard = Arc::clone(self);
            tokio::spawn(async move {
                dashboard.run_load(generation, source.as_ref()).await;
            });
        }
        self.snapshot()
    }

    async fn run_load(&self, generation: u64, source: &dyn CsvSource) {
        let location = source.describe();
        let records = match source.fetch().await {
            Ok(text) => {
                let records = records_from_csv(&text);
                info!(source = %location, count = records.len(), "loaded records");
                Some(records)
            }
            Err(e) => {
                error!(source = %location, error = %e, "error fetching data");
                None
            }
        };

        if !self.finish_load(generation, records) {
            debug!(generation, "discarding result of a superseded load");
        }
    }
}
