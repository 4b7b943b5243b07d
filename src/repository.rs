//! Task persistence: the repository contract and its JSON blob-backed
//! implementation.
//!
//! The whole collection lives in one serialized envelope:
//!
//! ```text
//! {
//!   "tasks": [ ... ],
//!   "metadata": { "version": "1.0", "lastUpdated": "...", "totalTasks": 0 }
//! }
//! ```
//!
//! Records inside the envelope stay untyped until validated, so a single
//! corrupted record cannot poison the rest of the collection.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{validate_record, Difficulty, HarmonyTask};
use crate::store::BlobStore;

/// Envelope schema version.
const ENVELOPE_VERSION: &str = "1.0";

/// Default storage key for the task collection.
pub const DEFAULT_STORAGE_KEY: &str = "harmony-tasks.json";

/// Filter options for [`HarmonyTaskRepository::list_tasks`]. Filters are
/// applied as a conjunction.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Keep only tasks with exactly this difficulty.
    pub difficulty: Option<Difficulty>,
    /// Keep only tasks whose tags contain every entry listed here. A task
    /// without tags fails any tag filter.
    pub tags: Option<Vec<String>>,
}

/// The persistence contract consumed by application code.
pub trait HarmonyTaskRepository {
    /// Store a task, replacing any existing task with the same id. The task
    /// is validated before storage is touched.
    fn save_task(&self, task: &HarmonyTask) -> Result<()>;

    /// Load the task with the given id. A matching record that fails
    /// validation is an error here, unlike in [`Self::list_tasks`].
    fn load_task(&self, task_id: &str) -> Result<HarmonyTask>;

    /// List tasks matching the filter. Records that fail validation are
    /// dropped from the result rather than failing the whole listing.
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<HarmonyTask>>;

    /// Delete the task with the given id.
    fn delete_task(&self, task_id: &str) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StorageEnvelope {
    #[serde(default)]
    tasks: Vec<Value>,
    #[serde(default = "Metadata::initial")]
    metadata: Metadata,
}

impl StorageEnvelope {
    fn empty() -> Self {
        Self {
            tasks: Vec::new(),
            metadata: Metadata::initial(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    version: String,
    last_updated: DateTime<Utc>,
    total_tasks: usize,
}

impl Metadata {
    fn initial() -> Self {
        Self::fresh(0)
    }

    fn fresh(total_tasks: usize) -> Self {
        Self {
            version: ENVELOPE_VERSION.to_string(),
            last_updated: Utc::now(),
            total_tasks,
        }
    }
}

/// JSON blob-backed repository.
///
/// Every operation loads the envelope, works on the in-memory collection,
/// and (for writes) re-serializes it in a single blob replacement. The
/// mutex makes that load-mutate-store cycle a transaction when the
/// repository is shared across threads.
pub struct JsonTaskRepository<S> {
    store: S,
    key: String,
    txn: Mutex<()>,
}

impl<S: BlobStore> JsonTaskRepository<S> {
    /// Open a repository over `store`, bootstrapping an empty envelope if
    /// the backing blob is missing or unreadable.
    pub fn new(store: S, key: impl Into<String>) -> Result<Self> {
        let repo = Self {
            store,
            key: key.into(),
            txn: Mutex::new(()),
        };
        repo.ensure_storage_exists()?;
        Ok(repo)
    }

    /// Open a repository under [`DEFAULT_STORAGE_KEY`].
    pub fn open(store: S) -> Result<Self> {
        Self::new(store, DEFAULT_STORAGE_KEY)
    }

    fn ensure_storage_exists(&self) -> Result<()> {
        if self.load_envelope().is_err() {
            debug!(key = %self.key, "initializing empty task envelope");
            self.store_envelope(&StorageEnvelope::empty())?;
        }
        Ok(())
    }

    fn load_envelope(&self) -> Result<StorageEnvelope> {
        let bytes = self
            .store
            .get(&self.key)
            .and_then(|blob| {
                blob.ok_or_else(|| Error::Persistence("Storage not found".to_string()))
            })
            .map_err(|err| err.into_persistence("Failed to load JSON"))?;
        serde_json::from_slice(&bytes)
            .map_err(|err| Error::Persistence(format!("Failed to load JSON: {err}")))
    }

    fn store_envelope(&self, envelope: &StorageEnvelope) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(envelope)
            .map_err(|err| Error::Persistence(format!("Failed to save JSON: {err}")))?;
        self.store
            .set(&self.key, &bytes)
            .map_err(|err| err.into_persistence("Failed to save JSON"))
    }

    fn record_id(record: &Value) -> Option<&str> {
        record.get("id").and_then(Value::as_str)
    }
}

impl<S: BlobStore> HarmonyTaskRepository for JsonTaskRepository<S> {
    fn save_task(&self, task: &HarmonyTask) -> Result<()> {
        task.validate()?;

        let _txn = self.txn.lock().unwrap_or_else(|e| e.into_inner());
        let result: Result<()> = (|| {
            let mut envelope = self.load_envelope()?;
            let record = serde_json::to_value(task)?;

            // Upsert by id: replace in place, else append.
            let existing = envelope
                .tasks
                .iter()
                .position(|r| Self::record_id(r) == Some(task.id.as_str()));
            match existing {
                Some(index) => envelope.tasks[index] = record,
                None => envelope.tasks.push(record),
            }

            envelope.metadata = Metadata::fresh(envelope.tasks.len());
            self.store_envelope(&envelope)
        })();

        debug!(id = %task.id, ok = result.is_ok(), "save task");
        result.map_err(|err| err.into_persistence("Failed to save task"))
    }

    fn load_task(&self, task_id: &str) -> Result<HarmonyTask> {
        let _txn = self.txn.lock().unwrap_or_else(|e| e.into_inner());
        let result: Result<HarmonyTask> = (|| {
            let envelope = self.load_envelope()?;
            let record = envelope
                .tasks
                .iter()
                .find(|r| Self::record_id(r) == Some(task_id))
                .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
            validate_record(record)
        })();

        result.map_err(|err| err.into_persistence("Failed to load task"))
    }

    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<HarmonyTask>> {
        let _txn = self.txn.lock().unwrap_or_else(|e| e.into_inner());
        let result: Result<Vec<HarmonyTask>> = (|| {
            let envelope = self.load_envelope()?;
            let mut tasks = Vec::new();
            for record in &envelope.tasks {
                if !matches_filter(record, filter) {
                    continue;
                }
                match validate_record(record) {
                    Ok(task) => tasks.push(task),
                    Err(err) => {
                        // Corrupted-record tolerance: a bad record drops out
                        // of the listing instead of failing it.
                        warn!(
                            id = Self::record_id(record).unwrap_or(""),
                            error = %err,
                            "dropping invalid task record"
                        );
                    }
                }
            }
            Ok(tasks)
        })();

        result.map_err(|err| err.into_persistence("Failed to list tasks"))
    }

    fn delete_task(&self, task_id: &str) -> Result<()> {
        let _txn = self.txn.lock().unwrap_or_else(|e| e.into_inner());
        let result: Result<()> = (|| {
            let mut envelope = self.load_envelope()?;
            let original_len = envelope.tasks.len();
            envelope.tasks.retain(|r| Self::record_id(r) != Some(task_id));

            if envelope.tasks.len() == original_len {
                return Err(Error::TaskNotFound(task_id.to_string()));
            }

            envelope.metadata = Metadata::fresh(envelope.tasks.len());
            self.store_envelope(&envelope)
        })();

        debug!(id = %task_id, ok = result.is_ok(), "delete task");
        result.map_err(|err| err.into_persistence("Failed to delete task"))
    }
}

fn matches_filter(record: &Value, filter: &TaskFilter) -> bool {
    if let Some(difficulty) = filter.difficulty {
        if record.get("difficulty").and_then(Value::as_str) != Some(difficulty.as_str()) {
            return false;
        }
    }

    if let Some(wanted) = &filter.tags {
        let Some(tags) = record.get("tags").and_then(Value::as_array) else {
            return false;
        };
        let has_tag = |tag: &str| tags.iter().any(|t| t.as_str() == Some(tag));
        if !wanted.iter().all(|tag| has_tag(tag)) {
            return false;
        }
    }

    true
}
