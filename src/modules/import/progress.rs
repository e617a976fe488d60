/// Keyed import status records polled by external callers
///
/// The tracker is an explicit collaborator passed into each stage processor;
/// a single `report` call replaces the nested progress callbacks of the
/// original system. Statuses are never deleted automatically; a new run for
/// the same key supersedes the old record.
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stage labels surfaced to pollers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportStage {
    Initializing,
    SyncingIdentifiers,
    ImportingShows,
    ImportingSongs,
    CreatingSetlists,
    Finalizing,
    Completed,
    Failed,
}

impl std::fmt::Display for ImportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportStage::Initializing => write!(f, "initializing"),
            ImportStage::SyncingIdentifiers => write!(f, "syncing-identifiers"),
            ImportStage::ImportingShows => write!(f, "importing-shows"),
            ImportStage::ImportingSongs => write!(f, "importing-songs"),
            ImportStage::CreatingSetlists => write!(f, "creating-setlists"),
            ImportStage::Finalizing => write!(f, "finalizing"),
            ImportStage::Completed => write!(f, "completed"),
            ImportStage::Failed => write!(f, "failed"),
        }
    }
}

/// The async pipeline stages an import run consists of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Profile,
    Catalog,
    DeepCatalog,
    Events,
    Setlists,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::Profile,
        PipelineStage::Catalog,
        PipelineStage::DeepCatalog,
        PipelineStage::Events,
        PipelineStage::Setlists,
    ];
}

/// Status record for one import run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportStatus {
    pub key: String,
    pub stage: ImportStage,
    pub percent: i32,
    pub message: String,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

struct RunState {
    pending: HashSet<PipelineStage>,
    force_refresh: bool,
}

pub struct ProgressTracker {
    statuses: DashMap<String, ImportStatus>,
    runs: DashMap<String, RunState>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            statuses: DashMap::new(),
            runs: DashMap::new(),
        }
    }

    /// Begin a run: status goes to initializing and the full stage set is
    /// registered as pending.
    pub fn start(&self, key: &str, force_refresh: bool) {
        self.statuses.insert(
            key.to_string(),
            ImportStatus {
                key: key.to_string(),
                stage: ImportStage::Initializing,
                percent: 0,
                message: "Import queued".to_string(),
                error: None,
                updated_at: Utc::now(),
            },
        );
        self.runs.insert(
            key.to_string(),
            RunState {
                pending: PipelineStage::ALL.into_iter().collect(),
                force_refresh,
            },
        );
    }

    /// Report progress for a key.
    ///
    /// Percent is clamped monotonic: parallel stages may report out of
    /// order, and a late lower-percent report must not regress the status.
    /// Terminal states are never overwritten by ordinary reports.
    pub fn report(&self, key: &str, stage: ImportStage, percent: i32, message: &str) {
        let mut entry = match self.statuses.get_mut(key) {
            Some(entry) => entry,
            None => return,
        };

        if matches!(entry.stage, ImportStage::Failed | ImportStage::Completed) {
            return;
        }

        let percent = percent.clamp(0, 100);
        if percent >= entry.percent {
            entry.stage = stage;
            entry.percent = percent;
        }
        entry.message = message.to_string();
        entry.updated_at = Utc::now();
    }

    /// Mark the run failed with the captured error. Always overrides.
    pub fn fail(&self, key: &str, error: &str) {
        if let Some(mut entry) = self.statuses.get_mut(key) {
            entry.stage = ImportStage::Failed;
            entry.error = Some(error.to_string());
            entry.message = "Import failed".to_string();
            entry.updated_at = Utc::now();
        }
    }

    /// Mark one pipeline stage finished; returns true when it was the last
    /// pending stage of the run.
    pub fn complete_stage(&self, key: &str, stage: PipelineStage) -> bool {
        match self.runs.get_mut(key) {
            Some(mut run) => {
                run.pending.remove(&stage);
                run.pending.is_empty()
            }
            None => false,
        }
    }

    /// Whether this run was requested with force-refresh.
    pub fn force_refresh(&self, key: &str) -> bool {
        self.runs
            .get(key)
            .map(|run| run.force_refresh)
            .unwrap_or(false)
    }

    /// Terminal success, unless the run already failed.
    pub fn finish(&self, key: &str) {
        if let Some(mut entry) = self.statuses.get_mut(key) {
            if entry.stage == ImportStage::Failed {
                return;
            }
            entry.stage = ImportStage::Completed;
            entry.percent = 100;
            entry.message = "Import completed".to_string();
            entry.updated_at = Utc::now();
        }
    }

    pub fn get(&self, key: &str) -> Option<ImportStatus> {
        self.statuses.get(key).map(|entry| entry.clone())
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
