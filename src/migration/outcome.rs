// ABOUTME: Per-collection migration outcomes and the run-level summary
// ABOUTME: The summary is logged at the end of every run, including interrupted ones

use crate::logging::AUDIT_TARGET;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Reached the planned count or ran out of documents.
    Completed,
    /// Source had no documents; the target collection was ensured to exist.
    SkippedEmpty,
    /// Failed before any document was copied.
    SkippedError,
    /// Stopped early by a read or write failure.
    PartiallyFailed,
    /// Stopped early by the cancellation token.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub collection: String,
    /// Documents sent to the target, including ones rejected as duplicate keys.
    pub migrated: u64,
    pub total: u64,
    pub planned: u64,
    pub duplicate_keys: u64,
    pub status: CollectionStatus,
}

impl MigrationOutcome {
    pub fn skipped(collection: impl Into<String>, status: CollectionStatus) -> Self {
        Self {
            collection: collection.into(),
            migrated: 0,
            total: 0,
            planned: 0,
            duplicate_keys: 0,
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSummary {
    pub database: String,
    pub collections_total: usize,
    pub outcomes: Vec<MigrationOutcome>,
    pub cancelled: bool,
}

impl MigrationSummary {
    pub fn new(database: impl Into<String>, collections_total: usize) -> Self {
        Self {
            database: database.into(),
            collections_total,
            outcomes: Vec::new(),
            cancelled: false,
        }
    }

    /// Collections handled, whatever their status.
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn migrated_documents(&self) -> u64 {
        self.outcomes.iter().map(|o| o.migrated).sum()
    }

    pub fn count(&self, status: CollectionStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn outcome(&self, collection: &str) -> Option<&MigrationOutcome> {
        self.outcomes.iter().find(|o| o.collection == collection)
    }

    pub fn log(&self) {
        tracing::info!(
            "{}/{} collections processed in '{}', {} documents migrated",
            self.processed(),
            self.collections_total,
            self.database,
            self.migrated_documents()
        );
        tracing::info!(
            "  completed: {}, empty: {}, skipped: {}, partial: {}, cancelled: {}",
            self.count(CollectionStatus::Completed),
            self.count(CollectionStatus::SkippedEmpty),
            self.count(CollectionStatus::SkippedError),
            self.count(CollectionStatus::PartiallyFailed),
            self.count(CollectionStatus::Cancelled)
        );
        for outcome in &self.outcomes {
            tracing::info!(
                target: AUDIT_TARGET,
                "{}: {:?} {}/{} (planned {}, duplicate keys {})",
                outcome.collection,
                outcome.status,
                outcome.migrated,
                outcome.total,
                outcome.planned,
                outcome.duplicate_keys
            );
        }
    }
}
