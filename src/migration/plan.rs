// ABOUTME: Per-collection sampling plan derived from an estimated document count
// ABOUTME: Migrates the first ceil(total * percentage / 100) documents the cursor yields

use crate::store::DocumentStore;
use anyhow::Result;

/// How much of one collection to copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPlan {
    pub collection: String,
    /// Estimated by the source; may lag concurrent writes.
    pub total: u64,
    pub to_migrate: u64,
}

impl CollectionPlan {
    pub fn new(collection: impl Into<String>, total: u64, percentage: u8) -> Self {
        Self {
            collection: collection.into(),
            total,
            to_migrate: documents_to_migrate(total, percentage),
        }
    }

    /// An empty collection is recreated on the target, never read.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// `ceil(total * percentage / 100)`, in integer arithmetic.
pub fn documents_to_migrate(total: u64, percentage: u8) -> u64 {
    let scaled = u128::from(total) * u128::from(percentage);
    u64::try_from(scaled.div_ceil(100)).unwrap_or(u64::MAX)
}

/// Count `collection` on `source` and plan its share.
pub async fn plan_collection<S: DocumentStore>(
    source: &S,
    collection: &str,
    percentage: u8,
) -> Result<CollectionPlan> {
    let total = source.estimated_document_count(collection).await?;
    Ok(CollectionPlan::new(collection, total, percentage))
}
