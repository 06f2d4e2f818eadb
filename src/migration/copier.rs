// ABOUTME: Streams one collection from source to target in bounded batches
// ABOUTME: Tolerates duplicate keys, stops on other write errors, and always releases the cursor

use super::plan::CollectionPlan;
use super::{CollectionStatus, MigrationOutcome};
use crate::cancel::CancellationToken;
use crate::store::{DocumentCursor, DocumentStore};
use bson::Document;
use indicatif::ProgressBar;

/// Why filling a batch stopped short.
enum BatchEnd {
    Full,
    Exhausted,
    ReadFailed,
}

/// Pull up to `limit` documents from `cursor`.
///
/// A read error ends the batch; documents read before it are kept.
async fn next_batch<C: DocumentCursor>(
    cursor: &mut C,
    limit: usize,
    collection: &str,
) -> (Vec<Document>, BatchEnd) {
    let mut batch = Vec::with_capacity(limit);
    while batch.len() < limit {
        match cursor.next_document().await {
            Ok(Some(document)) => batch.push(document),
            Ok(None) => return (batch, BatchEnd::Exhausted),
            Err(e) => {
                tracing::error!(
                    "Error fetching document from {}: {:#}",
                    collection,
                    e
                );
                return (batch, BatchEnd::ReadFailed);
            }
        }
    }
    (batch, BatchEnd::Full)
}

/// Copy the planned share of one collection.
///
/// `plan` must be non-empty. Batches never exceed `batch_size` and never carry
/// the running total past `plan.to_migrate`. The token is checked before each
/// batch, so an interrupt stops the copy within one batch and a write already
/// issued completes.
pub async fn copy_collection<S, T>(
    source: &S,
    target: &T,
    plan: &CollectionPlan,
    batch_size: usize,
    bar: &ProgressBar,
    cancel: &CancellationToken,
) -> MigrationOutcome
where
    S: DocumentStore,
    T: DocumentStore,
{
    let collection = plan.collection.as_str();
    let mut outcome = MigrationOutcome {
        collection: collection.to_string(),
        migrated: 0,
        total: plan.total,
        planned: plan.to_migrate,
        duplicate_keys: 0,
        status: CollectionStatus::Completed,
    };

    let mut cursor = match source.open_cursor(collection, batch_size).await {
        Ok(cursor) => cursor,
        Err(e) => {
            tracing::error!("Error creating cursor for {}: {:#}", collection, e);
            outcome.status = CollectionStatus::SkippedError;
            bar.abandon();
            return outcome;
        }
    };

    while outcome.migrated < plan.to_migrate {
        if cancel.is_cancelled() {
            outcome.status = CollectionStatus::Cancelled;
            break;
        }

        let remaining = plan.to_migrate - outcome.migrated;
        let limit = usize::try_from(remaining).map_or(batch_size, |r| r.min(batch_size));
        let (batch, end) = next_batch(&mut cursor, limit, collection).await;
        if batch.is_empty() {
            if matches!(end, BatchEnd::ReadFailed) {
                outcome.status = CollectionStatus::PartiallyFailed;
            }
            break;
        }

        let len = batch.len() as u64;
        match target.insert_unordered(collection, batch).await {
            Ok(report) => {
                if report.duplicate_keys > 0 {
                    tracing::warn!(
                        "Duplicate _id in {}: {} of {} document(s) already present",
                        collection,
                        report.duplicate_keys,
                        len
                    );
                    outcome.duplicate_keys += report.duplicate_keys as u64;
                }
            }
            Err(e) => {
                tracing::error!("Write error in {}: {}", collection, e.message);
                outcome.status = CollectionStatus::PartiallyFailed;
                break;
            }
        }

        // Duplicates count as migrated: the whole batch was attempted.
        outcome.migrated += len;
        bar.inc(len);

        match end {
            BatchEnd::Full => {}
            BatchEnd::Exhausted => break,
            BatchEnd::ReadFailed => {
                outcome.status = CollectionStatus::PartiallyFailed;
                break;
            }
        }
    }

    if let Err(e) = cursor.close().await {
        tracing::error!("Error closing cursor for {}: {:#}", collection, e);
    }

    match outcome.status {
        CollectionStatus::Completed => bar.finish(),
        _ => bar.abandon(),
    }

    outcome
}
