// ABOUTME: Drives a whole migration run across every collection of one database
// ABOUTME: Only connection and enumeration failures end the run; the pair is always closed

use super::connection::ConnectionPair;
use super::copier::copy_collection;
use super::enumerate::list_collections;
use super::plan::plan_collection;
use super::progress::MigrationProgress;
use super::{CollectionStatus, MigrationOutcome, MigrationSummary};
use crate::cancel::CancellationToken;
use crate::config::MigrationRequest;
use crate::error::MigrateError;
use crate::logging::AUDIT_TARGET;
use crate::store::DocumentStore;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

const BANNER: &str = "==============================================================";

/// Migrate `request.database` from `source` to `target`.
///
/// Takes ownership of both stores and closes them before returning, whether
/// the run completes, fails, is cancelled, or panics.
pub async fn run<S, T>(
    source: S,
    target: T,
    request: &MigrationRequest,
    progress: &MigrationProgress,
    cancel: &CancellationToken,
) -> Result<MigrationSummary, MigrateError>
where
    S: DocumentStore,
    T: DocumentStore,
{
    tracing::info!(target: AUDIT_TARGET, "{}", BANNER);

    let result = match ConnectionPair::open(source, target).await {
        Ok(pair) => {
            let result = AssertUnwindSafe(migrate_database(&pair, request, progress, cancel))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    Err(MigrateError::Unexpected(message))
                });
            pair.close().await;
            result
        }
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        tracing::error!("Migration failed: {}", e);
    }
    if !progress.is_finished() {
        progress.finish(if result.is_ok() { "Done" } else { "Failed" });
    }
    tracing::info!(target: AUDIT_TARGET, "{}", BANNER);
    result
}

async fn migrate_database<S, T>(
    pair: &ConnectionPair<S, T>,
    request: &MigrationRequest,
    progress: &MigrationProgress,
    cancel: &CancellationToken,
) -> Result<MigrationSummary, MigrateError>
where
    S: DocumentStore,
    T: DocumentStore,
{
    tracing::info!("Starting migration for database: {}", request.database);

    let collections = list_collections(&pair.source, &request.database).await?;
    let mut summary = MigrationSummary::new(&request.database, collections.len());

    if collections.is_empty() {
        tracing::warn!("No collections found in source DB.");
        return Ok(summary);
    }

    progress.set_collections(collections.len() as u64);

    for name in &collections {
        if cancel.is_cancelled() {
            break;
        }
        let outcome = migrate_one(pair, name, request, progress, cancel).await;
        progress.advance_overall();
        summary.outcomes.push(outcome);
    }

    summary.cancelled = cancel.is_cancelled();
    if summary.cancelled {
        progress.finish("Interrupted");
    } else {
        progress.finish("Done");
        tracing::info!("🎉 Migration complete.");
    }
    summary.log();

    Ok(summary)
}

async fn migrate_one<S, T>(
    pair: &ConnectionPair<S, T>,
    collection: &str,
    request: &MigrationRequest,
    progress: &MigrationProgress,
    cancel: &CancellationToken,
) -> MigrationOutcome
where
    S: DocumentStore,
    T: DocumentStore,
{
    let plan = match plan_collection(&pair.source, collection, request.percentage).await {
        Ok(plan) => plan,
        Err(e) => {
            tracing::error!("Error counting documents in {}: {:#}", collection, e);
            return MigrationOutcome::skipped(collection, CollectionStatus::SkippedError);
        }
    };

    if plan.is_empty() {
        return match pair.target.ensure_collection(collection).await {
            Ok(created) => {
                tracing::info!(
                    target: AUDIT_TARGET,
                    "📂 {} - {} empty collection.",
                    collection,
                    if created { "Created" } else { "Kept existing" }
                );
                MigrationOutcome::skipped(collection, CollectionStatus::SkippedEmpty)
            }
            Err(e) => {
                tracing::error!("Error creating empty collection {}: {:#}", collection, e);
                MigrationOutcome::skipped(collection, CollectionStatus::SkippedError)
            }
        };
    }

    tracing::info!(
        target: AUDIT_TARGET,
        "📂 {}: migrating {}/{} docs",
        collection,
        plan.to_migrate,
        plan.total
    );

    let bar = progress.collection_bar(collection, plan.to_migrate);
    let outcome = copy_collection(
        &pair.source,
        &pair.target,
        &plan,
        request.batch_size,
        &bar,
        cancel,
    )
    .await;

    tracing::info!(
        target: AUDIT_TARGET,
        "✅ Completed {}: {}/{}",
        collection,
        outcome.migrated,
        outcome.total
    );
    outcome
}
