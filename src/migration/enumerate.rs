// ABOUTME: Discovers the collections to migrate from the source database
// ABOUTME: Server-internal system collections are never copied

use crate::error::MigrateError;
use crate::store::DocumentStore;

/// List user collections of the source database, in the order the server returns them.
///
/// An empty list is not an error; the caller decides what nothing-to-do means.
pub async fn list_collections<S: DocumentStore>(
    source: &S,
    database: &str,
) -> Result<Vec<String>, MigrateError> {
    tracing::info!("Listing collections in database '{}'", database);

    let names = source
        .list_collection_names()
        .await
        .map_err(|source| MigrateError::Enumeration {
            database: database.to_string(),
            source,
        })?;

    let (system, user): (Vec<String>, Vec<String>) = names
        .into_iter()
        .partition(|name| name.starts_with("system."));
    if !system.is_empty() {
        tracing::debug!("Skipping system collections: {}", system.join(", "));
    }

    tracing::debug!(
        "Found {} user collections in '{}'",
        user.len(),
        database
    );

    Ok(user)
}
