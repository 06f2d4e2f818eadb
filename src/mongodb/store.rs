// ABOUTME: DocumentStore implementation backed by the async MongoDB driver
// ABOUTME: Streams collections through cursors and writes with unordered bulk inserts

use crate::error::WriteError;
use crate::store::{classify_write_errors, DocumentCursor, DocumentStore, InsertReport};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bson::{doc, Document};
use futures::stream::TryStreamExt;
use mongodb::error::ErrorKind;
use mongodb::options::{FindOptions, InsertManyOptions};
use mongodb::{Client, Cursor, Database};
use std::sync::atomic::{AtomicBool, Ordering};

/// One side of a migration: a client plus the database being migrated.
pub struct MongoStore {
    client: Client,
    database: Database,
    closed: AtomicBool,
}

impl MongoStore {
    /// Create a client for `connection_string` scoped to `database`.
    ///
    /// Does not contact the server; [`DocumentStore::ping`] does.
    pub async fn connect(connection_string: &str, database: &str) -> Result<Self> {
        let client = super::create_client(connection_string).await?;
        Ok(Self::from_client(client, database))
    }

    pub fn from_client(client: Client, database: &str) -> Self {
        let database = client.database(database);
        Self {
            client,
            database,
            closed: AtomicBool::new(false),
        }
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    type Cursor = MongoCursor;

    async fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! {"ping": 1}, None)
            .await
            .context(
                "Failed to ping MongoDB server (connection may be invalid or server unreachable)",
            )?;
        Ok(())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>> {
        self.database
            .list_collection_names(None)
            .await
            .with_context(|| {
                format!(
                    "Failed to list collections in database '{}'",
                    self.database.name()
                )
            })
    }

    async fn estimated_document_count(&self, collection: &str) -> Result<u64> {
        self.database
            .collection::<Document>(collection)
            .estimated_document_count(None)
            .await
            .with_context(|| format!("Failed to count documents in collection '{}'", collection))
    }

    async fn ensure_collection(&self, collection: &str) -> Result<bool> {
        let existing = self.list_collection_names().await?;
        if existing.iter().any(|name| name == collection) {
            return Ok(false);
        }

        self.database
            .create_collection(collection, None)
            .await
            .with_context(|| format!("Failed to create collection '{}'", collection))?;
        Ok(true)
    }

    async fn open_cursor(&self, collection: &str, batch_size: usize) -> Result<MongoCursor> {
        let options = FindOptions::builder()
            .no_cursor_timeout(true)
            .batch_size(u32::try_from(batch_size).unwrap_or(u32::MAX))
            .build();

        let inner = self
            .database
            .collection::<Document>(collection)
            .find(None, options)
            .await
            .with_context(|| format!("Failed to query collection '{}'", collection))?;

        Ok(MongoCursor {
            collection: collection.to_string(),
            inner,
        })
    }

    async fn insert_unordered(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> std::result::Result<InsertReport, WriteError> {
        let attempted = documents.len();
        let options = InsertManyOptions::builder().ordered(false).build();

        let err = match self
            .database
            .collection::<Document>(collection)
            .insert_many(documents, options)
            .await
        {
            Ok(result) => {
                return Ok(InsertReport {
                    inserted: result.inserted_ids.len(),
                    duplicate_keys: 0,
                })
            }
            Err(err) => err,
        };

        match &*err.kind {
            ErrorKind::BulkWrite(failure) => {
                let write_errors = failure.write_errors.as_deref().unwrap_or_default();
                let mut summary = classify_write_errors(
                    write_errors
                        .iter()
                        .map(|e| (e.code, e.message.as_str())),
                );
                if let Some(concern) = &failure.write_concern_error {
                    summary
                        .failures
                        .push(format!("write concern: {}", concern.message));
                }

                if summary.failures.is_empty() {
                    Ok(InsertReport {
                        inserted: attempted - summary.duplicate_keys.min(attempted),
                        duplicate_keys: summary.duplicate_keys,
                    })
                } else {
                    Err(WriteError::new(collection, summary.failures.join("; ")))
                }
            }
            _ => Err(WriteError::new(collection, err.to_string())),
        }
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.client.clone().shutdown().await;
        tracing::debug!("Closed MongoDB client for '{}'", self.database.name());
        Ok(())
    }
}

/// Live cursor over one source collection.
pub struct MongoCursor {
    collection: String,
    inner: Cursor<Document>,
}

#[async_trait]
impl DocumentCursor for MongoCursor {
    async fn next_document(&mut self) -> Result<Option<Document>> {
        self.inner.try_next().await.with_context(|| {
            format!(
                "Failed to read document from collection '{}'",
                self.collection
            )
        })
    }

    async fn close(self) -> Result<()> {
        // Dropping a driver cursor issues killCursors for any server-side remainder.
        drop(self.inner);
        Ok(())
    }
}
