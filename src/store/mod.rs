// ABOUTME: Driver seam between the migration engine and a document database
// ABOUTME: Lists the database capabilities the engine consumes, scoped to one database

use crate::error::WriteError;
use anyhow::Result;
use async_trait::async_trait;
use bson::Document;

/// Server error code for a duplicate key violation.
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// Result of an unordered bulk insert that did not fail for non-duplicate reasons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertReport {
    pub inserted: usize,
    pub duplicate_keys: usize,
}

/// A database on one side of a migration.
///
/// Implementations are scoped to a single database; collection names are passed
/// per call. The engine never holds two cursors at once.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    type Cursor: DocumentCursor;

    /// Round-trip to the server to prove the endpoint is usable.
    async fn ping(&self) -> Result<()>;

    async fn list_collection_names(&self) -> Result<Vec<String>>;

    /// Metadata-based count; may lag concurrent writes.
    async fn estimated_document_count(&self, collection: &str) -> Result<u64>;

    /// Create `collection` if absent. Returns `true` when it was created.
    async fn ensure_collection(&self, collection: &str) -> Result<bool>;

    /// Open a forward-only, non-expiring cursor over every document in `collection`.
    async fn open_cursor(&self, collection: &str, batch_size: usize) -> Result<Self::Cursor>;

    /// Insert `documents` without stopping at the first failing document.
    ///
    /// Duplicate key rejections are reported in the [`InsertReport`]; any other
    /// failure is a [`WriteError`].
    async fn insert_unordered(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> std::result::Result<InsertReport, WriteError>;

    /// Release the underlying connection. Calling it again is a no-op.
    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait DocumentCursor: Send {
    /// Next document, or `None` once the cursor is exhausted.
    async fn next_document(&mut self) -> Result<Option<Document>>;

    async fn close(self) -> Result<()>;
}

/// Outcome of sorting a bulk insert's per-document error codes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WriteErrorSummary {
    pub duplicate_keys: usize,
    pub failures: Vec<String>,
}

/// Split per-document write errors into duplicate keys and everything else.
pub fn classify_write_errors<'a>(
    errors: impl IntoIterator<Item = (i32, &'a str)>,
) -> WriteErrorSummary {
    let mut summary = WriteErrorSummary::default();
    for (code, message) in errors {
        if code == DUPLICATE_KEY_CODE {
            summary.duplicate_keys += 1;
        } else {
            let failure = format!("code {}: {}", code, message);
            if !summary.failures.contains(&failure) {
                summary.failures.push(failure);
            }
        }
    }
    summary
}
