// ABOUTME: Error types for the migration engine
// ABOUTME: Separates run-fatal failures from write failures contained to one collection

use thiserror::Error;

/// Failures that end a whole migration run.
///
/// Everything else (counting, cursors, writes) is contained to the collection it
/// happened in and reported through [`crate::MigrationOutcome`].
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Invalid migration request: {0}")]
    InvalidRequest(String),
    #[error("Failed to connect to {role} MongoDB")]
    Connection {
        role: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("Failed to list collections in database '{database}'")]
    Enumeration {
        database: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("Unexpected failure during migration: {0}")]
    Unexpected(String),
}

/// A bulk insert failure that is not explained by duplicate keys alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Bulk insert into '{collection}' failed: {message}")]
pub struct WriteError {
    pub collection: String,
    pub message: String,
}

impl WriteError {
    pub fn new(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
