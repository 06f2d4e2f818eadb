// ABOUTME: Library module for mongo-sample-migrator
// ABOUTME: Exports the migration engine, driver seam, and ambient setup for the binary and tests

pub mod cancel;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod migration;
pub mod mongodb;
pub mod store;

pub use config::MigrationRequest;
pub use error::{MigrateError, WriteError};
pub use migration::{CollectionStatus, MigrationOutcome, MigrationSummary};
