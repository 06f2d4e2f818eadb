// ABOUTME: Batch migration engine module
// ABOUTME: Enumerates, plans, and copies collections with progress and cancellation

pub mod connection;
pub mod copier;
pub mod enumerate;
pub mod outcome;
pub mod plan;
pub mod progress;
pub mod runner;

pub use connection::ConnectionPair;
pub use copier::copy_collection;
pub use enumerate::list_collections;
pub use outcome::{CollectionStatus, MigrationOutcome, MigrationSummary};
pub use plan::{documents_to_migrate, plan_collection, CollectionPlan};
pub use progress::MigrationProgress;
pub use runner::run;
