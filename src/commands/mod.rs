// ABOUTME: Command implementations invoked by the CLI
// ABOUTME: Exports the migrate command

pub mod migrate;

pub use migrate::migrate;
