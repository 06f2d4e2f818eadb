// ABOUTME: Migration request parameters, defaults, and validation
// ABOUTME: Merges CLI flags with an optional TOML file before any connection is opened

use crate::error::{MigrateError, Result};
use crate::mongodb::validate_mongodb_url;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// Target used when none is given: a MongoDB on the local machine.
pub const DEFAULT_TARGET_URI: &str = "mongodb://localhost:27017/";
pub const DEFAULT_PERCENTAGE: u8 = 100;
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Validated parameters for one migration run.
///
/// Construct through [`MigrationRequest::new`] or [`MigrationRequest::resolve`];
/// both reject out-of-range values without touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRequest {
    pub source_uri: String,
    pub target_uri: String,
    pub database: String,
    pub percentage: u8,
    pub batch_size: usize,
}

impl MigrationRequest {
    pub fn new(
        source_uri: impl Into<String>,
        target_uri: impl Into<String>,
        database: impl Into<String>,
        percentage: u8,
        batch_size: usize,
    ) -> Result<Self> {
        let request = Self {
            source_uri: source_uri.into(),
            target_uri: target_uri.into(),
            database: database.into(),
            percentage,
            batch_size,
        };
        request.validate()?;
        Ok(request)
    }

    /// Build a request from CLI values, falling back to `file` and then to defaults.
    pub fn resolve(cli: MigrationOverrides, file: Option<MigrationOverrides>) -> Result<Self> {
        let file = file.unwrap_or_default();

        let source_uri = cli.source.or(file.source).ok_or_else(|| {
            MigrateError::InvalidRequest("Source connection string is required".to_string())
        })?;
        let database = cli.database.or(file.database).ok_or_else(|| {
            MigrateError::InvalidRequest("Database name is required".to_string())
        })?;

        Self::new(
            source_uri,
            cli.target
                .or(file.target)
                .unwrap_or_else(|| DEFAULT_TARGET_URI.to_string()),
            database,
            cli.percentage.or(file.percentage).unwrap_or(DEFAULT_PERCENTAGE),
            cli.batch_size.or(file.batch_size).unwrap_or(DEFAULT_BATCH_SIZE),
        )
    }

    fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.percentage) {
            return Err(MigrateError::InvalidRequest(
                "Percentage must be between 1 and 100".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(MigrateError::InvalidRequest(
                "Batch size must be at least 1".to_string(),
            ));
        }
        if self.database.trim().is_empty() {
            return Err(MigrateError::InvalidRequest(
                "Database name cannot be empty".to_string(),
            ));
        }
        for (role, uri) in [("source", &self.source_uri), ("target", &self.target_uri)] {
            validate_mongodb_url(uri).map_err(|e| {
                MigrateError::InvalidRequest(format!("Invalid {} endpoint: {}", role, e))
            })?;
        }
        Ok(())
    }
}

/// Optional settings, as read from a TOML file or collected from CLI flags.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MigrationOverrides {
    pub source: Option<String>,
    pub target: Option<String>,
    pub database: Option<String>,
    pub percentage: Option<u8>,
    pub batch_size: Option<usize>,
}

impl MigrationOverrides {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }
}

/// Hide the password part of a connection string for display.
pub fn mask_uri(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };
    match rest.rsplit_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, host)
        }
        None => uri.to_string(),
    }
}
