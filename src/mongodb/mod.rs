// ABOUTME: MongoDB driver integration for source and target databases
// ABOUTME: Validates connection strings and opens database-scoped stores

pub mod store;

pub use store::{MongoCursor, MongoStore};

use anyhow::{bail, Context, Result};
use mongodb::{options::ClientOptions, Client};

/// Validate a MongoDB connection string
///
/// Checks the scheme only; host reachability is verified later by the ping
/// performed when the connection pair is opened.
///
/// # Examples
///
/// ```
/// # use mongo_sample_migrator::mongodb::validate_mongodb_url;
/// assert!(validate_mongodb_url("mongodb://localhost:27017").is_ok());
/// assert!(validate_mongodb_url("mongodb+srv://cluster.mongodb.net/mydb").is_ok());
///
/// assert!(validate_mongodb_url("invalid").is_err());
/// assert!(validate_mongodb_url("postgresql://localhost/db").is_err());
/// ```
pub fn validate_mongodb_url(connection_string: &str) -> Result<()> {
    if connection_string.trim().is_empty() {
        bail!("MongoDB connection string cannot be empty");
    }

    if !connection_string.starts_with("mongodb://")
        && !connection_string.starts_with("mongodb+srv://")
    {
        bail!(
            "Invalid MongoDB connection string '{}'. \
             Must start with 'mongodb://' or 'mongodb+srv://'",
            crate::config::mask_uri(connection_string)
        );
    }

    Ok(())
}

/// Build a MongoDB client without contacting the server
///
/// The driver connects lazily, so a successful return only means the
/// connection string parsed. `mongodb+srv://` strings resolve DNS here.
pub async fn create_client(connection_string: &str) -> Result<Client> {
    validate_mongodb_url(connection_string)?;

    let mut options = ClientOptions::parse(connection_string)
        .await
        .context("Failed to parse MongoDB connection options")?;
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

    let client = Client::with_options(options).context("Failed to create MongoDB client")?;
    tracing::debug!(
        "Created MongoDB client for {}",
        crate::config::mask_uri(connection_string)
    );

    Ok(client)
}
