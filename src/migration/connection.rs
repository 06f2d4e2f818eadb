// ABOUTME: Owns the source and target stores for the duration of a run
// ABOUTME: Both endpoints are pinged before use and both are closed on every exit path

use crate::error::MigrateError;
use crate::store::DocumentStore;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct ConnectionPair<S, T> {
    pub source: S,
    pub target: T,
    closed: AtomicBool,
}

impl<S: DocumentStore, T: DocumentStore> ConnectionPair<S, T> {
    /// Ping both stores. If either fails, both are closed and the error names the side.
    pub async fn open(source: S, target: T) -> Result<Self, MigrateError> {
        let pair = Self {
            source,
            target,
            closed: AtomicBool::new(false),
        };

        let checked = match pair.source.ping().await {
            Err(e) => Err(("source", e)),
            Ok(()) => pair.target.ping().await.map_err(|e| ("target", e)),
        };

        match checked {
            Ok(()) => {
                tracing::debug!("Source and target MongoDB respond to ping");
                Ok(pair)
            }
            Err((role, source)) => {
                tracing::error!("MongoDB connection error ({}): {:#}", role, source);
                pair.close().await;
                Err(MigrateError::Connection { role, source })
            }
        }
    }

    /// Close both stores. Errors are logged, never returned; later calls do nothing.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.source.close().await {
            tracing::error!("Error closing source client: {:#}", e);
        }
        if let Err(e) = self.target.close().await {
            tracing::error!("Error closing target client: {:#}", e);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
