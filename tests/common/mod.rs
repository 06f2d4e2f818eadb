// ABOUTME: In-memory DocumentStore used by the engine integration tests
// ABOUTME: Enforces unique _id values and injects failures on demand

#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use mongo_sample_migrator::cancel::CancellationToken;
use mongo_sample_migrator::store::{DocumentCursor, DocumentStore, InsertReport};
use mongo_sample_migrator::WriteError;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct State {
    collections: BTreeMap<String, Vec<Document>>,
    unreachable: bool,
    fail_listing: bool,
    fail_count: HashSet<String>,
    fail_cursor: HashSet<String>,
    /// (collection, 1-based insert call that fails)
    fail_insert: Option<(String, usize)>,
    /// Cursor read error after this many documents.
    fail_read_after: Option<(String, usize)>,
    panic_on_count: Option<String>,
    /// Added to the estimated count, as when metadata lags deletes.
    count_surplus: u64,
    cancel_after_inserts: Option<(CancellationToken, usize)>,
    insert_calls: Vec<(String, usize)>,
    cursors_opened: usize,
    cursors_closed: usize,
    close_calls: usize,
}

/// A shared handle; clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Add `count` documents with `_id` 0..count to `collection`.
    pub fn with_documents(self, collection: &str, count: usize) -> Self {
        let documents = (0..count)
            .map(|i| doc! {"_id": i as i64, "seq": i as i64})
            .collect();
        self.state().collections.insert(collection.to_string(), documents);
        self
    }

    /// Add `count` documents without `_id`; each insert gets a fresh id.
    pub fn with_anonymous_documents(self, collection: &str, count: usize) -> Self {
        let documents = (0..count).map(|i| doc! {"seq": i as i64}).collect();
        self.state().collections.insert(collection.to_string(), documents);
        self
    }

    pub fn with_empty_collection(self, collection: &str) -> Self {
        self.state().collections.insert(collection.to_string(), Vec::new());
        self
    }

    pub fn unreachable(self) -> Self {
        self.state().unreachable = true;
        self
    }

    pub fn failing_listing(self) -> Self {
        self.state().fail_listing = true;
        self
    }

    pub fn failing_count(self, collection: &str) -> Self {
        self.state().fail_count.insert(collection.to_string());
        self
    }

    pub fn failing_cursor(self, collection: &str) -> Self {
        self.state().fail_cursor.insert(collection.to_string());
        self
    }

    pub fn failing_insert(self, collection: &str, call: usize) -> Self {
        self.state().fail_insert = Some((collection.to_string(), call));
        self
    }

    pub fn failing_read_after(self, collection: &str, documents: usize) -> Self {
        self.state().fail_read_after = Some((collection.to_string(), documents));
        self
    }

    pub fn overstating_count(self, surplus: u64) -> Self {
        self.state().count_surplus = surplus;
        self
    }

    pub fn panicking_count(self, collection: &str) -> Self {
        self.state().panic_on_count = Some(collection.to_string());
        self
    }

    /// Cancel `token` once `inserts` insert calls have completed.
    pub fn cancelling_after_inserts(self, token: CancellationToken, inserts: usize) -> Self {
        self.state().cancel_after_inserts = Some((token, inserts));
        self
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.state()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn count(&self, collection: &str) -> usize {
        self.documents(collection).len()
    }

    pub fn has_collection(&self, collection: &str) -> bool {
        self.state().collections.contains_key(collection)
    }

    /// Sizes of the insert batches sent to `collection`, in order.
    pub fn batch_sizes(&self, collection: &str) -> Vec<usize> {
        self.state()
            .insert_calls
            .iter()
            .filter(|(name, _)| name == collection)
            .map(|(_, len)| *len)
            .collect()
    }

    pub fn cursors_opened(&self) -> usize {
        self.state().cursors_opened
    }

    pub fn cursors_closed(&self) -> usize {
        self.state().cursors_closed
    }

    pub fn close_calls(&self) -> usize {
        self.state().close_calls
    }

    pub fn seqs(&self, collection: &str) -> Vec<i64> {
        self.documents(collection)
            .iter()
            .filter_map(|d| d.get_i64("seq").ok())
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    type Cursor = MemoryCursor;

    async fn ping(&self) -> Result<()> {
        if self.state().unreachable {
            bail!("server selection timeout");
        }
        Ok(())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>> {
        let state = self.state();
        if state.fail_listing {
            bail!("not authorized to list collections");
        }
        Ok(state.collections.keys().cloned().collect())
    }

    async fn estimated_document_count(&self, collection: &str) -> Result<u64> {
        let state = self.state();
        if state.panic_on_count.as_deref() == Some(collection) {
            drop(state);
            panic!("count exploded for {}", collection);
        }
        if state.fail_count.contains(collection) {
            bail!("count failed for {}", collection);
        }
        let actual = state.collections.get(collection).map_or(0, |d| d.len()) as u64;
        Ok(actual + state.count_surplus)
    }

    async fn ensure_collection(&self, collection: &str) -> Result<bool> {
        let mut state = self.state();
        if state.collections.contains_key(collection) {
            return Ok(false);
        }
        state.collections.insert(collection.to_string(), Vec::new());
        Ok(true)
    }

    async fn open_cursor(&self, collection: &str, _batch_size: usize) -> Result<MemoryCursor> {
        let mut state = self.state();
        if state.fail_cursor.contains(collection) {
            bail!("cursor failed for {}", collection);
        }
        let documents = state
            .collections
            .get(collection)
            .cloned()
            .ok_or_else(|| anyhow!("no collection {}", collection))?;
        let fail_after = match &state.fail_read_after {
            Some((name, after)) if name == collection => Some(*after),
            _ => None,
        };
        state.cursors_opened += 1;
        Ok(MemoryCursor {
            documents: documents.into(),
            read: 0,
            fail_after,
            state: Arc::clone(&self.state),
        })
    }

    async fn insert_unordered(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> std::result::Result<InsertReport, WriteError> {
        let mut state = self.state();
        state.insert_calls.push((collection.to_string(), documents.len()));
        let call = state
            .insert_calls
            .iter()
            .filter(|(name, _)| name == collection)
            .count();

        if let Some((name, failing)) = &state.fail_insert {
            if name == collection && *failing == call {
                return Err(WriteError::new(collection, "code 121: Document failed validation"));
            }
        }

        let stored = state.collections.entry(collection.to_string()).or_default();
        let mut report = InsertReport::default();
        for mut document in documents {
            let id = match document.get("_id") {
                Some(id) => id.clone(),
                None => {
                    let id = Bson::ObjectId(ObjectId::new());
                    document.insert("_id", id.clone());
                    id
                }
            };
            if stored.iter().any(|d| d.get("_id") == Some(&id)) {
                report.duplicate_keys += 1;
            } else {
                stored.push(document);
                report.inserted += 1;
            }
        }

        let total_inserts = state.insert_calls.len();
        if let Some((token, after)) = &state.cancel_after_inserts {
            if total_inserts >= *after {
                token.cancel();
            }
        }

        Ok(report)
    }

    async fn close(&self) -> Result<()> {
        self.state().close_calls += 1;
        Ok(())
    }
}

pub struct MemoryCursor {
    documents: VecDeque<Document>,
    read: usize,
    fail_after: Option<usize>,
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl DocumentCursor for MemoryCursor {
    async fn next_document(&mut self) -> Result<Option<Document>> {
        if self.fail_after == Some(self.read) {
            bail!("cursor killed by server");
        }
        self.read += 1;
        Ok(self.documents.pop_front())
    }

    async fn close(self) -> Result<()> {
        self.state.lock().unwrap().cursors_closed += 1;
        Ok(())
    }
}
