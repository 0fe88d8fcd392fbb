//! In-memory document store with fault injection
//!
//! [`InMemoryDocumentStore`] keeps documents in a `BTreeMap` keyed by path,
//! so collection listings come back ordered by path exactly like the real
//! store. Faults can be switched on per test to check that failed writes
//! leave nothing behind.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only happens after a test already panicked

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tanda_core::document_store::{Document, DocumentStore, DocumentStoreError, StoreFuture, WriteBatch, WriteOp};

#[derive(Debug, Default)]
struct Faults {
    reads: AtomicBool,
    writes: AtomicBool,
    next_commit: AtomicBool,
}

/// In-memory document store for fast, deterministic testing.
///
/// Clones share the same documents and fault switches.
///
/// # Example
///
/// ```
/// use tanda_testing::InMemoryDocumentStore;
/// use tanda_core::document_store::{DocumentStore, WriteBatch};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryDocumentStore::new();
///
/// let mut batch = WriteBatch::new();
/// batch.set("events/e1", json!({"id": "e1"}));
/// store.fail_next_commit();
/// assert!(store.commit(batch.clone()).await.is_err());
/// assert!(store.is_empty());
///
/// store.commit(batch).await?;
/// assert!(store.contains("events/e1"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<BTreeMap<String, Document>>>,
    faults: Arc<Faults>,
    commits: Arc<AtomicUsize>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail with [`DocumentStoreError::Unavailable`]
    pub fn fail_reads(&self, fail: bool) {
        self.faults.reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write (`set` and `commit`) fail with
    /// [`DocumentStoreError::Unavailable`]
    pub fn fail_writes(&self, fail: bool) {
        self.faults.writes.store(fail, Ordering::SeqCst);
    }

    /// Reject the next `commit` only
    pub fn fail_next_commit(&self) {
        self.faults.next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of batches committed successfully
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Number of stored documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    /// Whether nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().unwrap().is_empty()
    }

    /// Whether a document exists at `path`
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.documents.read().unwrap().contains_key(path)
    }

    /// Snapshot of the document at `path`
    #[must_use]
    pub fn document(&self, path: &str) -> Option<Document> {
        self.documents.read().unwrap().get(path).cloned()
    }

    /// Store a document directly, bypassing fault injection
    ///
    /// Stands in for writes made by other subsystems (e.g. judges marking a
    /// tanda completed).
    pub fn insert(&self, path: impl Into<String>, document: Document) {
        self.documents.write().unwrap().insert(path.into(), document);
    }

    /// All stored paths, ordered
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.documents.read().unwrap().keys().cloned().collect()
    }

    fn check_reads(&self) -> Result<(), DocumentStoreError> {
        if self.faults.reads.load(Ordering::SeqCst) {
            return Err(DocumentStoreError::Unavailable("injected read failure".to_string()));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), DocumentStoreError> {
        if self.faults.writes.load(Ordering::SeqCst) {
            return Err(DocumentStoreError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }
}

/// Whether `path` is a direct child of `collection`
fn is_direct_child(collection: &str, path: &str) -> bool {
    path.strip_prefix(collection)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|key| !key.is_empty() && !key.contains('/'))
}

impl DocumentStore for InMemoryDocumentStore {
    fn get(&self, path: String) -> StoreFuture<'_, Option<Document>> {
        Box::pin(async move {
            self.check_reads()?;
            Ok(self.documents.read().unwrap().get(&path).cloned())
        })
    }

    fn set(&self, path: String, document: Document) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.check_writes()?;
            self.documents.write().unwrap().insert(path, document);
            Ok(())
        })
    }

    fn list(&self, collection: String) -> StoreFuture<'_, Vec<(String, Document)>> {
        Box::pin(async move {
            self.check_reads()?;
            let documents = self.documents.read().unwrap();
            Ok(documents
                .range(collection.clone()..)
                .take_while(|(path, _)| path.starts_with(&collection))
                .filter(|(path, _)| is_direct_child(&collection, path))
                .map(|(path, document)| (path.clone(), document.clone()))
                .collect())
        })
    }

    fn commit(&self, batch: WriteBatch) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.check_writes()?;
            if self.faults.next_commit.swap(false, Ordering::SeqCst) {
                return Err(DocumentStoreError::Rejected("injected commit failure".to_string()));
            }

            // One write lock for the whole batch: readers see all of it or none.
            let mut documents = self.documents.write().unwrap();
            for op in batch.into_ops() {
                match op {
                    WriteOp::Set { path, document } => {
                        documents.insert(path, document);
                    }
                }
            }
            drop(documents);

            self.commits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}
