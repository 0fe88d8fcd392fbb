//! Document store abstraction.
//!
//! The engine persists three kinds of documents, addressed by slash-separated
//! paths (see [`paths`]):
//!
//! ```text
//! events/{eventId}                                          EventRecord
//! events/{eventId}/liveCompetitions/{cellKey}               LiveCompetition
//! events/{eventId}/liveCompetitions/{cellKey}/tandas/{key}  Tanda
//! ```
//!
//! Single documents are replaced wholesale with [`DocumentStore::set`]. Writes
//! that must become visible together go through a [`WriteBatch`] and
//! [`DocumentStore::commit`], which is all-or-nothing.
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of using `async fn` so the
//! store can be shared as `Arc<dyn DocumentStore>`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// A stored document
pub type Document = serde_json::Value;

/// Boxed future returned by store operations
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DocumentStoreError>> + Send + 'a>>;

/// Errors that can occur during document store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentStoreError {
    /// The backing store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backing store rejected the operation
    #[error("write rejected: {0}")]
    Rejected(String),

    /// A document could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DocumentStoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// One write inside a batch
#[derive(Clone, Debug, PartialEq)]
pub enum WriteOp {
    /// Create or replace the document at `path`
    Set {
        /// Document path
        path: String,
        /// New document
        document: Document,
    },
}

impl WriteOp {
    /// Path the write targets
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Set { path, .. } => path,
        }
    }
}

/// An ordered set of writes committed atomically
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Creates an empty batch
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Queue a raw document write
    pub fn set(&mut self, path: impl Into<String>, document: Document) -> &mut Self {
        self.ops.push(WriteOp::Set {
            path: path.into(),
            document,
        });
        self
    }

    /// Queue a typed document write
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Serialization`] if `value` cannot be
    /// encoded; the batch is left unchanged in that case.
    pub fn set_json<T: Serialize>(
        &mut self,
        path: impl Into<String>,
        value: &T,
    ) -> Result<&mut Self, DocumentStoreError> {
        let document = serde_json::to_value(value)?;
        Ok(self.set(path, document))
    }

    /// Number of queued writes
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing is queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Queued writes in order
    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Consume the batch
    #[must_use]
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Generic document store used for every persisted fact of the engine.
///
/// Implementations must be `Send + Sync` to be shared across tasks.
pub trait DocumentStore: Send + Sync {
    /// Read one document. A missing document is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, path: String) -> StoreFuture<'_, Option<Document>>;

    /// Create or replace one document.
    ///
    /// # Errors
    ///
    /// Returns an error if the write was not acknowledged.
    fn set(&self, path: String, document: Document) -> StoreFuture<'_, ()>;

    /// List the direct children of a collection as `(path, document)` pairs,
    /// ordered by path.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list(&self, collection: String) -> StoreFuture<'_, Vec<(String, Document)>>;

    /// Apply every write of `batch`, or none of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch was not committed; in that case no write
    /// of the batch is visible.
    fn commit(&self, batch: WriteBatch) -> StoreFuture<'_, ()>;
}

/// Decode a stored document into a typed value
///
/// # Errors
///
/// Returns [`DocumentStoreError::Serialization`] if the document does not
/// match `T`.
pub fn decode<T: DeserializeOwned>(document: Document) -> Result<T, DocumentStoreError> {
    Ok(serde_json::from_value(document)?)
}

/// Encode a typed value as a document
///
/// # Errors
///
/// Returns [`DocumentStoreError::Serialization`] if `value` cannot be encoded.
pub fn encode<T: Serialize>(value: &T) -> Result<Document, DocumentStoreError> {
    Ok(serde_json::to_value(value)?)
}

/// Document paths used by the engine
pub mod paths {
    use crate::types::{EventId, LiveCompetitionId};

    /// `events/{eventId}`
    #[must_use]
    pub fn event(event_id: &EventId) -> String {
        format!("events/{event_id}")
    }

    /// `events/{eventId}/liveCompetitions`
    #[must_use]
    pub fn live_competitions(event_id: &EventId) -> String {
        format!("events/{event_id}/liveCompetitions")
    }

    /// `events/{eventId}/liveCompetitions/{cellKey}`
    #[must_use]
    pub fn live_competition(event_id: &EventId, cell: &LiveCompetitionId) -> String {
        format!("{}/{cell}", live_competitions(event_id))
    }

    /// `events/{eventId}/liveCompetitions/{cellKey}/tandas`
    #[must_use]
    pub fn tandas(event_id: &EventId, cell: &LiveCompetitionId) -> String {
        format!("{}/tandas", live_competition(event_id, cell))
    }

    /// `events/{eventId}/liveCompetitions/{cellKey}/tandas/{key}`
    #[must_use]
    pub fn tanda(event_id: &EventId, cell: &LiveCompetitionId, key: &str) -> String {
        format!("{}/{key}", tandas(event_id, cell))
    }
}
