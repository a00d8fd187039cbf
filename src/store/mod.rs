//! Document store adapter
//!
//! The external collaborator seam: everything the insertion protocol
//! needs from the underlying store, and nothing else.

pub mod memory;

pub use memory::{IndexSpec, MemoryStore};

use async_trait::async_trait;

use crate::core::document::Document;
use crate::core::error::StoreResult;
use crate::core::id::DocumentId;

/// A generic trait over the underlying document store.
///
/// This trait allows writing code that is agnostic to the backend. You
/// can use [`MemoryStore`] for tests and embedded use, or wrap a real
/// document database client to implement this trait for production.
/// Every operation is scoped to a named collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `document` into `collection`.
    ///
    /// Fails with [`StoreError::DuplicateKey`](crate::StoreError::DuplicateKey)
    /// when the document's primary key already exists in that collection,
    /// and with `Fault` for any other store-level problem. On success the
    /// inserted identifier is returned.
    async fn insert(&self, collection: &str, document: &Document) -> StoreResult<DocumentId>;

    /// Delete the document with primary key `id` from `collection`.
    ///
    /// Strict: a missing document is a fault, not a no-op. The rollback
    /// path relies on this to notice when store state has diverged from
    /// what the protocol believes.
    async fn delete(&self, collection: &str, id: DocumentId) -> StoreResult<()>;

    /// Fetch the first document matching every field of `filter`.
    ///
    /// Used by callers and tests to observe committed state; the
    /// insertion protocol never calls it.
    async fn find_one(&self, collection: &str, filter: &Document) -> StoreResult<Option<Document>>;

    /// Create an index over `field` in `collection`. Idempotent.
    async fn ensure_index(&self, collection: &str, field: &str, unique: bool) -> StoreResult<()>;
}
