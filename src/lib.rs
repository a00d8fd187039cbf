// ============================================================================
// AuditStore Library
// ============================================================================

pub mod audit;
pub mod collection;
pub mod core;
pub mod store;

// Re-export main types for convenience
pub use audit::{AuditRecord, DOCUMENT_ID_FIELD};
pub use collection::{AuditedCollection, CollectionConfig, FaultObserver, InsertOneResult};
pub use core::{Document, DocumentId, ID_FIELD, IdGenerator, InsertError, StoreError};
pub use store::{DocumentStore, IndexSpec, MemoryStore};
