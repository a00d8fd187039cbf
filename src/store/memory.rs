use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::document::{Document, document_id};
use crate::core::error::{StoreError, StoreResult};
use crate::core::id::DocumentId;
use crate::store::DocumentStore;

/// An index recorded on a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub field: String,
    pub unique: bool,
}

#[derive(Default)]
struct Collection {
    documents: HashMap<DocumentId, Document>,
    indexes: Vec<IndexSpec>,
}

/// HashMap-backed [`DocumentStore`] with `_id` uniqueness enforcement.
///
/// Collections are created lazily on first insert or index request.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held by `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .map(|c| c.documents.len())
            .unwrap_or(0)
    }

    /// Index specs recorded for `collection`.
    pub async fn indexes(&self, collection: &str) -> Vec<IndexSpec> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .map(|c| c.indexes.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, document: &Document) -> StoreResult<DocumentId> {
        let id = document_id(document).ok_or_else(|| StoreError::Fault {
            collection: collection.to_string(),
            message: "document has no usable primary key".to_string(),
        })?;

        let mut collections = self.collections.write().await;
        let entry = collections.entry(collection.to_string()).or_default();
        if entry.documents.contains_key(&id) {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
            });
        }
        entry.documents.insert(id, document.clone());
        Ok(id)
    }

    async fn delete(&self, collection: &str, id: DocumentId) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::Fault {
                collection: collection.to_string(),
                message: "collection not found".to_string(),
            })?;
        if entry.documents.remove(&id).is_none() {
            return Err(StoreError::Fault {
                collection: collection.to_string(),
                message: format!("no document with id '{id}'"),
            });
        }
        Ok(())
    }

    async fn find_one(&self, collection: &str, filter: &Document) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|entry| {
            entry
                .documents
                .values()
                .find(|doc| filter.iter().all(|(key, value)| doc.get(key) == Some(value)))
                .cloned()
        }))
    }

    async fn ensure_index(&self, collection: &str, field: &str, unique: bool) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let entry = collections.entry(collection.to_string()).or_default();
        let spec = IndexSpec {
            field: field.to_string(),
            unique,
        };
        if !entry.indexes.contains(&spec) {
            entry.indexes.push(spec);
        }
        Ok(())
    }
}
