//! Audit-linked collection
//!
//! A collection facade whose single write operation, [`insert_one`],
//! guarantees that every committed document has a matching record in a
//! secondary audit collection, without multi-document transactions.
//!
//! [`insert_one`]: AuditedCollection::insert_one

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::audit::{AuditRecord, DOCUMENT_ID_FIELD};
use crate::core::document::{Document, stamp_id};
use crate::core::error::{InsertError, StoreError, StoreResult};
use crate::core::id::{DocumentId, IdGenerator};
use crate::store::DocumentStore;

/// Observer invoked when a rollback delete fails and an orphaned audit
/// record is left behind.
///
/// The default observer emits a single `tracing` error event. Inject
/// your own to route the condition to alerting, or to count faults in
/// tests without capturing global logging state.
pub trait FaultObserver: Send + Sync {
    fn orphaned_audit_record(&self, document_id: DocumentId, error: &StoreError);
}

struct TracingFaultObserver;

impl FaultObserver for TracingFaultObserver {
    fn orphaned_audit_record(&self, document_id: DocumentId, error: &StoreError) {
        tracing::error!(
            %document_id,
            %error,
            "failed to clean up a failed insertion from the audit collection; \
             an orphaned record remains"
        );
    }
}

/// Construction-time settings for an [`AuditedCollection`].
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    /// Collection holding the canonical documents.
    pub primary_collection: String,
    /// Collection holding one audit record per committed revision.
    pub audit_collection: String,
    /// Field stamped onto each primary document, always equal to its own
    /// `_id`, correlating it with its audit record without a second
    /// write.
    pub revision_field: String,
    /// Optional cap on colliding attempts. `None` retries until a
    /// non-collision outcome.
    pub max_attempts: Option<u32>,
}

impl CollectionConfig {
    pub fn new(
        primary_collection: impl Into<String>,
        audit_collection: impl Into<String>,
        revision_field: impl Into<String>,
    ) -> Self {
        Self {
            primary_collection: primary_collection.into(),
            audit_collection: audit_collection.into(),
            revision_field: revision_field.into(),
            max_attempts: None,
        }
    }

    /// Abandon an insertion with
    /// [`InsertError::AttemptsExhausted`] after `cap` colliding attempts.
    pub fn max_attempts(mut self, cap: u32) -> Self {
        self.max_attempts = Some(cap);
        self
    }
}

/// Success value of [`AuditedCollection::insert_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsertOneResult {
    pub inserted_id: DocumentId,
}

/// States of the insertion protocol. Terminal outcomes (commit, fatal
/// fault, rollback failure) return early out of the loop instead.
enum InsertState {
    Generate,
    AuditInsert { id: DocumentId, record: AuditRecord },
    PrimaryInsert { id: DocumentId },
    Rollback { id: DocumentId },
}

/// A primary collection linked to an audit collection.
///
/// Holds a generic [`DocumentStore`] handle by composition; any other
/// collection operation a caller needs goes explicitly through the
/// store, never through inheritance of its full surface.
///
/// # Examples
///
/// ```
/// use auditstore::{AuditedCollection, CollectionConfig, MemoryStore};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # tokio_test::block_on(async {
/// let store = Arc::new(MemoryStore::new());
/// let config = CollectionConfig::new("people", "people_aud", "revision");
/// let people = AuditedCollection::open(store, config).await?;
///
/// let mut document = json!({"name": "Ada"}).as_object().unwrap().clone();
/// let result = people.insert_one(&mut document, None).await?;
///
/// assert_eq!(document["revision"], json!(result.inserted_id.to_string()));
/// assert!(people.find_audit(result.inserted_id).await?.is_some());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # })
/// # }
/// ```
pub struct AuditedCollection {
    store: Arc<dyn DocumentStore>,
    config: CollectionConfig,
    ids: IdGenerator,
    observer: Arc<dyn FaultObserver>,
}

impl AuditedCollection {
    /// Open the audited write path over `store`.
    ///
    /// Ensures a non-unique index on the audit collection's
    /// `document_id` field so a document's audit record stays cheap to
    /// look up. The index supports later queries only; it plays no part
    /// in the consistency protocol.
    pub async fn open(store: Arc<dyn DocumentStore>, config: CollectionConfig) -> StoreResult<Self> {
        store
            .ensure_index(&config.audit_collection, DOCUMENT_ID_FIELD, false)
            .await?;
        Ok(Self {
            store,
            config,
            ids: IdGenerator,
            observer: Arc::new(TracingFaultObserver),
        })
    }

    /// Replace the default tracing-backed [`FaultObserver`].
    pub fn with_fault_observer(mut self, observer: Arc<dyn FaultObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Insert `document` into the primary collection with a durable
    /// audit copy in the audit collection.
    ///
    /// The audit record is written first and carries the document's
    /// `_id` under `document_id`. Writing the primary document before
    /// the audit record would jeopardise audit integrity, since a
    /// rollback of the primary write cannot be guaranteed; writing a
    /// placeholder audit record and patching the id in afterwards would
    /// cost a third store operation. Instead the identifier is generated
    /// up front and doubles as the optimistic lock: if either insert
    /// hits a duplicate key, the attempt is abandoned (rolling back the
    /// audit record if it was already written) and the whole insertion
    /// retries with a fresh identifier.
    ///
    /// `document` may already carry an `_id`; it is overwritten, along
    /// with the configured revision field. On success both fields equal
    /// the returned `inserted_id`.
    ///
    /// `audit_metadata`, when given, is merged over the audit copy with
    /// metadata fields winning on key collision.
    ///
    /// Only duplicate-key failures are retried. Any other store fault is
    /// returned as-is, and a failure to roll back an orphaned audit
    /// record is reported through the [`FaultObserver`] and returned as
    /// [`InsertError::RollbackFailed`].
    pub async fn insert_one(
        &self,
        document: &mut Document,
        audit_metadata: Option<&Document>,
    ) -> Result<InsertOneResult, InsertError> {
        let mut attempts = 0u32;
        let mut state = InsertState::Generate;

        loop {
            state = match state {
                InsertState::Generate => {
                    if let Some(cap) = self.config.max_attempts {
                        if attempts >= cap {
                            return Err(InsertError::AttemptsExhausted { attempts: cap });
                        }
                    }
                    attempts += 1;

                    let id = self.ids.next();
                    stamp_id(document, &self.config.revision_field, id);
                    let record = AuditRecord::project(document, audit_metadata);
                    InsertState::AuditInsert { id, record }
                }

                InsertState::AuditInsert { id, record } => {
                    match self
                        .store
                        .insert(&self.config.audit_collection, record.fields())
                        .await
                    {
                        Ok(_) => InsertState::PrimaryInsert { id },
                        // Nothing durable exists for this id yet; just
                        // pick a new one.
                        Err(err) if err.is_duplicate_key() => InsertState::Generate,
                        Err(err) => return Err(err.into()),
                    }
                }

                InsertState::PrimaryInsert { id } => {
                    match self
                        .store
                        .insert(&self.config.primary_collection, document)
                        .await
                    {
                        Ok(_) => return Ok(InsertOneResult { inserted_id: id }),
                        // The audit record for this id is durable but
                        // the primary document is not; undo it before
                        // retrying.
                        Err(err) if err.is_duplicate_key() => InsertState::Rollback { id },
                        Err(err) => return Err(err.into()),
                    }
                }

                InsertState::Rollback { id } => {
                    match self.store.delete(&self.config.audit_collection, id).await {
                        Ok(()) => InsertState::Generate,
                        Err(source) => {
                            self.observer.orphaned_audit_record(id, &source);
                            return Err(InsertError::RollbackFailed {
                                document_id: id,
                                source,
                            });
                        }
                    }
                }
            };
        }
    }

    /// Fetch one document from the primary collection.
    pub async fn find_one(&self, filter: &Document) -> StoreResult<Option<Document>> {
        self.store
            .find_one(&self.config.primary_collection, filter)
            .await
    }

    /// Fetch the audit record of the document identified by
    /// `document_id`, through the index ensured at construction.
    pub async fn find_audit(&self, document_id: DocumentId) -> StoreResult<Option<Document>> {
        let mut filter = Document::new();
        filter.insert(
            DOCUMENT_ID_FIELD.to_string(),
            Value::String(document_id.to_string()),
        );
        self.store
            .find_one(&self.config.audit_collection, &filter)
            .await
    }
}
