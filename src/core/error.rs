use thiserror::Error;

use crate::core::id::DocumentId;

/// Failure kinds reported by a [`DocumentStore`](crate::store::DocumentStore)
/// implementation.
///
/// `DuplicateKey` is the only kind the insertion protocol recovers from;
/// every `Fault` is surfaced verbatim to the caller.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate key in collection '{collection}'")]
    DuplicateKey { collection: String },

    #[error("store fault in collection '{collection}': {message}")]
    Fault { collection: String, message: String },
}

impl StoreError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures surfaced by
/// [`AuditedCollection::insert_one`](crate::collection::AuditedCollection::insert_one).
#[derive(Error, Debug)]
pub enum InsertError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The primary insert collided and the compensating delete of the
    /// audit record failed as well. An orphaned audit record for
    /// `document_id` now exists; the insertion did not succeed.
    #[error(
        "rollback of audit record '{document_id}' failed, \
         an orphaned audit record remains: {source}"
    )]
    RollbackFailed {
        document_id: DocumentId,
        source: StoreError,
    },

    /// Only produced when a `max_attempts` cap is configured.
    #[error("insertion abandoned after {attempts} colliding attempts")]
    AttemptsExhausted { attempts: u32 },
}
