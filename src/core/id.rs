use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque primary identifier for a stored document.
///
/// Random-based with negligible but non-zero collision probability; the
/// insertion protocol treats a collision as an ordinary retryable event,
/// not an anomaly. Identifiers are never reused and never mutated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Parse the string form stored inside a document's `_id` field.
    pub fn parse(token: &str) -> Option<Self> {
        Uuid::parse_str(token).ok().map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Produces a fresh identifier for every insertion attempt.
///
/// Infallible; outputs are statistically independent of all previously
/// generated values within the process.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator;

impl IdGenerator {
    pub fn next(&self) -> DocumentId {
        DocumentId(Uuid::new_v4())
    }
}
