//! Audit projection
//!
//! Builds the record written to the audit collection from a primary
//! document plus optional caller-supplied metadata.

use crate::core::document::{Document, ID_FIELD};

/// Audit-collection field referencing the primary document's `_id`.
pub const DOCUMENT_ID_FIELD: &str = "document_id";

/// A field-for-field copy of a primary document bound for the audit
/// collection.
///
/// The copy keeps the document's `_id`, which is what lets the store's
/// primary-key uniqueness act as the optimistic lock for the whole
/// insertion: an identifier that ever reached the audit collection can
/// never be inserted there again.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    fields: Document,
}

impl AuditRecord {
    /// Copy every field of `document`, set `document_id` to the
    /// document's primary identifier, then merge `metadata` over the
    /// copy. Metadata fields win on key collision. Pure; no failure
    /// modes.
    pub fn project(document: &Document, metadata: Option<&Document>) -> Self {
        let mut fields = document.clone();
        if let Some(id) = document.get(ID_FIELD) {
            fields.insert(DOCUMENT_ID_FIELD.to_string(), id.clone());
        }
        if let Some(metadata) = metadata {
            for (key, value) in metadata {
                fields.insert(key.clone(), value.clone());
            }
        }
        Self { fields }
    }

    pub fn fields(&self) -> &Document {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Document {
        json!({"_id": "doc-1", "name": "Ada", "role": "engineer"})
            .as_object()
            .unwrap()
            .clone()
    }

    #[test]
    fn test_project_copies_fields_and_links_document() {
        let record = AuditRecord::project(&document(), None);

        assert_eq!(record.fields()["name"], json!("Ada"));
        assert_eq!(record.fields()["role"], json!("engineer"));
        assert_eq!(record.fields()[DOCUMENT_ID_FIELD], json!("doc-1"));
        assert_eq!(record.fields()[ID_FIELD], json!("doc-1"));
    }

    #[test]
    fn test_metadata_wins_on_key_collision() {
        let metadata = json!({"role": "author", "origin": "APIv2"})
            .as_object()
            .unwrap()
            .clone();
        let record = AuditRecord::project(&document(), Some(&metadata));

        assert_eq!(record.fields()["role"], json!("author"));
        assert_eq!(record.fields()["origin"], json!("APIv2"));
        assert_eq!(record.fields()["name"], json!("Ada"));
    }
}
