use serde_json::{Map, Value};

use crate::core::id::DocumentId;

/// Primary-key field of every stored document.
pub const ID_FIELD: &str = "_id";

/// An open-ended key/value record, the currency of the whole crate.
pub type Document = Map<String, Value>;

/// Stamp `id` onto `document` as both its primary key and its revision
/// marker. Any pre-existing values for either field are overwritten.
pub fn stamp_id(document: &mut Document, revision_field: &str, id: DocumentId) {
    let token = Value::String(id.to_string());
    document.insert(ID_FIELD.to_string(), token.clone());
    document.insert(revision_field.to_string(), token);
}

/// Read the primary identifier back out of a document, if present.
pub fn document_id(document: &Document) -> Option<DocumentId> {
    document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .and_then(DocumentId::parse)
}
