pub mod document;
pub mod error;
pub mod id;

pub use document::{Document, ID_FIELD};
pub use error::{InsertError, StoreError, StoreResult};
pub use id::{DocumentId, IdGenerator};
