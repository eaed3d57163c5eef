pub mod document;
pub mod document_store;

pub use document::DocumentService;
pub use document_store::{DocumentStore, SqliteDocumentStore};
