//! Thin HTTP clients for the notes backend.
//!
//! All remote collaborators — text extraction, semantic indexing, question
//! answering, and the tab/unit/note store — sit behind one [`ApiClient`].
//! The transport core lives in [`client`]; document operations (extract,
//! index, search, ask) in [`documents`]; resource CRUD in [`records`].

mod client;
mod documents;
mod records;
mod types;

pub use client::ApiClient;
pub use documents::{Answer, CHUNK_OVERLAP, CHUNK_SIZE, DEFAULT_TOP_K, ExtractedText, IndexAck};
pub use records::NewNote;
pub use types::{ApiError, NoteRecord, QueryError, TabRecord, UnitRecord};
