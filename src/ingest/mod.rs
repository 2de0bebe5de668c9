//! Document ingestion pipeline.
//!
//! [`IngestionPipeline`] drives extraction, indexing, and note persistence
//! for one uploaded file. Extraction is mandatory; indexing and persistence
//! are best-effort side effects whose failures are folded into the
//! [`IngestOutcome`] as warnings instead of aborting the pipeline.

mod pipeline;
mod types;

pub use pipeline::{IngestApi, IngestionPipeline};
pub use types::{IngestError, IngestOutcome, StageOutcome};
