//! Outcome and error types for the ingestion pipeline.

use crate::backend::{ApiError, NoteRecord};
use thiserror::Error;

/// Errors that abort the ingestion pipeline.
///
/// Only the extraction stage is fatal; indexing and persistence failures are
/// carried inside [`IngestOutcome`] instead.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Text extraction failed; no index entry and no note were created.
    #[error("text extraction failed: {0}")]
    Extraction(#[source] ApiError),
}

/// Result of one best-effort pipeline stage.
#[derive(Debug)]
pub enum StageOutcome {
    /// Stage ran and the backend acknowledged it.
    Completed,
    /// Stage was not attempted.
    Skipped {
        /// Why the stage did not run.
        reason: &'static str,
    },
    /// Stage ran and failed; the pipeline carried on.
    Failed(ApiError),
}

impl StageOutcome {
    /// Whether the stage completed successfully.
    pub fn succeeded(&self) -> bool {
        matches!(self, StageOutcome::Completed)
    }

    /// The stage's failure, when it has one.
    pub fn failure(&self) -> Option<&ApiError> {
        match self {
            StageOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Aggregate result of ingesting one document.
///
/// Overall success is defined solely by extraction: if this value exists, the
/// file was read. The per-stage fields say whether its text is retrievable
/// and whether a note record exists.
#[derive(Debug)]
pub struct IngestOutcome {
    /// Full text extracted from the document.
    pub text: String,
    /// File name recorded on the note (the upload's name, or a placeholder).
    pub file_name: String,
    /// Unit whose namespace the document was indexed under.
    pub unit_id: String,
    /// Extraction method tag reported by the extraction service.
    pub extraction_method: String,
    /// Outcome of the indexing stage.
    pub indexing: StageOutcome,
    /// Outcome of the note-persistence stage.
    pub persistence: StageOutcome,
    /// The persisted note, when the persistence stage completed.
    pub note: Option<NoteRecord>,
}

impl IngestOutcome {
    /// Whether the document's text was indexed for retrieval.
    pub fn indexing_ok(&self) -> bool {
        self.indexing.succeeded()
    }

    /// Whether a note record was created for the document.
    pub fn persistence_ok(&self) -> bool {
        self.persistence.succeeded()
    }
}
