//! Pipeline service coordinating extraction, indexing, and note persistence.

use crate::backend::{ApiClient, NewNote};
use crate::ingest::types::{IngestError, IngestOutcome, StageOutcome};
use crate::metrics::{IngestMetrics, MetricsSnapshot};
use async_trait::async_trait;
use std::sync::Arc;

/// Title and file name recorded when an upload arrives without a usable name.
const UNNAMED_UPLOAD: &str = "Untitled document";

/// Number of characters kept in a note's summary before the ellipsis marker.
const SUMMARY_CHARS: usize = 200;

/// Drives the extract → index → persist sequence for uploaded documents.
///
/// The pipeline owns a long-lived backend client handle and a metrics
/// registry shared with any surface that reports them. Construct it once and
/// share it through an `Arc`.
pub struct IngestionPipeline {
    api: Arc<ApiClient>,
    metrics: Arc<IngestMetrics>,
}

/// Abstraction over the ingestion pipeline used by consuming surfaces.
#[async_trait]
pub trait IngestApi: Send + Sync {
    /// Ingest one uploaded file into the given unit's namespace.
    async fn ingest_document(
        &self,
        file: Vec<u8>,
        filename: &str,
        mime_type: &str,
        unit_id: &str,
    ) -> Result<IngestOutcome, IngestError>;
}

impl IngestionPipeline {
    /// Build a pipeline around an existing backend client.
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            metrics: Arc::new(IngestMetrics::new()),
        }
    }

    /// Ingest one uploaded file into the given unit's namespace.
    ///
    /// Extraction is mandatory: any failure aborts before side effects and
    /// surfaces verbatim. Indexing runs only for non-blank text and its
    /// failure downgrades to a warning, as does a persistence failure — the
    /// user's upload is never discarded because a side effect misbehaved.
    pub async fn ingest_document(
        &self,
        file: Vec<u8>,
        filename: &str,
        mime_type: &str,
        unit_id: &str,
    ) -> Result<IngestOutcome, IngestError> {
        tracing::info!(filename, unit = unit_id, bytes = file.len(), "Ingesting document");

        let extracted = self
            .api
            .extract(file, filename, mime_type)
            .await
            .map_err(IngestError::Extraction)?;
        self.metrics.record_extracted();

        let file_name = if filename.trim().is_empty() {
            UNNAMED_UPLOAD
        } else {
            filename
        };

        let indexing = if extracted.text.trim().is_empty() {
            tracing::debug!(unit = unit_id, "Extracted text is blank; nothing to index");
            StageOutcome::Skipped {
                reason: "extracted text was empty",
            }
        } else {
            match self.api.index_text(&extracted.text, unit_id).await {
                Ok(ack) => {
                    if let Some(upserted) = ack.upserted {
                        self.metrics.record_chunks_indexed(upserted);
                    }
                    StageOutcome::Completed
                }
                Err(error) => {
                    tracing::warn!(unit = unit_id, %error, "Indexing failed; note will not be retrievable until re-ingested");
                    self.metrics.record_indexing_failure();
                    StageOutcome::Failed(error)
                }
            }
        };

        let payload = NewNote {
            unit: unit_id,
            title: file_name,
            content: &extracted.text,
            summary: summarize(&extracted.text),
            file: file_name,
            extraction_method: &extracted.extraction_method,
        };
        let (persistence, note) = match self.api.create_note(&payload).await {
            Ok(note) => {
                self.metrics.record_note_created();
                (StageOutcome::Completed, Some(note))
            }
            Err(error) => {
                tracing::warn!(unit = unit_id, %error, "Note persistence failed");
                self.metrics.record_persistence_failure();
                (StageOutcome::Failed(error), None)
            }
        };

        tracing::info!(
            filename = file_name,
            unit = unit_id,
            method = %extracted.extraction_method,
            indexed = indexing.succeeded(),
            persisted = persistence.succeeded(),
            "Ingestion finished"
        );

        Ok(IngestOutcome {
            text: extracted.text,
            file_name: file_name.to_string(),
            unit_id: unit_id.to_string(),
            extraction_method: extracted.extraction_method,
            indexing,
            persistence,
            note,
        })
    }

    /// Return the current ingestion metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl IngestApi for IngestionPipeline {
    async fn ingest_document(
        &self,
        file: Vec<u8>,
        filename: &str,
        mime_type: &str,
        unit_id: &str,
    ) -> Result<IngestOutcome, IngestError> {
        IngestionPipeline::ingest_document(self, file, filename, mime_type, unit_id).await
    }
}

/// Build the listing summary: the first [`SUMMARY_CHARS`] characters plus an
/// ellipsis marker. Truncation is by `char`, never inside a code point.
fn summarize(text: &str) -> String {
    let mut summary: String = text.chars().take(SUMMARY_CHARS).collect();
    summary.push_str("...");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_keeps_short_text_whole() {
        assert_eq!(summarize("full text..."), "full text......");
    }

    #[test]
    fn summary_truncates_at_two_hundred_chars() {
        let text = "a".repeat(450);
        let summary = summarize(&text);
        assert_eq!(summary.len(), 203);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn summary_respects_char_boundaries() {
        let text = "é".repeat(250);
        let summary = summarize(&text);
        assert_eq!(summary.chars().count(), 203);
    }
}
