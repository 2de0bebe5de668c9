use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing ingestion activity.
#[derive(Default)]
pub struct IngestMetrics {
    documents_extracted: AtomicU64,
    chunks_indexed: AtomicU64,
    notes_created: AtomicU64,
    indexing_failures: AtomicU64,
    persistence_failures: AtomicU64,
}

impl IngestMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document whose text extraction completed.
    pub fn record_extracted(&self) {
        self.documents_extracted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record chunks acknowledged by the indexing service.
    pub fn record_chunks_indexed(&self, chunks: u64) {
        self.chunks_indexed.fetch_add(chunks, Ordering::Relaxed);
    }

    /// Record a note successfully persisted by the store.
    pub fn record_note_created(&self) {
        self.notes_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an indexing call that failed and was carried as a warning.
    pub fn record_indexing_failure(&self) {
        self.indexing_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a note-persistence call that failed and was carried as a warning.
    pub fn record_persistence_failure(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_extracted: self.documents_extracted.load(Ordering::Relaxed),
            chunks_indexed: self.chunks_indexed.load(Ordering::Relaxed),
            notes_created: self.notes_created.load(Ordering::Relaxed),
            indexing_failures: self.indexing_failures.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of ingestion counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents whose text was extracted since startup.
    pub documents_extracted: u64,
    /// Total chunk count acknowledged across all indexing calls.
    pub chunks_indexed: u64,
    /// Number of note records created by the pipeline.
    pub notes_created: u64,
    /// Number of indexing calls that failed without aborting ingestion.
    pub indexing_failures: u64,
    /// Number of note-persistence calls that failed without aborting ingestion.
    pub persistence_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_extraction_and_warnings() {
        let metrics = IngestMetrics::new();
        metrics.record_extracted();
        metrics.record_extracted();
        metrics.record_chunks_indexed(7);
        metrics.record_note_created();
        metrics.record_indexing_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_extracted, 2);
        assert_eq!(snapshot.chunks_indexed, 7);
        assert_eq!(snapshot.notes_created, 1);
        assert_eq!(snapshot.indexing_failures, 1);
        assert_eq!(snapshot.persistence_failures, 0);
    }

    #[test]
    fn snapshot_starts_at_zero() {
        let metrics = IngestMetrics::new();
        assert_eq!(metrics.snapshot().documents_extracted, 0);
        assert_eq!(metrics.snapshot().chunks_indexed, 0);
    }
}
