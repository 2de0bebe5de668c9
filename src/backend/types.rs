//! Shared types used by the backend clients.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;

/// Errors returned while talking to the notes backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before a response arrived (connect, timeout, body read).
    #[error("Backend unreachable: {0}")]
    Http(#[from] reqwest::Error),
    /// Backend responded with an unexpected status code.
    #[error("Unexpected backend response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the backend.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Backend responded with a content type other than JSON.
    #[error("Backend returned a non-JSON response (content-type: {content_type})")]
    NotJson {
        /// Content type declared by the response.
        content_type: String,
    },
    /// Backend body could not be decoded into the expected shape.
    #[error("Failed to decode backend response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Errors from the query surface (search / ask).
#[derive(Debug, Error)]
pub enum QueryError {
    /// Rejected locally; no request was made.
    #[error("query text must not be empty")]
    EmptyQuery,
    /// Transport or backend failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A top-level tab grouping as stored by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct TabRecord {
    /// Identifier assigned by the store.
    pub id: String,
    /// Display name chosen by the user.
    pub name: String,
    /// Display color in `#rrggbb` form.
    pub color: String,
    /// Number of units currently grouped under this tab.
    #[serde(default)]
    pub unit_count: u64,
}

/// A unit within a tab as stored by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitRecord {
    /// Identifier assigned by the store.
    pub id: String,
    /// Identifier of the owning tab.
    pub tab: String,
    /// Display name chosen by the user.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Ordering index maintained by the store.
    #[serde(default)]
    pub order: i64,
    /// Number of notes currently attached to this unit.
    #[serde(default)]
    pub note_count: u64,
    /// Creation time reported by the store.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A persisted note as stored by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteRecord {
    /// Identifier assigned by the store.
    pub id: String,
    /// Identifier of the owning unit.
    pub unit: String,
    /// Note title, usually the uploaded file name.
    pub title: String,
    /// Full extracted text.
    pub content: String,
    /// Short summary shown in listings.
    #[serde(default)]
    pub summary: String,
    /// Original file name of the ingested document.
    #[serde(default)]
    pub file: String,
    /// Tag describing how the text was extracted.
    #[serde(default = "default_extraction_method")]
    pub extraction_method: String,
    /// Creation time reported by the store.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn default_extraction_method() -> String {
    "OCR".to_string()
}

#[derive(Deserialize)]
pub(crate) struct SearchResponse {
    pub(crate) snippets: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_record_fills_store_defaults() {
        let note: NoteRecord = serde_json::from_str(
            r#"{
                "id": "n1",
                "unit": "u1",
                "title": "lecture.pdf",
                "content": "full text",
                "created_at": "2026-03-01T09:30:00Z"
            }"#,
        )
        .expect("note json");

        assert_eq!(note.extraction_method, "OCR");
        assert!(note.summary.is_empty());
        assert!(note.file.is_empty());
    }

    #[test]
    fn unit_record_parses_store_timestamp() {
        let unit: UnitRecord = serde_json::from_str(
            r#"{
                "id": "u1",
                "tab": "t1",
                "name": "Week 1",
                "description": "Intro",
                "order": 2,
                "note_count": 4,
                "created_at": "2026-02-11T18:00:00+00:00"
            }"#,
        )
        .expect("unit json");

        assert_eq!(unit.order, 2);
        assert_eq!(unit.created_at.year(), 2026);
    }
}
