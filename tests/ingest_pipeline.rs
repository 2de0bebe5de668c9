//! End-to-end ingestion pipeline behavior against a mock backend.

use httpmock::{Method::POST, MockServer};
use serde_json::json;
use std::sync::Arc;
use studydesk::backend::ApiClient;
use studydesk::ingest::{IngestError, IngestionPipeline, StageOutcome};

fn pipeline_for(server: &MockServer) -> IngestionPipeline {
    let api = Arc::new(ApiClient::with_base_url(&server.base_url()).expect("client"));
    IngestionPipeline::new(api)
}

fn note_body(title: &str, unit: &str, summary: &str) -> serde_json::Value {
    json!({
        "id": "n1",
        "unit": unit,
        "title": title,
        "content": "full text...",
        "summary": summary,
        "file": title,
        "extraction_method": "OCR",
        "created_at": "2026-04-02T10:00:00Z"
    })
}

#[tokio::test]
async fn indexing_failure_does_not_block_the_note() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/extract");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                "text": "full text...",
                "extraction_method": "OCR"
            }));
        })
        .await;
    let indexing = server
        .mock_async(|when, then| {
            when.method(POST).path("/ingest");
            then.status(502).body("bad gateway");
        })
        .await;
    let notes = server
        .mock_async(|when, then| {
            when.method(POST).path("/notes").json_body_partial(
                r#"{
                    "unit": "unit-7",
                    "title": "lecture.pdf",
                    "summary": "full text......",
                    "extraction_method": "OCR"
                }"#,
            );
            then.status(201)
                .header("content-type", "application/json")
                .json_body(note_body("lecture.pdf", "unit-7", "full text......"));
        })
        .await;

    let pipeline = pipeline_for(&server);
    let outcome = pipeline
        .ingest_document(b"%PDF-1.4".to_vec(), "lecture.pdf", "application/pdf", "unit-7")
        .await
        .expect("ingestion succeeds on extraction alone");

    indexing.assert();
    notes.assert();

    assert!(!outcome.indexing_ok());
    assert!(outcome.persistence_ok());
    assert_eq!(outcome.extraction_method, "OCR");
    assert_eq!(outcome.file_name, "lecture.pdf");
    assert_eq!(outcome.unit_id, "unit-7");
    assert_eq!(outcome.note.as_ref().map(|note| note.title.as_str()), Some("lecture.pdf"));

    let snapshot = pipeline.metrics_snapshot();
    assert_eq!(snapshot.documents_extracted, 1);
    assert_eq!(snapshot.indexing_failures, 1);
    assert_eq!(snapshot.notes_created, 1);
}

#[tokio::test]
async fn extraction_failure_aborts_before_any_side_effect() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/extract");
            then.status(422)
                .header("content-type", "application/json")
                .body(r#"{"detail":"not a readable document"}"#);
        })
        .await;
    let indexing = server
        .mock_async(|when, then| {
            when.method(POST).path("/ingest");
            then.status(200);
        })
        .await;
    let notes = server
        .mock_async(|when, then| {
            when.method(POST).path("/notes");
            then.status(201);
        })
        .await;

    let pipeline = pipeline_for(&server);
    let err = pipeline
        .ingest_document(b"garbage".to_vec(), "broken.pdf", "application/pdf", "unit-7")
        .await
        .expect_err("extraction failure is fatal");

    assert!(matches!(err, IngestError::Extraction(_)));
    assert!(err.to_string().contains("not a readable document"));
    indexing.assert_hits(0);
    notes.assert_hits(0);
    assert_eq!(pipeline.metrics_snapshot().documents_extracted, 0);
}

#[tokio::test]
async fn blank_text_skips_indexing_but_still_persists() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/extract");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                "text": "   \n ",
                "extraction_method": "native"
            }));
        })
        .await;
    let indexing = server
        .mock_async(|when, then| {
            when.method(POST).path("/ingest");
            then.status(200);
        })
        .await;
    let notes = server
        .mock_async(|when, then| {
            when.method(POST).path("/notes");
            then.status(201)
                .header("content-type", "application/json")
                .json_body(note_body("scan.pdf", "unit-2", "   \n ..."));
        })
        .await;

    let pipeline = pipeline_for(&server);
    let outcome = pipeline
        .ingest_document(b"%PDF-1.4".to_vec(), "scan.pdf", "application/pdf", "unit-2")
        .await
        .expect("ingestion");

    assert!(matches!(outcome.indexing, StageOutcome::Skipped { .. }));
    assert!(outcome.persistence_ok());
    indexing.assert_hits(0);
    notes.assert();
}

#[tokio::test]
async fn unnamed_upload_gets_a_placeholder_title() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/extract");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                "text": "pasted text",
                "extraction_method": "native"
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/ingest");
            then.status(200);
        })
        .await;
    let notes = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/notes")
                .json_body_partial(r#"{"title":"Untitled document","file":"Untitled document"}"#);
            then.status(201)
                .header("content-type", "application/json")
                .json_body(note_body("Untitled document", "unit-1", "pasted text..."));
        })
        .await;

    let pipeline = pipeline_for(&server);
    let outcome = pipeline
        .ingest_document(b"pasted text".to_vec(), "", "text/plain", "unit-1")
        .await
        .expect("ingestion");

    notes.assert();
    assert_eq!(outcome.file_name, "Untitled document");
}

#[tokio::test]
async fn persistence_failure_is_a_warning_not_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/extract");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                "text": "full text...",
                "extraction_method": "OCR"
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/ingest");
            then.status(201)
                .header("content-type", "application/json")
                .body(r#"{"success":true,"upserted":2}"#);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/notes");
            then.status(500).body("store offline");
        })
        .await;

    let pipeline = pipeline_for(&server);
    let outcome = pipeline
        .ingest_document(b"%PDF-1.4".to_vec(), "lecture.pdf", "application/pdf", "unit-7")
        .await
        .expect("extraction succeeded, so ingest succeeds");

    assert!(outcome.indexing_ok());
    assert!(!outcome.persistence_ok());
    assert!(outcome.note.is_none());
    assert!(outcome.persistence.failure().is_some());

    let snapshot = pipeline.metrics_snapshot();
    assert_eq!(snapshot.chunks_indexed, 2);
    assert_eq!(snapshot.persistence_failures, 1);
}
