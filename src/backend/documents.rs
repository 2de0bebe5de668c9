//! Document operations: text extraction, semantic indexing, search, and ask.

use crate::backend::client::ApiClient;
use crate::backend::types::{ApiError, QueryError, SearchResponse};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

/// Chunk size sent with every indexing request, in units of text.
pub const CHUNK_SIZE: usize = 1000;
/// Overlap between adjacent chunks sent with every indexing request.
pub const CHUNK_OVERLAP: usize = 200;
/// Result count requested from search/ask when the caller does not specify one.
pub const DEFAULT_TOP_K: usize = 5;

/// Text extracted from an uploaded document.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedText {
    /// Full text recovered from the document.
    pub text: String,
    /// Tag describing the extraction method the service chose (e.g. `"OCR"`).
    pub extraction_method: String,
}

/// Acknowledgment returned by the indexing service.
///
/// Any 2xx response counts as success; the upserted count is informational
/// and absent when the service returns a body we do not recognize.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct IndexAck {
    /// Number of chunks the service reported upserting.
    #[serde(default)]
    pub upserted: Option<u64>,
}

/// A grounded answer from the question-answering service.
#[derive(Debug, Clone, Deserialize)]
pub struct Answer {
    /// Answer text generated over the namespace's indexed content.
    pub answer: String,
    /// Context snippets the answer was grounded in, when the service reports them.
    #[serde(default)]
    pub context: Vec<String>,
}

impl ApiClient {
    /// Upload a file to the extraction service and return its text.
    ///
    /// Fails on transport errors, non-2xx statuses, and payloads that cannot
    /// be parsed as the expected text result.
    pub async fn extract(
        &self,
        file: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<ExtractedText, ApiError> {
        let part = Part::bytes(file)
            .file_name(filename.to_string())
            .mime_str(mime_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .request(Method::POST, "extract")
            .multipart(form)
            .send()
            .await?;
        let extracted: ExtractedText = self.read_json(response).await?;
        tracing::debug!(
            filename,
            method = %extracted.extraction_method,
            chars = extracted.text.len(),
            "Extraction completed"
        );
        Ok(extracted)
    }

    /// Submit text for semantic indexing under the given namespace.
    ///
    /// The chunking configuration is fixed ([`CHUNK_SIZE`] / [`CHUNK_OVERLAP`]);
    /// chunking itself happens behind the endpoint.
    pub async fn index_text(&self, text: &str, namespace: &str) -> Result<IndexAck, ApiError> {
        let body = json!({
            "text": text,
            "category": namespace,
            "chunk_size": CHUNK_SIZE,
            "chunk_overlap": CHUNK_OVERLAP,
        });

        let response = self
            .request(Method::POST, "ingest")
            .json(&body)
            .send()
            .await?;
        let response = self.ensure_success(response).await?;

        // Any 2xx body counts as success; pull the upsert counter out if present.
        let ack = match response.text().await {
            Ok(body) => serde_json::from_str(&body).unwrap_or_default(),
            Err(_) => IndexAck::default(),
        };
        tracing::debug!(namespace, upserted = ?ack.upserted, "Text indexed");
        Ok(ack)
    }

    /// Run a free-text semantic search and return matching snippets.
    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<String>, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        let top_k = top_k.unwrap_or(DEFAULT_TOP_K).to_string();

        let response = self
            .request(Method::GET, "search")
            .query(&[("query", query), ("top_k", top_k.as_str())])
            .send()
            .await
            .map_err(ApiError::from)?;
        let payload: SearchResponse = self.read_json(response).await?;
        Ok(payload.snippets)
    }

    /// Ask a question grounded in the indexed content of one namespace.
    pub async fn ask(
        &self,
        question: &str,
        namespace: &str,
        top_k: Option<usize>,
    ) -> Result<Answer, QueryError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        let body = json!({
            "question": question,
            "namespace": namespace,
            "top_k": top_k.unwrap_or(DEFAULT_TOP_K),
        });

        let response = self
            .request(Method::POST, "summarize")
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from)?;
        let answer: Answer = self.read_json(response).await?;
        tracing::debug!(namespace, context_snippets = answer.context.len(), "Answer received");
        Ok(answer)
    }
}
