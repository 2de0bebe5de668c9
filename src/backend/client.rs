//! HTTP transport core shared by every backend client.

use crate::backend::types::ApiError;
use crate::config::get_config;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Per-call deadline applied when no override is configured.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Lightweight HTTP client for the notes backend.
///
/// One instance is shared by the ingestion pipeline and the workspace state
/// manager; construct it once near process start and hand out `Arc` clones.
#[derive(Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Construct a client using configuration derived from the environment.
    pub fn from_env() -> Result<Self, ApiError> {
        let config = get_config();
        let timeout = config
            .request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self::build(&config.api_base_url, timeout)
    }

    /// Construct a client pointed at an explicit base URL with the default deadline.
    pub fn with_base_url(url: &str) -> Result<Self, ApiError> {
        Self::build(url, DEFAULT_TIMEOUT)
    }

    fn build(url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(url).map_err(ApiError::InvalidUrl)?;
        let client = Client::builder()
            .user_agent(concat!("studydesk/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        tracing::debug!(url = %base_url, timeout_secs = timeout.as_secs(), "Initialized backend HTTP client");

        Ok(Self { client, base_url })
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format_endpoint(&self.base_url, path))
    }

    /// Map a non-2xx response into [`ApiError::UnexpectedStatus`], keeping the body for diagnostics.
    pub(crate) async fn ensure_success(&self, response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::UnexpectedStatus { status, body })
        }
    }

    /// Decode a successful JSON response body.
    ///
    /// A response declaring any content type other than JSON is rejected before
    /// parsing; a JSON body that does not match `T` surfaces the decode error.
    pub(crate) async fn read_json<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ApiError> {
        let response = self.ensure_success(response).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("application/json") {
            return Err(ApiError::NotJson { content_type });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ApiError::Decode)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    struct Pong {}

    #[test]
    fn endpoint_formatting_tolerates_slashes() {
        assert_eq!(
            format_endpoint("http://localhost:8000/api/", "/tabs"),
            "http://localhost:8000/api/tabs"
        );
        assert_eq!(
            format_endpoint("http://localhost:8000/api", "tabs"),
            "http://localhost:8000/api/tabs"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = ApiClient::with_base_url("not a url").expect_err("invalid url");
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn non_json_response_is_a_backend_integration_error() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/ping");
                then.status(200)
                    .header("content-type", "text/plain")
                    .body("pong");
            })
            .await;

        let client = ApiClient::with_base_url(&server.base_url()).expect("client");
        let response = client
            .request(Method::GET, "ping")
            .send()
            .await
            .expect("response");
        let err = client.read_json::<Pong>(response).await.expect_err("not json");

        mock.assert();
        assert!(matches!(err, ApiError::NotJson { content_type } if content_type.starts_with("text/plain")));
    }

    #[tokio::test]
    async fn error_status_carries_body_for_diagnostics() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/ping");
                then.status(503)
                    .header("content-type", "application/json")
                    .body(r#"{"detail":"maintenance"}"#);
            })
            .await;

        let client = ApiClient::with_base_url(&server.base_url()).expect("client");
        let response = client
            .request(Method::GET, "ping")
            .send()
            .await
            .expect("response");
        let err = client.read_json::<Pong>(response).await.expect_err("status error");

        match err {
            ApiError::UnexpectedStatus { status, body } => {
                assert_eq!(status.as_u16(), 503);
                assert!(body.contains("maintenance"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
