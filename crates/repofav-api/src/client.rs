use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::types::{ApiRepository, SearchResult, ToggleFavoriteRequest};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/Repositories";

/// Client for the `/api/Repositories` backend.
///
/// Every call is a single attempt: failures are handed straight back to the
/// caller, which decides what to show.
pub struct RepositoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl RepositoryClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("RepoFav/0.1.0"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Search repositories, one server-side page at a time
    pub async fn search(&self, query: &str, page: u32, per_page: u32) -> Result<SearchResult> {
        if query.trim().is_empty() {
            return Err(ApiError::InvalidArgument("search query is empty".into()));
        }
        if page == 0 || per_page == 0 {
            return Err(ApiError::InvalidArgument(format!(
                "page and perPage must be positive (got page={}, perPage={})",
                page, per_page
            )));
        }

        let url = format!("{}/Search", self.base_url);
        debug!("GET {} query={:?} page={} perPage={}", url, query, page, per_page);

        let request = self.client.get(&url).query(&[
            ("query", query.to_string()),
            ("page", page.to_string()),
            ("perPage", per_page.to_string()),
        ]);

        self.send_json(request).await
    }

    /// Every scored repository the backend knows about
    pub async fn relevant(&self) -> Result<Vec<ApiRepository>> {
        let url = format!("{}/Relevant", self.base_url);
        debug!("GET {}", url);
        self.send_json(self.client.get(&url)).await
    }

    /// Flip the favorite flag of a repository and return the updated record
    pub async fn toggle_favorite(&self, repository_id: u64) -> Result<ApiRepository> {
        let url = format!("{}/ToggleFavorite", self.base_url);
        debug!("POST {} repositoryId={}", url, repository_id);

        let request = self
            .client
            .post(&url)
            .json(&ToggleFavoriteRequest { repository_id });

        self.send_json(request).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_response(status, &body);
            warn!("Request failed: {}", err);
            return Err(err);
        }

        debug!("Response {} ({} bytes)", status, body.len());
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one canned response and hand back the raw request text
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];

            // Read headers, then whatever body Content-Length announces
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).to_string()
        });

        (format!("http://{}/api/Repositories", addr), handle)
    }

    #[tokio::test]
    async fn test_search_sends_encoded_query_and_decodes_page() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"totalCount":25,"items":[{"id":1,"name":"ripgrep","relevanceScore":9.5}]}"#,
        )
        .await;

        let client = RepositoryClient::new(base, Some(Duration::from_secs(5))).unwrap();
        let result = client.search("rust cli", 2, 10).await.unwrap();

        assert_eq!(result.total_count, 25);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].name.as_deref(), Some("ripgrep"));

        let request = server.await.unwrap();
        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("GET /api/Repositories/Search?"));
        assert!(request_line.contains("query=rust+cli") || request_line.contains("query=rust%20cli"));
        assert!(request_line.contains("page=2"));
        assert!(request_line.contains("perPage=10"));
    }

    #[tokio::test]
    async fn test_toggle_favorite_posts_repository_id() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"id":7,"name":"serde","isFavorite":true,"relevanceScore":3.0}"#,
        )
        .await;

        let client = RepositoryClient::new(base, None).unwrap();
        let repo = client.toggle_favorite(7).await.unwrap();
        assert!(repo.is_favorite);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/Repositories/ToggleFavorite"));
        assert!(request.ends_with(r#"{"repositoryId":7}"#));
    }

    #[tokio::test]
    async fn test_server_error_carries_payload_message() {
        let (base, _server) =
            serve_once("500 Internal Server Error", r#"{"message":"GitHub quota exhausted"}"#).await;

        let client = RepositoryClient::new(base, None).unwrap();
        let err = client.relevant().await.unwrap_err();

        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "GitHub quota exhausted");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_garbage_body_is_a_parse_error() {
        let (base, _server) = serve_once("200 OK", "not json").await;

        let client = RepositoryClient::new(base, None).unwrap();
        let err = client.relevant().await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_hit_the_network() {
        let client = RepositoryClient::new("http://127.0.0.1:9", None).unwrap();

        assert!(matches!(
            client.search("   ", 1, 10).await,
            Err(ApiError::InvalidArgument(_))
        ));
        assert!(matches!(
            client.search("rust", 0, 10).await,
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = RepositoryClient::new("http://example.test/api/Repositories/", None).unwrap();
        assert_eq!(client.base_url, "http://example.test/api/Repositories");
    }
}
