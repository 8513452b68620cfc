use serde::{Deserialize, Serialize};

/// Repository as the backend serializes it.
///
/// Text fields are optional because the backend may send explicit `null`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRepository {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    #[serde(default)]
    pub watchers_count: u32,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub relevance_score: f64,
}

/// One page of search results plus the total number of matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<ApiRepository>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteRequest {
    pub repository_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_decodes_camel_case() {
        let json = r#"{
            "totalCount": 25,
            "items": [{
                "id": 7,
                "name": "tokio",
                "fullName": "tokio-rs/tokio",
                "description": "A runtime for writing reliable asynchronous applications",
                "htmlUrl": "https://github.com/tokio-rs/tokio",
                "language": "Rust",
                "stargazersCount": 25000,
                "forksCount": 2300,
                "watchersCount": 25000,
                "updatedAt": "2024-05-01T12:00:00Z",
                "isFavorite": true,
                "relevanceScore": 87.5
            }]
        }"#;

        let result: SearchResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.total_count, 25);
        let repo = &result.items[0];
        assert_eq!(repo.full_name.as_deref(), Some("tokio-rs/tokio"));
        assert_eq!(repo.stargazers_count, 25000);
        assert!(repo.is_favorite);
        assert_eq!(repo.relevance_score, 87.5);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"id": 1, "name": "bare", "description": null}"#;
        let repo: ApiRepository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.description, None);
        assert_eq!(repo.language, None);
        assert_eq!(repo.forks_count, 0);
        assert!(!repo.is_favorite);
    }

    #[test]
    fn test_null_text_fields_do_not_fail_the_page() {
        let json = r#"{
            "totalCount": 1,
            "items": [{
                "id": 9,
                "name": null,
                "fullName": null,
                "htmlUrl": null,
                "updatedAt": null,
                "language": null
            }]
        }"#;

        let result: SearchResult = serde_json::from_str(json).unwrap();
        let repo = &result.items[0];
        assert_eq!(repo.id, 9);
        assert!(repo.full_name.is_none());
        assert!(repo.html_url.is_none());
        assert!(repo.updated_at.is_none());
    }

    #[test]
    fn test_toggle_request_body() {
        let body = serde_json::to_string(&ToggleFavoriteRequest { repository_id: 7 }).unwrap();
        assert_eq!(body, r#"{"repositoryId":7}"#);
    }
}
