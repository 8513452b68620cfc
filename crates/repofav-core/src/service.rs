// Bridges the HTTP client with the controller's view of the backend
use async_trait::async_trait;
use repofav_api::{ApiRepository, RepositoryClient};

use crate::{
    config::ApiConfig,
    models::{Repository, SearchPage},
    Result,
};

/// The three things the backend can do for us.
///
/// The controller only talks to this trait, so tests can swap in a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryService: Send + Sync {
    async fn search(&self, query: &str, page: u32, per_page: u32) -> Result<SearchPage>;
    async fn relevant(&self) -> Result<Vec<Repository>>;
    async fn toggle_favorite(&self, id: u64) -> Result<Repository>;
}

/// `RepositoryService` backed by the real API
pub struct HttpRepositoryService {
    client: RepositoryClient,
}

impl HttpRepositoryService {
    pub fn new(client: RepositoryClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let client = RepositoryClient::new(config.base_url.clone(), config.timeout())?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl RepositoryService for HttpRepositoryService {
    async fn search(&self, query: &str, page: u32, per_page: u32) -> Result<SearchPage> {
        let result = self.client.search(query, page, per_page).await?;

        Ok(SearchPage {
            total_count: result.total_count,
            items: result.items.into_iter().map(api_to_repo).collect(),
        })
    }

    async fn relevant(&self) -> Result<Vec<Repository>> {
        let repos = self.client.relevant().await?;
        Ok(repos.into_iter().map(api_to_repo).collect())
    }

    async fn toggle_favorite(&self, id: u64) -> Result<Repository> {
        let repo = self.client.toggle_favorite(id).await?;
        Ok(api_to_repo(repo))
    }
}

/// Convert the wire record to our internal Repository model
fn api_to_repo(api: ApiRepository) -> Repository {
    let name = api.name.unwrap_or_default();
    Repository {
        id: api.id,
        // Bare name beats an empty title in the list
        full_name: api.full_name.unwrap_or_else(|| name.clone()),
        name,
        description: api.description,
        url: api.html_url.unwrap_or_default(),
        language: api.language,
        stars: api.stargazers_count,
        forks: api.forks_count,
        watchers: api.watchers_count,
        updated_at: api.updated_at.unwrap_or_default(),
        is_favorite: api.is_favorite,
        relevance_score: api.relevance_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_to_repo_maps_every_field() {
        let api = ApiRepository {
            id: 3,
            name: Some("axum".into()),
            full_name: Some("tokio-rs/axum".into()),
            description: Some("web framework".into()),
            html_url: Some("https://github.com/tokio-rs/axum".into()),
            language: Some("Rust".into()),
            stargazers_count: 20000,
            forks_count: 1000,
            watchers_count: 19000,
            updated_at: Some("2024-06-01T00:00:00Z".into()),
            is_favorite: true,
            relevance_score: 42.0,
        };

        let repo = api_to_repo(api);
        assert_eq!(repo.id, 3);
        assert_eq!(repo.full_name, "tokio-rs/axum");
        assert_eq!(repo.url, "https://github.com/tokio-rs/axum");
        assert_eq!(repo.stars, 20000);
        assert_eq!(repo.forks, 1000);
        assert_eq!(repo.watchers, 19000);
        assert!(repo.is_favorite);
        assert_eq!(repo.relevance_score, 42.0);
    }

    #[test]
    fn test_api_to_repo_fills_in_null_text() {
        let api: ApiRepository = serde_json::from_str(
            r#"{"id": 4, "name": "serde", "fullName": null, "htmlUrl": null, "updatedAt": null}"#,
        )
        .unwrap();

        let repo = api_to_repo(api);
        assert_eq!(repo.name, "serde");
        assert_eq!(repo.full_name, "serde");
        assert_eq!(repo.url, "");
        assert_eq!(repo.updated_at, "");
        assert!(repo.updated_at_utc().is_none());
    }
}
