use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository record. `id` is the only identity that matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub language: Option<String>,
    pub stars: u32,
    pub forks: u32,
    pub watchers: u32,
    /// Last update as the server reported it
    pub updated_at: String,
    pub is_favorite: bool,
    /// Higher is more relevant. Sole sort key for consolidated views.
    pub relevance_score: f64,
}

impl Repository {
    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.updated_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// One server-side page of search results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchPage {
    pub items: Vec<Repository>,
    pub total_count: u64,
}

/// Which list is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Search,
    Favorites,
    Relevant,
}

impl ViewMode {
    pub fn all() -> [ViewMode; 3] {
        [ViewMode::Search, ViewMode::Favorites, ViewMode::Relevant]
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::Search => write!(f, "Search"),
            ViewMode::Favorites => write!(f, "Favorites"),
            ViewMode::Relevant => write!(f, "Relevant"),
        }
    }
}

#[cfg(test)]
pub(crate) fn repo(id: u64, score: f64, favorite: bool) -> Repository {
    Repository {
        id,
        name: format!("repo-{}", id),
        full_name: format!("owner/repo-{}", id),
        description: None,
        url: format!("https://github.com/owner/repo-{}", id),
        language: Some("Rust".to_string()),
        stars: 10,
        forks: 1,
        watchers: 10,
        updated_at: "2024-03-01T10:00:00Z".to_string(),
        is_favorite: favorite,
        relevance_score: score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updated_at_parses_rfc3339() {
        let r = repo(1, 1.0, false);
        let parsed = r.updated_at_utc().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_updated_at_garbage_is_none() {
        let mut r = repo(1, 1.0, false);
        r.updated_at = "yesterday".into();
        assert!(r.updated_at_utc().is_none());
    }
}
