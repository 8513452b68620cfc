//! Merge rules for the consolidated repository list.
//!
//! The consolidated list holds every repository seen by any fetch, one entry
//! per id, ordered by descending relevance. Favorite flags already in the
//! list outlive fresh page fetches; only a toggle response may change them.

use std::collections::HashMap;

use crate::models::Repository;

/// Stable sort, most relevant first
pub fn sort_by_relevance(items: &mut [Repository]) {
    items.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
}

/// Fold `incoming` into `existing`.
///
/// Unknown ids are appended. Known ids take every field from the incoming
/// record except `is_favorite`, which keeps the stored value.
pub fn merge(existing: &mut Vec<Repository>, incoming: &[Repository]) {
    let mut positions: HashMap<u64, usize> = existing
        .iter()
        .enumerate()
        .map(|(pos, repo)| (repo.id, pos))
        .collect();

    for repo in incoming {
        match positions.get(&repo.id) {
            Some(&pos) => {
                let is_favorite = existing[pos].is_favorite;
                existing[pos] = Repository {
                    is_favorite,
                    ..repo.clone()
                };
            }
            None => {
                positions.insert(repo.id, existing.len());
                existing.push(repo.clone());
            }
        }
    }

    sort_by_relevance(existing);
}

/// Build a fresh consolidated list from a full listing
pub fn from_listing(items: &[Repository]) -> Vec<Repository> {
    let mut consolidated = Vec::with_capacity(items.len());
    merge(&mut consolidated, items);
    consolidated
}

/// Apply a record the server just returned for a toggle.
///
/// Unlike [`merge`], the favorite flag comes from `updated`: the toggle
/// response is the newest word on it. Returns `true` if the id was new.
pub fn upsert(collection: &mut Vec<Repository>, updated: &Repository) -> bool {
    let inserted = match collection.iter_mut().find(|r| r.id == updated.id) {
        Some(slot) => {
            *slot = updated.clone();
            false
        }
        None => {
            collection.push(updated.clone());
            true
        }
    };
    sort_by_relevance(collection);
    inserted
}

/// Favorite-flagged subset, most relevant first
pub fn favorites_of(items: &[Repository]) -> Vec<Repository> {
    let mut favorites: Vec<Repository> = items.iter().filter(|r| r.is_favorite).cloned().collect();
    sort_by_relevance(&mut favorites);
    favorites
}

/// Keep the favorites list in step with one toggled record
pub fn sync_favorite(favorites: &mut Vec<Repository>, updated: &Repository) {
    if updated.is_favorite {
        upsert(favorites, updated);
    } else {
        favorites.retain(|r| r.id != updated.id);
    }
}
