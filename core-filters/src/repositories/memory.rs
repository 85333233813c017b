//! In-memory filter store

use super::FilterRepository;
use crate::error::{StoreError, StoreResult};
use crate::models::{CameraFilter, FilterId};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

const NOT_FOUND: &str = "not found";

/// Local filter store
///
/// Entries keep insertion order. Lookups are linear scans, which is fine for
/// the handful of filters a user keeps.
#[derive(Debug, Default)]
pub struct InMemoryFilterRepository {
    entries: RwLock<Vec<Entry>>,
}

#[derive(Debug, Clone)]
struct Entry {
    owner: String,
    filter: CameraFilter,
}

impl InMemoryFilterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `filters`, given as `(owner, filter)` pairs.
    pub fn with_filters<I, S>(filters: I) -> Self
    where
        I: IntoIterator<Item = (S, CameraFilter)>,
        S: Into<String>,
    {
        let entries = filters
            .into_iter()
            .map(|(owner, filter)| Entry {
                owner: owner.into(),
                filter,
            })
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl FilterRepository for InMemoryFilterRepository {
    async fn fetch_all(&self, owner: &str) -> StoreResult<Vec<CameraFilter>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.owner == owner)
            .map(|e| e.filter.clone())
            .collect())
    }

    async fn fetch_one(&self, id: &FilterId) -> StoreResult<CameraFilter> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .find(|e| e.filter.id() == id)
            .map(|e| e.filter.clone())
            .ok_or_else(|| StoreError::fetch(NOT_FOUND))
    }

    async fn create(&self, owner: &str, filter: &CameraFilter) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.filter.id() == filter.id()) {
            return Err(StoreError::create(format!(
                "filter {} already exists",
                filter.id()
            )));
        }
        entries.push(Entry {
            owner: owner.to_string(),
            filter: filter.clone(),
        });
        debug!(filter_id = %filter.id(), count = entries.len(), "Stored filter");
        Ok(())
    }

    async fn update(&self, owner: &str, filter: &CameraFilter) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .iter_mut()
            .find(|e| e.filter.id() == filter.id())
            .ok_or_else(|| StoreError::update(NOT_FOUND))?;
        entry.owner = owner.to_string();
        entry.filter = filter.clone();
        Ok(())
    }

    async fn delete(&self, id: &FilterId) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        let index = entries
            .iter()
            .position(|e| e.filter.id() == id)
            .ok_or_else(|| StoreError::delete(NOT_FOUND))?;
        entries.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FilterCatalog;
    use crate::models::Color;
    use bridge_desktop::CpuFilterBackend;
    use std::sync::Arc;

    fn catalog() -> FilterCatalog {
        FilterCatalog::new(Arc::new(CpuFilterBackend::new()))
    }

    #[tokio::test]
    async fn test_fetch_all_scopes_by_owner() {
        let catalog = catalog();
        let mine = catalog.sepia("warm", 0.8).unwrap();
        let theirs = catalog.blur("soft", 3.0).unwrap();
        let repo = InMemoryFilterRepository::with_filters(vec![
            ("alice", mine.clone()),
            ("bob", theirs),
        ]);

        assert_eq!(repo.fetch_all("alice").await.unwrap(), vec![mine]);
        assert!(repo.fetch_all("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_then_fetch_one() {
        let repo = InMemoryFilterRepository::new();
        let filter = catalog()
            .monochrome("cyan", Color::CYAN, 1.0)
            .unwrap();

        repo.create("alice", &filter).await.unwrap();
        assert_eq!(repo.fetch_one(filter.id()).await.unwrap(), filter);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_create_fails() {
        let filter = catalog().vintage("film").unwrap();
        let repo = InMemoryFilterRepository::with_filters(vec![("alice", filter.clone())]);

        let err = repo.create("alice", &filter).await.unwrap_err();
        assert!(matches!(err, StoreError::CannotCreate(ref m) if m.contains("already exists")));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let catalog = catalog();
        let first = catalog.vintage("film").unwrap();
        let mut second = catalog.posterize("poster", 6.0).unwrap();
        let repo = InMemoryFilterRepository::with_filters(vec![
            ("alice", first.clone()),
            ("alice", second.clone()),
        ]);

        second.set_levels(4.0).unwrap();
        second.set_display_name("poster 4");
        repo.update("alice", &second).await.unwrap();

        let all = repo.fetch_all("alice").await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test]
    async fn test_absent_ids_are_not_found() {
        let repo = InMemoryFilterRepository::new();
        let ghost = catalog().black_white("noir").unwrap();

        assert_eq!(
            repo.fetch_one(ghost.id()).await.unwrap_err(),
            StoreError::CannotFetch("not found".to_string())
        );
        assert_eq!(
            repo.update("alice", &ghost).await.unwrap_err(),
            StoreError::CannotUpdate("not found".to_string())
        );
        assert_eq!(
            repo.delete(ghost.id()).await.unwrap_err(),
            StoreError::CannotDelete("not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let filter = catalog().blur("soft", 2.0).unwrap();
        let repo = InMemoryFilterRepository::with_filters(vec![("alice", filter.clone())]);

        repo.delete(filter.id()).await.unwrap();
        assert!(repo.is_empty().await);
    }
}
