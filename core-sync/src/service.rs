//! # Filter Sync Service
//!
//! Runs filter store operations and tags every outcome with the operation
//! that produced it.
//!
//! ## Lifecycle
//!
//! Each call goes through `Requested -> in flight -> Completed | Failed`:
//!
//! 1. A [`FilterEvent::Requested`] is published on the event bus.
//! 2. The repository call runs exactly once. Nothing is retried.
//! 3. The caller receives `Ok(Synced)` or `Err(SyncError)`, and the same
//!    outcome is published as [`FilterEvent::Completed`] or
//!    [`FilterEvent::Failed`].
//!
//! The returned value is authoritative; events are notifications for other
//! observers (pickers, galleries) that want to react to store changes.
//! Publishing with nobody subscribed is fine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::FilterSyncService;
//!
//! let service = FilterSyncService::new(repository, event_bus.clone());
//! let synced = service.fetch_all("user-1").await?;
//! assert_eq!(synced.operation, SyncOperation::FetchAll);
//! ```

use crate::error::{Result, SyncError};
use core_filters::{CameraFilter, FilterId, FilterRepository, StoreError, StoreResult};
use core_runtime::events::{CoreEvent, EventBus, FilterEvent, SyncOperation};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// A successful store result tagged with its operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Synced<T> {
    pub operation: SyncOperation,
    pub payload: T,
}

impl<T> Synced<T> {
    pub fn into_payload(self) -> T {
        self.payload
    }
}

/// Operation-tagged CRUD over a [`FilterRepository`]
#[derive(Clone)]
pub struct FilterSyncService {
    repository: Arc<dyn FilterRepository>,
    events: EventBus,
}

impl FilterSyncService {
    pub fn new(repository: Arc<dyn FilterRepository>, events: EventBus) -> Self {
        Self { repository, events }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// All filters owned by `owner`
    #[instrument(skip(self))]
    pub async fn fetch_all(&self, owner: &str) -> Result<Synced<Vec<CameraFilter>>> {
        self.run(
            SyncOperation::FetchAll,
            None,
            |filters: &Vec<CameraFilter>| filters.len(),
            self.repository.fetch_all(owner),
        )
        .await
    }

    #[instrument(skip(self), fields(filter_id = %id))]
    pub async fn fetch_one(&self, id: &FilterId) -> Result<Synced<CameraFilter>> {
        self.run(
            SyncOperation::FetchOne,
            Some(id.to_string()),
            |_| 1,
            self.repository.fetch_one(id),
        )
        .await
    }

    /// Store a new filter. The payload is the stored filter.
    #[instrument(skip(self, filter), fields(filter_id = %filter.id()))]
    pub async fn create(&self, owner: &str, filter: &CameraFilter) -> Result<Synced<CameraFilter>> {
        self.run(
            SyncOperation::Create,
            Some(filter.id().to_string()),
            |_| 1,
            async {
                self.repository.create(owner, filter).await?;
                Ok::<_, StoreError>(filter.clone())
            },
        )
        .await
    }

    #[instrument(skip(self, filter), fields(filter_id = %filter.id()))]
    pub async fn update(&self, owner: &str, filter: &CameraFilter) -> Result<Synced<CameraFilter>> {
        self.run(
            SyncOperation::Update,
            Some(filter.id().to_string()),
            |_| 1,
            async {
                self.repository.update(owner, filter).await?;
                Ok::<_, StoreError>(filter.clone())
            },
        )
        .await
    }

    /// Remove a filter. The payload is the removed id.
    #[instrument(skip(self), fields(filter_id = %id))]
    pub async fn delete(&self, id: &FilterId) -> Result<Synced<FilterId>> {
        self.run(
            SyncOperation::Delete,
            Some(id.to_string()),
            |_| 0,
            async {
                self.repository.delete(id).await?;
                Ok::<_, StoreError>(id.clone())
            },
        )
        .await
    }

    async fn run<T, F>(
        &self,
        operation: SyncOperation,
        filter_id: Option<String>,
        count: impl FnOnce(&T) -> usize,
        call: F,
    ) -> Result<Synced<T>>
    where
        F: Future<Output = StoreResult<T>>,
    {
        self.publish(FilterEvent::Requested {
            operation,
            filter_id: filter_id.clone(),
        });

        match call.await {
            Ok(payload) => {
                let count = count(&payload);
                debug!(%operation, count, "Filter operation completed");
                self.publish(FilterEvent::Completed {
                    operation,
                    filter_id,
                    count,
                });
                Ok(Synced { operation, payload })
            }
            Err(source) => {
                warn!(%operation, error = %source, "Filter operation failed");
                self.publish(FilterEvent::Failed {
                    operation,
                    filter_id,
                    message: source.message().to_string(),
                });
                Err(SyncError::new(operation, source))
            }
        }
    }

    fn publish(&self, event: FilterEvent) {
        let delivered = self.events.notify(CoreEvent::Filter(event));
        if delivered == 0 {
            debug!("No subscribers for filter event");
        }
    }
}
