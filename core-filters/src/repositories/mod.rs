//! # Filter Stores
//!
//! [`FilterRepository`] is the storage interface for filters. Two
//! implementations ship with the crate:
//!
//! - [`InMemoryFilterRepository`] - local store for offline use and tests
//! - [`RestFilterRepository`] - remote store backed by the REST document API
//!
//! Every call completes exactly once with either a value or a
//! [`StoreError`](crate::error::StoreError). Nothing is retried here.

pub mod memory;
pub mod remote;

pub use memory::InMemoryFilterRepository;
pub use remote::RestFilterRepository;

use crate::error::StoreResult;
use crate::models::{CameraFilter, FilterId};
use async_trait::async_trait;

/// Filter store interface
#[async_trait]
pub trait FilterRepository: Send + Sync {
    /// All filters owned by `owner`
    ///
    /// An owner without filters yields an empty list, not an error.
    async fn fetch_all(&self, owner: &str) -> StoreResult<Vec<CameraFilter>>;

    /// A single filter by id
    ///
    /// # Errors
    /// `CannotFetch` with "not found" when no filter has this id.
    async fn fetch_one(&self, id: &FilterId) -> StoreResult<CameraFilter>;

    /// Store a new filter under `owner`
    async fn create(&self, owner: &str, filter: &CameraFilter) -> StoreResult<()>;

    /// Replace a stored filter
    async fn update(&self, owner: &str, filter: &CameraFilter) -> StoreResult<()>;

    /// Remove a filter
    async fn delete(&self, id: &FilterId) -> StoreResult<()>;
}
