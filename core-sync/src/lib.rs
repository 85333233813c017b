//! # Filter Synchronization Module
//!
//! Wraps a filter store so that every result carries the operation that
//! produced it.
//!
//! ## Components
//!
//! - **Sync Service** (`service`): operation-tagged CRUD with event publishing
//! - **Errors** (`error`): [`SyncError`], a store failure plus its operation

pub mod error;
pub mod service;

pub use core_runtime::events::SyncOperation;
pub use error::{Result, SyncError};
pub use service::{FilterSyncService, Synced};
