use core_filters::StoreError;
use core_runtime::events::SyncOperation;
use thiserror::Error;

/// A store failure tagged with the operation that produced it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {source}")]
pub struct SyncError {
    pub operation: SyncOperation,
    pub source: StoreError,
}

impl SyncError {
    pub fn new(operation: SyncOperation, source: StoreError) -> Self {
        Self { operation, source }
    }

    pub fn message(&self) -> &str {
        self.source.message()
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
