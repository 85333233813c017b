use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Filter construction and decoding failures
///
/// All of these are recoverable: the caller may retry with corrected input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Unsupported filter kind: {0}")]
    UnsupportedKind(String),

    #[error("Missing parameter '{parameter}' for {kind}")]
    MissingParameter { kind: String, parameter: String },

    #[error("Unexpected parameter '{parameter}' for {kind}")]
    UnexpectedParameter { kind: String, parameter: String },

    #[error("Parameter '{parameter}' expects a {expected}")]
    WrongParameterType { parameter: String, expected: String },

    #[error("Parameter '{parameter}' = {value} is outside [{min}, {max}]")]
    OutOfRange {
        parameter: String,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("Invalid filter record '{id}': {message}")]
    InvalidRecord { id: String, message: String },
}

/// Store failures, one variant per operation kind
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Cannot fetch: {0}")]
    CannotFetch(String),

    #[error("Cannot create: {0}")]
    CannotCreate(String),

    #[error("Cannot update: {0}")]
    CannotUpdate(String),

    #[error("Cannot delete: {0}")]
    CannotDelete(String),
}

impl StoreError {
    pub fn message(&self) -> &str {
        match self {
            StoreError::CannotFetch(m)
            | StoreError::CannotCreate(m)
            | StoreError::CannotUpdate(m)
            | StoreError::CannotDelete(m) => m,
        }
    }

    pub(crate) fn fetch(err: impl ToString) -> Self {
        StoreError::CannotFetch(err.to_string())
    }

    pub(crate) fn create(err: impl ToString) -> Self {
        StoreError::CannotCreate(err.to_string())
    }

    pub(crate) fn update(err: impl ToString) -> Self {
        StoreError::CannotUpdate(err.to_string())
    }

    pub(crate) fn delete(err: impl ToString) -> Self {
        StoreError::CannotDelete(err.to_string())
    }
}

impl From<FilterError> for StoreError {
    /// A record that does not decode aborts the fetch it came from.
    fn from(err: FilterError) -> Self {
        StoreError::CannotFetch(err.to_string())
    }
}

/// Errors from rendering a filter onto an image
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Filter backend error: {0}")]
    Backend(#[from] BridgeError),

    #[error("Frame source error: {0}")]
    FrameSource(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
