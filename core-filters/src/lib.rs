//! # Filter Management Module
//!
//! Owns the camera filter model and everything that creates, stores or
//! renders filters.
//!
//! ## Overview
//!
//! This module manages:
//! - The filter entity and its per-kind parameters
//! - A validating catalog that is the only way to build filters
//! - The wire codec for stored filter records
//! - Local and REST-backed filter stores
//! - Rendering filters onto still images and camera previews

pub mod apply;
pub mod catalog;
pub mod codec;
pub mod error;
pub mod models;
pub mod preview;
pub mod repositories;

pub use apply::{apply_filter, try_apply_filter};
pub use catalog::{FilterCatalog, KindSpec, ParameterSpec};
pub use error::{FilterError, RenderError, Result, StoreError, StoreResult};
pub use models::{
    CameraFilter, Color, FilterId, FilterKind, FilterSettings, ParameterKey, ParameterRange,
    ParameterValue, Parameters,
};
pub use preview::{PreviewFrame, PreviewRenderer};
pub use repositories::{FilterRepository, InMemoryFilterRepository, RestFilterRepository};
