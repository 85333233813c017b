//! # Core Runtime Module
//!
//! Foundational infrastructure shared by the filter core crates:
//! - Logging and tracing setup
//! - Configuration builder
//! - Event bus
//! - REST document store client
//!
//! ## Overview
//!
//! Nothing in here knows about filters or users. The domain crates build on
//! these pieces and map the errors into their own taxonomies.

pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
