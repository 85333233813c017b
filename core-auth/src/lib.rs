//! # Authentication Module
//!
//! Account lifecycle on top of a host identity provider.
//!
//! ## Overview
//!
//! This module handles:
//! - Email/password sign-up and log-in
//! - Social log-in (Apple, Google, Kakao) with user record creation on first use
//! - Log-out and account deletion
//! - User record storage, local or through the REST document API
//! - Auth event emission

pub mod error;
pub mod manager;
pub mod repository;
pub mod types;

pub use error::{AuthError, Result};
pub use manager::AccountManager;
pub use repository::{InMemoryUserRepository, RestUserRepository, UserRepository};
pub use types::{LoginMethod, User};
