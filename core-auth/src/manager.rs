//! # Account Manager
//!
//! Orchestrates the identity provider and the user record store.
//!
//! ## Overview
//!
//! The `AccountManager` owns the current session. Every operation talks to
//! the identity provider first and then brings the user record in line:
//!
//! - **Sign-up** registers the identity, stores the user record and opens
//!   a session.
//! - **Log-in** verifies credentials and opens a session. A missing user
//!   record is recreated.
//! - **Social log-in** exchanges a provider token. The first login for an
//!   identity creates its user record.
//! - **Log-out** ends the provider session and clears the current user.
//! - **Account deletion** removes the user record, then the identity.
//!
//! Each outcome is published on the event bus as an [`AuthEvent`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_auth::AccountManager;
//!
//! let manager = AccountManager::new(identity_provider, user_repository, event_bus);
//! let user = manager.log_in("ann@example.com", "secret").await?;
//! manager.log_out().await?;
//! ```

use crate::error::{AuthError, Result};
use crate::repository::UserRepository;
use crate::types::{LoginMethod, User};
use bridge_traits::error::BridgeError;
use bridge_traits::identity::{IdentityProvider, SocialProvider};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use core_runtime::logging::redact_if_sensitive;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

/// Account lifecycle orchestrator
pub struct AccountManager {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
    event_bus: EventBus,
    current_user: RwLock<Option<User>>,
}

impl AccountManager {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepository>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            identity,
            users,
            event_bus,
            current_user: RwLock::new(None),
        }
    }

    /// Register an email/password account and sign it in
    ///
    /// # Errors
    ///
    /// [`AuthError::CannotSignUp`] if the input is empty, the provider
    /// rejects the registration, or the user record cannot be stored.
    #[instrument(skip(self, email, password), fields(email = %redact_if_sensitive("email", email)))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        check_credentials(email, password).map_err(AuthError::CannotSignUp)?;

        let identity = self
            .identity
            .sign_up(email.trim(), password)
            .await
            .map_err(|e| self.fail(None, &e, AuthError::CannotSignUp))?;
        let user = User::from(identity);

        self.users
            .save(&user)
            .await
            .map_err(|e| self.fail(Some(&user.user_id), &e, AuthError::CannotSignUp))?;

        self.set_current(Some(user.clone())).await;
        self.publish(AuthEvent::SignedUp {
            user_id: user.user_id.clone(),
        });
        info!(user_id = %user.user_id, "Account created");
        Ok(user)
    }

    /// Sign in with email and password
    #[instrument(skip(self, email, password), fields(email = %redact_if_sensitive("email", email)))]
    pub async fn log_in(&self, email: &str, password: &str) -> Result<User> {
        check_credentials(email, password).map_err(AuthError::CannotLogIn)?;

        let identity = self
            .identity
            .sign_in(email.trim(), password)
            .await
            .map_err(|e| self.fail(None, &e, AuthError::CannotLogIn))?;

        self.open_session(User::from(identity), LoginMethod::Password)
            .await
    }

    /// Sign in with a social provider token
    ///
    /// The first login for an identity creates its user record and publishes
    /// `SignedUp` before `SignedIn`.
    #[instrument(skip(self, token), fields(provider = %provider))]
    pub async fn log_in_with_social(&self, provider: SocialProvider, token: &str) -> Result<User> {
        if token.trim().is_empty() {
            return Err(AuthError::CannotLogIn(format!(
                "missing {} token",
                provider
            )));
        }

        let identity = self
            .identity
            .sign_in_with(provider, token)
            .await
            .map_err(|e| self.fail(None, &e, AuthError::CannotLogIn))?;

        self.open_session(User::from(identity), LoginMethod::Social(provider))
            .await
    }

    /// End the current session
    #[instrument(skip(self))]
    pub async fn log_out(&self) -> Result<()> {
        let user = self.require_user().await?;

        self.identity
            .sign_out()
            .await
            .map_err(|e| self.fail(Some(&user.user_id), &e, AuthError::CannotLogOut))?;

        self.set_current(None).await;
        self.publish(AuthEvent::SignedOut {
            user_id: user.user_id.clone(),
        });
        info!(user_id = %user.user_id, "Signed out");
        Ok(())
    }

    /// Delete the current account: user record first, then the identity
    ///
    /// If the identity removal fails the user record is already gone; the
    /// next login recreates it.
    #[instrument(skip(self))]
    pub async fn delete_account(&self) -> Result<()> {
        let user = self.require_user().await?;

        self.users
            .delete(&user.user_id)
            .await
            .map_err(|e| self.fail(Some(&user.user_id), &e, AuthError::CannotDelete))?;

        self.identity
            .delete_identity(&user.user_id)
            .await
            .map_err(|e| self.fail(Some(&user.user_id), &e, AuthError::CannotDelete))?;

        self.set_current(None).await;
        self.publish(AuthEvent::AccountDeleted {
            user_id: user.user_id.clone(),
        });
        info!(user_id = %user.user_id, "Account deleted");
        Ok(())
    }

    /// The signed-in user, if any
    pub async fn current_user(&self) -> Option<User> {
        self.current_user.read().await.clone()
    }

    /// The signed-in user
    ///
    /// # Errors
    ///
    /// [`AuthError::NotAuthenticated`] when nobody is signed in.
    pub async fn require_user(&self) -> Result<User> {
        self.current_user()
            .await
            .ok_or(AuthError::NotAuthenticated)
    }

    async fn open_session(&self, user: User, method: LoginMethod) -> Result<User> {
        let stored = self
            .users
            .fetch(&user.user_id)
            .await
            .map_err(|e| self.fail(Some(&user.user_id), &e, AuthError::CannotLogIn))?;

        if stored.is_none() {
            self.users
                .save(&user)
                .await
                .map_err(|e| self.fail(Some(&user.user_id), &e, AuthError::CannotLogIn))?;
            if let LoginMethod::Social(_) = method {
                self.publish(AuthEvent::SignedUp {
                    user_id: user.user_id.clone(),
                });
            } else {
                warn!(user_id = %user.user_id, "User record was missing and has been recreated");
            }
        }

        self.set_current(Some(user.clone())).await;
        self.publish(AuthEvent::SignedIn {
            user_id: user.user_id.clone(),
            method: method.to_string(),
        });
        info!(user_id = %user.user_id, %method, "Signed in");
        Ok(user)
    }

    async fn set_current(&self, user: Option<User>) {
        *self.current_user.write().await = user;
    }

    /// Log, publish and convert a bridge failure
    fn fail(
        &self,
        user_id: Option<&str>,
        err: &BridgeError,
        wrap: fn(String) -> AuthError,
    ) -> AuthError {
        let recoverable = matches!(err, BridgeError::Rejected(_) | BridgeError::HttpStatus { .. });
        error!(user_id = ?user_id, error = %err, "Account operation failed");
        self.publish(AuthEvent::AuthError {
            user_id: user_id.map(str::to_string),
            message: err.to_string(),
            recoverable,
        });
        wrap(err.to_string())
    }

    fn publish(&self, event: AuthEvent) {
        self.event_bus.notify(CoreEvent::Auth(event));
    }
}

fn check_credentials(email: &str, password: &str) -> std::result::Result<(), String> {
    if email.trim().is_empty() {
        return Err("email is required".to_string());
    }
    if password.is_empty() {
        return Err("password is required".to_string());
    }
    Ok(())
}
