//! User record stores
//!
//! The identity provider owns credentials; these stores only keep the
//! `{userId, email}` record the rest of the app reads.

use crate::types::User;
use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use core_runtime::document::{DocumentClient, Documents};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// User record store interface
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// The record for `user_id`, if one exists
    async fn fetch(&self, user_id: &str) -> Result<Option<User>>;

    /// Insert or replace a record
    async fn save(&self, user: &User) -> Result<()>;

    /// Remove a record. Removing an absent record succeeds.
    async fn delete(&self, user_id: &str) -> Result<()>;
}

/// Local user store
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(
                users
                    .into_iter()
                    .map(|u| (u.user_id.clone(), u))
                    .collect(),
            ),
        }
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn fetch(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn save(&self, user: &User) -> Result<()> {
        self.users
            .write()
            .await
            .insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<()> {
        self.users.write().await.remove(user_id);
        Ok(())
    }
}

/// Stored form of a user, keyed by user id
#[derive(Debug, Serialize, Deserialize)]
struct UserRecord {
    email: String,
}

/// User store backed by the REST document API
#[derive(Debug, Clone)]
pub struct RestUserRepository {
    documents: DocumentClient,
}

impl RestUserRepository {
    pub fn new(documents: DocumentClient) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl UserRepository for RestUserRepository {
    #[instrument(skip(self))]
    async fn fetch(&self, user_id: &str) -> Result<Option<User>> {
        let Some(value) = self.documents.query_key(user_id).await? else {
            debug!("No user record");
            return Ok(None);
        };
        let record: UserRecord = serde_json::from_value(value).map_err(|e| {
            BridgeError::OperationFailed(format!("Invalid user record '{}': {}", user_id, e))
        })?;
        Ok(Some(User::new(user_id, record.email)))
    }

    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    async fn save(&self, user: &User) -> Result<()> {
        let record = serde_json::to_value(UserRecord {
            email: user.email.clone(),
        })
        .map_err(|e| BridgeError::OperationFailed(e.to_string()))?;

        let mut documents = Documents::new();
        documents.insert(user.user_id.clone(), record);
        self.documents.patch(documents).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: &str) -> Result<()> {
        self.documents.delete(user_id).await
    }
}
