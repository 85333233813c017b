//! Identity Provider Abstraction
//!
//! Wraps the third-party authentication SDK. The core never sees passwords
//! after handing them over and never stores provider tokens.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Social sign-in providers the host can broker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialProvider {
    Apple,
    Google,
    Kakao,
}

impl SocialProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialProvider::Apple => "apple",
            SocialProvider::Google => "google",
            SocialProvider::Kakao => "kakao",
        }
    }
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the SDK reports back after a successful sign-up or sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderIdentity {
    pub user_id: String,
    pub email: String,
}

/// Authentication SDK bridge
///
/// Rejections by the provider (wrong password, email taken, revoked social
/// token) are reported as [`BridgeError::Rejected`](crate::BridgeError::Rejected);
/// transport problems as `OperationFailed`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new email/password account
    async fn sign_up(&self, email: &str, password: &str) -> Result<ProviderIdentity>;

    /// Sign in with email/password
    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderIdentity>;

    /// Exchange a social provider token for an identity
    async fn sign_in_with(
        &self,
        provider: SocialProvider,
        token: &str,
    ) -> Result<ProviderIdentity>;

    /// End the SDK session
    async fn sign_out(&self) -> Result<()>;

    /// Remove the identity from the provider
    async fn delete_identity(&self, user_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_identity_wire_names() {
        let identity: ProviderIdentity =
            serde_json::from_str(r#"{"userId":"u-1","email":"a@b.c"}"#).unwrap();
        assert_eq!(identity.user_id, "u-1");
        assert_eq!(identity.email, "a@b.c");
    }

    #[test]
    fn test_social_provider_display() {
        assert_eq!(SocialProvider::Kakao.to_string(), "kakao");
        assert_eq!(
            serde_json::to_string(&SocialProvider::Apple).unwrap(),
            "\"apple\""
        );
    }
}
