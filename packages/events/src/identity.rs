//! Bearer token verification.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::EventError;

const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id.
    pub id: String,
    /// Email address, if the auth backend exposes one.
    #[serde(default)]
    pub email: Option<String>,
}

/// Resolves bearer tokens to identities.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// The identity behind `token`, or `None` if it cannot be verified.
    async fn verify(&self, token: &str) -> Option<Identity>;
}

/// Verifies tokens against `GET {auth_url}/user`.
#[derive(Debug, Clone)]
pub struct RestIdentityVerifier {
    client: reqwest::Client,
    user_url: String,
    api_key: String,
}

impl RestIdentityVerifier {
    /// Creates a verifier for the auth service at `auth_url`.
    #[must_use]
    pub fn new(client: reqwest::Client, auth_url: &str, api_key: String) -> Self {
        Self {
            client,
            user_url: format!("{}/user", auth_url.trim_end_matches('/')),
            api_key,
        }
    }

    /// Reads `SITELINE_AUTH_URL` and `SITELINE_AUTH_KEY`.
    #[must_use]
    pub fn from_env(client: reqwest::Client) -> Option<Self> {
        let url = std::env::var("SITELINE_AUTH_URL").ok()?;
        let key = std::env::var("SITELINE_AUTH_KEY").ok()?;
        Some(Self::new(client, &url, key))
    }

    async fn fetch_user(&self, token: &str) -> Result<Identity, EventError> {
        let resp = self
            .client
            .get(&self.user_url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {token}"))
            .timeout(VERIFY_TIMEOUT)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EventError::Status {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(resp.json::<Identity>().await?)
    }
}

#[async_trait]
impl IdentityVerifier for RestIdentityVerifier {
    async fn verify(&self, token: &str) -> Option<Identity> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        match self.fetch_user(token).await {
            Ok(identity) => Some(identity),
            Err(e) => {
                log::debug!("Token verification failed: {e}");
                None
            }
        }
    }
}

/// Treats every caller as anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousVerifier;

#[async_trait]
impl IdentityVerifier for AnonymousVerifier {
    async fn verify(&self, _token: &str) -> Option<Identity> {
        None
    }
}

/// The REST verifier if configured, otherwise the anonymous one.
#[must_use]
pub fn verifier_from_env(client: reqwest::Client) -> Arc<dyn IdentityVerifier> {
    RestIdentityVerifier::from_env(client).map_or_else(
        || {
            log::info!("SITELINE_AUTH_URL/SITELINE_AUTH_KEY not set, all callers are anonymous");
            Arc::new(AnonymousVerifier) as Arc<dyn IdentityVerifier>
        },
        |verifier| Arc::new(verifier) as Arc<dyn IdentityVerifier>,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn anonymous_never_verifies() {
        assert!(AnonymousVerifier.verify("any-token").await.is_none());
    }

    #[tokio::test]
    async fn unreachable_auth_service_is_none() {
        let verifier =
            RestIdentityVerifier::new(reqwest::Client::new(), "http://127.0.0.1:9/", "k".into());
        assert_eq!(verifier.user_url, "http://127.0.0.1:9/user");
        assert!(verifier.verify("token").await.is_none());
        assert!(verifier.verify("   ").await.is_none());
    }

    #[test]
    fn identity_email_is_optional() {
        let identity: Identity = serde_json::from_str(r#"{"id":"abc","aud":"x"}"#).unwrap();
        assert_eq!(identity.id, "abc");
        assert!(identity.email.is_none());
    }
}
