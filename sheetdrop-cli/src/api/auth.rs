//! Token acquisition via the OAuth client-credentials grant.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;

use super::constants::{DEFAULT_TIMEOUT, GRAPH_DEFAULT_SCOPE, LOGIN_BASE_URL, TOKEN_LIFETIME_MINUTES};
use super::error::ApiError;
use super::models::{CredentialSet, TokenInfo};

/// Exchanges application credentials for a bearer token.
///
/// Behind a trait so tests can count how often the identity provider is
/// actually hit.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self, credentials: &CredentialSet) -> Result<TokenInfo, ApiError>;
}

/// Live token source against the Microsoft identity endpoint.
pub struct ClientCredentialsSource {
    http: reqwest::Client,
}

impl ClientCredentialsSource {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[async_trait]
impl TokenSource for ClientCredentialsSource {
    async fn fetch_token(&self, credentials: &CredentialSet) -> Result<TokenInfo, ApiError> {
        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            LOGIN_BASE_URL, credentials.tenant_id
        );

        let response = self
            .http
            .post(&url)
            .timeout(DEFAULT_TIMEOUT)
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("grant_type", "client_credentials"),
                ("scope", GRAPH_DEFAULT_SCOPE),
            ])
            .send()
            .await
            .map_err(|e| ApiError::AuthFailure(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::AuthFailure(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::AuthFailure(format!("malformed token response: {}", e)))?;

        match body.access_token {
            Some(access_token) => Ok(TokenInfo {
                access_token,
                expires_at: Utc::now() + Duration::minutes(TOKEN_LIFETIME_MINUTES),
            }),
            None => Err(ApiError::AuthFailure(
                "token response carried no access_token".to_string(),
            )),
        }
    }
}

/// Session-scoped token cache around a [`TokenSource`].
///
/// Holds at most one token and refreshes it only once it goes stale, so
/// repeated actions within a session reuse the same grant.
pub struct AuthManager {
    credentials: CredentialSet,
    source: Box<dyn TokenSource>,
    cached: Option<TokenInfo>,
}

impl AuthManager {
    pub fn new(credentials: CredentialSet) -> Self {
        Self::with_source(credentials, Box::new(ClientCredentialsSource::new()))
    }

    pub fn with_source(credentials: CredentialSet, source: Box<dyn TokenSource>) -> Self {
        Self {
            credentials,
            source,
            cached: None,
        }
    }

    /// Return a valid bearer token, hitting the identity provider only
    /// when the cache is empty or past its expiry. No retry: the caller
    /// decides whether to run the whole action again.
    pub async fn get_token(&mut self) -> Result<String, ApiError> {
        let now = Utc::now();
        if let Some(token) = &self.cached {
            if !token.is_expired(now) {
                log::debug!("reusing cached token, expires {}", token.expires_at);
                return Ok(token.access_token.clone());
            }
        }

        log::info!(
            "requesting access token for tenant {}",
            self.credentials.tenant_id
        );
        let token = self.source.fetch_token(&self.credentials).await?;
        let access = token.access_token.clone();
        self.cached = Some(token);
        Ok(access)
    }

    #[cfg(test)]
    fn expire_cached(&mut self) {
        if let Some(token) = &mut self.cached {
            token.expires_at = Utc::now() - Duration::seconds(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        issued: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn fetch_token(&self, _credentials: &CredentialSet) -> Result<TokenInfo, ApiError> {
            let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(TokenInfo {
                access_token: format!("token-{}", n),
                expires_at: Utc::now() + Duration::minutes(TOKEN_LIFETIME_MINUTES),
            })
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TokenSource for FailingSource {
        async fn fetch_token(&self, _credentials: &CredentialSet) -> Result<TokenInfo, ApiError> {
            Err(ApiError::AuthFailure("invalid_client".to_string()))
        }
    }

    fn credentials() -> CredentialSet {
        CredentialSet {
            client_id: "app".to_string(),
            client_secret: "secret".to_string(),
            tenant_id: "tenant".to_string(),
        }
    }

    #[tokio::test]
    async fn token_is_reused_within_lifetime() {
        let issued = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            issued: issued.clone(),
        };
        let mut auth = AuthManager::with_source(credentials(), Box::new(source));

        let first = auth.get_token().await.unwrap();
        let second = auth.get_token().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(issued.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_token_triggers_second_request() {
        let issued = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            issued: issued.clone(),
        };
        let mut auth = AuthManager::with_source(credentials(), Box::new(source));

        auth.get_token().await.unwrap();
        auth.get_token().await.unwrap();
        auth.expire_cached();
        let third = auth.get_token().await.unwrap();

        assert_eq!(third, "token-2");
        assert_eq!(issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn auth_failure_is_reported_not_cached() {
        let mut auth = AuthManager::with_source(credentials(), Box::new(FailingSource));

        let err = auth.get_token().await.unwrap_err();
        assert!(matches!(err, ApiError::AuthFailure(_)));
    }

    #[test]
    fn expiry_check_uses_the_given_instant() {
        let token = TokenInfo {
            access_token: "t".to_string(),
            expires_at: Utc::now(),
        };
        assert!(token.is_expired(Utc::now() + Duration::seconds(1)));
        assert!(!token.is_expired(Utc::now() - Duration::seconds(60)));
    }
}
