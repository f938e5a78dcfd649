use crate::domain::ports::{AccessToken, TokenSource};
use crate::utils::error::{ReportError, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Tokens this close to expiry are treated as already expired.
const EXPIRY_SKEW_SECS: i64 = 30;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

/// Client-credentials exchange against `POST {base_url}/v1/auth/token`.
pub struct AuthClient {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    default_ttl: chrono::Duration,
}

impl AuthClient {
    pub fn new(
        client: Client,
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        default_ttl: chrono::Duration,
    ) -> Self {
        Self {
            client,
            token_url: format!("{}/v1/auth/token", base_url.trim_end_matches('/')),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            default_ttl,
        }
    }
}

#[async_trait]
impl TokenSource for AuthClient {
    async fn fetch_token(&self) -> Result<AccessToken> {
        tracing::debug!("🔐 Requesting access token from: {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .json(&TokenRequest {
                client_id: &self.client_id,
                client_secret: &self.client_secret,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("token request rejected")
                    .to_string()
            } else {
                body
            };
            return Err(ReportError::AuthError {
                status: Some(status.as_u16()),
                message,
            });
        }

        let body: TokenResponse = response.json().await?;
        let value = body
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ReportError::AuthError {
                status: None,
                message: "token response has no access_token".to_string(),
            })?;

        let now = Utc::now();
        let expires_at = body
            .expires_in
            .and_then(|secs| {
                let at = i64::try_from(secs)
                    .ok()
                    .and_then(chrono::Duration::try_seconds)
                    .and_then(|ttl| now.checked_add_signed(ttl));
                if at.is_none() {
                    tracing::warn!("Ignoring out-of-range expires_in={}, using default lifetime", secs);
                }
                at
            })
            .or_else(|| now.checked_add_signed(self.default_ttl))
            .ok_or_else(|| ReportError::AuthError {
                status: None,
                message: "token lifetime is out of range".to_string(),
            })?;

        Ok(AccessToken::new(value, expires_at))
    }
}

/// Shared bearer-token holder for every request in a run.
///
/// With caching on, a token is reused until it nears expiry or the API
/// rejects it. With caching off, every call performs a fresh exchange.
pub struct Session {
    source: Arc<dyn TokenSource>,
    cached: Mutex<Option<AccessToken>>,
    cache_tokens: bool,
}

impl Session {
    pub fn new(source: Arc<dyn TokenSource>, cache_tokens: bool) -> Self {
        Self {
            source,
            cached: Mutex::new(None),
            cache_tokens,
        }
    }

    fn skew() -> chrono::Duration {
        chrono::Duration::seconds(EXPIRY_SKEW_SECS)
    }

    pub async fn token(&self) -> Result<String> {
        if !self.cache_tokens {
            return Ok(self.source.fetch_token().await?.value);
        }

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if !token.is_expired(Utc::now(), Self::skew()) {
                return Ok(token.value.clone());
            }
            tracing::debug!("Cached token expired at {}, renewing", token.expires_at);
        }

        let fresh = self.source.fetch_token().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    /// Called after the API answered 401 for `rejected`. If another task has
    /// already replaced that token, the replacement is returned without a new exchange.
    pub async fn refresh(&self, rejected: &str) -> Result<String> {
        if !self.cache_tokens {
            return Ok(self.source.fetch_token().await?.value);
        }

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.value != rejected && !token.is_expired(Utc::now(), Self::skew()) {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.source.fetch_token().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        ttl: chrono::Duration,
    }

    impl CountingSource {
        fn new(ttl: chrono::Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                ttl,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn fetch_token(&self) -> Result<AccessToken> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(AccessToken::new(format!("token-{}", n), Utc::now() + self.ttl))
        }
    }

    fn auth_client(server: &MockServer) -> AuthClient {
        AuthClient::new(
            Client::new(),
            &server.base_url(),
            "client-1",
            "secret-1",
            chrono::Duration::seconds(300),
        )
    }

    #[tokio::test]
    async fn test_fetch_token_posts_credentials() {
        let server = MockServer::start();
        let token_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/auth/token")
                .json_body(serde_json::json!({"clientId": "client-1", "clientSecret": "secret-1"}));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"access_token": "abc", "expires_in": 3600}));
        });

        let before = Utc::now();
        let token = auth_client(&server).fetch_token().await.unwrap();

        token_mock.assert();
        assert_eq!(token.value, "abc");
        assert!(token.expires_at >= before + chrono::Duration::seconds(3600));
    }

    #[tokio::test]
    async fn test_fetch_token_uses_default_ttl_without_expires_in() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/auth/token");
            then.status(200)
                .json_body(serde_json::json!({"access_token": "abc"}));
        });

        let before = Utc::now();
        let token = auth_client(&server).fetch_token().await.unwrap();

        assert!(token.expires_at >= before + chrono::Duration::seconds(300));
        assert!(token.expires_at <= Utc::now() + chrono::Duration::seconds(300));
    }

    #[tokio::test]
    async fn test_fetch_token_huge_expires_in_falls_back_to_default_ttl() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/auth/token");
            then.status(200).json_body(
                serde_json::json!({"access_token": "abc", "expires_in": 10_000_000_000_000u64}),
            );
        });

        let before = Utc::now();
        let token = auth_client(&server).fetch_token().await.unwrap();

        assert_eq!(token.value, "abc");
        assert!(token.expires_at >= before + chrono::Duration::seconds(300));
        assert!(token.expires_at <= Utc::now() + chrono::Duration::seconds(300));
    }

    #[tokio::test]
    async fn test_fetch_token_unrepresentable_lifetime_is_auth_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/auth/token");
            then.status(200)
                .json_body(serde_json::json!({"access_token": "abc", "expires_in": u64::MAX}));
        });
        let client = AuthClient::new(
            Client::new(),
            &server.base_url(),
            "client-1",
            "secret-1",
            chrono::Duration::max_value(),
        );

        let result = client.fetch_token().await;

        assert!(matches!(
            result,
            Err(ReportError::AuthError { status: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_token_rejected_is_auth_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/auth/token");
            then.status(401).body("invalid client");
        });

        let result = auth_client(&server).fetch_token().await;

        match result {
            Err(ReportError::AuthError { status, message }) => {
                assert_eq!(status, Some(401));
                assert_eq!(message, "invalid client");
            }
            other => panic!("expected AuthError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_token_without_access_token_is_auth_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/auth/token");
            then.status(200).json_body(serde_json::json!({"token_type": "bearer"}));
        });

        let result = auth_client(&server).fetch_token().await;
        assert!(matches!(
            result,
            Err(ReportError::AuthError { status: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_session_reuses_cached_token() {
        let source = CountingSource::new(chrono::Duration::seconds(3600));
        let session = Session::new(source.clone(), true);

        assert_eq!(session.token().await.unwrap(), "token-1");
        assert_eq!(session.token().await.unwrap(), "token-1");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_session_without_cache_exchanges_every_call() {
        let source = CountingSource::new(chrono::Duration::seconds(3600));
        let session = Session::new(source.clone(), false);

        assert_eq!(session.token().await.unwrap(), "token-1");
        assert_eq!(session.token().await.unwrap(), "token-2");
        assert_eq!(session.refresh("token-2").await.unwrap(), "token-3");
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_session_renews_expired_token() {
        // Every issued token is already inside the expiry skew
        let source = CountingSource::new(chrono::Duration::seconds(5));
        let session = Session::new(source.clone(), true);

        assert_eq!(session.token().await.unwrap(), "token-1");
        assert_eq!(session.token().await.unwrap(), "token-2");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_refresh_replaces_rejected_token_once() {
        let source = CountingSource::new(chrono::Duration::seconds(3600));
        let session = Session::new(source.clone(), true);

        let first = session.token().await.unwrap();
        let second = session.refresh(&first).await.unwrap();
        assert_eq!(second, "token-2");

        // A late 401 for the old token must not trigger another exchange
        let third = session.refresh(&first).await.unwrap();
        assert_eq!(third, "token-2");
        assert_eq!(source.calls(), 2);
    }
}
