//! OAuth2 client-credentials token acquisition against Entra ID.
//!
//! Implements `TokenProvider`. The token is cached for the process lifetime and
//! re-acquired shortly before it expires. Nothing is written to disk.

use crate::domain::{AccessToken, Credentials, DomainError};
use crate::ports::TokenProvider;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3599;

/// Token endpoint answer. Success and error shapes share one struct.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Client-credentials token provider (app-only access).
pub struct ClientCredentialsProvider {
    client: reqwest::Client,
    token_url: String,
    credentials: Credentials,
    scope: String,
    /// Held across acquisition so concurrent callers share one token request.
    cache: Mutex<Option<AccessToken>>,
}

impl ClientCredentialsProvider {
    /// Create a provider.
    ///
    /// # Arguments
    /// * `authority_host` - Login host, e.g. "https://login.microsoftonline.com"
    /// * `credentials` - Tenant, client id and client secret
    /// * `scope` - Requested scope, normally "https://graph.microsoft.com/.default"
    /// * `timeout` - Timeout for the token request
    pub fn new(
        authority_host: &str,
        credentials: Credentials,
        scope: String,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Transport(format!("build token client: {}", e)))?;
        Ok(Self {
            client,
            token_url: Self::token_url(authority_host, &credentials.tenant_id),
            credentials,
            scope,
            cache: Mutex::new(None),
        })
    }

    /// `{authority}/{tenant}/oauth2/v2.0/token`
    pub fn token_url(authority_host: &str, tenant_id: &str) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            authority_host.trim_end_matches('/'),
            tenant_id
        )
    }

    async fn acquire(&self) -> Result<AccessToken, DomainError> {
        let form = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| DomainError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let parsed: Option<TokenResponse> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            warn!(status = %status, tenant = %self.credentials.tenant_id, "token endpoint returned error");
            return Err(match parsed {
                Some(TokenResponse {
                    error: Some(error),
                    error_description,
                    ..
                }) => DomainError::Auth(format!(
                    "{}: {}",
                    error,
                    error_description.unwrap_or_default()
                )),
                _ => DomainError::Auth(format!("{} {}", status.as_u16(), text)),
            });
        }

        let parsed = parsed.ok_or_else(|| {
            DomainError::Auth(format!(
                "token endpoint returned non-JSON body: {}",
                text.chars().take(200).collect::<String>()
            ))
        })?;
        let value = parsed.access_token.ok_or_else(|| {
            DomainError::Auth(format!(
                "{}: {}",
                parsed.error.unwrap_or_else(|| "no access_token in response".into()),
                parsed.error_description.unwrap_or_default()
            ))
        })?;

        let expires_in = parsed.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        info!(
            tenant = %self.credentials.tenant_id,
            expires_in,
            "acquired app-only access token"
        );
        Ok(AccessToken::new(value, expires_in, Utc::now()))
    }
}

#[async_trait::async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn access_token(&self) -> Result<String, DomainError> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }
        let token = self.acquire().await?;
        let value = token.value.clone();
        *cache = Some(token);
        Ok(value)
    }

    async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }
}

/// Fixed bearer token supplied by the user (GRAPH_ACCESS_TOKEN).
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, DomainError> {
        Ok(self.token.clone())
    }

    async fn invalidate(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn creds() -> Credentials {
        Credentials {
            tenant_id: "contoso-tenant".into(),
            client_id: "app-id".into(),
            client_secret: "app-secret".into(),
        }
    }

    fn provider(server: &MockServer) -> ClientCredentialsProvider {
        ClientCredentialsProvider::new(
            &server.uri(),
            creds(),
            "https://graph.microsoft.com/.default".into(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_token_url() {
        assert_eq!(
            ClientCredentialsProvider::token_url("https://login.microsoftonline.com/", "t1"),
            "https://login.microsoftonline.com/t1/oauth2/v2.0/token"
        );
    }

    #[tokio::test]
    async fn test_client_credentials_exchange_and_cache() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso-tenant/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=app-id"))
            .and(body_string_contains("client_secret=app-secret"))
            .and(body_string_contains("scope=https%3A%2F%2Fgraph.microsoft.com%2F.default"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "tok-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let p = provider(&server);
        assert_eq!(p.access_token().await.unwrap(), "tok-1");
        // Second call is served from cache; `expect(1)` is verified on drop.
        assert_eq!(p.access_token().await.unwrap(), "tok-1");
    }

    #[tokio::test]
    async fn test_invalidate_forces_new_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso-tenant/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "expires_in": 3599,
                "access_token": "tok"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let p = provider(&server);
        p.access_token().await.unwrap();
        p.invalidate().await;
        p.access_token().await.unwrap();
    }

    #[tokio::test]
    async fn test_short_lived_token_is_not_reused() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso-tenant/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "expires_in": 10,
                "access_token": "short"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let p = provider(&server);
        p.access_token().await.unwrap();
        p.access_token().await.unwrap();
    }

    #[tokio::test]
    async fn test_error_response_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso-tenant/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })))
            .mount(&server)
            .await;

        let err = provider(&server).access_token().await.unwrap_err();
        match err {
            DomainError::Auth(msg) => {
                assert!(msg.starts_with("invalid_client: "));
                assert!(msg.contains("AADSTS7000215"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_access_token_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso-tenant/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let err = provider(&server).access_token().await.unwrap_err();
        assert!(matches!(err, DomainError::Auth(msg) if msg.contains("no access_token")));
    }

    #[tokio::test]
    async fn test_static_provider() {
        let p = StaticTokenProvider::new("fixed");
        assert_eq!(p.access_token().await.unwrap(), "fixed");
        p.invalidate().await;
        assert_eq!(p.access_token().await.unwrap(), "fixed");
    }
}
