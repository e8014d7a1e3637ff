//! Credentials and bearer token lifecycle.
//!
//! Tokens are obtained through the identity provider's resource-owner
//! password flow. The API does not report a lifetime we can rely on, so every
//! token is treated as expiring a fixed 50 minutes after it was last acquired
//! or validated.

use chrono::{DateTime, TimeDelta, Utc};
use ercot_types::{ErcotError, Result};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{ClientConfig, http_client};

/// Default identity provider token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://ercotb2c.b2clogin.com/ercotb2c.onmicrosoft.com/B2C_1_PUBAPI-ROPC-FLOW/oauth2/v2.0/token";

/// Public client id registered for the reports API.
pub const DEFAULT_CLIENT_ID: &str = "fec253ea-0d06-4272-a5e6-b478baeecd70";

/// Header carrying the API subscription key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Environment variable holding the API username.
pub const USERNAME_ENV: &str = "ERCOT_USERNAME";
/// Environment variable holding the API password.
pub const PASSWORD_ENV: &str = "ERCOT_PASSWORD";
/// Environment variable holding the API subscription key.
pub const API_KEY_ENV: &str = "ERCOT_API_KEY";

/// Token lifetime assumed after each successful acquisition or validation.
#[must_use]
pub const fn token_lifetime() -> TimeDelta {
    TimeDelta::minutes(50)
}

/// Account credentials for the reports API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
    api_key: String,
}

impl Credentials {
    /// Creates a new credential set.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            api_key: api_key.into(),
        }
    }

    /// Reads credentials from `ERCOT_USERNAME`, `ERCOT_PASSWORD` and `ERCOT_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an authentication error naming the first missing variable.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| ErcotError::Authentication(format!("missing {name} in environment")))
        };
        Ok(Self::new(var(USERNAME_ENV)?, var(PASSWORD_ENV)?, var(API_KEY_ENV)?))
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the API subscription key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Identity provider settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token endpoint URL.
    pub token_url: String,
    /// OAuth client id.
    pub client_id: String,
    /// Space-separated scopes.
    pub scope: String,
    /// Lifetime assumed for each token.
    pub lifetime: TimeDelta,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            scope: format!("openid {DEFAULT_CLIENT_ID} offline_access"),
            lifetime: token_lifetime(),
        }
    }
}

/// A bearer token and the instant it stops being trusted.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Returns the bearer token string.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the expiry timestamp.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns true if the token is still trusted at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Owns the credentials and the current bearer token.
///
/// Fetches take the manager by `&mut`, so a refresh can never race another
/// request issued through the same manager.
#[derive(Debug)]
pub struct TokenManager {
    credentials: Credentials,
    config: AuthConfig,
    http: Client,
    token: Option<Token>,
}

impl TokenManager {
    /// Creates a manager without contacting the identity provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(credentials: Credentials, config: AuthConfig) -> Result<Self> {
        let http = http_client(&ClientConfig::default())
            .map_err(|e| ErcotError::Http(e.to_string()))?;
        Ok(Self::with_client(credentials, config, http))
    }

    /// Creates a manager that reuses an existing HTTP client.
    #[must_use]
    pub const fn with_client(credentials: Credentials, config: AuthConfig, http: Client) -> Self {
        Self {
            credentials,
            config,
            http,
            token: None,
        }
    }

    /// Creates a manager and acquires a first token.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the credentials are rejected.
    pub async fn connect(credentials: Credentials, config: AuthConfig) -> Result<Self> {
        let mut manager = Self::new(credentials, config)?;
        manager.acquire(Utc::now()).await?;
        Ok(manager)
    }

    /// Exchanges the credentials for a new token expiring `lifetime` after `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ErcotError::Authentication`] if the response carries no
    /// `id_token`, or [`ErcotError::Http`] if the identity provider is unreachable.
    pub async fn acquire(&mut self, now: DateTime<Utc>) -> Result<&Token> {
        debug!(username = %self.credentials.username, "Requesting access token");

        let response = self
            .http
            .post(&self.config.token_url)
            .query(&[
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
                ("grant_type", "password"),
                ("scope", self.config.scope.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "id_token"),
            ])
            .send()
            .await
            .map_err(|e| ErcotError::Http(e.to_string()))?;

        let status = response.status();
        let body: TokenResponse = response.json().await.map_err(|e| {
            ErcotError::Authentication(format!("unreadable identity response ({status}): {e}"))
        })?;

        let Some(id_token) = body.id_token else {
            let reason = body
                .error_description
                .or(body.error)
                .unwrap_or_else(|| format!("identity provider returned no id_token ({status})"));
            return Err(ErcotError::Authentication(reason));
        };

        let token = Token::new(id_token, now + self.config.lifetime);
        info!(expires_at = %token.expires_at(), "Acquired access token");
        Ok(self.token.insert(token))
    }

    /// Re-acquires the token regardless of its expiry.
    ///
    /// # Errors
    ///
    /// See [`TokenManager::acquire`].
    pub async fn refresh(&mut self, now: DateTime<Utc>) -> Result<&Token> {
        self.acquire(now).await
    }

    /// Returns true if a token is held and has not expired at `now`.
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.token.as_ref().is_some_and(|t| t.is_valid_at(now))
    }

    /// Returns the current token, refreshing it first if it has expired.
    ///
    /// # Errors
    ///
    /// See [`TokenManager::acquire`].
    pub async fn ensure_valid(&mut self, now: DateTime<Utc>) -> Result<&Token> {
        if !self.is_valid(now) {
            debug!("Access token missing or expired");
            return self.acquire(now).await;
        }
        self.token
            .as_ref()
            .ok_or_else(|| ErcotError::Authentication("no access token held".to_string()))
    }

    /// Extends the current token's expiry after a successful connection probe.
    pub fn mark_validated(&mut self, now: DateTime<Utc>) {
        let lifetime = self.config.lifetime;
        if let Some(token) = self.token.as_mut() {
            token.expires_at = now + lifetime;
        }
    }

    /// Returns the current token, if any.
    #[must_use]
    pub const fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Returns the credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the identity provider settings.
    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Replaces the username. Takes effect at the next refresh.
    pub fn set_username(&mut self, username: impl Into<String>) -> &mut Self {
        self.credentials.username = username.into();
        self
    }

    /// Replaces the password. Takes effect at the next refresh.
    pub fn set_password(&mut self, password: impl Into<String>) -> &mut Self {
        self.credentials.password = password.into();
        self
    }

    /// Replaces the API subscription key. Sent with the next request.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> &mut Self {
        self.credentials.api_key = api_key.into();
        self
    }

    /// Returns the bearer token and subscription key headers.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if no token has been acquired or a
    /// credential is not a valid header value.
    pub fn auth_headers(&self) -> Result<HeaderMap> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| ErcotError::Authentication("no access token held".to_string()))?;

        let invalid =
            |what: &str| ErcotError::Authentication(format!("{what} is not a valid header value"));
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token.value()))
                .map_err(|_| invalid("access token"))?,
        );
        headers.insert(
            SUBSCRIPTION_KEY_HEADER,
            HeaderValue::from_str(&self.credentials.api_key).map_err(|_| invalid("API key"))?,
        );
        Ok(headers)
    }

    /// Adds the authentication headers to a request.
    ///
    /// # Errors
    ///
    /// See [`TokenManager::auth_headers`].
    pub fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(request.headers(self.auth_headers()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn manager() -> TokenManager {
        TokenManager::new(Credentials::new("user", "pass", "key"), AuthConfig::default()).unwrap()
    }

    #[test]
    fn test_token_validity_boundary() {
        let token = Token::new("abc", noon());
        assert!(token.is_valid_at(noon() - TimeDelta::seconds(1)));
        assert!(!token.is_valid_at(noon()));
    }

    #[test]
    fn test_new_manager_holds_no_token() {
        let manager = manager();
        assert!(manager.token().is_none());
        assert!(!manager.is_valid(noon()));
    }

    #[test]
    fn test_authorize_without_token_fails() {
        let manager = manager();
        let request = Client::new().get("http://localhost/report");
        assert!(matches!(
            manager.authorize(request),
            Err(ErcotError::Authentication(_))
        ));
    }

    #[test]
    fn test_auth_headers() {
        let mut manager = manager();
        manager.token = Some(Token::new("abc", noon()));
        let headers = manager.auth_headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert_eq!(headers[SUBSCRIPTION_KEY_HEADER], "key");
    }

    #[test]
    fn test_setters_keep_token() {
        let mut manager = manager();
        manager.token = Some(Token::new("abc", noon()));
        manager.set_username("other").set_api_key("new-key");
        assert_eq!(manager.credentials().username(), "other");
        assert_eq!(manager.credentials().api_key(), "new-key");
        assert!(manager.token().is_some());
    }

    #[test]
    fn test_mark_validated_extends_expiry() {
        let mut manager = manager();
        manager.token = Some(Token::new("abc", noon()));
        let later = noon() + TimeDelta::minutes(30);
        manager.mark_validated(later);
        assert_eq!(
            manager.token().unwrap().expires_at(),
            later + token_lifetime()
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("user", "hunter2", "secret-key");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("secret-key"));
    }

    #[test]
    fn test_default_scope_names_client() {
        let config = AuthConfig::default();
        assert!(config.scope.contains(DEFAULT_CLIENT_ID));
        assert_eq!(config.lifetime, TimeDelta::minutes(50));
    }
}
