use super::endpoints::GoogleOauthEndpoints;
use crate::error::BootstrapError;
use crate::google_oauth::credentials::ServiceAccountCredential;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Tokens this close to expiry are treated as already expired.
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// Bearer token plus the instant it stops being accepted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: String,
    pub expiry: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            secret: secret.into(),
            expiry,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry - now > Duration::seconds(EXPIRY_SKEW_SECS)
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Anything that can mint bearer tokens for Firestore requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<AccessToken, BootstrapError>;

    /// Human readable identity, used in logs.
    fn identity(&self) -> String;
}

/// Exchanges signed service-account assertions at the credential's token URI.
pub struct ServiceAccountTokenSource {
    credential: ServiceAccountCredential,
    http_client: reqwest::Client,
}

impl ServiceAccountTokenSource {
    pub fn new(credential: ServiceAccountCredential, http_client: reqwest::Client) -> Self {
        Self {
            credential,
            http_client,
        }
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn fetch_token(&self) -> Result<AccessToken, BootstrapError> {
        GoogleOauthEndpoints::exchange_assertion(&self.credential, &self.http_client).await
    }

    fn identity(&self) -> String {
        self.credential.client_email.clone()
    }
}

/// The Firestore emulator accepts a fixed `owner` token and never expires it.
pub struct EmulatorTokenSource;

#[async_trait]
impl TokenSource for EmulatorTokenSource {
    async fn fetch_token(&self) -> Result<AccessToken, BootstrapError> {
        Ok(AccessToken::new("owner", DateTime::<Utc>::MAX_UTC))
    }

    fn identity(&self) -> String {
        "emulator".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_honours_skew() {
        let now = Utc::now();
        let token = AccessToken::new("t", now + Duration::seconds(EXPIRY_SKEW_SECS + 5));
        assert!(token.is_fresh_at(now));
        assert!(!token.is_fresh_at(now + Duration::seconds(10)));
    }

    #[test]
    fn debug_hides_secret() {
        let token = AccessToken::new("ya29.secret", Utc::now());
        assert!(!format!("{token:?}").contains("ya29"));
    }

    #[tokio::test]
    async fn emulator_token_is_owner_and_never_stale() {
        let token = EmulatorTokenSource.fetch_token().await.unwrap();
        assert_eq!(token.secret(), "owner");
        assert!(token.is_fresh());
    }
}
