use crate::config::FIRESTORE_SCOPES;
use crate::error::BootstrapError;
use crate::google_oauth::credentials::ServiceAccountCredential;
use crate::google_oauth::token::AccessToken;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, Header};
use oauth2::{
    EmptyExtraTokenFields, StandardTokenResponse, TokenResponse,
    basic::{BasicErrorResponse, BasicTokenType},
};
use serde::Serialize;
use tracing::{debug, info};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime Google accepts for a self-signed assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

type ServiceAccountTokenResponse = StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>;

#[derive(Debug, Serialize)]
pub(crate) struct AssertionClaims<'a> {
    pub iss: &'a str,
    pub scope: String,
    pub aud: &'a str,
    pub iat: i64,
    pub exp: i64,
}

/// Stateless Google OAuth endpoints used by service accounts.
pub(super) struct GoogleOauthEndpoints;

impl GoogleOauthEndpoints {
    /// Sign the RS256 assertion that proves possession of the service-account key.
    pub(super) fn sign_assertion(creds: &ServiceAccountCredential) -> Result<String, BootstrapError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &creds.client_email,
            scope: FIRESTORE_SCOPES.join(" "),
            aud: creds.token_uri.as_str(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = creds.private_key_id.clone();
        Ok(jsonwebtoken::encode(&header, &claims, creds.signing_key())?)
    }

    /// Trade a signed assertion for an access token (RFC 7523 JWT bearer grant).
    pub(super) async fn exchange_assertion(
        creds: &ServiceAccountCredential,
        http_client: &reqwest::Client,
    ) -> Result<AccessToken, BootstrapError> {
        let assertion = Self::sign_assertion(creds)?;
        let resp = http_client
            .post(creds.token_uri.clone())
            .header("Accept", "application/json")
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            // OAuth error bodies mean the credential was refused; anything else
            // is an endpoint failure.
            return match serde_json::from_slice::<BasicErrorResponse>(&body) {
                Ok(err) if status.is_client_error() => Err(err.into()),
                _ => Err(BootstrapError::TokenEndpoint(status)),
            };
        }

        let token: ServiceAccountTokenResponse = serde_json::from_slice(&body)?;
        let lifetime = token
            .expires_in()
            .and_then(|d| Duration::from_std(d).ok())
            .unwrap_or_else(|| Duration::seconds(ASSERTION_LIFETIME_SECS));
        debug!(expires_in_secs = lifetime.num_seconds(), "token endpoint response parsed");
        info!(
            project_id = %creds.project_id,
            client_email = %creds.client_email,
            "service account access token obtained"
        );
        Ok(AccessToken::new(
            token.access_token().secret().clone(),
            Utc::now() + lifetime,
        ))
    }
}
