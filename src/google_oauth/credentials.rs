use crate::config::GOOGLE_TOKEN_URI;
use crate::error::BootstrapError;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use url::Url;

const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// A parsed Google service-account key.
///
/// The private key is kept only as a ready-to-use signing key; the PEM text
/// is dropped once it has been decoded.
#[derive(Clone)]
pub struct ServiceAccountCredential {
    pub project_id: String,
    pub client_email: String,
    pub client_id: Option<String>,
    pub private_key_id: Option<String>,
    pub token_uri: Url,
    signing_key: EncodingKey,
}

#[derive(Deserialize)]
struct ServiceAccountKeyFile {
    #[serde(rename = "type")]
    kind: Option<String>,
    project_id: Option<String>,
    private_key_id: Option<String>,
    private_key: Option<String>,
    client_email: Option<String>,
    client_id: Option<String>,
    token_uri: Option<String>,
}

impl ServiceAccountCredential {
    /// Parse raw key-file bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, BootstrapError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| BootstrapError::CredentialMalformed(format!("invalid JSON: {e}")))?;
        Self::from_payload(&value)
    }

    /// Build a credential from an already decoded JSON payload.
    pub fn from_payload(payload: &Value) -> Result<Self, BootstrapError> {
        if !payload.is_object() {
            return Err(BootstrapError::CredentialMalformed(
                "expected a JSON object".to_string(),
            ));
        }
        let raw: ServiceAccountKeyFile = serde_json::from_value(payload.clone())
            .map_err(|e| BootstrapError::CredentialMalformed(e.to_string()))?;

        let kind = required(raw.kind, "type")?;
        if kind != SERVICE_ACCOUNT_TYPE {
            return Err(BootstrapError::CredentialMalformed(format!(
                "unsupported credential type {kind:?}, expected {SERVICE_ACCOUNT_TYPE:?}"
            )));
        }
        let project_id = required(raw.project_id, "project_id")?;
        let client_email = required(raw.client_email, "client_email")?;
        let private_key = required(raw.private_key, "private_key")?;

        let signing_key = EncodingKey::from_rsa_pem(private_key.as_bytes()).map_err(unusable_key)?;
        // PEM decoding does not look inside the RSA parameters; signing does.
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &Value::Null, &signing_key)
            .map_err(unusable_key)?;

        let token_uri = match raw.token_uri.filter(|s| !s.trim().is_empty()) {
            Some(uri) => Url::parse(&uri).map_err(|e| {
                BootstrapError::CredentialMalformed(format!("invalid token_uri: {e}"))
            })?,
            None => GOOGLE_TOKEN_URI.clone(),
        };

        Ok(Self {
            project_id,
            client_email,
            client_id: raw.client_id,
            private_key_id: raw.private_key_id,
            token_uri,
            signing_key,
        })
    }

    pub(crate) fn signing_key(&self) -> &EncodingKey {
        &self.signing_key
    }
}

fn required(field: Option<String>, name: &str) -> Result<String, BootstrapError> {
    field
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| BootstrapError::CredentialMalformed(format!("missing field `{name}`")))
}

fn unusable_key(e: jsonwebtoken::errors::Error) -> BootstrapError {
    BootstrapError::CredentialMalformed(format!("unusable private_key: {e}"))
}

impl fmt::Debug for ServiceAccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredential")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri.as_str())
            .field("signing_key", &"<redacted>")
            .finish()
    }
}
