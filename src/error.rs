use oauth2::basic::BasicErrorResponse;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BootstrapError {
    #[error("credential file not found: {}", .path.display())]
    CredentialNotFound { path: PathBuf },

    #[error("credential file {} could not be read: {source}", .path.display())]
    CredentialUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed service account credential: {0}")]
    CredentialMalformed(String),

    #[error("application context {name:?} is already initialized")]
    AlreadyInitialized { name: String },

    #[error("token endpoint rejected the credential: {error}{}", description_suffix(.description))]
    AuthenticationRejected {
        error: String,
        description: Option<String>,
    },

    #[error("token endpoint failed with status: {0}")]
    TokenEndpoint(StatusCode),

    #[error("JWT signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid document path: {0:?}")]
    InvalidDocumentPath(String),

    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl BootstrapError {
    /// True for the failures that stem from the credential itself rather than
    /// from the process or the network.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::CredentialNotFound { .. }
                | Self::CredentialUnreadable { .. }
                | Self::CredentialMalformed(_)
                | Self::AuthenticationRejected { .. }
        )
    }
}

impl From<BasicErrorResponse> for BootstrapError {
    fn from(resp: BasicErrorResponse) -> Self {
        BootstrapError::AuthenticationRejected {
            error: resp.error().to_string(),
            description: resp.error_description().cloned(),
        }
    }
}

impl From<figment::Error> for BootstrapError {
    fn from(e: figment::Error) -> Self {
        BootstrapError::Config(Box::new(e))
    }
}

fn description_suffix(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth2::StandardErrorResponse;
    use oauth2::basic::BasicErrorResponseType;

    #[test]
    fn oauth_error_response_maps_to_rejection() {
        let resp: BasicErrorResponse = StandardErrorResponse::new(
            BasicErrorResponseType::InvalidGrant,
            Some("Invalid JWT Signature.".to_string()),
            None,
        );
        let err = BootstrapError::from(resp);
        assert!(err.is_credential_error());
        assert_eq!(
            err.to_string(),
            "token endpoint rejected the credential: invalid_grant (Invalid JWT Signature.)"
        );
    }

    #[test]
    fn already_initialized_is_not_a_credential_error() {
        let err = BootstrapError::AlreadyInitialized {
            name: "[DEFAULT]".to_string(),
        };
        assert!(!err.is_credential_error());
    }
}
