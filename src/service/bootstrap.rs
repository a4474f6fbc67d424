use crate::config::{ClientOptions, DEFAULT_APP_NAME};
use crate::error::BootstrapError;
use crate::firestore::FirestoreClient;
use crate::google_oauth::token::{EmulatorTokenSource, ServiceAccountTokenSource, TokenSource};
use crate::service::app::{AppContext, AppRegistration};
use crate::service::credential_loader::{CredentialSource, FileCredential};

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Load the key file at `credential_path`, create the default application
/// context and return a client handle bound to it.
///
/// Honours `FIRESTORE_EMULATOR_HOST` like the Google SDKs do.
///
/// Succeeds at most once per process; later calls fail with
/// [`BootstrapError::AlreadyInitialized`].
pub async fn initialize(
    credential_path: impl AsRef<Path>,
) -> Result<FirestoreClient, BootstrapError> {
    Bootstrapper::new(FileCredential::new(credential_path.as_ref()))
        .options(ClientOptions::from_env())
        .initialize()
        .await
}

/// Explicit construction path for a [`FirestoreClient`].
pub struct Bootstrapper {
    source: Box<dyn CredentialSource>,
    app_name: String,
    options: ClientOptions,
    token_source: Option<Arc<dyn TokenSource>>,
}

impl Bootstrapper {
    pub fn new(source: impl CredentialSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            app_name: DEFAULT_APP_NAME.to_string(),
            options: ClientOptions::default(),
            token_source: None,
        }
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the service-account token exchange.
    pub fn token_source(mut self, token_source: Arc<dyn TokenSource>) -> Self {
        self.token_source = Some(token_source);
        self
    }

    /// Credential, then app registration, then authentication, then handle.
    pub async fn initialize(self) -> Result<FirestoreClient, BootstrapError> {
        let credential = self.source.load()?;
        let registration = AppRegistration::reserve(&self.app_name)?;

        let http = self.options.build_http_client()?;
        let base_url = self.options.base_url()?;

        let token_source: Arc<dyn TokenSource> =
            match (self.token_source, &self.options.emulator_host) {
                (Some(custom), _) => custom,
                (None, Some(host)) => {
                    warn!(
                        app = %self.app_name,
                        emulator = %host,
                        "using Firestore emulator; authentication skipped"
                    );
                    Arc::new(EmulatorTokenSource)
                }
                (None, None) => Arc::new(ServiceAccountTokenSource::new(
                    credential.clone(),
                    http.clone(),
                )),
            };

        // A refused credential drops `registration`, which frees the app name.
        let token = token_source.fetch_token().await?;

        let project_id = credential.project_id.clone();
        drop(credential);

        let app = Arc::new(AppContext::new(registration, project_id, token_source));
        info!(
            app = %app.name(),
            project_id = %app.project_id(),
            database_id = %self.options.database_id,
            base_url = %base_url,
            "Firestore client initialized"
        );

        Ok(FirestoreClient::new(
            app,
            self.options.database_id,
            base_url,
            http,
            Some(token),
        ))
    }
}
