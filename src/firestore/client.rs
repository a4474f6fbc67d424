use crate::error::BootstrapError;
use crate::google_oauth::token::AccessToken;
use crate::service::app::AppContext;

use reqwest::{Method, RequestBuilder};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

/// Handle for issuing Firestore operations.
///
/// Cheap to clone; every clone shares the same application context, HTTP
/// client and current access token.
#[derive(Clone, Debug)]
pub struct FirestoreClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    app: Arc<AppContext>,
    database_id: String,
    base_url: Url,
    http: reqwest::Client,
    token: Mutex<Option<AccessToken>>,
}

impl FirestoreClient {
    pub(crate) fn new(
        app: Arc<AppContext>,
        database_id: String,
        base_url: Url,
        http: reqwest::Client,
        initial_token: Option<AccessToken>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                app,
                database_id,
                base_url,
                http,
                token: Mutex::new(initial_token),
            }),
        }
    }

    pub fn app(&self) -> &AppContext {
        &self.inner.app
    }

    pub fn app_name(&self) -> &str {
        self.inner.app.name()
    }

    pub fn project_id(&self) -> &str {
        self.inner.app.project_id()
    }

    pub fn database_id(&self) -> &str {
        &self.inner.database_id
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// `projects/{project}/databases/{database}`
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/databases/{}",
            self.project_id(),
            self.database_id()
        )
    }

    pub fn documents_url(&self) -> Result<Url, BootstrapError> {
        Ok(self
            .inner
            .base_url
            .join(&format!("{}/documents", self.database_path()))?)
    }

    /// URL of a document or collection, e.g. `products/abc123`.
    ///
    /// Each segment is percent-encoded, so IDs cannot escape the database's
    /// `documents` tree.
    pub fn document_url(&self, path: &str) -> Result<Url, BootstrapError> {
        let invalid = || BootstrapError::InvalidDocumentPath(path.to_string());
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty()
            || trimmed
                .split('/')
                .any(|seg| seg.is_empty() || seg == "." || seg == "..")
        {
            return Err(invalid());
        }
        let mut url = self.documents_url()?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .extend(trimmed.split('/'));
        Ok(url)
    }

    /// Current bearer token, fetching a new one when it is close to expiry.
    pub async fn access_token(&self) -> Result<AccessToken, BootstrapError> {
        let mut slot = self.inner.token.lock().await;
        if let Some(token) = slot.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.clone());
        }
        debug!(app = %self.app_name(), "access token missing or near expiry; fetching");
        let token = self.inner.app.token_source().fetch_token().await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Request builder with the bearer token already attached.
    pub async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, BootstrapError> {
        let token = self.access_token().await?;
        Ok(self
            .inner
            .http
            .request(method, url)
            .bearer_auth(token.secret()))
    }
}
