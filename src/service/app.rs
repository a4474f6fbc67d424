use crate::error::BootstrapError;
use crate::google_oauth::token::TokenSource;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use tracing::debug;

/// Names of every application context created in this process.
static APPS: LazyLock<Mutex<HashSet<String>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// Claim on an app name. Dropping it without calling [`AppRegistration::keep`]
/// gives the name back, so a failed initialization leaves nothing behind.
#[must_use]
pub struct AppRegistration {
    name: String,
    armed: bool,
}

impl AppRegistration {
    /// Reserve `name` for this process. Fails if it is already taken.
    pub fn reserve(name: &str) -> Result<Self, BootstrapError> {
        let mut apps = APPS.lock().unwrap_or_else(PoisonError::into_inner);
        if !apps.insert(name.to_string()) {
            return Err(BootstrapError::AlreadyInitialized {
                name: name.to_string(),
            });
        }
        debug!(app = name, "app name reserved");
        Ok(Self {
            name: name.to_string(),
            armed: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Make the reservation permanent for the life of the process.
    pub fn keep(mut self) -> String {
        self.armed = false;
        std::mem::take(&mut self.name)
    }
}

impl Drop for AppRegistration {
    fn drop(&mut self) {
        if self.armed {
            APPS.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.name);
            debug!(app = %self.name, "app name released");
        }
    }
}

/// Whether an application context named `name` exists in this process.
pub fn is_initialized(name: &str) -> bool {
    APPS.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .contains(name)
}

/// The authenticated session every client handle is derived from.
pub struct AppContext {
    name: String,
    project_id: String,
    token_source: Arc<dyn TokenSource>,
}

impl AppContext {
    pub(crate) fn new(
        registration: AppRegistration,
        project_id: String,
        token_source: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            name: registration.keep(),
            project_id,
            token_source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn token_source(&self) -> &Arc<dyn TokenSource> {
        &self.token_source
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("name", &self.name)
            .field("project_id", &self.project_id)
            .field("identity", &self.token_source.identity())
            .finish()
    }
}
