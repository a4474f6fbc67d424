use crate::error::BootstrapError;
use crate::google_oauth::credentials::ServiceAccountCredential;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fmt, fs};
use tracing::{debug, info};

/// Capability that supplies the raw bytes of a service-account key.
pub trait CredentialSource: Send + Sync {
    fn read(&self) -> Result<Vec<u8>, BootstrapError>;

    /// Where the bytes come from, for logs and error messages.
    fn describe(&self) -> String;

    fn load(&self) -> Result<ServiceAccountCredential, BootstrapError> {
        let bytes = self.read()?;
        let credential = ServiceAccountCredential::from_slice(&bytes)?;
        info!(
            source = %self.describe(),
            project_id = %credential.project_id,
            "service account credential loaded"
        );
        Ok(credential)
    }
}

/// Key file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileCredential {
    path: PathBuf,
}

impl FileCredential {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialSource for FileCredential {
    fn read(&self) -> Result<Vec<u8>, BootstrapError> {
        debug!(path = %self.path.display(), "reading credential file");
        fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => BootstrapError::CredentialNotFound {
                path: self.path.clone(),
            },
            _ => BootstrapError::CredentialUnreadable {
                path: self.path.clone(),
                source: e,
            },
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Key material already in memory, e.g. pulled from a secret store or a test fixture.
#[derive(Clone)]
pub struct InMemoryCredential {
    label: String,
    bytes: Vec<u8>,
}

impl InMemoryCredential {
    pub fn new(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for InMemoryCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCredential")
            .field("label", &self.label)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl CredentialSource for InMemoryCredential {
    fn read(&self) -> Result<Vec<u8>, BootstrapError> {
        Ok(self.bytes.clone())
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.label)
    }
}
