pub mod app;
pub mod bootstrap;
pub mod credential_loader;

pub use app::{AppContext, AppRegistration, is_initialized};
pub use bootstrap::{Bootstrapper, initialize};
pub use credential_loader::{CredentialSource, FileCredential, InMemoryCredential};
