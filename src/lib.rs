pub mod config;
pub mod error;
pub mod firestore;
pub mod google_oauth;
pub mod service;

pub use config::{ClientOptions, Config};
pub use error::BootstrapError;
pub use firestore::FirestoreClient;
pub use google_oauth::{AccessToken, ServiceAccountCredential, TokenSource};
pub use service::{Bootstrapper, initialize};
