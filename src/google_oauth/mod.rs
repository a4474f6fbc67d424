//! Google service-account authentication.
//!
//! - `credentials.rs`: service-account key parsing
//! - `endpoints.rs`: JWT bearer exchange against the token URI
//! - `token.rs`: access tokens and the `TokenSource` seam

pub mod credentials;
mod endpoints;
pub mod token;

pub use credentials::ServiceAccountCredential;
pub use token::{AccessToken, EmulatorTokenSource, ServiceAccountTokenSource, TokenSource};
