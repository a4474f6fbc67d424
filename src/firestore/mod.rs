//! Client handle bound to an initialized application context.

pub mod client;

pub use client::FirestoreClient;
