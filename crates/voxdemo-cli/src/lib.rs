//! Library surface of the `voxdemo` binary: the interactive demo controller
//! and the provider API-key store.

/// Interactive call controls with duplicate-start protection.
pub mod demo;
/// Stored provider API key (legacy direct-call path).
pub mod keystore;

pub use demo::DemoController;
pub use keystore::ApiKeyStore;
