//! Credential provider adapters.
//!
//! - `StaticCredentials` - Token held in memory
//! - `FileCredentialStore` - Token read from a JSON credentials file

mod file_store;
mod static_credentials;

pub use file_store::FileCredentialStore;
pub use static_credentials::StaticCredentials;
