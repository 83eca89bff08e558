//! Credential source configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::{FileCredentialStore, StaticCredentials};
use crate::ports::CredentialProvider;

/// Where the access token comes from.
///
/// A token file wins over an inline token since it is re-read on every
/// connect and so follows token refreshes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    /// Inline access token
    pub token: Option<Secret<String>>,

    /// JSON file holding `{"access_token": "..."}`
    pub token_file: Option<PathBuf>,
}

impl CredentialsConfig {
    /// Builds the configured provider.
    ///
    /// With neither source set the provider is empty and every connect
    /// fails with missing credentials.
    pub fn provider(&self) -> Arc<dyn CredentialProvider> {
        if let Some(path) = &self.token_file {
            return Arc::new(FileCredentialStore::new(path));
        }
        match &self.token {
            Some(token) => Arc::new(StaticCredentials::new(token.expose_secret().as_str())),
            None => Arc::new(StaticCredentials::empty()),
        }
    }
}
