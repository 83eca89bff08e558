//! Credentials held in memory.

use secrecy::{ExposeSecret, Secret};
use std::sync::RwLock;

use crate::ports::CredentialProvider;

/// Token held in process memory, replaceable at runtime (login/logout).
#[derive(Debug, Default)]
pub struct StaticCredentials {
    token: RwLock<Option<Secret<String>>>,
}

impl StaticCredentials {
    /// Creates a provider with a token.
    pub fn new(token: impl Into<String>) -> Self {
        let provider = Self::default();
        provider.set(token);
        provider
    }

    /// Creates a provider with no token.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Stores a token; blank tokens count as absent.
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        let value = (!token.trim().is_empty()).then(|| Secret::new(token));
        *self.token.write().unwrap_or_else(|p| p.into_inner()) = value;
    }

    /// Forgets the token.
    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(|p| p.into_inner()) = None;
    }
}

impl CredentialProvider for StaticCredentials {
    fn access_token(&self) -> Option<Secret<String>> {
        self.token
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .map(|t| Secret::new(t.expose_secret().clone()))
    }
}
