//! Credentials read from a JSON file on every lookup.

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::PathBuf;

use crate::ports::CredentialProvider;

/// Stored credential blob, e.g. `{"access_token": "...", "refresh_token": "..."}`.
#[derive(Deserialize)]
struct StoredCredentials {
    #[serde(alias = "token", alias = "accessToken")]
    access_token: Option<Secret<String>>,
}

/// Reads the access token from a JSON file.
///
/// The file is re-read on every lookup so a token written after start-up
/// (login in another process) is picked up by the next `connect()`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a store reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for FileCredentialStore {
    fn access_token(&self) -> Option<Secret<String>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "Credentials file unreadable");
                return None;
            }
        };

        match serde_json::from_str::<StoredCredentials>(&contents) {
            Ok(stored) => stored
                .access_token
                .filter(|t| !t.expose_secret().trim().is_empty()),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Credentials file is not valid JSON");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_access_token() {
        let file = file_with(r#"{"access_token":"tok-1","refresh_token":"r"}"#);
        let store = FileCredentialStore::new(file.path());
        assert_eq!(store.access_token().unwrap().expose_secret(), "tok-1");
    }

    #[test]
    fn accepts_camel_case_key() {
        let file = file_with(r#"{"accessToken":"tok-2"}"#);
        let store = FileCredentialStore::new(file.path());
        assert_eq!(store.access_token().unwrap().expose_secret(), "tok-2");
    }

    #[test]
    fn missing_file_means_no_credentials() {
        let store = FileCredentialStore::new("/definitely/not/here.json");
        assert!(store.access_token().is_none());
    }

    #[test]
    fn unparsable_file_means_no_credentials() {
        let file = file_with("{not json");
        assert!(FileCredentialStore::new(file.path()).access_token().is_none());
    }

    #[test]
    fn null_or_blank_token_means_no_credentials() {
        let null = file_with(r#"{"access_token":null}"#);
        let blank = file_with(r#"{"access_token":""}"#);
        assert!(FileCredentialStore::new(null.path()).access_token().is_none());
        assert!(FileCredentialStore::new(blank.path()).access_token().is_none());
    }

    #[test]
    fn token_written_later_is_picked_up() {
        let mut file = NamedTempFile::new().unwrap();
        let store = FileCredentialStore::new(file.path());
        assert!(store.access_token().is_none());

        file.write_all(br#"{"access_token":"late"}"#).unwrap();
        file.flush().unwrap();
        assert_eq!(store.access_token().unwrap().expose_secret(), "late");
    }
}
