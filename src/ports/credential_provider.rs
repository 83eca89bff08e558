//! CredentialProvider port - Lookup of the user's access token.

use secrecy::Secret;

/// Port for resolving the current access token.
///
/// Returns `None` when no token is stored or the stored credentials cannot
/// be parsed. The connector treats `None` as fatal for one `connect()`
/// call only, so the lookup is repeated on every attempt.
pub trait CredentialProvider: Send + Sync {
    fn access_token(&self) -> Option<Secret<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_provider_object_safe(_: &dyn CredentialProvider) {}
}
