//! User credential storage and the OAuth authorization link handed to users
//! who have not signed in yet. Exchanging the authorization code for tokens
//! happens outside this service; whatever performs it stores the result
//! through [`CredentialStore::put_credentials`].

use dashmap::DashMap;
use url::Url;

use crate::config::AuthConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scopes: Vec<String>,
}

/// Per-user credential lookup, keyed by the chat user resource name (`users/123`).
pub trait CredentialStore: Send + Sync {
    fn get_credentials(&self, user: &str) -> Option<Credentials>;
    fn put_credentials(&self, user: &str, credentials: Credentials);
    /// Returns whether anything was removed.
    fn delete_credentials(&self, user: &str) -> bool;
}

pub struct InMemoryCredentialStore {
    credentials: DashMap<String, Credentials>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        InMemoryCredentialStore {
            credentials: DashMap::new(),
        }
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get_credentials(&self, user: &str) -> Option<Credentials> {
        self.credentials.get(user).map(|entry| entry.value().clone())
    }

    fn put_credentials(&self, user: &str, credentials: Credentials) {
        self.credentials.insert(user.to_string(), credentials);
    }

    fn delete_credentials(&self, user: &str) -> bool {
        self.credentials.remove(user).is_some()
    }
}

/// Builds the consent URL; `state` carries the user name back to the callback.
pub fn authorization_url(config: &AuthConfig, user: &str) -> anyhow::Result<String> {
    let scope = config.scopes.join(" ");
    let url = Url::parse_with_params(
        &config.authorization_url,
        &[
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("response_type", "code"),
            ("access_type", "offline"),
            ("scope", scope.as_str()),
            ("state", user),
        ],
    )?;
    Ok(url.into())
}
