//! Request authentication.
//!
//! Authentication itself is a collaborator of this service: something
//! upstream owns accounts and sessions. The server only needs to turn a
//! bearer token into a [`Principal`]. [`TokenAuthenticator`] is the
//! built-in implementation, a static token map loaded from config.

use std::collections::HashMap;

use policy::Principal;

/// Resolves a bearer token to the acting principal.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> Option<Principal>;
}

/// Static token-to-principal map.
#[derive(Debug, Default)]
pub struct TokenAuthenticator {
    tokens: HashMap<String, Principal>,
}

impl TokenAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a principal under a token, builder-style.
    pub fn register(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens.insert(token.into(), principal);
        self
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(&self, token: &str) -> Option<Principal> {
        self.tokens.get(token).cloned()
    }
}
