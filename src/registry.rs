use crate::error::AuthError;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Pre-shared secret for one (identity, counterparty) pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        SharedSecret(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedSecret {
    fn from(value: &str) -> Self {
        SharedSecret::new(value)
    }
}

impl From<String> for SharedSecret {
    fn from(value: String) -> Self {
        SharedSecret(value)
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// Identity -> secret lookups, populated out of band.
#[derive(Debug)]
pub struct SecretRegistry<I: Eq + Hash> {
    secrets: DashMap<I, SharedSecret>,
}

impl<I: Eq + Hash> Default for SecretRegistry<I> {
    fn default() -> Self {
        SecretRegistry {
            secrets: DashMap::new(),
        }
    }
}

impl<I: Eq + Hash> SecretRegistry<I> {
    pub fn contains(&self, identity: &I) -> bool {
        self.secrets.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl<I: Eq + Hash + Clone> SecretRegistry<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the secret previously registered for `identity`, if any.
    pub fn register(&self, identity: I, secret: impl Into<SharedSecret>) -> Option<SharedSecret> {
        self.secrets.insert(identity, secret.into())
    }

    pub fn remove(&self, identity: &I) -> Option<SharedSecret> {
        self.secrets.remove(identity).map(|(_, secret)| secret)
    }

    pub fn lookup(&self, identity: &I) -> Result<SharedSecret, AuthError> {
        self.secrets
            .get(identity)
            .map(|secret| secret.clone())
            .ok_or(AuthError::UnknownIdentity)
    }

    pub fn identities(&self) -> Vec<I> {
        self.secrets.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_of_missing_identity_is_unknown_identity() {
        let registry: SecretRegistry<u32> = SecretRegistry::new();
        assert_eq!(registry.lookup(&7).unwrap_err(), AuthError::UnknownIdentity);
    }

    #[test]
    fn register_replaces_and_returns_previous() {
        let registry = SecretRegistry::new();
        assert!(registry.register("alice", "one").is_none());
        let previous = registry.register("alice", "two").expect("previous secret");
        assert_eq!(previous.expose(), "one");
        assert_eq!(registry.lookup(&"alice").expect("registered").expose(), "two");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let secret = SharedSecret::new("hunter2");
        assert!(!format!("{secret:?}").contains("hunter2"));
    }
}
