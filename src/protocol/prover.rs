use crate::config::DigestAlgorithm;
use crate::crypto::hash::KeyedDigest;
use crate::error::AuthError;
use crate::protocol::messages::{Challenge, Response};
use crate::registry::{SecretRegistry, SharedSecret};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    pub digest: DigestAlgorithm,
}

pub fn compute_response(hasher: &dyn KeyedDigest, challenge: &Challenge, secret: &str) -> Response {
    Response::from(hasher.keyed(challenge.as_str(), secret))
}

/// Answers challenges using secrets shared with known verifiers.
pub struct Prover<I: Eq + Hash> {
    secrets: SecretRegistry<I>,
    hasher: Arc<dyn KeyedDigest>,
}

impl<I: Eq + Hash> fmt::Debug for Prover<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prover")
            .field("verifiers", &self.secrets.len())
            .finish_non_exhaustive()
    }
}

impl<I: Eq + Hash + Clone> Default for Prover<I> {
    fn default() -> Self {
        Prover::new(&ProverConfig::default())
    }
}

impl<I: Eq + Hash + Clone> Prover<I> {
    pub fn new(config: &ProverConfig) -> Self {
        Prover {
            secrets: SecretRegistry::new(),
            hasher: config.digest.hasher(),
        }
    }

    pub fn with_digest(mut self, hasher: Arc<dyn KeyedDigest>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn register(&self, verifier: I, secret: impl Into<SharedSecret>) -> Option<SharedSecret> {
        self.secrets.register(verifier, secret)
    }

    pub fn secrets(&self) -> &SecretRegistry<I> {
        &self.secrets
    }

    pub fn respond(&self, challenge: &Challenge, secret: &str) -> Response {
        compute_response(self.hasher.as_ref(), challenge, secret)
    }

    pub fn respond_for(&self, challenge: &Challenge, verifier: &I) -> Result<Response, AuthError> {
        let secret = self.secrets.lookup(verifier)?;
        Ok(self.respond(challenge, secret.expose()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_counts_verifiers_without_secrets() {
        let prover: Prover<&str> = Prover::default();
        prover.register("server", "hunter2");
        prover.register("backup", "hunter3");
        let rendered = format!("{prover:?}");
        assert!(rendered.contains("verifiers: 2"), "{rendered}");
        assert!(!rendered.contains("hunter"));
    }
}
