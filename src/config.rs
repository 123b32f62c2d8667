use crate::crypto::hash::{Blake3Digest, KeyedDigest, Sha256Digest, Sha3Digest};
use crate::crypto::random::DEFAULT_CHALLENGE_LENGTH;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_EXPIRATION_WINDOW_MS: u64 = 1_000;
pub const DEFAULT_MAX_ISSUE_ATTEMPTS: u32 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    #[serde(rename = "sha3-256", alias = "sha3")]
    Sha3_256,
    Blake3,
}

impl DigestAlgorithm {
    pub fn hasher(self) -> Arc<dyn KeyedDigest> {
        match self {
            DigestAlgorithm::Sha256 => Arc::new(Sha256Digest),
            DigestAlgorithm::Sha3_256 => Arc::new(Sha3Digest),
            DigestAlgorithm::Blake3 => Arc::new(Blake3Digest),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestAlgorithm::Sha256 => write!(f, "sha256"),
            DigestAlgorithm::Sha3_256 => write!(f, "sha3-256"),
            DigestAlgorithm::Blake3 => write!(f, "blake3"),
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            "sha3" | "sha3-256" | "sha3_256" => Ok(DigestAlgorithm::Sha3_256),
            "blake3" => Ok(DigestAlgorithm::Blake3),
            other => Err(format!("unknown digest algorithm '{other}'")),
        }
    }
}

/// Verifier settings, loadable from TOML.
///
/// ```toml
/// expiration_window_ms = 1000
/// challenge_length = 16
/// digest = "sha256"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub expiration_window_ms: u64,
    pub challenge_length: usize,
    pub digest: DigestAlgorithm,
    /// Draws allowed when a generated challenge collides with a stored one.
    pub max_issue_attempts: u32,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        VerifierConfig {
            expiration_window_ms: DEFAULT_EXPIRATION_WINDOW_MS,
            challenge_length: DEFAULT_CHALLENGE_LENGTH,
            digest: DigestAlgorithm::default(),
            max_issue_attempts: DEFAULT_MAX_ISSUE_ATTEMPTS,
        }
    }
}

impl VerifierConfig {
    pub fn with_expiration_window(mut self, window: Duration) -> Self {
        self.expiration_window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn expiration_window(&self) -> Duration {
        Duration::from_millis(self.expiration_window_ms)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: VerifierConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expiration_window_ms == 0 {
            return Err(ConfigError::Invalid("expiration_window_ms must be positive"));
        }
        if self.challenge_length == 0 {
            return Err(ConfigError::Invalid("challenge_length must be positive"));
        }
        if self.max_issue_attempts == 0 {
            return Err(ConfigError::Invalid("max_issue_attempts must be positive"));
        }
        Ok(())
    }
}
