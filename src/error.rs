use std::io;

/// Protocol-level rejections surfaced by the verifier.
///
/// A digest mismatch is not represented here: it is the `Ok(false)` outcome of
/// verification. These variants describe misuse of the verifier state or an
/// otherwise-correct response that arrived too late or a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// The challenge was never issued by this verifier, or has been purged.
    #[error("unknown challenge")]
    UnknownChallenge,

    /// No shared secret is registered for the identity.
    #[error("unknown identity")]
    UnknownIdentity,

    /// The response was correct but the challenge had already expired.
    #[error("the nonce is already expired")]
    ExpiredNonce,

    /// The response was correct but the challenge had already been consumed.
    #[error("the nonce has already been used")]
    ReplayedNonce,
}

impl AuthError {
    /// True for rejections of a correct digest because of the challenge state.
    pub fn is_state_violation(&self) -> bool {
        matches!(self, AuthError::ExpiredNonce | AuthError::ReplayedNonce)
    }
}

/// Every draw for a new challenge hit a value the store still holds.
///
/// Existing records are never overwritten, so issuance gives up instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no unused challenge value after {attempts} draws")]
pub struct ChallengeSpaceExhausted {
    pub attempts: u32,
}

/// Failure to run one fixture exchange end to end.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeError {
    #[error(transparent)]
    Issue(#[from] ChallengeSpaceExhausted),

    #[error("prover cannot answer: {0}")]
    Prover(AuthError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config: {0}")]
    Io(#[from] io::Error),

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("transcript io: {0}")]
    Io(#[from] io::Error),

    #[error("encode transcript: {0}")]
    Encode(#[from] bincode::Error),

    #[error("render transcript: {0}")]
    Json(#[from] serde_json::Error),
}
