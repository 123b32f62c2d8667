use crate::config::VerifierConfig;
use crate::error::{AuthError, TranscriptError};
use crate::protocol::messages::{Challenge, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeOutcome {
    Accepted,
    Rejected,
    Expired,
    Replayed,
    UnknownChallenge,
    UnknownIdentity,
}

impl From<&Result<bool, AuthError>> for ExchangeOutcome {
    fn from(result: &Result<bool, AuthError>) -> Self {
        match result {
            Ok(true) => ExchangeOutcome::Accepted,
            Ok(false) => ExchangeOutcome::Rejected,
            Err(AuthError::ExpiredNonce) => ExchangeOutcome::Expired,
            Err(AuthError::ReplayedNonce) => ExchangeOutcome::Replayed,
            Err(AuthError::UnknownChallenge) => ExchangeOutcome::UnknownChallenge,
            Err(AuthError::UnknownIdentity) => ExchangeOutcome::UnknownIdentity,
        }
    }
}

impl fmt::Display for ExchangeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExchangeOutcome::Accepted => "accepted",
            ExchangeOutcome::Rejected => "rejected",
            ExchangeOutcome::Expired => "expired nonce",
            ExchangeOutcome::Replayed => "replayed nonce",
            ExchangeOutcome::UnknownChallenge => "unknown challenge",
            ExchangeOutcome::UnknownIdentity => "unknown identity",
        };
        f.write_str(label)
    }
}

/// One challenge/response exchange as seen by the verifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub verifier: String,
    pub prover: String,
    pub challenge: Challenge,
    pub response: Response,
    pub outcome: ExchangeOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub config: VerifierConfig,
    pub exchanges: Vec<ExchangeRecord>,
}

impl Transcript {
    pub fn new(config: VerifierConfig) -> Self {
        Transcript {
            config,
            exchanges: Vec::new(),
        }
    }

    pub fn record(&mut self, exchange: ExchangeRecord) {
        self.exchanges.push(exchange);
    }

    pub fn count(&self, outcome: ExchangeOutcome) -> usize {
        self.exchanges
            .iter()
            .filter(|exchange| exchange.outcome == outcome)
            .count()
    }
}

pub fn save_transcript<P: AsRef<Path>>(path: P, transcript: &Transcript) -> Result<(), TranscriptError> {
    let bytes = bincode::serialize(transcript)?;
    let mut file = fs::File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}

pub fn load_transcript<P: AsRef<Path>>(path: P) -> Result<Transcript, TranscriptError> {
    let bytes = fs::read(path)?;
    Ok(bincode::deserialize(&bytes)?)
}

pub fn transcript_to_json(transcript: &Transcript) -> Result<String, TranscriptError> {
    Ok(serde_json::to_string_pretty(transcript)?)
}
