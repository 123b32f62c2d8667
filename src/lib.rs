pub mod config;
pub mod crypto;
pub mod error;
pub mod nonce;
pub mod protocol;
pub mod registry;
pub mod utils;

pub use config::{DigestAlgorithm, VerifierConfig};
pub use crypto::*;
pub use error::{AuthError, ChallengeSpaceExhausted, ConfigError, ExchangeError, TranscriptError};
pub use nonce::{Clock, ManualClock, NonceRecord, NonceState, NonceStore, SystemClock};
pub use protocol::{
	messages::{Challenge, Response},
	prover::{compute_response, Prover, ProverConfig},
	verifier::Verifier,
};
pub use registry::{SecretRegistry, SharedSecret};
