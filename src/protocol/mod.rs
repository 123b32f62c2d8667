pub mod messages;
pub mod prover;
pub mod verifier;

pub use messages::{Challenge, Response};
pub use prover::{compute_response, Prover, ProverConfig};
pub use verifier::Verifier;
