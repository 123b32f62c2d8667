pub mod hash;
pub mod random;

pub use hash::{default_keyed_digest, Blake3Digest, KeyedDigest, Sha256Digest, Sha3Digest};
pub use random::{SecureRandom, ThreadSecureRandom, CHALLENGE_ALPHABET, DEFAULT_CHALLENGE_LENGTH};
