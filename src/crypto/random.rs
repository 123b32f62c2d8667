use rand::Rng;

pub const DEFAULT_CHALLENGE_LENGTH: usize = 16;

/// ASCII letters, digits and punctuation: 94 printable characters.
pub const CHALLENGE_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Source of unpredictable challenge strings.
pub trait SecureRandom: Send + Sync {
    fn generate(&self, length: usize) -> String;
}

/// Draws from the thread-local CSPRNG, which is seeded from the OS and cannot
/// be reseeded by callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSecureRandom;

impl SecureRandom for ThreadSecureRandom {
    fn generate(&self, length: usize) -> String {
        let mut rng = rand::rng();
        (0..length)
            .map(|_| char::from(CHALLENGE_ALPHABET[rng.random_range(0..CHALLENGE_ALPHABET.len())]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn alphabet_has_letters_digits_and_punctuation() {
        assert_eq!(CHALLENGE_ALPHABET.len(), 94);
        let unique: HashSet<_> = CHALLENGE_ALPHABET.iter().collect();
        assert_eq!(unique.len(), CHALLENGE_ALPHABET.len());
        assert!(CHALLENGE_ALPHABET.iter().all(|b| b.is_ascii_graphic()));
    }

    #[test]
    fn generates_requested_length_from_alphabet() {
        let value = ThreadSecureRandom.generate(DEFAULT_CHALLENGE_LENGTH);
        assert_eq!(value.len(), DEFAULT_CHALLENGE_LENGTH);
        assert!(value.bytes().all(|b| CHALLENGE_ALPHABET.contains(&b)));
    }

    #[test]
    fn consecutive_values_differ() {
        let values: HashSet<String> = (0..256).map(|_| ThreadSecureRandom.generate(16)).collect();
        assert_eq!(values.len(), 256);
    }
}
