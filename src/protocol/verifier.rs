use crate::config::VerifierConfig;
use crate::crypto::hash::KeyedDigest;
use crate::crypto::random::{SecureRandom, ThreadSecureRandom};
use crate::error::{AuthError, ChallengeSpaceExhausted};
use crate::nonce::{Clock, NonceRecord, NonceState, NonceStore, SystemClock};
use crate::protocol::messages::{Challenge, Response};
use crate::registry::{SecretRegistry, SharedSecret};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Issues challenges and checks the responses to them.
///
/// `I` identifies provers for the registry-backed calls
/// ([`Verifier::issue_challenge_for`], [`Verifier::verify_for`]). All methods
/// take `&self`; a verifier can be shared across threads behind an `Arc`.
pub struct Verifier<I: Eq + Hash> {
    configuration: VerifierConfig,
    store: NonceStore,
    secrets: SecretRegistry<I>,
    assignments: DashMap<I, Challenge>,
    random: Arc<dyn SecureRandom>,
    hasher: Arc<dyn KeyedDigest>,
    clock: Arc<dyn Clock>,
}

impl<I: Eq + Hash> fmt::Debug for Verifier<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("configuration", &self.configuration)
            .field("outstanding", &self.store.len())
            .field("assignments", &self.assignments.len())
            .finish_non_exhaustive()
    }
}

impl<I: Eq + Hash + Clone + fmt::Debug> Default for Verifier<I> {
    fn default() -> Self {
        Verifier::new(VerifierConfig::default())
    }
}

impl<I: Eq + Hash + Clone + fmt::Debug> Verifier<I> {
    pub fn new(configuration: VerifierConfig) -> Self {
        let hasher = configuration.digest.hasher();
        Verifier {
            configuration,
            store: NonceStore::new(),
            secrets: SecretRegistry::new(),
            assignments: DashMap::new(),
            random: Arc::new(ThreadSecureRandom),
            hasher,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_random<R: SecureRandom + 'static>(mut self, random: R) -> Self {
        self.random = Arc::new(random);
        self
    }

    pub fn with_clock<C: Clock + 'static>(mut self, clock: Arc<C>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_digest(mut self, hasher: Arc<dyn KeyedDigest>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.configuration
    }

    pub fn register(&self, identity: I, secret: impl Into<SharedSecret>) -> Option<SharedSecret> {
        self.secrets.register(identity, secret)
    }

    pub fn unregister(&self, identity: &I) -> Option<SharedSecret> {
        self.assignments.remove(identity);
        self.secrets.remove(identity)
    }

    pub fn secrets(&self) -> &SecretRegistry<I> {
        &self.secrets
    }

    /// Draws a fresh challenge and records it as issued.
    ///
    /// A draw that hits a value still held by the store is discarded; after
    /// `max_issue_attempts` such draws issuance fails.
    pub fn issue_challenge(&self) -> Result<Challenge, ChallengeSpaceExhausted> {
        let record = NonceRecord::new(self.clock.now(), self.configuration.expiration_window());
        let attempts = self.configuration.max_issue_attempts;
        for attempt in 1..=attempts {
            let challenge = Challenge::from(self.random.generate(self.configuration.challenge_length));
            if self.store.try_insert(challenge.clone(), record) {
                debug!(
                    length = challenge.as_str().len(),
                    outstanding = self.store.len(),
                    "issued challenge"
                );
                return Ok(challenge);
            }
            debug!(attempt, "generated challenge collides with a stored one, drawing again");
        }
        warn!(attempts, outstanding = self.store.len(), "challenge source keeps colliding");
        Err(ChallengeSpaceExhausted { attempts })
    }

    /// Returns the identity's outstanding challenge while it is still
    /// unconsumed and unexpired, otherwise issues and assigns a new one.
    pub fn issue_challenge_for(&self, identity: &I) -> Result<Challenge, ChallengeSpaceExhausted> {
        match self.assignments.entry(identity.clone()) {
            Entry::Occupied(mut entry) => {
                if self.store.state(entry.get().as_str(), self.clock.now()) == Some(NonceState::Issued) {
                    debug!(?identity, "reusing outstanding challenge");
                    return Ok(entry.get().clone());
                }
                let challenge = self.issue_challenge()?;
                entry.insert(challenge.clone());
                Ok(challenge)
            }
            Entry::Vacant(entry) => {
                let challenge = self.issue_challenge()?;
                entry.insert(challenge.clone());
                Ok(challenge)
            }
        }
    }

    /// Checks `response` against `Digest(challenge ++ secret)`.
    ///
    /// `Ok(true)` is returned once per challenge. A wrong digest is `Ok(false)`
    /// regardless of the challenge state; a correct digest for an expired or
    /// already consumed challenge is an error.
    pub fn verify(&self, response: &Response, challenge: &Challenge, secret: &str) -> Result<bool, AuthError> {
        let expected = self.hasher.keyed(challenge.as_str(), secret);
        let matched = response.as_str() == expected;
        let outcome = self.store.redeem(challenge.as_str(), matched, self.clock.now());
        match &outcome {
            Ok(true) => debug!("challenge accepted"),
            Ok(false) => debug!("response digest mismatch"),
            Err(AuthError::ReplayedNonce) => warn!("correct response presented for a consumed challenge"),
            Err(AuthError::ExpiredNonce) => info!("correct response arrived after the challenge expired"),
            Err(err) => debug!(%err, "verification rejected"),
        }
        outcome
    }

    /// Verifies against the challenge last issued to `identity` and the secret
    /// registered for it.
    pub fn verify_for(&self, response: &Response, identity: &I) -> Result<bool, AuthError> {
        let secret = self.secrets.lookup(identity)?;
        let challenge = self
            .assignments
            .get(identity)
            .map(|challenge| challenge.clone())
            .ok_or(AuthError::UnknownChallenge)?;
        self.verify(response, &challenge, secret.expose())
    }

    pub fn challenge_state(&self, challenge: &Challenge) -> Option<NonceState> {
        self.store.state(challenge.as_str(), self.clock.now())
    }

    pub fn assigned_challenge(&self, identity: &I) -> Option<Challenge> {
        self.assignments.get(identity).map(|challenge| challenge.clone())
    }

    /// Number of challenge records currently held, in any state.
    pub fn outstanding(&self) -> usize {
        self.store.len()
    }

    /// Reclaims memory held by expired challenges. Purged challenges verify as
    /// [`AuthError::UnknownChallenge`].
    pub fn purge_expired(&self) -> usize {
        let purged = self.store.purge_expired(self.clock.now());
        self.assignments
            .retain(|_, challenge| self.store.record(challenge.as_str()).is_some());
        if purged > 0 {
            info!(purged, remaining = self.store.len(), "purged expired challenges");
        }
        purged
    }
}
