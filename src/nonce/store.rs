//! Verifier-side nonce state.
//!
//! Each issued challenge owns one [`NonceRecord`]. A record starts `Issued`,
//! becomes `Consumed` on the first accepted response and never goes back.
//! Expiry is not tracked by a timer: a record whose deadline has passed is
//! reported as `Expired` the next time it is looked at.
//!
//! Records live in a sharded [`DashMap`], so issuing unrelated challenges does
//! not contend on a single lock. [`NonceStore::redeem`] holds the shard lock of
//! its key for the whole check-then-consume sequence, which makes acceptance
//! exactly-once under concurrent verification of the same challenge. Records
//! are only ever inserted into vacant keys, so a consumed record cannot be
//! brought back by a later issuance.

use crate::error::AuthError;
use crate::protocol::messages::Challenge;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceState {
    Issued,
    Consumed,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceRecord {
    pub issued_at: Instant,
    pub expires_at: Instant,
    pub consumed: bool,
}

impl NonceRecord {
    pub fn new(now: Instant, window: Duration) -> Self {
        NonceRecord {
            issued_at: now,
            expires_at: now + window,
            consumed: false,
        }
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    pub fn state(&self, now: Instant) -> NonceState {
        if self.consumed {
            NonceState::Consumed
        } else if self.is_fresh(now) {
            NonceState::Issued
        } else {
            NonceState::Expired
        }
    }
}

#[derive(Debug, Default)]
pub struct NonceStore {
    records: DashMap<Challenge, NonceRecord>,
}

impl NonceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record` under `challenge` unless the key is already present.
    /// Returns whether the record was inserted.
    pub fn try_insert(&self, challenge: Challenge, record: NonceRecord) -> bool {
        match self.records.entry(challenge) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(record);
                true
            }
        }
    }

    /// Settles a verification attempt against the stored record.
    ///
    /// `matched` is whether the presented response equals the expected digest.
    /// A mismatch is `Ok(false)` whatever the record state; only a matching
    /// response can consume the record or learn that it is expired or used.
    pub fn redeem(&self, challenge: &str, matched: bool, now: Instant) -> Result<bool, AuthError> {
        let mut record = self
            .records
            .get_mut(challenge)
            .ok_or(AuthError::UnknownChallenge)?;

        if !matched {
            return Ok(false);
        }

        let fresh = record.is_fresh(now);
        if !record.consumed && fresh {
            record.consumed = true;
            Ok(true)
        } else if !fresh {
            Err(AuthError::ExpiredNonce)
        } else {
            Err(AuthError::ReplayedNonce)
        }
    }

    pub fn record(&self, challenge: &str) -> Option<NonceRecord> {
        self.records.get(challenge).map(|record| *record)
    }

    pub fn state(&self, challenge: &str, now: Instant) -> Option<NonceState> {
        self.records.get(challenge).map(|record| record.state(now))
    }

    /// Drops every record whose deadline has passed, consumed or not.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| record.is_fresh(now));
        before.saturating_sub(self.records.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(1);

    fn store_with(challenge: &str, now: Instant) -> NonceStore {
        let store = NonceStore::new();
        assert!(store.try_insert(Challenge::from(challenge), NonceRecord::new(now, WINDOW)));
        store
    }

    #[test]
    fn matching_response_consumes_once() {
        let now = Instant::now();
        let store = store_with("n1", now);

        assert_eq!(store.redeem("n1", true, now), Ok(true));
        assert_eq!(store.state("n1", now), Some(NonceState::Consumed));
        assert_eq!(store.redeem("n1", true, now), Err(AuthError::ReplayedNonce));
    }

    #[test]
    fn mismatch_never_reveals_state() {
        let now = Instant::now();
        let store = store_with("n1", now);

        assert_eq!(store.redeem("n1", false, now), Ok(false));
        assert_eq!(store.state("n1", now), Some(NonceState::Issued));

        store.redeem("n1", true, now).expect("first match accepted");
        assert_eq!(store.redeem("n1", false, now), Ok(false));
        assert_eq!(store.redeem("n1", false, now + WINDOW * 2), Ok(false));
    }

    #[test]
    fn expiry_wins_over_replay() {
        let now = Instant::now();
        let store = store_with("n1", now);
        store.redeem("n1", true, now).expect("first match accepted");

        assert_eq!(store.redeem("n1", true, now + WINDOW), Err(AuthError::ExpiredNonce));
        // consumed stays terminal even after the deadline
        assert_eq!(store.state("n1", now + WINDOW), Some(NonceState::Consumed));
    }

    #[test]
    fn expired_at_exact_deadline() {
        let now = Instant::now();
        let store = store_with("n1", now);
        assert_eq!(store.state("n1", now + WINDOW), Some(NonceState::Expired));
        assert_eq!(store.redeem("n1", true, now + WINDOW), Err(AuthError::ExpiredNonce));
        assert_eq!(store.state("n1", now + WINDOW), Some(NonceState::Expired));
    }

    #[test]
    fn unknown_challenge_is_an_error_even_on_mismatch() {
        let store = NonceStore::new();
        let now = Instant::now();
        assert_eq!(store.redeem("missing", true, now), Err(AuthError::UnknownChallenge));
        assert_eq!(store.redeem("missing", false, now), Err(AuthError::UnknownChallenge));
    }

    #[test]
    fn try_insert_refuses_occupied_keys() {
        let now = Instant::now();
        let store = store_with("n1", now);
        assert!(!store.try_insert(Challenge::from("n1"), NonceRecord::new(now, WINDOW)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn purge_drops_expired_records_only() {
        let now = Instant::now();
        let store = store_with("old", now);
        let later = now + Duration::from_millis(600);
        assert!(store.try_insert(Challenge::from("new"), NonceRecord::new(later, WINDOW)));

        assert_eq!(store.purge_expired(now + WINDOW), 1);
        assert_eq!(store.len(), 1);
        assert!(store.record("old").is_none());
        assert_eq!(store.redeem("old", true, now + WINDOW), Err(AuthError::UnknownChallenge));
    }
}
