use nonce_auth::config::VerifierConfig;
use nonce_auth::crypto::hash::default_keyed_digest;
use nonce_auth::error::AuthError;
use nonce_auth::protocol::messages::{Challenge, Response};
use nonce_auth::protocol::prover::compute_response;
use nonce_auth::protocol::verifier::Verifier;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const SECRET: &str = "LeVioletEstUneJolieCouleur";

fn long_lived_verifier() -> Verifier<usize> {
    Verifier::new(VerifierConfig::default().with_expiration_window(Duration::from_secs(60)))
}

fn issue_batch(verifier: &Verifier<usize>, count: usize) -> Vec<(Challenge, Response)> {
    (0..count)
        .map(|_| {
            let challenge = verifier.issue_challenge().expect("challenge issued");
            let response = compute_response(&default_keyed_digest(), &challenge, SECRET);
            (challenge, response)
        })
        .collect()
}

fn race_verification(challenges: usize, threads: usize) {
    let verifier = long_lived_verifier();
    let batch = issue_batch(&verifier, challenges);
    let accepted = AtomicUsize::new(0);
    let replayed = AtomicUsize::new(0);

    crossbeam::thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|_| {
                for (challenge, response) in &batch {
                    match verifier.verify(response, challenge, SECRET) {
                        Ok(true) => {
                            accepted.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(AuthError::ReplayedNonce) => {
                            replayed.fetch_add(1, Ordering::SeqCst);
                        }
                        other => panic!("unexpected verification outcome {other:?}"),
                    }
                }
            });
        }
    })
    .expect("verification threads");

    assert_eq!(accepted.load(Ordering::SeqCst), challenges);
    assert_eq!(replayed.load(Ordering::SeqCst), challenges * (threads - 1));
}

#[test]
fn concurrent_verification_accepts_each_challenge_once() {
    race_verification(200, 8);
}

#[test]
fn concurrent_issuance_yields_distinct_challenges() {
    let verifier = long_lived_verifier();
    let seen = Mutex::new(HashSet::new());

    crossbeam::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|_| {
                let batch: Vec<Challenge> = (0..250)
                    .map(|_| verifier.issue_challenge().expect("challenge issued"))
                    .collect();
                seen.lock().expect("seen set").extend(batch);
            });
        }
    })
    .expect("issuing threads");

    assert_eq!(seen.lock().expect("seen set").len(), 2_000);
    assert_eq!(verifier.outstanding(), 2_000);
}

#[test]
fn concurrent_issue_for_same_identity_converges() {
    let verifier = long_lived_verifier();
    verifier.register(1, SECRET);
    let seen = Mutex::new(HashSet::new());

    crossbeam::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|_| {
                let challenge = verifier.issue_challenge_for(&1).expect("challenge issued");
                seen.lock().expect("seen set").insert(challenge);
            });
        }
    })
    .expect("issuing threads");

    assert_eq!(seen.lock().expect("seen set").len(), 1);
    assert_eq!(verifier.outstanding(), 1);
}

#[cfg_attr(
    not(feature = "stress-tests"),
    ignore = "set --features stress-tests to enable large runs"
)]
#[test]
fn concurrent_verification_accepts_each_challenge_once_at_scale() {
    race_verification(50_000, 16);
}

#[cfg_attr(
    not(feature = "stress-tests"),
    ignore = "set --features stress-tests to enable large runs"
)]
#[test]
fn sweep_while_verifying_never_double_accepts() {
    let verifier = Verifier::<usize>::new(
        VerifierConfig::default().with_expiration_window(Duration::from_millis(50)),
    );
    let batch = issue_batch(&verifier, 20_000);
    let acceptances: Vec<AtomicUsize> = batch.iter().map(|_| AtomicUsize::new(0)).collect();

    crossbeam::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|_| {
                for (index, (challenge, response)) in batch.iter().enumerate() {
                    if verifier.verify(response, challenge, SECRET) == Ok(true) {
                        acceptances[index].fetch_add(1, Ordering::SeqCst);
                    }
                }
            });
        }
        scope.spawn(|_| {
            for _ in 0..100 {
                verifier.purge_expired();
            }
        });
    })
    .expect("worker threads");

    for (index, count) in acceptances.iter().enumerate() {
        let count = count.load(Ordering::SeqCst);
        assert!(count <= 1, "challenge {index} accepted {count} times");
    }
}
