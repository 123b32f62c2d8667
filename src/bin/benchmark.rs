use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use nonce_auth::config::{DigestAlgorithm, VerifierConfig};
use nonce_auth::error::{AuthError, ChallengeSpaceExhausted};
use nonce_auth::protocol::messages::{Challenge, Response};
use nonce_auth::protocol::prover::compute_response;
use nonce_auth::protocol::verifier::Verifier;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const SECRET: &str = "laChaiseEstRougeLesFraisesAussi";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Concurrent issuance and verification benchmark for the nonce store"
)]
struct BenchmarkCli {
    /// Challenges issued per round
    #[arg(long, default_value_t = 10_000)]
    challenges: usize,
    /// Threads racing to verify every challenge
    #[arg(long, default_value_t = 4)]
    threads: usize,
    #[arg(long, default_value_t = 5)]
    rounds: u32,
    /// Comma-separated digests to benchmark (sha256,sha3-256,blake3)
    #[arg(long, value_delimiter = ',')]
    digests: Option<Vec<DigestAlgorithm>>,
}

struct BenchmarkResult {
    digest: DigestAlgorithm,
    issue_time: Duration,
    verify_time: Duration,
    accepted: usize,
    replayed: usize,
    other: usize,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nonce_auth=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = BenchmarkCli::parse();
    println!("=== Nonce Store Benchmark ===\n");

    let digests = cli.digests.unwrap_or_else(|| {
        vec![DigestAlgorithm::Sha256, DigestAlgorithm::Sha3_256, DigestAlgorithm::Blake3]
    });
    let threads = cli.threads.max(1);

    let progress = ProgressBar::new(u64::from(cli.rounds) * digests.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} rounds {msg}") {
        progress.set_style(style);
    }

    let mut results = Vec::new();
    for &digest in &digests {
        for _ in 0..cli.rounds {
            progress.set_message(digest.to_string());
            match run_round(digest, cli.challenges, threads) {
                Ok(result) => results.push(result),
                Err(err) => progress.println(format!("  ✗ {digest} round failed: {err}")),
            }
            progress.inc(1);
        }
    }
    progress.finish_and_clear();

    println!(
        "{:<10} {:>12} {:>12} {:>10} {:>10} {:>8}",
        "digest", "issue (ms)", "verify (ms)", "accepted", "replayed", "other"
    );
    for result in &results {
        println!(
            "{:<10} {:>12.2} {:>12.2} {:>10} {:>10} {:>8}",
            result.digest.to_string(),
            result.issue_time.as_secs_f64() * 1000.0,
            result.verify_time.as_secs_f64() * 1000.0,
            result.accepted,
            result.replayed,
            result.other
        );
    }

    let failed_rounds = u64::from(cli.rounds) * digests.len() as u64 - results.len() as u64;
    let violations = results
        .iter()
        .filter(|result| result.accepted != cli.challenges)
        .count() as u64
        + failed_rounds;
    if violations > 0 {
        eprintln!("  ✗ {violations} rounds did not accept every challenge exactly once");
        std::process::exit(1);
    }
    println!("\nEvery challenge was accepted exactly once.");
}

fn run_round(
    digest: DigestAlgorithm,
    challenges: usize,
    threads: usize,
) -> Result<BenchmarkResult, ChallengeSpaceExhausted> {
    let config = VerifierConfig {
        expiration_window_ms: 60_000,
        digest,
        ..VerifierConfig::default()
    };
    let verifier: Verifier<usize> = Verifier::new(config);
    let hasher = digest.hasher();

    let start = Instant::now();
    let issued: Vec<(Challenge, Response)> = (0..challenges)
        .into_par_iter()
        .map(|_| -> Result<(Challenge, Response), ChallengeSpaceExhausted> {
            let challenge = verifier.issue_challenge()?;
            let response = compute_response(hasher.as_ref(), &challenge, SECRET);
            Ok((challenge, response))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let issue_time = start.elapsed();

    let accepted = AtomicUsize::new(0);
    let replayed = AtomicUsize::new(0);
    let other = AtomicUsize::new(0);
    let start = Instant::now();
    let scope = crossbeam::thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|_| {
                for (challenge, response) in &issued {
                    match verifier.verify(response, challenge, SECRET) {
                        Ok(true) => accepted.fetch_add(1, Ordering::Relaxed),
                        Err(AuthError::ReplayedNonce) => replayed.fetch_add(1, Ordering::Relaxed),
                        _ => other.fetch_add(1, Ordering::Relaxed),
                    };
                }
            });
        }
    });
    if scope.is_err() {
        eprintln!("  ✗ a verification thread panicked");
    }
    let verify_time = start.elapsed();

    Ok(BenchmarkResult {
        digest,
        issue_time,
        verify_time,
        accepted: accepted.into_inner(),
        replayed: replayed.into_inner(),
        other: other.into_inner(),
    })
}
