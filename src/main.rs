use clap::{Parser, Subcommand, ValueEnum};
use nonce_auth::config::{DigestAlgorithm, VerifierConfig};
use nonce_auth::crypto::random::{SecureRandom, ThreadSecureRandom};
use nonce_auth::error::ExchangeError;
use nonce_auth::protocol::messages::Challenge;
use nonce_auth::protocol::prover::{compute_response, Prover, ProverConfig};
use nonce_auth::protocol::verifier::Verifier;
use nonce_auth::utils::fixtures::{prover_name, verifier_name, Deployment, DEMO_PASSWORDS};
use nonce_auth::utils::serialization::{
    load_transcript, save_transcript, transcript_to_json, ExchangeOutcome, ExchangeRecord,
    Transcript,
};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(author, version, about = "Shared-secret challenge-response authentication demo", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    /// One prover, one verifier: accept, replay, expire
    Single,
    /// One pair using the identity registries
    Registry,
    /// Several provers against several verifiers
    Multi,
    All,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demonstration exchanges in-process
    Demo {
        #[arg(value_enum, default_value_t = Scenario::All)]
        scenario: Scenario,
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        #[arg(long, help = "Challenge lifetime in milliseconds")]
        window_ms: Option<u64>,
        #[arg(long)]
        digest: Option<DigestAlgorithm>,
        #[arg(long, default_value_t = 10)]
        provers: usize,
        #[arg(long, default_value_t = 3)]
        verifiers: usize,
        #[arg(long, default_value_t = 10)]
        rounds: usize,
        #[arg(short, long, value_name = "FILE", help = "Write the exchange transcript here")]
        transcript: Option<PathBuf>,
    },
    /// Print freshly generated challenge values
    Challenge {
        #[arg(long, default_value_t = 16)]
        length: usize,
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Compute the response for a challenge and secret
    Respond {
        challenge: String,
        secret: String,
        #[arg(long, default_value_t = DigestAlgorithm::Sha256)]
        digest: DigestAlgorithm,
    },
    /// Print a stored transcript
    Inspect {
        #[arg(value_name = "FILE")]
        transcript: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nonce_auth=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Demo {
            scenario,
            config,
            window_ms,
            digest,
            provers,
            verifiers,
            rounds,
            transcript,
        } => {
            let mut configuration = match config {
                Some(path) => VerifierConfig::load(path)?,
                None => VerifierConfig::default(),
            };
            if let Some(window_ms) = window_ms {
                configuration.expiration_window_ms = window_ms;
            }
            if let Some(digest) = digest {
                configuration.digest = digest;
            }
            configuration.validate()?;
            run_demo(scenario, configuration, provers, verifiers, rounds, transcript)?
        }
        Commands::Challenge { length, count } => run_challenge(length, count),
        Commands::Respond {
            challenge,
            secret,
            digest,
        } => run_respond(challenge, secret, digest),
        Commands::Inspect { transcript, json } => run_inspect(transcript, json)?,
    }
    Ok(())
}

fn run_demo(
    scenario: Scenario,
    configuration: VerifierConfig,
    provers: usize,
    verifiers: usize,
    rounds: usize,
    transcript_path: Option<PathBuf>,
) -> CliResult<()> {
    let mut transcript = Transcript::new(configuration.clone());
    if matches!(scenario, Scenario::Multi | Scenario::All) {
        run_multi(&configuration, provers, verifiers, rounds, &mut transcript)?;
    }
    if matches!(scenario, Scenario::Registry | Scenario::All) {
        run_registry(&configuration, &mut transcript)?;
    }
    if matches!(scenario, Scenario::Single | Scenario::All) {
        run_single(&configuration, &mut transcript)?;
    }

    println!(
        "{} exchanges: {} accepted, {} rejected, {} replayed, {} expired, {} unknown identity",
        transcript.exchanges.len(),
        transcript.count(ExchangeOutcome::Accepted),
        transcript.count(ExchangeOutcome::Rejected),
        transcript.count(ExchangeOutcome::Replayed),
        transcript.count(ExchangeOutcome::Expired),
        transcript.count(ExchangeOutcome::UnknownIdentity),
    );
    if let Some(path) = transcript_path {
        save_transcript(&path, &transcript)?;
        println!("Transcript saved to {}", path.display());
    }
    Ok(())
}

fn run_single(configuration: &VerifierConfig, transcript: &mut Transcript) -> CliResult<()> {
    println!("Single prover-verifier challenge-response");
    let verifier: Verifier<String> = Verifier::new(configuration.clone());
    let prover: Prover<String> = Prover::new(&ProverConfig {
        digest: configuration.digest,
    });
    let password = DEMO_PASSWORDS[0];
    prover.register(verifier_name(0), password);
    verifier.register(prover_name(0), password);

    let challenge = verifier.issue_challenge()?;
    println!("\tverifier challenge: {challenge}");
    let response = prover.respond(&challenge, password);
    println!("\tprover response: {response}");

    let mut exchange = |label: &str, challenge: &Challenge| {
        let response = prover.respond(challenge, password);
        let result = verifier.verify(&response, challenge, password);
        match &result {
            Ok(accepted) => println!("\t{label}: accepted = {accepted}"),
            Err(err) => println!("\t{label}: {err}"),
        }
        transcript.record(ExchangeRecord {
            verifier: verifier_name(0),
            prover: prover_name(0),
            challenge: challenge.clone(),
            response,
            outcome: ExchangeOutcome::from(&result),
        });
    };

    exchange("first answer", &challenge);
    exchange("replayed answer", &challenge);
    thread::sleep(configuration.expiration_window() + Duration::from_millis(100));
    exchange("late answer", &challenge);

    let fresh = verifier.issue_challenge()?;
    thread::sleep(configuration.expiration_window() + Duration::from_millis(100));
    exchange("late answer to an unused challenge", &fresh);
    println!();
    Ok(())
}

fn run_registry(configuration: &VerifierConfig, transcript: &mut Transcript) -> CliResult<()> {
    println!("Single prover-verifier challenge-response using the registries");
    let deployment = Deployment::generate(1, 1, configuration);
    let verifier = &deployment.verifiers[0];
    let prover = &deployment.provers[0];
    let prover_id = prover_name(0);
    let verifier_id = verifier_name(0);

    let challenge = verifier.issue_challenge_for(&prover_id)?;
    println!("\tverifier challenge: {challenge}");
    let again = verifier.issue_challenge_for(&prover_id)?;
    println!("\tre-requested challenge is unchanged: {}", again == challenge);

    match prover.respond_for(&challenge, &verifier_id) {
        Ok(response) => {
            println!("\tprover response: {response}");
            let result = verifier.verify_for(&response, &prover_id);
            match &result {
                Ok(accepted) => println!("\taccepted = {accepted}"),
                Err(err) => println!("\t{err}"),
            }
            transcript.record(ExchangeRecord {
                verifier: verifier_id,
                prover: prover_id,
                challenge,
                response,
                outcome: ExchangeOutcome::from(&result),
            });
        }
        Err(err) => println!("\tprover cannot answer: {err}"),
    }
    println!();
    Ok(())
}

fn run_multi(
    configuration: &VerifierConfig,
    provers: usize,
    verifiers: usize,
    rounds: usize,
    transcript: &mut Transcript,
) -> CliResult<()> {
    println!("Multi prover-verifier challenge-response");
    let deployment = Deployment::generate(provers, verifiers, configuration);
    for round in 0..rounds {
        let Some(link) = deployment.link_for_round(round) else {
            println!("\tno prover is linked to any verifier");
            break;
        };
        println!(
            "Round {}: {} -> {} ({:?})",
            round + 1,
            prover_name(link.prover),
            verifier_name(link.verifier),
            link.pairing
        );
        let exchange = match deployment.exchange(link) {
            Ok(exchange) => exchange,
            Err(ExchangeError::Prover(err)) => {
                println!("\tprover cannot answer: {err}\n");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        println!("\tverifier challenge: {}", exchange.challenge);
        println!("\tprover response: {}", exchange.response);
        println!("\toutcome: {}\n", exchange.outcome);
        transcript.record(exchange);
    }
    Ok(())
}

fn run_challenge(length: usize, count: usize) {
    for _ in 0..count {
        println!("{}", ThreadSecureRandom.generate(length));
    }
}

fn run_respond(challenge: String, secret: String, digest: DigestAlgorithm) {
    let hasher = digest.hasher();
    let response = compute_response(hasher.as_ref(), &Challenge::from(challenge), &secret);
    println!("{response}");
}

fn run_inspect(path: PathBuf, json: bool) -> CliResult<()> {
    let transcript = load_transcript(&path)?;
    if json {
        println!("{}", transcript_to_json(&transcript)?);
        return Ok(());
    }
    println!(
        "Transcript {} (window {} ms, {} digest, {}-character challenges)",
        path.display(),
        transcript.config.expiration_window_ms,
        transcript.config.digest,
        transcript.config.challenge_length
    );
    for (index, exchange) in transcript.exchanges.iter().enumerate() {
        println!(
            "  {:>3}. {} -> {}: {} [{}]",
            index + 1,
            exchange.prover,
            exchange.verifier,
            exchange.outcome,
            exchange.challenge
        );
    }
    Ok(())
}
