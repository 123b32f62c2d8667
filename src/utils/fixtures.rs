//! Deterministic provers, verifiers and challenge sources for demos and tests.

use crate::config::VerifierConfig;
use crate::crypto::random::{SecureRandom, ThreadSecureRandom};
use crate::error::ExchangeError;
use crate::protocol::prover::{Prover, ProverConfig};
use crate::protocol::verifier::Verifier;
use crate::utils::serialization::{ExchangeOutcome, ExchangeRecord};
use std::collections::VecDeque;
use std::sync::Mutex;

pub const DEMO_PASSWORDS: [&str; 5] = [
    "laChaiseEstRougeLesFraisesAussi",
    "LeVioletEstUneJolieCouleur",
    "JeVousConseilleDEcouterLeGroupePalace",
    "CestDeLaMusiqueTresAgreablePourUneDimanchePluvieux",
    "LeoWyndhamMattHodgesAndRupertTurner",
];

/// Hands out queued challenge values, then falls back to the secure source.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    queued: Mutex<VecDeque<String>>,
}

impl ScriptedRandom {
    pub fn new<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        ScriptedRandom {
            queued: Mutex::new(values.into_iter().map(Into::into).collect()),
        }
    }
}

impl SecureRandom for ScriptedRandom {
    fn generate(&self, length: usize) -> String {
        let next = match self.queued.lock() {
            Ok(mut queued) => queued.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        next.unwrap_or_else(|| ThreadSecureRandom.generate(length))
    }
}

pub fn prover_name(index: usize) -> String {
    format!("prover-{index}")
}

pub fn verifier_name(index: usize) -> String {
    format!("verifier-{index}")
}

/// How a linked prover and verifier were provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// Both sides hold the same secret.
    Shared,
    /// The prover holds an outdated secret for this verifier.
    StaleSecret,
    /// The prover knows the verifier, the verifier never registered the prover.
    Unregistered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub prover: usize,
    pub verifier: usize,
    pub pairing: Pairing,
}

/// Provers and verifiers with pre-shared secrets.
///
/// Prover `p` is linked to verifier `v` when `v == p % verifiers` or `(p + v)`
/// is even; the pair shares `DEMO_PASSWORDS[(p + v) % 5]`. Links with
/// `(p + v) % 5 == 3` give the prover a stale secret, and links with
/// `(p * verifiers + v) % 7 == 6` are left unregistered on the verifier.
#[derive(Debug)]
pub struct Deployment {
    pub provers: Vec<Prover<String>>,
    pub verifiers: Vec<Verifier<String>>,
    links: Vec<Link>,
}

impl Deployment {
    pub fn generate(provers: usize, verifiers: usize, config: &VerifierConfig) -> Self {
        let prover_config = ProverConfig {
            digest: config.digest,
        };
        let prover_list: Vec<Prover<String>> =
            (0..provers).map(|_| Prover::new(&prover_config)).collect();
        let verifier_list: Vec<Verifier<String>> =
            (0..verifiers).map(|_| Verifier::new(config.clone())).collect();

        let mut links = Vec::new();
        if verifiers > 0 {
            for (p, prover) in prover_list.iter().enumerate() {
                for (v, verifier) in verifier_list.iter().enumerate() {
                    if v != p % verifiers && (p + v) % 2 != 0 {
                        continue;
                    }
                    let password = DEMO_PASSWORDS[(p + v) % DEMO_PASSWORDS.len()];
                    let pairing = if (p + v) % 5 == 3 {
                        Pairing::StaleSecret
                    } else if (p * verifiers + v) % 7 == 6 {
                        Pairing::Unregistered
                    } else {
                        Pairing::Shared
                    };
                    match pairing {
                        Pairing::Shared => {
                            prover.register(verifier_name(v), password);
                            verifier.register(prover_name(p), password);
                        }
                        Pairing::StaleSecret => {
                            let stale = DEMO_PASSWORDS[(p + v + 1) % DEMO_PASSWORDS.len()];
                            prover.register(verifier_name(v), stale);
                            verifier.register(prover_name(p), password);
                        }
                        Pairing::Unregistered => {
                            prover.register(verifier_name(v), password);
                        }
                    }
                    links.push(Link {
                        prover: p,
                        verifier: v,
                        pairing,
                    });
                }
            }
        }

        Deployment {
            provers: prover_list,
            verifiers: verifier_list,
            links,
        }
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link_for_round(&self, round: usize) -> Option<Link> {
        if self.links.is_empty() {
            return None;
        }
        self.links.get((round * 3) % self.links.len()).copied()
    }

    /// Runs one registry-backed exchange over `link`.
    pub fn exchange(&self, link: Link) -> Result<ExchangeRecord, ExchangeError> {
        let verifier = &self.verifiers[link.verifier];
        let prover_id = prover_name(link.prover);
        let verifier_id = verifier_name(link.verifier);

        let challenge = verifier.issue_challenge_for(&prover_id)?;
        let response = self.provers[link.prover]
            .respond_for(&challenge, &verifier_id)
            .map_err(ExchangeError::Prover)?;
        let result = verifier.verify_for(&response, &prover_id);
        Ok(ExchangeRecord {
            verifier: verifier_id,
            prover: prover_id,
            challenge,
            response,
            outcome: ExchangeOutcome::from(&result),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_values_come_first() {
        let random = ScriptedRandom::new(["abc123", "def456"]);
        assert_eq!(random.generate(16), "abc123");
        assert_eq!(random.generate(16), "def456");
        assert_eq!(random.generate(16).len(), 16);
    }

    #[test]
    fn every_prover_knows_at_least_one_verifier() {
        let deployment = Deployment::generate(10, 3, &VerifierConfig::default());
        for p in 0..10 {
            assert!(deployment.links().iter().any(|link| link.prover == p));
        }
        for link in deployment.links() {
            assert!(deployment.provers[link.prover]
                .secrets()
                .contains(&verifier_name(link.verifier)));
            let registered = deployment.verifiers[link.verifier]
                .secrets()
                .contains(&prover_name(link.prover));
            assert_eq!(registered, link.pairing != Pairing::Unregistered);
        }
    }

    #[test]
    fn every_pairing_kind_is_provisioned() {
        let deployment = Deployment::generate(10, 3, &VerifierConfig::default());
        for pairing in [Pairing::Shared, Pairing::StaleSecret, Pairing::Unregistered] {
            assert!(deployment.links().iter().any(|link| link.pairing == pairing));
        }
    }
}
