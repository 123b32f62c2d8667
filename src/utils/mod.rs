pub mod fixtures;
pub mod serialization;

pub use fixtures::{Deployment, Link, Pairing, ScriptedRandom, DEMO_PASSWORDS};
pub use serialization::{
    load_transcript, save_transcript, transcript_to_json, ExchangeOutcome, ExchangeRecord,
    Transcript,
};
