use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Opaque single-use value sent from the verifier to the prover.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Challenge(String);

impl Challenge {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for Challenge {
    fn from(value: String) -> Self {
        Challenge(value)
    }
}

impl From<&str> for Challenge {
    fn from(value: &str) -> Self {
        Challenge(value.to_owned())
    }
}

impl Borrow<str> for Challenge {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Challenge {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex digest of `challenge ++ secret`, sent from the prover to the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Response(String);

impl Response {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Response {
    fn from(value: String) -> Self {
        Response(value)
    }
}

impl From<&str> for Response {
    fn from(value: &str) -> Self {
        Response(value.to_owned())
    }
}

impl AsRef<str> for Response {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
