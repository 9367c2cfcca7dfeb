//! Proving system identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ZkError;

/// Proving systems accepted by the verifier.
///
/// `Fflonk` is an accepted tag only: its proofs carry the PLONK commitment
/// shape and are checked with the PLONK routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvingSystem {
    Groth16,
    Plonk,
    Fflonk,
}

/// The cryptographic routine a proving system is checked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationRoutine {
    Groth16,
    Plonk,
}

impl ProvingSystem {
    pub const ALL: [ProvingSystem; 3] = [Self::Groth16, Self::Plonk, Self::Fflonk];

    /// Value of the `protocol` field snarkjs writes into proofs and keys.
    pub fn protocol_tag(self) -> &'static str {
        match self {
            Self::Groth16 => "groth16",
            Self::Plonk => "plonk",
            Self::Fflonk => "fflonk",
        }
    }

    pub fn routine(self) -> VerificationRoutine {
        match self {
            Self::Groth16 => VerificationRoutine::Groth16,
            Self::Plonk | Self::Fflonk => VerificationRoutine::Plonk,
        }
    }
}

impl fmt::Display for ProvingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.protocol_tag())
    }
}

impl FromStr for ProvingSystem {
    type Err = ZkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|system| system.protocol_tag() == tag)
            .ok_or_else(|| ZkError::UnsupportedSystem(s.to_string()))
    }
}
