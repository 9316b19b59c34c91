//! # Algorithm — Sieve Algorithm Selection
//!
//! The five interchangeable prime-enumeration algorithms, identified on the
//! command line either by numeric id (0–4) or by name. The choice is always
//! explicit; nothing is picked automatically from the input size.
//!
//! | Id | Name | Direct-to-stream |
//! |----|------|------------------|
//! | 0 | `trial-division` | no |
//! | 1 | `eratosthenes` | yes |
//! | 2 | `euler` | no |
//! | 3 | `sundaram` | yes |
//! | 4 | `incremental` | no |
//!
//! Trial division and the incremental sieve read back the primes they have
//! already found, and Euler's linear sieve walks its own prime list for every
//! candidate, so those three must materialize the list. Eratosthenes and
//! Sundaram only consult their bit array and can push primes straight to a sink.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SieveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    TrialDivision,
    Eratosthenes,
    Euler,
    Sundaram,
    Incremental,
}

impl Algorithm {
    /// All algorithms in id order.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::TrialDivision,
        Algorithm::Eratosthenes,
        Algorithm::Euler,
        Algorithm::Sundaram,
        Algorithm::Incremental,
    ];

    pub fn from_id(id: u8) -> Result<Self, SieveError> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(SieveError::InvalidAlgorithm { id })
    }

    pub fn id(self) -> u8 {
        match self {
            Algorithm::TrialDivision => 0,
            Algorithm::Eratosthenes => 1,
            Algorithm::Euler => 2,
            Algorithm::Sundaram => 3,
            Algorithm::Incremental => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::TrialDivision => "trial-division",
            Algorithm::Eratosthenes => "eratosthenes",
            Algorithm::Euler => "euler",
            Algorithm::Sundaram => "sundaram",
            Algorithm::Incremental => "incremental",
        }
    }

    /// Whether the algorithm can emit primes directly to a sink without
    /// holding the discovered list in memory.
    pub fn supports_streaming(self) -> bool {
        matches!(self, Algorithm::Eratosthenes | Algorithm::Sundaram)
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Algorithm {
    type Error = SieveError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Algorithm::from_id(id)
    }
}

impl FromStr for Algorithm {
    type Err = String;

    /// Accepts a numeric id or a name, case-insensitively. Underscores are
    /// treated like dashes so `trial_division` also parses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u8>() {
            return Algorithm::from_id(id).map_err(|e| e.to_string());
        }
        let normalized = s.to_ascii_lowercase().replace('_', "-");
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown algorithm '{}' (expected 0-4 or one of: {})",
                    s,
                    Algorithm::ALL.map(Algorithm::name).join(", ")
                )
            })
    }
}
