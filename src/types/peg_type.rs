//! Denomination tags for pegged assets

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The denomination a pegged asset tracks
///
/// Exactly one peg type is active per reconciliation run; balances may carry
/// others but only the active one is read.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PegType {
    #[default]
    #[serde(rename = "peggedUSD")]
    Usd,
    #[serde(rename = "peggedEUR")]
    Eur,
    #[serde(rename = "peggedGOLD")]
    Gold,
    #[serde(rename = "peggedCHF")]
    Chf,
    #[serde(rename = "peggedVAR")]
    Variable,
}

impl PegType {
    pub const ALL: [PegType; 5] = [
        PegType::Usd,
        PegType::Eur,
        PegType::Gold,
        PegType::Chf,
        PegType::Variable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PegType::Usd => "peggedUSD",
            PegType::Eur => "peggedEUR",
            PegType::Gold => "peggedGOLD",
            PegType::Chf => "peggedCHF",
            PegType::Variable => "peggedVAR",
        }
    }
}

impl fmt::Display for PegType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PegType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PegType::ALL
            .iter()
            .copied()
            .find(|peg| peg.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = PegType::ALL.iter().map(|p| p.as_str()).collect();
                format!("Unknown peg type '{}', expected one of: {}", s, known.join(", "))
            })
    }
}
