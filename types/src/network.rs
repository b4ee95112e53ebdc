//! Network identifier.

use serde::{Deserialize, Serialize};

/// Identifies which Bitcoin network the DAO state is derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkId {
    /// Bitcoin mainnet.
    Mainnet,
    /// Bitcoin testnet.
    Testnet,
    /// Local regtest network.
    Regtest,
}

impl NetworkId {
    /// Height of the BSQ genesis transaction's block on this network. DAO
    /// parsing starts here; earlier blocks carry no BSQ.
    pub fn genesis_height(&self) -> u32 {
        match self {
            Self::Mainnet => 524_717,
            Self::Testnet => 1_446_300,
            Self::Regtest => 111,
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Regtest => "regtest",
        }
    }
}
