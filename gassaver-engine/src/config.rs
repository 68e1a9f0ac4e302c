// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::chain::{ChainFamily, ChainId, TronNetwork};
use crate::common::Scale;
use crate::registry::{self, AssetRegistry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// environment variable selecting the active chain, e.g. `evm:11155111` or `tron:nile`
pub const GASSAVER_CHAIN: &str = "GASSAVER_CHAIN";
pub const SETTLEMENT_CONTRACT_ADDRESS: &str = "SETTLEMENT_CONTRACT_ADDRESS";
pub const ASSET_REGISTRY_PATH: &str = "ASSET_REGISTRY_PATH";
pub const UNROUTABLE_POLICY: &str = "UNROUTABLE_POLICY";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },
    #[error(transparent)]
    Registry(#[from] registry::Error),
}

/// What to do with a line whose asset has no route on the active chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnroutablePolicy {
    /// Drop the line and carry on with the rest of the batch.
    #[default]
    Skip,
    /// Fail the whole batch before anything is signed.
    Reject,
}

impl FromStr for UnroutablePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(UnroutablePolicy::Skip),
            "reject" => Ok(UnroutablePolicy::Reject),
            other => Err(format!(
                "expected \"skip\" or \"reject\", got {other:?}"
            )),
        }
    }
}

/// Scale guess used when a custodian's `decimals()` cannot be read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleHeuristic {
    pub stablecoins: BTreeSet<String>,
    pub stablecoin_scale: Scale,
    pub evm_default_scale: Scale,
    pub tron_default_scale: Scale,
    /// Per-chain exceptions, checked first.
    pub overrides: BTreeMap<ChainId, BTreeMap<String, Scale>>,
}

impl Default for ScaleHeuristic {
    fn default() -> Self {
        let stablecoins = ["USDT", "USDC"].into_iter().map(String::from).collect();
        // Binance-Peg stablecoins carry 18 decimals.
        let bsc = ["USDT", "USDC"]
            .into_iter()
            .map(|symbol| (symbol.to_string(), 18))
            .collect();
        Self {
            stablecoins,
            stablecoin_scale: 6,
            evm_default_scale: 18,
            tron_default_scale: 6,
            overrides: BTreeMap::from([(ChainId::BNB_SMART_CHAIN, bsc)]),
        }
    }
}

impl ScaleHeuristic {
    pub fn scale_for(&self, chain: ChainId, symbol: &str) -> Scale {
        let symbol = symbol.trim().to_ascii_uppercase();
        if let Some(scale) = self
            .overrides
            .get(&chain)
            .and_then(|overrides| overrides.get(&symbol))
        {
            return *scale;
        }
        match chain.family() {
            ChainFamily::Tron => self.tron_default_scale,
            ChainFamily::Evm if self.stablecoins.contains(&symbol) => self.stablecoin_scale,
            ChainFamily::Evm => self.evm_default_scale,
        }
    }
}

/// Immutable configuration handed to the engine at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub chain: ChainId,
    pub registry: AssetRegistry,
    pub settlement_contracts: BTreeMap<ChainId, String>,
    pub unroutable_policy: UnroutablePolicy,
    pub scale_heuristic: ScaleHeuristic,
}

impl EngineConfig {
    /// Built-in registry and settlement contracts for the given chain.
    pub fn default_for(chain: ChainId) -> Self {
        Self {
            chain,
            registry: AssetRegistry::builtin(),
            settlement_contracts: builtin_settlement_contracts(),
            unroutable_policy: UnroutablePolicy::default(),
            scale_heuristic: ScaleHeuristic::default(),
        }
    }

    /// Settlement contract deployed on the active chain, if any.
    pub fn settlement_contract(&self) -> Option<&str> {
        self.settlement_contracts
            .get(&self.chain)
            .map(String::as_str)
    }

    pub fn with_settlement_contract(mut self, chain: ChainId, address: impl Into<String>) -> Self {
        self.settlement_contracts.insert(chain, address.into());
        self
    }

    pub fn with_registry(mut self, registry: AssetRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_unroutable_policy(mut self, policy: UnroutablePolicy) -> Self {
        self.unroutable_policy = policy;
        self
    }

    /// Build the configuration from environment variables.
    ///
    /// Only `GASSAVER_CHAIN` is required, everything else falls back to the built-in tables.
    pub fn from_env() -> Result<Self, Error> {
        let chain = env::var(GASSAVER_CHAIN).map_err(|_| Error::InvalidVar {
            var: GASSAVER_CHAIN,
            reason: "not set".to_string(),
        })?;
        let chain = ChainId::from_str(&chain).map_err(|reason| Error::InvalidVar {
            var: GASSAVER_CHAIN,
            reason,
        })?;
        let mut config = Self::default_for(chain);

        if let Ok(path) = env::var(ASSET_REGISTRY_PATH) {
            info!("Loading asset registry from {path}");
            config.registry = AssetRegistry::from_file(&PathBuf::from(path))?;
        }

        if let Ok(address) = env::var(SETTLEMENT_CONTRACT_ADDRESS) {
            info!("Using settlement contract {address} from environment for {chain}");
            config.settlement_contracts.insert(chain, address);
        }

        if let Ok(policy) = env::var(UNROUTABLE_POLICY) {
            config.unroutable_policy =
                UnroutablePolicy::from_str(&policy).map_err(|reason| Error::InvalidVar {
                    var: UNROUTABLE_POLICY,
                    reason,
                })?;
        }

        Ok(config)
    }
}

fn builtin_settlement_contracts() -> BTreeMap<ChainId, String> {
    BTreeMap::from([
        (
            ChainId::SEPOLIA,
            "0xE0636c80c18931cf5BFd24c8A3679aa85e8e7d8D".to_string(),
        ),
        (
            ChainId::CELO_SEPOLIA,
            "0x46c0752624339B3A3e3ACbcB75faa173a5d25928".to_string(),
        ),
        (
            ChainId::Tron(TronNetwork::Nile),
            "TESHt6Nrd7JtdXWzJUeeA7EGJsS8oma9qK".to_string(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_prefers_overrides_then_family_rules() {
        let heuristic = ScaleHeuristic::default();
        assert_eq!(heuristic.scale_for(ChainId::SEPOLIA, "USDT"), 6);
        assert_eq!(heuristic.scale_for(ChainId::SEPOLIA, "usdc"), 6);
        assert_eq!(heuristic.scale_for(ChainId::SEPOLIA, "BNB"), 18);
        assert_eq!(heuristic.scale_for(ChainId::BNB_SMART_CHAIN, "USDT"), 18);
        assert_eq!(
            heuristic.scale_for(ChainId::Tron(TronNetwork::Nile), "WHATEVER"),
            6
        );
    }

    #[test]
    fn settlement_contract_is_chain_scoped() {
        assert!(EngineConfig::default_for(ChainId::SEPOLIA)
            .settlement_contract()
            .is_some());
        assert!(EngineConfig::default_for(ChainId::ETHEREUM)
            .settlement_contract()
            .is_none());
        let config = EngineConfig::default_for(ChainId::ETHEREUM)
            .with_settlement_contract(ChainId::ETHEREUM, "0x01");
        assert_eq!(config.settlement_contract(), Some("0x01"));
    }

    #[test]
    fn unroutable_policy_parses() {
        assert_eq!("Skip".parse::<UnroutablePolicy>(), Ok(UnroutablePolicy::Skip));
        assert_eq!(" reject ".parse::<UnroutablePolicy>(), Ok(UnroutablePolicy::Reject));
        assert!("ignore".parse::<UnroutablePolicy>().is_err());
    }
}
