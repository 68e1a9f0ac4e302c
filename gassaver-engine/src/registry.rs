// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::chain::{ChainId, TronNetwork, EVM_NATIVE_PLACEHOLDER, TRON_NATIVE_PLACEHOLDER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const NATIVE_MARKER: &str = "native";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to read asset registry at {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse asset registry: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where an asset symbol settles on a given chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetRoute {
    /// The chain's base currency, sent as transaction value.
    Native,
    /// A token governed by the custodian contract at this address.
    Custodian(String),
}

impl AssetRoute {
    pub fn is_native(&self) -> bool {
        matches!(self, AssetRoute::Native)
    }

    pub fn custodian(&self) -> Option<&str> {
        match self {
            AssetRoute::Native => None,
            AssetRoute::Custodian(address) => Some(address),
        }
    }
}

impl From<String> for AssetRoute {
    // The settlement contracts treat the zero address as the native asset,
    // so a registry entry pointing at it is a native route too.
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case(NATIVE_MARKER)
            || trimmed.eq_ignore_ascii_case(EVM_NATIVE_PLACEHOLDER)
            || trimmed == TRON_NATIVE_PLACEHOLDER
        {
            AssetRoute::Native
        } else {
            AssetRoute::Custodian(trimmed.to_string())
        }
    }
}

impl From<AssetRoute> for String {
    fn from(route: AssetRoute) -> Self {
        match route {
            AssetRoute::Native => NATIVE_MARKER.to_string(),
            AssetRoute::Custodian(address) => address,
        }
    }
}

/// Read-only mapping of `(chain, symbol)` to an [`AssetRoute`].
///
/// Symbols are matched case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRegistry {
    chains: BTreeMap<ChainId, BTreeMap<String, AssetRoute>>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the route of a symbol on a chain.
    pub fn with_route(mut self, chain: ChainId, symbol: &str, route: AssetRoute) -> Self {
        self.insert(chain, symbol, route);
        self
    }

    pub fn insert(&mut self, chain: ChainId, symbol: &str, route: AssetRoute) {
        self.chains
            .entry(chain)
            .or_default()
            .insert(normalize_symbol(symbol), route);
    }

    pub fn lookup(&self, chain: ChainId, symbol: &str) -> Option<&AssetRoute> {
        self.chains.get(&chain)?.get(&normalize_symbol(symbol))
    }

    /// Symbols known on a chain, in lexical order.
    pub fn symbols(&self, chain: ChainId) -> Vec<&str> {
        self.chains
            .get(&chain)
            .map(|routes| routes.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let raw: BTreeMap<ChainId, BTreeMap<String, AssetRoute>> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for (chain, routes) in raw {
            for (symbol, route) in routes {
                registry.insert(chain, &symbol, route);
            }
        }
        Ok(registry)
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The deployment table Gassaver ships with.
    pub fn builtin() -> Self {
        const MOCK_TOKEN: &str = "0xC8673dE666Ac880C4f220176588C6d368D574aaF";
        const MOCK_USDC: &str = "0xBDeD8Ec7EFc7C3bE1Bf086d3832285c12B6CB2f4";

        let custodian = |address: &str| AssetRoute::Custodian(address.to_string());
        let mut registry = Self::new();

        for (chain, native_symbol) in [
            (ChainId::ETHEREUM, "ETH"),
            (ChainId::BNB_SMART_CHAIN, "BNB"),
            (ChainId::POLYGON, "MATIC"),
            (ChainId::CELO_SEPOLIA, "ETH"),
        ] {
            registry.insert(chain, "USDT", custodian(MOCK_TOKEN));
            registry.insert(chain, "USDC", custodian(MOCK_USDC));
            for symbol in ["ETH", "BNB", "MATIC"] {
                let route = if symbol == native_symbol {
                    AssetRoute::Native
                } else {
                    custodian(MOCK_TOKEN)
                };
                registry.insert(chain, symbol, route);
            }
        }

        registry.insert(
            ChainId::SEPOLIA,
            "USDT",
            custodian("0xAFcEeeC3708C9760E70DE04E954Acf409c001A59"),
        );
        registry.insert(
            ChainId::SEPOLIA,
            "USDC",
            custodian("0x3fefD5B9F2a3EfA43976964f73CE6cafdfD3eE83"),
        );
        registry.insert(ChainId::SEPOLIA, "ETH", AssetRoute::Native);
        registry.insert(ChainId::SEPOLIA, "BNB", custodian(MOCK_TOKEN));
        registry.insert(ChainId::SEPOLIA, "MATIC", custodian(MOCK_TOKEN));

        let nile = ChainId::Tron(TronNetwork::Nile);
        registry.insert(nile, "USDT", custodian("TLCuviLXZtgF7JgXxwrUzrHpt4mmbMRTfW"));
        registry.insert(nile, "USDC", custodian("TEkxiTehnzSmSe2XqrBj4w32RUN966rdz8"));
        registry.insert(nile, "TRX", AssetRoute::Native);

        registry
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}
