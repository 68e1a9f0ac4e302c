// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use gassaver_engine::{ChainId, TronNetwork};
use std::env;
use std::time::Duration;
use url::Url;

/// environment variable overriding the full node endpoint
pub const RPC_URL: &str = "RPC_URL";
/// environment variable holding a TronGrid API key, sent as `TRON-PRO-API-KEY`
pub const TRONGRID_API_KEY: &str = "TRONGRID_API_KEY";

/// Energy budget, in sun, for an allowance grant.
pub const DEFAULT_FEE_LIMIT_APPROVE: u64 = 100_000_000;
/// Energy budget, in sun, for the bulk transfer call.
pub const DEFAULT_FEE_LIMIT_TRANSFER: u64 = 500_000_000;
pub const DEFAULT_READY_ATTEMPTS: u32 = 50;
pub const DEFAULT_READY_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0} is not a TRON chain")]
    NotTron(ChainId),
    #[error("Invalid full node URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TronConfig {
    pub network: TronNetwork,
    pub full_node: Url,
    pub api_key: Option<String>,
    pub fee_limit_approve: u64,
    pub fee_limit_transfer: u64,
    pub ready_attempts: u32,
    pub ready_interval: Duration,
    /// Delay between two transaction info lookups while waiting for finality.
    pub poll_interval: Duration,
}

impl TronConfig {
    pub fn new(network: TronNetwork) -> Self {
        Self {
            network,
            full_node: default_full_node(network),
            api_key: None,
            fee_limit_approve: DEFAULT_FEE_LIMIT_APPROVE,
            fee_limit_transfer: DEFAULT_FEE_LIMIT_TRANSFER,
            ready_attempts: DEFAULT_READY_ATTEMPTS,
            ready_interval: DEFAULT_READY_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn for_chain(chain: ChainId) -> Result<Self, Error> {
        match chain {
            ChainId::Tron(network) => Ok(Self::new(network)),
            ChainId::Evm(_) => Err(Error::NotTron(chain)),
        }
    }

    /// Applies `RPC_URL` and `TRONGRID_API_KEY` on top of the network defaults.
    pub fn from_env(chain: ChainId) -> Result<Self, Error> {
        let mut config = Self::for_chain(chain)?;
        if let Ok(url) = env::var(RPC_URL) {
            info!("Using full node {url} from environment for {chain}");
            config.full_node = Url::parse(&url).map_err(|source| Error::InvalidUrl {
                url: url.clone(),
                source,
            })?;
        }
        config.api_key = env::var(TRONGRID_API_KEY).ok();
        Ok(config)
    }

    pub fn chain(&self) -> ChainId {
        ChainId::Tron(self.network)
    }

    /// Whether the configured full node looks like it serves the configured network.
    pub fn node_matches_network(&self) -> bool {
        let expected = default_full_node(self.network);
        self.full_node.host_str() == expected.host_str()
    }
}

pub fn default_full_node(network: TronNetwork) -> Url {
    let url = match network {
        TronNetwork::Mainnet => "https://api.trongrid.io",
        TronNetwork::Shasta => "https://api.shasta.trongrid.io",
        TronNetwork::Nile => "https://nile.trongrid.io",
    };
    url.parse().expect("Invalid full node URL")
}
