// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use alloy::transports::http::reqwest;
use gassaver_engine::ChainId;
use std::env;

pub const RPC_URL: &str = "RPC_URL";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0} is not an EVM chain")]
    NotEvm(ChainId),
    #[error("No default RPC endpoint for {0}, set {RPC_URL}")]
    NoDefaultRpc(ChainId),
    #[error("Invalid RPC URL {url:?}: {source}")]
    InvalidRpcUrl {
        url: String,
        source: url::ParseError,
    },
}

/// An EVM chain and the JSON-RPC endpoint used to reach it.
#[derive(Clone, Debug, PartialEq)]
pub struct EvmNetwork {
    chain: ChainId,
    chain_id: u64,
    rpc_url: reqwest::Url,
}

impl EvmNetwork {
    pub fn new(chain: ChainId, rpc_url: &str) -> Result<Self, Error> {
        let ChainId::Evm(chain_id) = chain else {
            return Err(Error::NotEvm(chain));
        };
        let rpc_url = reqwest::Url::parse(rpc_url).map_err(|source| Error::InvalidRpcUrl {
            url: rpc_url.to_string(),
            source,
        })?;
        Ok(Self {
            chain,
            chain_id,
            rpc_url,
        })
    }

    /// Uses `RPC_URL` when set, the chain's public endpoint otherwise.
    pub fn from_env(chain: ChainId) -> Result<Self, Error> {
        match env::var(RPC_URL) {
            Ok(url) => {
                info!("Using RPC endpoint {url} from environment for {chain}");
                Self::new(chain, &url)
            }
            Err(_) => {
                let url = default_rpc_url(chain).ok_or(Error::NoDefaultRpc(chain))?;
                Self::new(chain, url)
            }
        }
    }

    pub fn chain(&self) -> ChainId {
        self.chain
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn rpc_url(&self) -> &reqwest::Url {
        &self.rpc_url
    }
}

fn default_rpc_url(chain: ChainId) -> Option<&'static str> {
    let url = match chain {
        ChainId::ETHEREUM => "https://ethereum-rpc.publicnode.com",
        ChainId::BNB_SMART_CHAIN => "https://bsc-dataseed.bnbchain.org",
        ChainId::POLYGON => "https://polygon-rpc.com",
        ChainId::SEPOLIA => "https://ethereum-sepolia-rpc.publicnode.com",
        ChainId::CELO_SEPOLIA => "https://forno.celo-sepolia.celo-testnet.org",
        _ => return None,
    };
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gassaver_engine::TronNetwork;

    #[test]
    fn known_chains_have_a_default_endpoint() {
        for chain in [
            ChainId::ETHEREUM,
            ChainId::BNB_SMART_CHAIN,
            ChainId::POLYGON,
            ChainId::SEPOLIA,
            ChainId::CELO_SEPOLIA,
        ] {
            assert!(default_rpc_url(chain).is_some(), "{chain} has no endpoint");
        }
        assert_eq!(default_rpc_url(ChainId::Evm(31337)), None);
    }

    #[test]
    fn new_rejects_tron_and_bad_urls() {
        assert!(matches!(
            EvmNetwork::new(ChainId::Tron(TronNetwork::Nile), "http://localhost:8545"),
            Err(Error::NotEvm(_))
        ));
        assert!(matches!(
            EvmNetwork::new(ChainId::SEPOLIA, "not a url"),
            Err(Error::InvalidRpcUrl { .. })
        ));

        let network = EvmNetwork::new(ChainId::Evm(31337), "http://localhost:8545")
            .expect("valid network");
        assert_eq!(network.chain_id(), 31337);
        assert_eq!(network.rpc_url().as_str(), "http://localhost:8545/");
    }
}
