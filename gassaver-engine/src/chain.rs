// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::common::Scale;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// EVM zero address, used by the settlement contract to denote the native asset.
pub const EVM_NATIVE_PLACEHOLDER: &str = "0x0000000000000000000000000000000000000000";
/// Base58check form of `0x41` followed by twenty zero bytes.
pub const TRON_NATIVE_PLACEHOLDER: &str = "T9yD14Nj9j7xAB4dbGeiX9h8unkKHxuWwb";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChainFamily {
    Evm,
    Tron,
}

impl ChainFamily {
    /// Fractional digits of the chain's base currency. Never queried.
    pub fn native_scale(&self) -> Scale {
        match self {
            ChainFamily::Evm => 18,
            ChainFamily::Tron => 6,
        }
    }

    /// Address the settlement contract expects in place of a native asset.
    pub fn native_placeholder(&self) -> &'static str {
        match self {
            ChainFamily::Evm => EVM_NATIVE_PLACEHOLDER,
            ChainFamily::Tron => TRON_NATIVE_PLACEHOLDER,
        }
    }
}

impl Display for ChainFamily {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ChainFamily::Evm => write!(f, "evm"),
            ChainFamily::Tron => write!(f, "tron"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TronNetwork {
    Mainnet,
    Shasta,
    Nile,
}

impl TronNetwork {
    pub fn identifier(&self) -> &'static str {
        match self {
            TronNetwork::Mainnet => "mainnet",
            TronNetwork::Shasta => "shasta",
            TronNetwork::Nile => "nile",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChainId {
    Evm(u64),
    Tron(TronNetwork),
}

impl ChainId {
    pub const ETHEREUM: ChainId = ChainId::Evm(1);
    pub const BNB_SMART_CHAIN: ChainId = ChainId::Evm(56);
    pub const POLYGON: ChainId = ChainId::Evm(137);
    pub const SEPOLIA: ChainId = ChainId::Evm(11_155_111);
    pub const CELO_SEPOLIA: ChainId = ChainId::Evm(11_142_220);

    pub fn family(&self) -> ChainFamily {
        match self {
            ChainId::Evm(_) => ChainFamily::Evm,
            ChainId::Tron(_) => ChainFamily::Tron,
        }
    }
}

impl Display for ChainId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ChainId::Evm(id) => write!(f, "evm:{id}"),
            ChainId::Tron(network) => write!(f, "tron:{}", network.identifier()),
        }
    }
}

impl FromStr for ChainId {
    type Err = String;

    /// Parses `evm:<id>` or `tron:<mainnet|shasta|nile>`. A bare number is taken as an EVM id.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        match value.split_once(':') {
            Some(("evm", id)) => id
                .parse::<u64>()
                .map(ChainId::Evm)
                .map_err(|_| format!("invalid EVM chain id: {id:?}")),
            Some(("tron", "mainnet")) => Ok(ChainId::Tron(TronNetwork::Mainnet)),
            Some(("tron", "shasta")) => Ok(ChainId::Tron(TronNetwork::Shasta)),
            Some(("tron", "nile")) => Ok(ChainId::Tron(TronNetwork::Nile)),
            Some(("tron", other)) => Err(format!("unknown TRON network: {other:?}")),
            Some((family, _)) => Err(format!("unknown chain family: {family:?}")),
            None => value
                .parse::<u64>()
                .map(ChainId::Evm)
                .map_err(|_| format!("invalid chain identifier: {value:?}")),
        }
    }
}

impl TryFrom<String> for ChainId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChainId> for String {
    fn from(chain: ChainId) -> Self {
        chain.to_string()
    }
}
