// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use alloy::primitives::Address;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// First byte of every TRON account address.
pub const ADDRESS_PREFIX: u8 = 0x41;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid base58check address {0:?}")]
    InvalidEncoding(String),
    #[error("Address {address:?} decodes to {len} bytes, expected 21")]
    InvalidLength { address: String, len: usize },
    #[error("Address {address:?} has prefix {prefix:#04x}, expected 0x41")]
    InvalidPrefix { address: String, prefix: u8 },
}

/// A TRON account or contract address: `0x41` followed by a 20-byte EVM address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TronAddress(Address);

impl TronAddress {
    pub fn from_evm(address: Address) -> Self {
        Self(address)
    }

    /// The 20-byte form used inside ABI encoded parameters.
    pub fn evm(&self) -> Address {
        self.0
    }

    /// `0x41` prefixed bytes.
    pub fn to_bytes(&self) -> [u8; 21] {
        let mut bytes = [0u8; 21];
        bytes[0] = ADDRESS_PREFIX;
        bytes[1..].copy_from_slice(self.0.as_slice());
        bytes
    }

    /// Hex form as used by the non-`visible` HTTP API, e.g. `41a614...`.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.to_bytes()).with_check().into_string()
    }
}

impl FromStr for TronAddress {
    type Err = Error;

    fn from_str(address: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(address)
            .with_check(None)
            .into_vec()
            .map_err(|_| Error::InvalidEncoding(address.to_string()))?;
        if bytes.len() != 21 {
            return Err(Error::InvalidLength {
                address: address.to_string(),
                len: bytes.len(),
            });
        }
        if bytes[0] != ADDRESS_PREFIX {
            return Err(Error::InvalidPrefix {
                address: address.to_string(),
                prefix: bytes[0],
            });
        }
        Ok(Self(Address::from_slice(&bytes[1..])))
    }
}

impl Display for TronAddress {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gassaver_engine::chain::TRON_NATIVE_PLACEHOLDER;

    const USDT_MAINNET: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";

    #[test]
    fn native_placeholder_is_the_zero_address() -> Result<(), Error> {
        let address = TronAddress::from_str(TRON_NATIVE_PLACEHOLDER)?;
        assert_eq!(address.evm(), Address::ZERO);
        assert_eq!(address.to_hex(), format!("41{}", "00".repeat(20)));
        assert_eq!(TronAddress::from_evm(Address::ZERO).to_string(), TRON_NATIVE_PLACEHOLDER);
        Ok(())
    }

    #[test]
    fn decodes_known_contract() -> Result<(), Error> {
        let address = TronAddress::from_str(USDT_MAINNET)?;
        assert_eq!(address.to_hex(), "41a614f803b6fd780986a42c78ec9c7f77e6ded13c");
        assert_eq!(address.to_base58(), USDT_MAINNET);
        Ok(())
    }

    #[test]
    fn rejects_addresses_outside_the_grammar() {
        // Last character altered, the checksum no longer matches.
        assert!(matches!(
            TronAddress::from_str("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6u"),
            Err(Error::InvalidEncoding(_))
        ));
        assert!(matches!(
            TronAddress::from_str("0xa614f803b6fd780986a42c78ec9c7f77e6ded13c"),
            Err(Error::InvalidEncoding(_))
        ));

        let short = bs58::encode([ADDRESS_PREFIX, 1, 2, 3]).with_check().into_string();
        assert!(matches!(
            TronAddress::from_str(&short),
            Err(Error::InvalidLength { len: 4, .. })
        ));

        let mut bytes = [0u8; 21];
        bytes[0] = 0x42;
        let wrong_prefix = bs58::encode(bytes).with_check().into_string();
        assert!(matches!(
            TronAddress::from_str(&wrong_prefix),
            Err(Error::InvalidPrefix { prefix: 0x42, .. })
        ));
    }
}
