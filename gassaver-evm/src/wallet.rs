// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use alloy::signers::local::{LocalSigner, PrivateKeySigner};
use std::str::FromStr;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Private key is invalid")]
    PrivateKeyInvalid,
}

/// Parses a hex encoded secp256k1 private key, with or without `0x`.
pub fn signer_from_private_key(private_key: &str) -> Result<PrivateKeySigner, Error> {
    PrivateKeySigner::from_str(private_key.trim()).map_err(|_| Error::PrivateKeyInvalid)
}

pub fn random_signer() -> PrivateKeySigner {
    LocalSigner::random()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key, never funded on a public chain.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn parses_keys_with_and_without_prefix() {
        let with_prefix = signer_from_private_key(DEV_KEY).expect("valid key");
        let without_prefix =
            signer_from_private_key(DEV_KEY.trim_start_matches("0x")).expect("valid key");
        assert_eq!(with_prefix.address(), without_prefix.address());
        assert_eq!(
            format!("{:?}", with_prefix.address()).to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(signer_from_private_key("not a key").is_err());
        assert!(signer_from_private_key("0x1234").is_err());
    }
}
