// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use alloy::primitives::B256;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use gassaver_engine::SignedPayload;
use prost::Message;
use serde::Deserialize;
use sha2::{Digest, Sha256};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Transaction raw data is not valid hex: {0}")]
    InvalidRawData(#[from] hex::FromHexError),
    #[error("Transaction id {reported} does not match its raw data hash {computed}")]
    TxIdMismatch { reported: String, computed: String },
    #[error("Failed to sign transaction: {0}")]
    Signing(#[from] alloy::signers::Error),
}

/// A transaction built by the node and awaiting a signature.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UnsignedTransaction {
    #[serde(rename = "txID")]
    pub tx_id: String,
    pub raw_data_hex: String,
}

/// Wire form of `protocol.Transaction` with its raw data kept opaque.
#[derive(Clone, PartialEq, Message)]
struct SignedTransaction {
    #[prost(bytes = "vec", tag = "1")]
    raw_data: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    signature: Vec<Vec<u8>>,
}

/// Signs the sha256 of the raw data and encodes the result for `broadcasthex`.
///
/// The node reported id is checked against the raw data before signing.
pub fn sign_transaction(
    signer: &PrivateKeySigner,
    transaction: &UnsignedTransaction,
) -> Result<SignedPayload, Error> {
    let raw_data = hex::decode(&transaction.raw_data_hex)?;
    let digest = Sha256::digest(&raw_data);
    let computed = hex::encode(digest);
    if !computed.eq_ignore_ascii_case(&transaction.tx_id) {
        return Err(Error::TxIdMismatch {
            reported: transaction.tx_id.clone(),
            computed,
        });
    }

    let signature = signer.sign_hash_sync(&B256::from_slice(&digest))?;
    let encoded = SignedTransaction {
        raw_data,
        signature: vec![signature.as_bytes().to_vec()],
    }
    .encode_to_vec();

    Ok(SignedPayload {
        tx_id: computed,
        encoded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn unsigned(raw_data: &[u8]) -> UnsignedTransaction {
        UnsignedTransaction {
            tx_id: hex::encode(Sha256::digest(raw_data)),
            raw_data_hex: hex::encode(raw_data),
        }
    }

    #[test]
    fn signed_transaction_wraps_raw_data_and_signature() -> Result<(), Error> {
        let signer = PrivateKeySigner::from_str(DEV_KEY).expect("valid key");
        let raw_data = [0x0a, 0x02, 0xbe, 0xef];
        let payload = sign_transaction(&signer, &unsigned(&raw_data))?;

        assert_eq!(payload.tx_id, hex::encode(Sha256::digest(raw_data)));
        // field 1, length 4, raw data
        assert_eq!(&payload.encoded[..6], &[0x0a, 0x04, 0x0a, 0x02, 0xbe, 0xef]);
        // field 2, length 65, r || s || v
        assert_eq!(&payload.encoded[6..8], &[0x12, 0x41]);
        assert_eq!(payload.encoded.len(), 8 + 65);
        assert!(matches!(payload.encoded[72], 27 | 28));
        Ok(())
    }

    #[test]
    fn decoded_wrapper_carries_the_prehash_signature() -> Result<(), Error> {
        let signer = PrivateKeySigner::from_str(DEV_KEY).expect("valid key");
        let raw_data = b"raw transaction";
        let payload = sign_transaction(&signer, &unsigned(raw_data))?;

        let decoded =
            SignedTransaction::decode(payload.encoded.as_slice()).expect("valid protobuf");
        assert_eq!(decoded.raw_data, raw_data.to_vec());

        let digest = B256::from_slice(&Sha256::digest(raw_data));
        let expected = signer.sign_hash_sync(&digest)?;
        assert_eq!(decoded.signature, vec![expected.as_bytes().to_vec()]);
        Ok(())
    }

    #[test]
    fn mismatched_tx_id_is_refused() {
        let signer = PrivateKeySigner::from_str(DEV_KEY).expect("valid key");
        let mut transaction = unsigned(b"raw transaction");
        transaction.tx_id = "00".repeat(32);
        assert!(matches!(
            sign_transaction(&signer, &transaction),
            Err(Error::TxIdMismatch { .. })
        ));
    }

    #[test]
    fn unsigned_transaction_deserializes_from_node_response() {
        let transaction: UnsignedTransaction = serde_json::from_str(
            r#"{
                "visible": true,
                "txID": "d0d5f1a0",
                "raw_data": { "contract": [] },
                "raw_data_hex": "0a02"
            }"#,
        )
        .expect("valid json");
        assert_eq!(transaction.tx_id, "d0d5f1a0");
        assert_eq!(transaction.raw_data_hex, "0a02");
    }
}
