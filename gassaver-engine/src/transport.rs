// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::chain::{ChainFamily, ChainId};
use crate::common::{Amount, Scale, TxId};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::fmt::{self, Display, Formatter};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Signature request was rejected: {0}")]
    Rejected(String),
    #[error("Transaction failed: {0}")]
    Failed(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("Transport is not ready: {0}")]
    NotReady(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Failed to sign transaction: {0}")]
    Signing(String),
}

/// A state-changing call the engine asks a transport to sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// `approve(spender, amount)` on a custodian contract.
    Approve {
        custodian: String,
        spender: String,
        amount: Amount,
    },
    /// `bulkTransfer(assets, recipients, amounts)` on the settlement contract.
    BulkTransfer {
        settlement: String,
        assets: Vec<String>,
        recipients: Vec<String>,
        amounts: Vec<Amount>,
        /// Native value attached to the call.
        value: Amount,
    },
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Instruction::Approve {
                custodian,
                spender,
                amount,
            } => write!(f, "approve {spender} to spend {amount} units of {custodian}"),
            Instruction::BulkTransfer {
                settlement,
                recipients,
                value,
                ..
            } => write!(
                f,
                "bulk transfer to {} recipients via {settlement} with value {value}",
                recipients.len()
            ),
        }
    }
}

/// A signed transaction, ready to be broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedPayload {
    pub tx_id: TxId,
    /// Wire encoding expected by the chain's broadcast endpoint.
    pub encoded: Vec<u8>,
}

/// Outcome of a broadcast once the network has settled it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Finality {
    Finalized { tx_id: TxId },
    Rejected { detail: String },
    Failed { detail: String },
}

/// Gate consulted before every signature, the stand-in for a wallet prompt.
pub trait SigningConsent: Send + Sync {
    fn approve(&self, chain: ChainId, instruction: &Instruction) -> bool;
}

/// Consents to everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoApprove;

impl SigningConsent for AutoApprove {
    fn approve(&self, _chain: ChainId, _instruction: &Instruction) -> bool {
        true
    }
}

/// The capabilities the engine needs from a chain family.
///
/// Implementations must serialize signing so that only one signature request
/// is outstanding at any time.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChainTransport: Send + Sync {
    fn family(&self) -> ChainFamily;

    /// Chain this transport is bound to.
    fn chain_id(&self) -> ChainId;

    /// Asset identifier the settlement contract reads as "the native asset".
    fn native_placeholder(&self) -> String;

    /// Checks an address against the chain family's grammar.
    fn validate_address(&self, address: &str) -> Result<(), TransportError>;

    /// Succeeds once the wallet and node binding can serve a batch.
    async fn ensure_ready(&self) -> Result<(), TransportError>;

    /// Reads `decimals()` from a custodian contract.
    async fn query_decimals(&self, custodian: &str) -> Result<Scale, TransportError>;

    /// Native balance of the signing account.
    async fn native_balance(&self) -> Result<Amount, TransportError>;

    /// `balanceOf(signer)` on a custodian contract.
    async fn token_balance(&self, custodian: &str) -> Result<Amount, TransportError>;

    /// Builds the transaction for `instruction`, asks for consent and signs it.
    async fn sign(&self, instruction: &Instruction) -> Result<SignedPayload, TransportError>;

    /// Broadcasts a signed payload and waits for its finalization.
    async fn broadcast(&self, payload: SignedPayload) -> Result<Finality, TransportError>;
}
