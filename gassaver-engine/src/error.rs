// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::amount::AmountError;
use crate::chain::ChainId;
use crate::transport::TransportError;
use thiserror::Error;

/// Specialisation of `std::Result`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Broad class of a batch failure, for callers that branch on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InputShape,
    InvalidInput,
    UnroutableAsset,
    UserRejection,
    Transport,
    NotInitialized,
}

/// Bulk transfer errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Input arrays must have the same length: {assets} assets, {recipients} recipients, {amounts} amounts")]
    InputShape {
        assets: usize,
        recipients: usize,
        amounts: usize,
    },
    #[error("No line of the batch can be routed on this chain")]
    EmptyBatch,
    #[error("Invalid amount {amount:?} for {symbol} on line {line}: {source}")]
    InvalidAmount {
        line: usize,
        symbol: String,
        amount: String,
        source: AmountError,
    },
    #[error("Invalid recipient {recipient:?} on line {line}: {source}")]
    InvalidRecipient {
        line: usize,
        recipient: String,
        source: TransportError,
    },
    #[error("Asset {symbol} is not available on {chain}")]
    UnroutableAsset { symbol: String, chain: ChainId },
    #[error("Approval rejected for {symbol}: {reason}")]
    ApprovalRejected {
        symbol: String,
        custodian: String,
        reason: String,
    },
    #[error("Transfer rejected: {reason}")]
    TransferRejected { reason: String },
    #[error("Approval failed for {symbol}: {source}")]
    ApprovalFailed {
        symbol: String,
        custodian: String,
        source: TransportError,
    },
    #[error("Transfer failed: {0}")]
    TransferFailed(TransportError),
    #[error("Failed to query the balance of {symbol}: {source}")]
    BalanceQuery {
        symbol: String,
        source: TransportError,
    },
    #[error("Bulk transfer engine is not initialized: {0}")]
    NotInitialized(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InputShape { .. } | Error::EmptyBatch => ErrorKind::InputShape,
            Error::InvalidAmount { .. } | Error::InvalidRecipient { .. } => ErrorKind::InvalidInput,
            Error::UnroutableAsset { .. } => ErrorKind::UnroutableAsset,
            Error::ApprovalRejected { .. } | Error::TransferRejected { .. } => {
                ErrorKind::UserRejection
            }
            Error::ApprovalFailed { .. }
            | Error::TransferFailed(_)
            | Error::BalanceQuery { .. } => ErrorKind::Transport,
            Error::NotInitialized(_) => ErrorKind::NotInitialized,
        }
    }

    /// Maps a failed approval grant, keeping rejections apart from other failures.
    pub(crate) fn from_approval(symbol: String, custodian: String, err: TransportError) -> Self {
        match err {
            TransportError::Rejected(reason) => Error::ApprovalRejected {
                symbol,
                custodian,
                reason,
            },
            source => Error::ApprovalFailed {
                symbol,
                custodian,
                source,
            },
        }
    }

    /// Maps a failed batch submission, keeping rejections apart from other failures.
    pub(crate) fn from_transfer(err: TransportError) -> Self {
        match err {
            TransportError::Rejected(reason) => Error::TransferRejected { reason },
            source => Error::TransferFailed(source),
        }
    }
}
