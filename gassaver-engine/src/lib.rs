// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Chain-agnostic bulk-transfer orchestration.
//!
//! A batch of `(asset, recipient, amount)` lines flows through four stages:
//! decimal resolution, amount normalization, allowance sequencing and batch
//! submission. The chain specifics live behind [`transport::ChainTransport`].

#[macro_use]
extern crate tracing;

pub mod amount;
pub mod chain;
pub mod common;
pub mod config;
pub mod decimals;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod transport;

pub use amount::{format_units, parse_units, AmountError};
pub use chain::{ChainFamily, ChainId, TronNetwork};
pub use common::{Amount, Scale, TxId, U256};
pub use config::{EngineConfig, ScaleHeuristic, UnroutablePolicy};
pub use engine::{Balance, BatchReceipt, BatchState, BulkTransferEngine};
pub use error::{Error, ErrorKind, Result};
pub use ledger::{
    Approval, ApprovalLedger, BatchLine, BatchPlan, BatchRequest, NormalizedLine, SkippedLine,
};
pub use registry::{AssetRegistry, AssetRoute};
pub use transport::{
    AutoApprove, ChainTransport, Finality, Instruction, SignedPayload, SigningConsent,
    TransportError,
};
