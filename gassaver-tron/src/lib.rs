// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! TRON transport for the Gassaver bulk-transfer engine.
//!
//! Contract calls are built by a full node over its HTTP API, signed locally
//! with a secp256k1 key and broadcast as hex encoded protobuf.

#[macro_use]
extern crate tracing;

pub mod address;
pub mod api;
pub mod config;
pub mod contract;
pub mod transaction;
pub mod transport;

pub use address::TronAddress;
pub use config::TronConfig;
pub use transport::TronTransport;
