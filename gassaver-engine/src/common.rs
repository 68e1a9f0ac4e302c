// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

pub type U256 = alloy::primitives::U256;
/// Raw on-chain unit amount.
pub type Amount = U256;
/// Number of fractional digits of an asset.
pub type Scale = u8;
/// Transaction identifier as reported by the chain (hex, no prefix rules).
pub type TxId = String;
