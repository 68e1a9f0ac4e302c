// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! TRC20 and settlement contract calls, encoded for the TRON HTTP API.
//!
//! The API takes a function selector string and the hex encoded ABI
//! parameters separately, so calls are encoded without their 4-byte selector.

use alloy::sol;
use alloy::sol_types::SolCall;

sol!(
    #[allow(missing_docs)]
    interface ITRC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
    }

    #[allow(missing_docs)]
    interface IGasSaver {
        function bulkTransfer(address[] calldata tokens, address[] calldata recipients, uint256[] calldata amounts) external payable;
    }
);

/// A contract call as the HTTP API expects it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedCall {
    pub function_selector: &'static str,
    /// Hex encoded ABI parameters, without selector.
    pub parameter: String,
}

pub fn encode_call<C: SolCall>(call: &C) -> EncodedCall {
    let mut parameters = Vec::new();
    call.abi_encode_raw(&mut parameters);
    EncodedCall {
        function_selector: C::SIGNATURE,
        parameter: hex::encode(parameters),
    }
}
