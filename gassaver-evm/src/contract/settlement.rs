// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::common::{Address, Calldata, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

sol!(
    #[allow(missing_docs)]
    interface IGasSaver {
        function bulkTransfer(address[] calldata tokens, address[] calldata recipients, uint256[] calldata amounts) external payable;
    }
);

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Transfer arrays differ in length: {tokens} tokens, {recipients} recipients, {amounts} amounts")]
    ShapeMismatch {
        tokens: usize,
        recipients: usize,
        amounts: usize,
    },
}

/// `bulkTransfer(tokens, recipients, amounts)` calldata.
///
/// The zero address in `tokens` designates the native asset.
pub fn bulk_transfer_calldata(
    tokens: Vec<Address>,
    recipients: Vec<Address>,
    amounts: Vec<U256>,
) -> Result<Calldata, Error> {
    if tokens.len() != recipients.len() || tokens.len() != amounts.len() {
        return Err(Error::ShapeMismatch {
            tokens: tokens.len(),
            recipients: recipients.len(),
            amounts: amounts.len(),
        });
    }

    let call = IGasSaver::bulkTransferCall {
        tokens,
        recipients,
        amounts,
    };
    Ok(call.abi_encode().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, keccak256};

    #[test]
    fn bulk_transfer_calldata_keeps_line_order() {
        let usdt = address!("AFcEeeC3708C9760E70DE04E954Acf409c001A59");
        let alice = address!("1111111111111111111111111111111111111111");
        let bob = address!("2222222222222222222222222222222222222222");

        let calldata = bulk_transfer_calldata(
            vec![usdt, Address::ZERO],
            vec![alice, bob],
            vec![U256::from(1_000_000u64), U256::from(5u64)],
        )
        .expect("arrays of equal length");

        let selector = keccak256("bulkTransfer(address[],address[],uint256[])");
        assert_eq!(&calldata[..4], &selector[..4]);

        let decoded =
            IGasSaver::bulkTransferCall::abi_decode(&calldata, true).expect("valid calldata");
        assert_eq!(decoded.tokens, vec![usdt, Address::ZERO]);
        assert_eq!(decoded.recipients, vec![alice, bob]);
        assert_eq!(decoded.amounts, vec![U256::from(1_000_000u64), U256::from(5u64)]);
    }

    #[test]
    fn bulk_transfer_calldata_rejects_ragged_arrays() {
        let result = bulk_transfer_calldata(vec![Address::ZERO], vec![], vec![U256::from(1u64)]);
        assert_eq!(
            result,
            Err(Error::ShapeMismatch {
                tokens: 1,
                recipients: 0,
                amounts: 1
            })
        );
    }
}
