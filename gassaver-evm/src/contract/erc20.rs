// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::common::{Address, Calldata, U256};
use crate::contract::erc20::IERC20::IERC20Instance;
use alloy::providers::{Network, Provider};
use alloy::sol;
use alloy::sol_types::SolCall;
use alloy::transports::Transport;

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
);

/// A custodian contract following the ERC20 interface.
pub struct Erc20Token<T: Transport + Clone, P: Provider<T, N>, N: Network> {
    pub contract: IERC20Instance<T, P, N>,
}

impl<T, P, N> Erc20Token<T, P, N>
where
    T: Transport + Clone,
    P: Provider<T, N>,
    N: Network,
{
    pub fn new(contract_address: Address, provider: P) -> Self {
        let contract = IERC20::new(contract_address, provider);
        Erc20Token { contract }
    }

    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    pub async fn decimals(&self) -> Result<u8, alloy::contract::Error> {
        let decimals = self
            .contract
            .decimals()
            .call()
            .await
            .inspect_err(|err| {
                error!("Error getting decimals of {}: {err:?}", self.address())
            })?
            ._0;
        Ok(decimals)
    }

    /// Get the raw token balance of an address.
    pub async fn balance_of(&self, account: Address) -> Result<U256, alloy::contract::Error> {
        debug!("Getting balance of account {account:?} at {}", self.address());
        let balance = self
            .contract
            .balanceOf(account)
            .call()
            .await
            .inspect_err(|err| error!("Error getting balance of account: {err:?}"))?
            ._0;
        debug!("Balance of account {account} is {balance}");
        Ok(balance)
    }
}

/// `approve(spender, amount)` calldata.
pub fn approve_calldata(spender: Address, amount: U256) -> Calldata {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn approve_calldata_encodes_selector_and_arguments() {
        let spender = address!("E0636c80c18931cf5BFd24c8A3679aa85e8e7d8D");
        let calldata = approve_calldata(spender, U256::from(150_000_000u64));

        // approve(address,uint256)
        assert_eq!(&calldata[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(calldata.len(), 4 + 32 + 32);
        assert_eq!(&calldata[16..36], spender.as_slice());
        assert_eq!(U256::from_be_slice(&calldata[36..68]), U256::from(150_000_000u64));

        let decoded = IERC20::approveCall::abi_decode(&calldata, true).expect("valid calldata");
        assert_eq!(decoded.spender, spender);
        assert_eq!(decoded.amount, U256::from(150_000_000u64));
    }
}
