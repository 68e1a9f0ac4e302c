// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use dialoguer::Confirm;
use gassaver_engine::{ChainId, Instruction, SigningConsent};

/// Asks on the terminal before every signature.
pub struct PromptConsent;

impl SigningConsent for PromptConsent {
    fn approve(&self, chain: ChainId, instruction: &Instruction) -> bool {
        println!("\n{}", describe(chain, instruction));
        Confirm::new()
            .with_prompt("Sign this transaction?")
            .default(false)
            .interact()
            .inspect_err(|err| error!("Failed to read signing consent: {err}"))
            .unwrap_or(false)
    }
}

fn describe(chain: ChainId, instruction: &Instruction) -> String {
    match instruction {
        Instruction::Approve {
            custodian,
            spender,
            amount,
        } => format!(
            "[{chain}] Allow {spender} to move up to {amount} units of the token at {custodian}"
        ),
        Instruction::BulkTransfer {
            settlement,
            recipients,
            value,
            ..
        } => format!(
            "[{chain}] Settle {} transfer(s) through {settlement}, attaching {value} native units",
            recipients.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gassaver_engine::Amount;

    #[test]
    fn bulk_transfer_description_counts_lines() {
        let instruction = Instruction::BulkTransfer {
            settlement: "0xE0636c80c18931cf5BFd24c8A3679aa85e8e7d8D".to_string(),
            assets: vec!["0x0000000000000000000000000000000000000000".to_string(); 2],
            recipients: vec!["0x1111111111111111111111111111111111111111".to_string(); 2],
            amounts: vec![Amount::from(1u64); 2],
            value: Amount::from(2u64),
        };
        assert_eq!(
            describe(ChainId::SEPOLIA, &instruction),
            "[evm:11155111] Settle 2 transfer(s) through \
             0xE0636c80c18931cf5BFd24c8A3679aa85e8e7d8D, attaching 2 native units"
        );
    }
}
