// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use alloy::signers::local::PrivateKeySigner;
use color_eyre::eyre::{Context, Result};
use color_eyre::Section;
use gassaver_engine::{AutoApprove, EngineConfig, SigningConsent};
use gassaver_evm::{EvmNetwork, EvmTransport};
use gassaver_tron::{TronConfig, TronTransport};
use std::sync::Arc;

use super::consent::PromptConsent;

pub fn consent(assume_yes: bool) -> Arc<dyn SigningConsent> {
    if assume_yes {
        Arc::new(AutoApprove)
    } else {
        Arc::new(PromptConsent)
    }
}

pub fn evm_transport(
    config: &EngineConfig,
    signer: PrivateKeySigner,
    consent: Arc<dyn SigningConsent>,
) -> Result<EvmTransport> {
    let network = EvmNetwork::from_env(config.chain)
        .wrap_err(format!("Failed to configure {}", config.chain))
        .with_suggestion(|| "set RPC_URL to the JSON-RPC endpoint of the chain")?;
    info!("Using RPC endpoint {} for {}", network.rpc_url(), config.chain);

    let mut transport = EvmTransport::new(network, signer).with_consent(consent);
    if let Some(settlement) = config.settlement_contract() {
        transport = transport
            .with_settlement_contract(settlement)
            .wrap_err("Invalid settlement contract address")?;
    }
    Ok(transport)
}

pub fn tron_transport(
    config: &EngineConfig,
    signer: PrivateKeySigner,
    consent: Arc<dyn SigningConsent>,
) -> Result<TronTransport> {
    let tron_config = TronConfig::from_env(config.chain)
        .wrap_err(format!("Failed to configure {}", config.chain))
        .with_suggestion(|| "set RPC_URL to the full node HTTP endpoint")?;
    info!("Using full node {} for {}", tron_config.full_node, config.chain);

    let transport = TronTransport::new(tron_config, signer)
        .wrap_err("Failed to create the TRON client")?
        .with_consent(consent);
    Ok(transport)
}
