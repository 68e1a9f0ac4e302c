// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

mod balance;
mod batch;

use clap::Subcommand;
use color_eyre::eyre::{Context, Result};
use color_eyre::Section;
use gassaver_engine::config::GASSAVER_CHAIN;
use gassaver_engine::{BulkTransferEngine, ChainFamily, ChainId, ChainTransport, EngineConfig};
use gassaver_evm::wallet::random_signer;
use std::env;
use std::path::PathBuf;

use crate::access::keys::load_signer;
use crate::access::transport::{consent, evm_transport, tron_transport};
use crate::opt::Opt;

#[derive(Subcommand, Debug)]
pub enum SubCmd {
    /// Approve and settle every line of a batch file in one bulk transfer.
    Send {
        /// JSON array of `{"asset", "recipient", "amount"}` objects.
        #[arg(long)]
        batch: PathBuf,
        /// Sign without asking for confirmation.
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the approvals and unit amounts a batch resolves to, without signing.
    Plan {
        /// JSON array of `{"asset", "recipient", "amount"}` objects.
        #[arg(long)]
        batch: PathBuf,
    },

    /// Check the balances of the signing account.
    Balance {
        /// Asset symbols to query. Every asset known on the chain when omitted.
        #[arg(long = "asset")]
        assets: Vec<String>,
    },
}

pub async fn handle_subcommand(opt: Opt) -> Result<()> {
    let config = engine_config(opt.chain)?;
    let cmd = opt.command;

    let signer = match cmd {
        SubCmd::Plan { .. } => load_signer().unwrap_or_else(|err| {
            debug!("Planning with a throwaway key: {err}");
            random_signer()
        }),
        _ => load_signer()?,
    };
    let consent = consent(matches!(cmd, SubCmd::Send { yes: true, .. }));

    match config.chain.family() {
        ChainFamily::Evm => {
            let transport = evm_transport(&config, signer, consent)?;
            execute(BulkTransferEngine::new(config, transport), cmd).await
        }
        ChainFamily::Tron => {
            let transport = tron_transport(&config, signer, consent)?;
            execute(BulkTransferEngine::new(config, transport), cmd).await
        }
    }
}

async fn execute<T: ChainTransport>(engine: BulkTransferEngine<T>, cmd: SubCmd) -> Result<()> {
    match cmd {
        SubCmd::Send { batch, .. } => batch::send(&engine, &batch).await,
        SubCmd::Plan { batch } => batch::plan(&engine, &batch).await,
        SubCmd::Balance { assets } => balance::balance(&engine, &assets).await,
    }
}

/// `--chain` takes precedence over `GASSAVER_CHAIN`, the other settings come from the env.
fn engine_config(chain: Option<ChainId>) -> Result<EngineConfig> {
    if let Some(chain) = chain {
        env::set_var(GASSAVER_CHAIN, chain.to_string());
    }
    let config = EngineConfig::from_env()
        .wrap_err("Failed to load the engine configuration")
        .with_suggestion(|| {
            format!("pass --chain or set {GASSAVER_CHAIN}, e.g. evm:11155111 or tron:nile")
        })?;
    info!("Operating on {}", config.chain);
    Ok(config)
}
