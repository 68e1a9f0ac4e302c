// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use color_eyre::eyre::{Context, Result};
use gassaver_engine::{BulkTransferEngine, ChainTransport};

pub async fn balance<T: ChainTransport>(
    engine: &BulkTransferEngine<T>,
    assets: &[String],
) -> Result<()> {
    let chain = engine.config().chain;
    let symbols: Vec<String> = if assets.is_empty() {
        engine
            .config()
            .registry
            .symbols(chain)
            .into_iter()
            .map(str::to_string)
            .collect()
    } else {
        assets.to_vec()
    };

    engine
        .transport()
        .ensure_ready()
        .await
        .wrap_err(format!("The {chain} endpoint is not ready"))?;

    for symbol in symbols {
        let balance = engine
            .balance_of(&symbol)
            .await
            .wrap_err(format!("Failed to query the {symbol} balance"))?;
        println!("{balance}");
    }
    Ok(())
}
