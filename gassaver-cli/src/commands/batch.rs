// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use color_eyre::eyre::{Context, Result};
use color_eyre::Section;
use gassaver_engine::{
    format_units, BatchPlan, BatchRequest, BulkTransferEngine, ChainTransport, ErrorKind,
};
use prettytable::{row, Table};
use std::fs;
use std::path::Path;

pub fn read_batch(path: &Path) -> Result<BatchRequest> {
    let json = fs::read_to_string(path)
        .wrap_err(format!("Failed to read batch file {path:?}"))?;
    serde_json::from_str(&json)
        .wrap_err(format!("Failed to parse batch file {path:?}"))
        .with_suggestion(|| {
            r#"the batch file should be a JSON array like [{"asset": "USDT", "recipient": "0x...", "amount": "12.5"}]"#
        })
}

/// The three parallel arrays the engine takes.
fn columns(request: &BatchRequest) -> (Vec<String>, Vec<String>, Vec<String>) {
    let lines = request.lines();
    (
        lines.iter().map(|line| line.asset.clone()).collect(),
        lines.iter().map(|line| line.recipient.clone()).collect(),
        lines.iter().map(|line| line.amount.clone()).collect(),
    )
}

pub async fn send<T: ChainTransport>(engine: &BulkTransferEngine<T>, path: &Path) -> Result<()> {
    let request = read_batch(path)?;
    let (assets, recipients, amounts) = columns(&request);
    println!(
        "Sending {} line(s) on {}...",
        request.len(),
        engine.config().chain
    );

    match engine.bulk_transfer(&assets, &recipients, &amounts).await {
        Ok(receipt) => {
            println!("Batch {} settled", receipt.batch_id);
            for tx_id in &receipt.approvals {
                println!("Approval: {tx_id}");
            }
            println!("Transfer: {}", receipt.transfer);
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::UserRejection => {
            println!("Batch cancelled: {err}");
            Ok(())
        }
        Err(err) => Err(err).wrap_err("Bulk transfer failed"),
    }
}

pub async fn plan<T: ChainTransport>(engine: &BulkTransferEngine<T>, path: &Path) -> Result<()> {
    let request = read_batch(path)?;
    let plan = engine
        .plan(&request)
        .await
        .wrap_err("Failed to plan the batch")?;
    let native_scale = engine.config().chain.family().native_scale();

    lines_table(&plan).printstd();

    if !plan.ledger.is_empty() {
        let mut approvals = Table::new();
        approvals.add_row(row!["Approval", "Custodian", "Total"]);
        for approval in plan.ledger.iter() {
            let scale = approval
                .symbols
                .first()
                .and_then(|symbol| plan.scales.get(symbol))
                .copied();
            approvals.add_row(row![
                approval.label(),
                approval.custodian,
                display_units(approval.total, scale)
            ]);
        }
        approvals.printstd();
    }

    println!(
        "Native value attached: {}",
        format_units(plan.native_total, native_scale)
    );
    for skipped in &plan.skipped {
        println!(
            "Skipping line {}: {} is not available on {}",
            skipped.line,
            skipped.symbol,
            engine.config().chain
        );
    }
    Ok(())
}

fn lines_table(plan: &BatchPlan) -> Table {
    let mut table = Table::new();
    table.add_row(row!["#", "Asset", "Recipient", "Amount", "Units"]);
    for line in &plan.lines {
        table.add_row(row![
            line.line,
            line.symbol,
            line.recipient,
            display_units(line.units, plan.scales.get(&line.symbol).copied()),
            line.units
        ]);
    }
    table
}

fn display_units(units: gassaver_engine::Amount, scale: Option<u8>) -> String {
    match scale {
        Some(scale) => format_units(units, scale),
        None => units.to_string(),
    }
}
