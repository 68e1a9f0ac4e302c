// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


use crate::amount::format_units;
use crate::common::{Amount, Scale, TxId};
use crate::config::{EngineConfig, UnroutablePolicy};
use crate::decimals::DecimalResolver;
use crate::error::{Error, Result};
use crate::ledger::{BatchPlan, BatchRequest};
use crate::registry::AssetRoute;
use crate::transport::{ChainTransport, Finality, Instruction, TransportError};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// Where a batch is in its pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    ResolvingDecimals,
    Normalizing,
    /// Granting the `index`th allowance (1-based) out of `of`.
    Approving { index: usize, of: usize },
    Submitting,
    Finalized,
    Failed,
}

impl Display for BatchState {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            BatchState::Idle => write!(f, "idle"),
            BatchState::ResolvingDecimals => write!(f, "resolving decimals"),
            BatchState::Normalizing => write!(f, "normalizing"),
            BatchState::Approving { index, of } => write!(f, "approving ({index} of {of})"),
            BatchState::Submitting => write!(f, "submitting"),
            BatchState::Finalized => write!(f, "finalized"),
            BatchState::Failed => write!(f, "failed"),
        }
    }
}

/// Transaction ids of a settled batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReceipt {
    pub batch_id: Uuid,
    /// Allowance grants, in the order they were finalized.
    pub approvals: Vec<TxId>,
    pub transfer: TxId,
}

/// Balance of the signing account for one asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Balance {
    pub symbol: String,
    pub units: Amount,
    pub scale: Scale,
}

impl Display for Balance {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} {}", format_units(self.units, self.scale), self.symbol)
    }
}

/// Lifecycle of a transaction the engine drives to finality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Built,
    Signed,
    Broadcast,
    Finalized,
    Rejected,
    Failed,
}

struct PendingTransaction {
    batch_id: Uuid,
    label: String,
    instruction: Instruction,
    stage: Stage,
}

impl PendingTransaction {
    fn new(batch_id: Uuid, label: String, instruction: Instruction) -> Self {
        debug!("Batch {batch_id}: built {label}: {instruction}");
        Self {
            batch_id,
            label,
            instruction,
            stage: Stage::Built,
        }
    }

    fn advance(&mut self, stage: Stage) {
        debug!(
            "Batch {}: {} {:?} -> {stage:?}",
            self.batch_id, self.label, self.stage
        );
        self.stage = stage;
    }
}

/// Logs every state change of one batch.
struct BatchTracker {
    batch_id: Uuid,
    state: BatchState,
}

impl BatchTracker {
    fn new() -> Self {
        let batch_id = Uuid::new_v4();
        info!("Batch {batch_id}: {}", BatchState::Idle);
        Self {
            batch_id,
            state: BatchState::Idle,
        }
    }

    fn advance(&mut self, next: BatchState) {
        info!("Batch {}: {} -> {next}", self.batch_id, self.state);
        self.state = next;
    }
}

/// Runs bulk transfers on the chain its transport is bound to.
pub struct BulkTransferEngine<T: ChainTransport> {
    config: EngineConfig,
    transport: T,
}

impl<T: ChainTransport> BulkTransferEngine<T> {
    pub fn new(config: EngineConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Settles every line of the batch with one allowance grant per custodian
    /// and a single `bulkTransfer` call.
    ///
    /// Each call is an independent batch, nothing is retried.
    pub async fn bulk_transfer(
        &self,
        assets: &[String],
        recipients: &[String],
        amounts: &[String],
    ) -> Result<BatchReceipt> {
        let mut tracker = BatchTracker::new();
        let result = self
            .run_batch(&mut tracker, assets, recipients, amounts)
            .await;
        match &result {
            Ok(receipt) => {
                tracker.advance(BatchState::Finalized);
                info!(
                    "Batch {} settled by transfer {} after {} approval(s)",
                    receipt.batch_id,
                    receipt.transfer,
                    receipt.approvals.len()
                );
            }
            Err(err) => {
                error!("Batch {} failed in state {}: {err}", tracker.batch_id, tracker.state);
                tracker.advance(BatchState::Failed);
            }
        }
        result
    }

    /// Resolves and normalizes a batch without signing anything.
    pub async fn plan(&self, request: &BatchRequest) -> Result<BatchPlan> {
        let mut tracker = BatchTracker::new();
        let result = self.plan_batch(&mut tracker, request).await;
        match &result {
            Ok(plan) => info!(
                "Batch {} planned: {} line(s), {} skipped",
                tracker.batch_id,
                plan.lines.len(),
                plan.skipped.len()
            ),
            Err(err) => {
                error!(
                    "Batch {} plan failed in state {}: {err}",
                    tracker.batch_id, tracker.state
                );
                tracker.advance(BatchState::Failed);
            }
        }
        result
    }

    async fn plan_batch(
        &self,
        tracker: &mut BatchTracker,
        request: &BatchRequest,
    ) -> Result<BatchPlan> {
        self.validate_recipients(request)?;
        self.ensure_transport_ready().await?;
        self.prepare(tracker, request).await
    }

    /// Balance of the signing account for `symbol` on the active chain.
    pub async fn balance_of(&self, symbol: &str) -> Result<Balance> {
        let chain = self.config.chain;
        let route = self
            .config
            .registry
            .lookup(chain, symbol)
            .ok_or_else(|| Error::UnroutableAsset {
                symbol: symbol.to_string(),
                chain,
            })?;
        let symbol = symbol.trim().to_ascii_uppercase();

        let mut resolver =
            DecimalResolver::new(&self.transport, chain, &self.config.scale_heuristic);
        let scale = resolver.resolve(&symbol, route).await;

        let units = match route {
            AssetRoute::Native => self.transport.native_balance().await,
            AssetRoute::Custodian(custodian) => self.transport.token_balance(custodian).await,
        }
        .map_err(|source| Error::BalanceQuery {
            symbol: symbol.clone(),
            source,
        })
        .inspect_err(|err| error!("{err}"))?;

        Ok(Balance {
            symbol,
            units,
            scale,
        })
    }

    async fn run_batch(
        &self,
        tracker: &mut BatchTracker,
        assets: &[String],
        recipients: &[String],
        amounts: &[String],
    ) -> Result<BatchReceipt> {
        let request = BatchRequest::from_arrays(assets, recipients, amounts)?;
        self.validate_recipients(&request)?;

        let settlement = self
            .config
            .settlement_contract()
            .ok_or_else(|| {
                Error::NotInitialized(format!(
                    "no settlement contract configured for {}",
                    self.config.chain
                ))
            })?
            .to_string();
        self.ensure_transport_ready().await?;

        let plan = self.prepare(tracker, &request).await?;
        if plan.lines.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let approvals = self.grant_allowances(tracker, &plan, &settlement).await?;

        tracker.advance(BatchState::Submitting);
        let mut pending = PendingTransaction::new(
            tracker.batch_id,
            "transfer".to_string(),
            plan.transfer_instruction(&settlement),
        );
        let transfer = self
            .settle(&mut pending)
            .await
            .map_err(Error::from_transfer)?;

        Ok(BatchReceipt {
            batch_id: tracker.batch_id,
            approvals,
            transfer,
        })
    }

    fn validate_recipients(&self, request: &BatchRequest) -> Result<()> {
        for (line, batch_line) in request.lines().iter().enumerate() {
            self.transport
                .validate_address(&batch_line.recipient)
                .map_err(|source| Error::InvalidRecipient {
                    line,
                    recipient: batch_line.recipient.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    async fn ensure_transport_ready(&self) -> Result<()> {
        let bound = self.transport.chain_id();
        if bound != self.config.chain {
            return Err(Error::NotInitialized(format!(
                "transport is bound to {bound}, engine is configured for {}",
                self.config.chain
            )));
        }
        self.transport
            .ensure_ready()
            .await
            .map_err(|err| Error::NotInitialized(err.to_string()))
    }

    /// Decimal resolution and normalization.
    async fn prepare(&self, tracker: &mut BatchTracker, request: &BatchRequest) -> Result<BatchPlan> {
        let chain = self.config.chain;

        tracker.advance(BatchState::ResolvingDecimals);
        let mut resolver =
            DecimalResolver::new(&self.transport, chain, &self.config.scale_heuristic);
        let mut routed = Vec::with_capacity(request.len());
        for batch_line in request.lines() {
            let resolved = match self.config.registry.lookup(chain, &batch_line.asset) {
                Some(route) => Some((route, resolver.resolve(&batch_line.asset, route).await)),
                None => None,
            };
            routed.push(resolved);
        }
        debug!(
            "Batch {}: resolved {} asset scale(s)",
            tracker.batch_id,
            resolver.len()
        );

        tracker.advance(BatchState::Normalizing);
        let placeholder = self.transport.native_placeholder();
        let mut plan = BatchPlan::default();
        for (line, (batch_line, resolved)) in request.lines().iter().zip(routed).enumerate() {
            match resolved {
                Some((route, scale)) => plan.push(line, batch_line, route, scale, &placeholder)?,
                None => match self.config.unroutable_policy {
                    UnroutablePolicy::Skip => {
                        warn!(
                            "Batch {}: skipping line {line}, {} is not available on {chain}",
                            tracker.batch_id, batch_line.asset
                        );
                        plan.skip(line, &batch_line.asset);
                    }
                    UnroutablePolicy::Reject => {
                        return Err(Error::UnroutableAsset {
                            symbol: batch_line.asset.clone(),
                            chain,
                        })
                    }
                },
            }
        }

        debug!(
            "Batch {}: {} line(s) routed, {} allowance(s) needed, native value {}",
            tracker.batch_id,
            plan.lines.len(),
            plan.ledger.pending().count(),
            plan.native_total
        );
        Ok(plan)
    }

    /// Grants one exact allowance per custodian, strictly in sequence.
    async fn grant_allowances(
        &self,
        tracker: &mut BatchTracker,
        plan: &BatchPlan,
        settlement: &str,
    ) -> Result<Vec<TxId>> {
        let pending: Vec<_> = plan.ledger.pending().collect();
        let count = pending.len();
        let mut approvals = Vec::with_capacity(count);

        for (index, approval) in pending.into_iter().enumerate() {
            tracker.advance(BatchState::Approving {
                index: index + 1,
                of: count,
            });
            let instruction = Instruction::Approve {
                custodian: approval.custodian.clone(),
                spender: settlement.to_string(),
                amount: approval.total,
            };
            let mut pending = PendingTransaction::new(
                tracker.batch_id,
                format!("approval for {}", approval.label()),
                instruction,
            );
            let tx_id = self.settle(&mut pending).await.map_err(|err| {
                Error::from_approval(approval.label(), approval.custodian.clone(), err)
            })?;
            approvals.push(tx_id);
        }

        Ok(approvals)
    }

    /// Signs, broadcasts and waits for the finalization of one transaction.
    async fn settle(&self, pending: &mut PendingTransaction) -> Result<TxId, TransportError> {
        let payload = match self.transport.sign(&pending.instruction).await {
            Ok(payload) => payload,
            Err(err) => {
                pending.advance(match err {
                    TransportError::Rejected(_) => Stage::Rejected,
                    _ => Stage::Failed,
                });
                return Err(err);
            }
        };
        pending.advance(Stage::Signed);

        let tx_id = payload.tx_id.clone();
        pending.advance(Stage::Broadcast);
        let finality = self
            .transport
            .broadcast(payload)
            .await
            .inspect_err(|_| pending.advance(Stage::Failed))?;

        match finality {
            Finality::Finalized { tx_id: finalized } => {
                pending.advance(Stage::Finalized);
                info!("Batch {}: {} finalized as {finalized}", pending.batch_id, pending.label);
                Ok(finalized)
            }
            Finality::Rejected { detail } => {
                pending.advance(Stage::Rejected);
                Err(TransportError::Failed(format!(
                    "transaction {tx_id} was rejected by the network: {detail}"
                )))
            }
            Finality::Failed { detail } => {
                pending.advance(Stage::Failed);
                Err(TransportError::Failed(format!(
                    "transaction {tx_id} failed: {detail}"
                )))
            }
        }
    }
}
