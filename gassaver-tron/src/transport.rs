// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::address::TronAddress;
use crate::api::{self, TronClient};
use crate::config::TronConfig;
use crate::contract::{encode_call, EncodedCall, IGasSaver, ITRC20};
use crate::transaction::sign_transaction;
use alloy::primitives::U256;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use gassaver_engine::chain::TRON_NATIVE_PLACEHOLDER;
use gassaver_engine::{
    Amount, AutoApprove, ChainFamily, ChainId, ChainTransport, Finality, Instruction, Scale,
    SignedPayload, SigningConsent, TransportError,
};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// [`ChainTransport`] for TRON, letting the node build contract calls and
/// signing them locally.
pub struct TronTransport {
    client: TronClient,
    config: TronConfig,
    signer: PrivateKeySigner,
    owner: TronAddress,
    consent: Arc<dyn SigningConsent>,
    signing: Mutex<()>,
}

impl TronTransport {
    pub fn new(config: TronConfig, signer: PrivateKeySigner) -> Result<Self, TransportError> {
        let client = TronClient::new(config.full_node.clone(), config.api_key.as_deref())
            .map_err(|err| TransportError::NotReady(err.to_string()))?;
        let owner = TronAddress::from_evm(signer.address());
        Ok(Self {
            client,
            config,
            signer,
            owner,
            consent: Arc::new(AutoApprove),
            signing: Mutex::new(()),
        })
    }

    pub fn with_consent(mut self, consent: Arc<dyn SigningConsent>) -> Self {
        self.consent = consent;
        self
    }

    /// Base58check address of the signing account.
    pub fn address(&self) -> TronAddress {
        self.owner
    }

    pub fn config(&self) -> &TronConfig {
        &self.config
    }

    async fn probe(&self) -> Result<(), api::Error> {
        let block = self.client.now_block().await?;
        let account = self.client.account(&self.owner).await?;
        trace!(
            "Node at block {} reports {} sun for {}",
            block.block_id,
            account.balance,
            self.owner
        );
        Ok(())
    }

    async fn call_constant<C: SolCall>(
        &self,
        contract: &TronAddress,
        call: &C,
    ) -> Result<C::Return, TransportError> {
        let output = self
            .client
            .trigger_constant(&self.owner, contract, &encode_call(call))
            .await
            .map_err(classify_api_error)?;
        C::abi_decode_returns(&output, true)
            .map_err(|err| TransportError::MalformedResponse(err.to_string()))
    }
}

#[async_trait]
impl ChainTransport for TronTransport {
    fn family(&self) -> ChainFamily {
        ChainFamily::Tron
    }

    fn chain_id(&self) -> ChainId {
        self.config.chain()
    }

    fn native_placeholder(&self) -> String {
        TRON_NATIVE_PLACEHOLDER.to_string()
    }

    fn validate_address(&self, address: &str) -> Result<(), TransportError> {
        parse_address(address).map(|_| ())
    }

    async fn ensure_ready(&self) -> Result<(), TransportError> {
        if !self.config.node_matches_network() {
            warn!(
                "Full node {} is not the default node of {}, the network cannot be verified",
                self.config.full_node,
                self.chain_id()
            );
        }

        let mut last_error = None;
        for attempt in 1..=self.config.ready_attempts {
            match self.probe().await {
                Ok(()) => {
                    debug!(
                        "TRON transport ready on {} as {} after {attempt} attempt(s)",
                        self.chain_id(),
                        self.owner
                    );
                    return Ok(());
                }
                Err(err) => {
                    trace!("Readiness probe {attempt} failed: {err}");
                    last_error = Some(err);
                    if attempt < self.config.ready_attempts {
                        tokio::time::sleep(self.config.ready_interval).await;
                    }
                }
            }
        }

        let reason = last_error.map_or_else(|| "no attempt made".to_string(), |e| e.to_string());
        error!(
            "Full node {} did not become ready: {reason}",
            self.config.full_node
        );
        Err(TransportError::NotReady(format!(
            "full node {} unreachable after {} attempts: {reason}",
            self.config.full_node, self.config.ready_attempts
        )))
    }

    async fn query_decimals(&self, custodian: &str) -> Result<Scale, TransportError> {
        let contract = parse_address(custodian)?;
        let decimals = self
            .call_constant(&contract, &ITRC20::decimalsCall {})
            .await?;
        Ok(decimals._0)
    }

    async fn native_balance(&self) -> Result<Amount, TransportError> {
        let account = self
            .client
            .account(&self.owner)
            .await
            .map_err(classify_api_error)?;
        Ok(U256::from(account.balance))
    }

    async fn token_balance(&self, custodian: &str) -> Result<Amount, TransportError> {
        let contract = parse_address(custodian)?;
        let balance = self
            .call_constant(
                &contract,
                &ITRC20::balanceOfCall {
                    account: self.owner.evm(),
                },
            )
            .await?;
        Ok(balance._0)
    }

    async fn sign(&self, instruction: &Instruction) -> Result<SignedPayload, TransportError> {
        let _guard = self.signing.lock().await;

        if !self.consent.approve(self.chain_id(), instruction) {
            info!("Signature declined for {instruction}");
            return Err(TransportError::Rejected(
                "signature request declined".to_string(),
            ));
        }

        let (contract, call, call_value, fee_limit) = self.encode_instruction(instruction)?;
        let unsigned = self
            .client
            .trigger_smart_contract(&self.owner, &contract, &call, fee_limit, call_value)
            .await
            .map_err(classify_api_error)
            .inspect_err(|err| error!("Error building {}: {err}", call.function_selector))?;

        let payload = sign_transaction(&self.signer, &unsigned)
            .map_err(|err| TransportError::Signing(err.to_string()))
            .inspect_err(|err| error!("Error signing transaction: {err}"))?;
        debug!("Signed transaction {}", payload.tx_id);
        Ok(payload)
    }

    async fn broadcast(&self, payload: SignedPayload) -> Result<Finality, TransportError> {
        let response = self
            .client
            .broadcast_hex(&payload.encoded)
            .await
            .map_err(classify_api_error)
            .inspect_err(|err| error!("Error broadcasting {}: {err}", payload.tx_id))?;
        if !response.result {
            return Ok(Finality::Rejected {
                detail: response.detail(),
            });
        }

        let tx_id = response.txid.unwrap_or(payload.tx_id);
        debug!("Transaction {tx_id} is pending");
        loop {
            tokio::time::sleep(self.config.poll_interval).await;
            match self.client.transaction_info(&tx_id).await {
                Ok(Some(info)) => {
                    let finality = info.finality(&tx_id);
                    debug!("Transaction {tx_id} settled: {finality:?}");
                    return Ok(finality);
                }
                Ok(None) => trace!("Transaction {tx_id} not yet solidified"),
                Err(err) => warn!("Failed to look up transaction {tx_id}, retrying: {err}"),
            }
        }
    }
}

impl TronTransport {
    /// Contract, call, call value and fee limit of the transaction carrying `instruction`.
    fn encode_instruction(
        &self,
        instruction: &Instruction,
    ) -> Result<(TronAddress, EncodedCall, u64, u64), TransportError> {
        match instruction {
            Instruction::Approve {
                custodian,
                spender,
                amount,
            } => Ok((
                parse_address(custodian)?,
                encode_call(&ITRC20::approveCall {
                    spender: parse_address(spender)?.evm(),
                    amount: *amount,
                }),
                0,
                self.config.fee_limit_approve,
            )),
            Instruction::BulkTransfer {
                settlement,
                assets,
                recipients,
                amounts,
                value,
            } => {
                if assets.len() != recipients.len() || assets.len() != amounts.len() {
                    return Err(TransportError::Failed(format!(
                        "bulk transfer arrays differ in length: {} assets, {} recipients, {} amounts",
                        assets.len(),
                        recipients.len(),
                        amounts.len()
                    )));
                }
                let tokens = assets
                    .iter()
                    .map(|asset| parse_address(asset).map(|address| address.evm()))
                    .collect::<Result<Vec<_>, _>>()?;
                let recipients = recipients
                    .iter()
                    .map(|recipient| parse_address(recipient).map(|address| address.evm()))
                    .collect::<Result<Vec<_>, _>>()?;
                let call_value = u64::try_from(*value).map_err(|_| {
                    TransportError::Failed(format!("native value {value} exceeds the sun range"))
                })?;
                Ok((
                    parse_address(settlement)?,
                    encode_call(&IGasSaver::bulkTransferCall {
                        tokens,
                        recipients,
                        amounts: amounts.clone(),
                    }),
                    call_value,
                    self.config.fee_limit_transfer,
                ))
            }
        }
    }
}

/// Parses a base58check TRON address.
pub fn parse_address(address: &str) -> Result<TronAddress, TransportError> {
    TronAddress::from_str(address).map_err(|err| TransportError::InvalidAddress(err.to_string()))
}

/// Node refusals are transaction failures, everything else is transport trouble.
fn classify_api_error(err: api::Error) -> TransportError {
    match err {
        api::Error::Refused(detail) => TransportError::Failed(detail),
        api::Error::Malformed(detail) => TransportError::MalformedResponse(detail),
        other => TransportError::Rpc(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gassaver_engine::TronNetwork;
    use std::time::Duration;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const USDT_MAINNET: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";

    struct Decline;

    impl SigningConsent for Decline {
        fn approve(&self, _chain: ChainId, _instruction: &Instruction) -> bool {
            false
        }
    }

    fn transport() -> TronTransport {
        let signer = PrivateKeySigner::from_str(DEV_KEY).expect("valid key");
        TronTransport::new(TronConfig::new(TronNetwork::Nile), signer).expect("valid client")
    }

    /// Transport against `full_node` with fast readiness and finality polling.
    fn transport_at(full_node: &str) -> TronTransport {
        let mut config = TronConfig::new(TronNetwork::Nile);
        config.full_node = full_node.parse().expect("valid url");
        config.ready_attempts = 3;
        config.ready_interval = Duration::from_millis(1);
        config.poll_interval = Duration::from_millis(1);
        let signer = PrivateKeySigner::from_str(DEV_KEY).expect("valid key");
        TronTransport::new(config, signer).expect("valid client")
    }

    fn signed(tx_id: &str) -> SignedPayload {
        SignedPayload {
            tx_id: tx_id.to_string(),
            encoded: vec![0x0a, 0x02, 0xbe, 0xef],
        }
    }

    fn settlement() -> String {
        TronAddress::from_evm(alloy::primitives::Address::repeat_byte(0x33)).to_base58()
    }

    #[tokio::test]
    async fn declined_consent_rejects_before_building() {
        let transport = transport().with_consent(Arc::new(Decline));
        let instruction = Instruction::Approve {
            custodian: USDT_MAINNET.to_string(),
            spender: settlement(),
            amount: Amount::from(1u64),
        };
        assert!(matches!(
            transport.sign(&instruction).await,
            Err(TransportError::Rejected(_))
        ));
    }

    #[test]
    fn approvals_use_the_approval_fee_limit() -> Result<(), TransportError> {
        let transport = transport();
        let (contract, call, call_value, fee_limit) =
            transport.encode_instruction(&Instruction::Approve {
                custodian: USDT_MAINNET.to_string(),
                spender: settlement(),
                amount: Amount::from(150_000_000u64),
            })?;
        assert_eq!(contract.to_base58(), USDT_MAINNET);
        assert_eq!(call.function_selector, "approve(address,uint256)");
        assert_eq!(call_value, 0);
        assert_eq!(fee_limit, transport.config().fee_limit_approve);
        Ok(())
    }

    #[test]
    fn bulk_transfer_carries_native_value_in_sun() -> Result<(), TransportError> {
        let transport = transport();
        let instruction = Instruction::BulkTransfer {
            settlement: settlement(),
            assets: vec![TRON_NATIVE_PLACEHOLDER.to_string(), USDT_MAINNET.to_string()],
            recipients: vec![settlement(), settlement()],
            amounts: vec![Amount::from(2_000_000u64), Amount::from(1u64)],
            value: Amount::from(2_000_000u64),
        };
        let (contract, call, call_value, fee_limit) = transport.encode_instruction(&instruction)?;
        assert_eq!(contract.to_base58(), settlement());
        assert_eq!(
            call.function_selector,
            "bulkTransfer(address[],address[],uint256[])"
        );
        assert_eq!(call_value, 2_000_000);
        assert_eq!(fee_limit, transport.config().fee_limit_transfer);
        Ok(())
    }

    #[test]
    fn oversized_native_value_is_refused() {
        let transport = transport();
        let instruction = Instruction::BulkTransfer {
            settlement: settlement(),
            assets: vec![TRON_NATIVE_PLACEHOLDER.to_string()],
            recipients: vec![settlement()],
            amounts: vec![U256::MAX],
            value: U256::MAX,
        };
        assert!(matches!(
            transport.encode_instruction(&instruction),
            Err(TransportError::Failed(_))
        ));
    }

    #[test]
    fn transport_reports_its_family_and_placeholder() {
        let transport = transport();
        assert_eq!(transport.family(), ChainFamily::Tron);
        assert_eq!(transport.chain_id(), ChainId::Tron(TronNetwork::Nile));
        assert_eq!(transport.native_placeholder(), TRON_NATIVE_PLACEHOLDER);
        assert!(transport.validate_address(USDT_MAINNET).is_ok());
        assert!(matches!(
            transport.validate_address("0xa614f803b6fd780986a42c78ec9c7f77e6ded13c"),
            Err(TransportError::InvalidAddress(_))
        ));
    }

    #[test]
    fn node_refusals_are_failures() {
        assert_eq!(
            classify_api_error(api::Error::Refused("REVERT: balance".to_string())),
            TransportError::Failed("REVERT: balance".to_string())
        );
        assert!(matches!(
            classify_api_error(api::Error::InvalidApiKey),
            TransportError::Rpc(_)
        ));
    }

    #[tokio::test]
    async fn unreachable_node_is_not_ready_after_configured_attempts() {
        let transport = transport_at("http://127.0.0.1:1");
        match transport.ensure_ready().await {
            Err(TransportError::NotReady(reason)) => {
                assert!(reason.contains("after 3 attempts"), "{reason}");
            }
            other => panic!("expected NotReady, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn readiness_retries_until_the_node_answers() {
        let mock_server = MockServer::start().await;

        // The node is still syncing for the first two probes
        Mock::given(method("POST"))
            .and(path("/wallet/getnowblock"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/wallet/getnowblock"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "blockID": "00ab" })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/wallet/getaccount"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "balance": 5 })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = transport_at(&mock_server.uri());
        assert_eq!(transport.ensure_ready().await, Ok(()));
    }

    #[tokio::test]
    async fn broadcast_polls_until_the_transaction_is_solidified() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/wallet/broadcasthex"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({ "result": true, "txid": "d0d5f1a0" }),
            ))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/walletsolidity/gettransactioninfobyid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .up_to_n_times(2)
            .expect(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/walletsolidity/gettransactioninfobyid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "d0d5f1a0",
                "blockNumber": 7,
                "receipt": { "result": "SUCCESS" }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = transport_at(&mock_server.uri());
        assert_eq!(
            transport.broadcast(signed("d0d5f1a0")).await,
            Ok(Finality::Finalized {
                tx_id: "d0d5f1a0".to_string()
            })
        );
    }

    #[tokio::test]
    async fn reverted_execution_is_a_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/wallet/broadcasthex"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({ "result": true, "txid": "d0d5f1a0" }),
            ))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/walletsolidity/gettransactioninfobyid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "d0d5f1a0",
                "blockNumber": 7,
                "result": "FAILED",
                "receipt": { "result": "REVERT" }
            })))
            .mount(&mock_server)
            .await;

        let transport = transport_at(&mock_server.uri());
        match transport.broadcast(signed("d0d5f1a0")).await {
            Ok(Finality::Failed { detail }) => {
                assert!(detail.starts_with("REVERT in block 7"), "{detail}");
            }
            other => panic!("expected a failed execution, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refused_broadcast_is_rejected_without_polling() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/wallet/broadcasthex"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({ "result": false, "code": "SIGERROR" }),
            ))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/walletsolidity/gettransactioninfobyid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let transport = transport_at(&mock_server.uri());
        assert!(matches!(
            transport.broadcast(signed("d0d5f1a0")).await,
            Ok(Finality::Rejected { .. })
        ));
    }
}
