// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::common::{Address, Calldata, EthereumWallet, U256};
use crate::contract::erc20::{approve_calldata, Erc20Token};
use crate::contract::settlement::bulk_transfer_calldata;
use crate::network::EvmNetwork;
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{Ethereum, ReceiptResponse, TransactionBuilder};
use alloy::providers::{PendingTransactionError, Provider, ProviderBuilder, ReqwestProvider};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::{Client, Http};
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use gassaver_engine::chain::EVM_NATIVE_PLACEHOLDER;
use gassaver_engine::{
    AutoApprove, ChainFamily, ChainId, ChainTransport, Finality, Instruction, SignedPayload,
    SigningConsent, TransportError,
};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;

type Token = Erc20Token<Http<Client>, ReqwestProvider, Ethereum>;

/// [`ChainTransport`] for EVM chains, signing locally and broadcasting raw
/// transactions over JSON-RPC.
pub struct EvmTransport {
    network: EvmNetwork,
    provider: ReqwestProvider,
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
    settlement: Option<Address>,
    consent: Arc<dyn SigningConsent>,
    signing: Mutex<()>,
}

impl EvmTransport {
    pub fn new(network: EvmNetwork, signer: PrivateKeySigner) -> Self {
        let provider = ProviderBuilder::new().on_http(network.rpc_url().clone());
        let wallet = EthereumWallet::from(signer.clone());
        Self {
            network,
            provider,
            signer,
            wallet,
            settlement: None,
            consent: Arc::new(AutoApprove),
            signing: Mutex::new(()),
        }
    }

    /// Settlement contract whose deployment [`ChainTransport::ensure_ready`] checks.
    pub fn with_settlement_contract(mut self, settlement: &str) -> Result<Self, TransportError> {
        self.settlement = Some(parse_address(settlement)?);
        Ok(self)
    }

    pub fn with_consent(mut self, consent: Arc<dyn SigningConsent>) -> Self {
        self.consent = consent;
        self
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn network(&self) -> &EvmNetwork {
        &self.network
    }

    async fn has_code(&self, address: Address) -> Result<bool, TransportError> {
        let code = self
            .provider
            .get_code_at(address)
            .await
            .map_err(classify_rpc_error)?;
        Ok(!code.is_empty())
    }

    async fn build_transaction(
        &self,
        to: Address,
        input: Calldata,
        value: U256,
    ) -> Result<TransactionRequest, TransportError> {
        let from = self.address();
        let nonce = self
            .provider
            .get_transaction_count(from)
            .await
            .map_err(classify_rpc_error)?;
        let fees = self
            .provider
            .estimate_eip1559_fees(None)
            .await
            .map_err(classify_rpc_error)?;

        let mut tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(input)
            .with_value(value)
            .with_nonce(nonce)
            .with_chain_id(self.network.chain_id())
            .with_max_fee_per_gas(fees.max_fee_per_gas)
            .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas);

        let gas_limit = self
            .provider
            .estimate_gas(&tx)
            .await
            .map_err(classify_rpc_error)
            .inspect_err(|err| error!("Error estimating gas for call to {to:?}: {err}"))?;
        tx.set_gas_limit(gas_limit);

        debug!("Built transaction to {to:?} with nonce {nonce} and gas limit {gas_limit}");
        Ok(tx)
    }
}

#[async_trait]
impl ChainTransport for EvmTransport {
    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    fn chain_id(&self) -> ChainId {
        self.network.chain()
    }

    fn native_placeholder(&self) -> String {
        EVM_NATIVE_PLACEHOLDER.to_string()
    }

    fn validate_address(&self, address: &str) -> Result<(), TransportError> {
        parse_address(address).map(|_| ())
    }

    async fn ensure_ready(&self) -> Result<(), TransportError> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|err| TransportError::NotReady(format!("RPC endpoint unreachable: {err}")))?;
        if chain_id != self.network.chain_id() {
            return Err(TransportError::NotReady(format!(
                "RPC endpoint serves chain {chain_id}, expected {}",
                self.network.chain_id()
            )));
        }

        if let Some(settlement) = self.settlement {
            if !self.has_code(settlement).await? {
                return Err(TransportError::NotReady(format!(
                    "no settlement contract deployed at {settlement:?}"
                )));
            }
        }

        debug!("EVM transport ready on chain {chain_id} as {:?}", self.address());
        Ok(())
    }

    async fn query_decimals(&self, custodian: &str) -> Result<u8, TransportError> {
        let token = Token::new(parse_address(custodian)?, self.provider.clone());
        token.decimals().await.map_err(classify_contract_error)
    }

    async fn native_balance(&self) -> Result<U256, TransportError> {
        self.provider
            .get_balance(self.address())
            .await
            .map_err(classify_rpc_error)
    }

    async fn token_balance(&self, custodian: &str) -> Result<U256, TransportError> {
        let custodian = parse_address(custodian)?;
        if !self.has_code(custodian).await? {
            warn!("No contract deployed at {custodian:?}, reporting a zero balance");
            return Ok(U256::ZERO);
        }
        let token = Token::new(custodian, self.provider.clone());
        token
            .balance_of(self.address())
            .await
            .map_err(classify_contract_error)
    }

    async fn sign(&self, instruction: &Instruction) -> Result<SignedPayload, TransportError> {
        let _guard = self.signing.lock().await;

        if !self.consent.approve(self.chain_id(), instruction) {
            info!("Signature declined for {instruction}");
            return Err(TransportError::Rejected(
                "signature request declined".to_string(),
            ));
        }

        let (to, input, value) = encode_instruction(instruction)?;
        let tx = self.build_transaction(to, input, value).await?;
        let envelope = tx
            .build(&self.wallet)
            .await
            .map_err(|err| TransportError::Signing(err.to_string()))
            .inspect_err(|err| error!("Error signing transaction: {err}"))?;

        let tx_id = format!("{:?}", envelope.tx_hash());
        debug!("Signed transaction {tx_id}");
        Ok(SignedPayload {
            tx_id,
            encoded: envelope.encoded_2718(),
        })
    }

    async fn broadcast(&self, payload: SignedPayload) -> Result<Finality, TransportError> {
        let pending = self
            .provider
            .send_raw_transaction(&payload.encoded)
            .await
            .map_err(classify_rpc_error)
            .inspect_err(|err| error!("Error broadcasting {}: {err}", payload.tx_id))?;

        let tx_hash = *pending.tx_hash();
        debug!("Transaction {tx_hash:?} is pending");
        let receipt = pending
            .get_receipt()
            .await
            .map_err(classify_pending_error)
            .inspect_err(|err| error!("Error waiting for receipt of {tx_hash:?}: {err}"))?;

        if receipt.status() {
            debug!("Transaction {tx_hash:?} is successful");
            Ok(Finality::Finalized {
                tx_id: format!("{tx_hash:?}"),
            })
        } else {
            Ok(Finality::Failed {
                detail: format!(
                    "execution reverted in block {}",
                    receipt
                        .block_number()
                        .map_or_else(|| "unknown".to_string(), |n| n.to_string())
                ),
            })
        }
    }
}

/// Parses an EVM address, `0x` followed by 40 hex digits.
pub fn parse_address(address: &str) -> Result<Address, TransportError> {
    let digits = address
        .strip_prefix("0x")
        .ok_or_else(|| TransportError::InvalidAddress(format!("{address:?} lacks the 0x prefix")))?;
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(TransportError::InvalidAddress(format!(
            "{address:?} is not 40 hex digits"
        )));
    }
    Address::from_str(address).map_err(|err| TransportError::InvalidAddress(err.to_string()))
}

/// Target, calldata and value of the transaction carrying `instruction`.
fn encode_instruction(
    instruction: &Instruction,
) -> Result<(Address, Calldata, U256), TransportError> {
    match instruction {
        Instruction::Approve {
            custodian,
            spender,
            amount,
        } => Ok((
            parse_address(custodian)?,
            approve_calldata(parse_address(spender)?, *amount),
            U256::ZERO,
        )),
        Instruction::BulkTransfer {
            settlement,
            assets,
            recipients,
            amounts,
            value,
        } => {
            let tokens = assets
                .iter()
                .map(|asset| parse_address(asset))
                .collect::<Result<Vec<_>, _>>()?;
            let recipients = recipients
                .iter()
                .map(|recipient| parse_address(recipient))
                .collect::<Result<Vec<_>, _>>()?;
            let calldata = bulk_transfer_calldata(tokens, recipients, amounts.clone())
                .map_err(|err| TransportError::Failed(err.to_string()))?;
            Ok((parse_address(settlement)?, calldata, *value))
        }
    }
}

/// Splits wallet rejections from other RPC failures.
pub fn classify_rpc_error(err: RpcError<TransportErrorKind>) -> TransportError {
    match &err {
        RpcError::ErrorResp(payload) if payload.code == USER_REJECTED_CODE => {
            TransportError::Rejected(payload.message.to_string())
        }
        RpcError::ErrorResp(payload) => {
            TransportError::Failed(format!("{} (code {})", payload.message, payload.code))
        }
        _ => TransportError::Rpc(err.to_string()),
    }
}

fn classify_contract_error(err: alloy::contract::Error) -> TransportError {
    match err {
        alloy::contract::Error::TransportError(err) => classify_rpc_error(err),
        other => TransportError::MalformedResponse(other.to_string()),
    }
}

fn classify_pending_error(err: PendingTransactionError) -> TransportError {
    match err {
        PendingTransactionError::TransportError(err) => classify_rpc_error(err),
        other => TransportError::Failed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::random_signer;
    use alloy::rpc::json_rpc::ErrorPayload;
    use gassaver_engine::Amount;
    use wiremock::{matchers::method, Mock, MockServer, Request, Respond, ResponseTemplate};

    struct Decline;

    impl SigningConsent for Decline {
        fn approve(&self, _chain: ChainId, _instruction: &Instruction) -> bool {
            false
        }
    }

    fn transport() -> EvmTransport {
        let network = EvmNetwork::new(ChainId::Evm(31337), "http://localhost:8545")
            .expect("valid network");
        EvmTransport::new(network, random_signer())
    }

    /// JSON-RPC node on `chain_id` with no contract code deployed anywhere.
    struct EmptyChain {
        chain_id: u64,
    }

    impl Respond for EmptyChain {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let call: serde_json::Value =
                serde_json::from_slice(&request.body).expect("json-rpc request");
            let result = match call["method"].as_str() {
                Some("eth_chainId") => format!("{:#x}", self.chain_id),
                Some("eth_getCode") => "0x".to_string(),
                other => panic!("unexpected call {other:?}"),
            };
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": call["id"],
                "result": result,
            }))
        }
    }

    fn transport_at(mock_server: &MockServer) -> EvmTransport {
        let network =
            EvmNetwork::new(ChainId::Evm(31337), &mock_server.uri()).expect("valid network");
        EvmTransport::new(network, random_signer())
    }

    fn error_response(code: i64, message: &'static str) -> RpcError<TransportErrorKind> {
        RpcError::ErrorResp(ErrorPayload {
            code,
            message: message.into(),
            data: None,
        })
    }

    #[test]
    fn user_rejection_is_classified_as_rejected() {
        assert_eq!(
            classify_rpc_error(error_response(4001, "User rejected the request.")),
            TransportError::Rejected("User rejected the request.".to_string())
        );
        assert_eq!(
            classify_rpc_error(error_response(-32000, "insufficient funds")),
            TransportError::Failed("insufficient funds (code -32000)".to_string())
        );
        assert!(matches!(
            classify_rpc_error(RpcError::NullResp),
            TransportError::Rpc(_)
        ));
    }

    #[test]
    fn addresses_follow_the_evm_grammar() {
        assert!(parse_address("0x1111111111111111111111111111111111111111").is_ok());
        assert!(parse_address("0xdAC17F958D2ee523a2206206994597C13D831ec7").is_ok());
        for invalid in [
            "1111111111111111111111111111111111111111",
            "0x111111111111111111111111111111111111111",
            "0x11111111111111111111111111111111111111111",
            "0xZZ11111111111111111111111111111111111111",
            "TLCuviLXZtgF7JgXxwrUzrHpt4mmbMRTfW",
        ] {
            assert!(
                matches!(parse_address(invalid), Err(TransportError::InvalidAddress(_))),
                "{invalid} should be rejected"
            );
        }
    }

    #[test]
    fn bulk_transfer_carries_native_value() -> Result<(), TransportError> {
        let instruction = Instruction::BulkTransfer {
            settlement: "0xE0636c80c18931cf5BFd24c8A3679aa85e8e7d8D".to_string(),
            assets: vec![EVM_NATIVE_PLACEHOLDER.to_string()],
            recipients: vec!["0x1111111111111111111111111111111111111111".to_string()],
            amounts: vec![Amount::from(5u64)],
            value: Amount::from(5u64),
        };
        let (to, calldata, value) = encode_instruction(&instruction)?;
        assert_eq!(
            to,
            parse_address("0xE0636c80c18931cf5BFd24c8A3679aa85e8e7d8D")?
        );
        assert!(!calldata.is_empty());
        assert_eq!(value, U256::from(5u64));

        let approval = Instruction::Approve {
            custodian: "0xAFcEeeC3708C9760E70DE04E954Acf409c001A59".to_string(),
            spender: "0xE0636c80c18931cf5BFd24c8A3679aa85e8e7d8D".to_string(),
            amount: Amount::from(1u64),
        };
        let (_, _, value) = encode_instruction(&approval)?;
        assert_eq!(value, U256::ZERO);
        Ok(())
    }

    #[tokio::test]
    async fn declined_consent_rejects_before_building() {
        let transport = transport().with_consent(Arc::new(Decline));
        let instruction = Instruction::Approve {
            custodian: "0xAFcEeeC3708C9760E70DE04E954Acf409c001A59".to_string(),
            spender: "0xE0636c80c18931cf5BFd24c8A3679aa85e8e7d8D".to_string(),
            amount: Amount::from(1u64),
        };
        assert!(matches!(
            transport.sign(&instruction).await,
            Err(TransportError::Rejected(_))
        ));
    }

    #[test]
    fn transport_reports_its_family_and_placeholder() {
        let transport = transport();
        assert_eq!(transport.family(), ChainFamily::Evm);
        assert_eq!(transport.chain_id(), ChainId::Evm(31337));
        assert_eq!(transport.native_placeholder(), EVM_NATIVE_PLACEHOLDER);
        assert!(transport.validate_address("0x123").is_err());
    }

    #[tokio::test]
    async fn endpoint_on_another_chain_is_not_ready() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(EmptyChain { chain_id: 1 })
            .mount(&mock_server)
            .await;

        match transport_at(&mock_server).ensure_ready().await {
            Err(TransportError::NotReady(reason)) => {
                assert_eq!(reason, "RPC endpoint serves chain 1, expected 31337");
            }
            other => panic!("expected NotReady, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_settlement_contract_is_not_ready() -> Result<(), TransportError> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(EmptyChain { chain_id: 31337 })
            .mount(&mock_server)
            .await;

        let transport = transport_at(&mock_server)
            .with_settlement_contract("0xE0636c80c18931cf5BFd24c8A3679aa85e8e7d8D")?;
        assert!(matches!(
            transport.ensure_ready().await,
            Err(TransportError::NotReady(reason)) if reason.starts_with("no settlement contract")
        ));
        Ok(())
    }

    #[tokio::test]
    async fn custodian_without_code_has_zero_balance() -> Result<(), TransportError> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(EmptyChain { chain_id: 31337 })
            .mount(&mock_server)
            .await;

        let balance = transport_at(&mock_server)
            .token_balance("0xAFcEeeC3708C9760E70DE04E954Acf409c001A59")
            .await?;
        assert_eq!(balance, U256::ZERO);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_not_ready() {
        let network =
            EvmNetwork::new(ChainId::Evm(31337), "http://127.0.0.1:1").expect("valid network");
        let transport = EvmTransport::new(network, random_signer());
        assert!(matches!(
            transport.ensure_ready().await,
            Err(TransportError::NotReady(reason)) if reason.starts_with("RPC endpoint unreachable")
        ));
    }
}
