// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::address::TronAddress;
use crate::contract::EncodedCall;
use crate::transaction::UnsignedTransaction;
use gassaver_engine::Finality;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

/// `TRON-PRO-API-KEY`, header names are case insensitive.
const API_KEY_HEADER: &str = "tron-pro-api-key";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid endpoint path {0:?}")]
    InvalidPath(String),
    #[error("Invalid API key header value")]
    InvalidApiKey,
    #[error("Node refused the call: {0}")]
    Refused(String),
    #[error("Unexpected response: {0}")]
    Malformed(String),
}

/// `result` object the node attaches to contract triggers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ReturnStatus {
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub code: Option<String>,
    /// Hex encoded UTF-8.
    #[serde(default)]
    pub message: Option<String>,
}

impl ReturnStatus {
    pub fn detail(&self) -> String {
        describe(self.code.as_deref(), self.message.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TriggerResponse {
    #[serde(default)]
    pub result: ReturnStatus,
    #[serde(default)]
    pub transaction: Option<UnsignedTransaction>,
    #[serde(default)]
    pub constant_result: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BroadcastResponse {
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    /// Hex encoded UTF-8.
    #[serde(default)]
    pub message: Option<String>,
}

impl BroadcastResponse {
    pub fn detail(&self) -> String {
        describe(self.code.as_deref(), self.message.as_deref())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Receipt {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub energy_usage_total: Option<u64>,
}

/// Solidified execution record of a transaction, empty until it is included.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TransactionInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "blockNumber")]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub receipt: Option<Receipt>,
    #[serde(default)]
    pub result: Option<String>,
    /// Hex encoded UTF-8.
    #[serde(default, rename = "resMessage")]
    pub res_message: Option<String>,
}

impl TransactionInfo {
    pub fn is_pending(&self) -> bool {
        self.id.is_none()
    }

    pub fn finality(&self, tx_id: &str) -> Finality {
        let receipt_result = self
            .receipt
            .as_ref()
            .and_then(|receipt| receipt.result.as_deref());
        let failed = self.result.as_deref() == Some("FAILED");

        match receipt_result {
            Some("SUCCESS") if !failed => Finality::Finalized {
                tx_id: tx_id.to_string(),
            },
            None if !failed => Finality::Finalized {
                tx_id: tx_id.to_string(),
            },
            outcome => Finality::Failed {
                detail: format!(
                    "{} in block {}: {}",
                    outcome.unwrap_or("FAILED"),
                    self.block_number
                        .map_or_else(|| "unknown".to_string(), |n| n.to_string()),
                    self.res_message
                        .as_deref()
                        .map(decode_message)
                        .unwrap_or_default()
                ),
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub address: Option<String>,
    /// TRX balance in sun. Absent for accounts that were never activated.
    #[serde(default)]
    pub balance: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Block {
    #[serde(rename = "blockID")]
    pub block_id: String,
}

#[derive(Serialize)]
struct TriggerRequest<'a> {
    owner_address: String,
    contract_address: String,
    function_selector: &'a str,
    parameter: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fee_limit: Option<u64>,
    call_value: u64,
    visible: bool,
}

/// Minimal client of the full node and solidity node HTTP API.
#[derive(Clone, Debug)]
pub struct TronClient {
    http: reqwest::Client,
    full_node: Url,
}

impl TronClient {
    pub fn new(full_node: Url, api_key: Option<&str>) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = api_key {
            let value = HeaderValue::from_str(api_key).map_err(|_| Error::InvalidApiKey)?;
            let _ = headers.insert(API_KEY_HEADER, value);
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self { http, full_node })
    }

    pub fn full_node(&self) -> &Url {
        &self.full_node
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, Error> {
        let url = self
            .full_node
            .join(path)
            .map_err(|_| Error::InvalidPath(path.to_string()))?;
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        let value = response.json::<R>().await?;
        Ok(value)
    }

    pub async fn now_block(&self) -> Result<Block, Error> {
        self.post("wallet/getnowblock", &serde_json::json!({})).await
    }

    pub async fn account(&self, address: &TronAddress) -> Result<Account, Error> {
        self.post(
            "wallet/getaccount",
            &serde_json::json!({ "address": address.to_base58(), "visible": true }),
        )
        .await
    }

    /// Runs a view call and returns its raw ABI encoded output.
    pub async fn trigger_constant(
        &self,
        owner: &TronAddress,
        contract: &TronAddress,
        call: &EncodedCall,
    ) -> Result<Vec<u8>, Error> {
        let request = TriggerRequest {
            owner_address: owner.to_base58(),
            contract_address: contract.to_base58(),
            function_selector: call.function_selector,
            parameter: &call.parameter,
            fee_limit: None,
            call_value: 0,
            visible: true,
        };
        let response: TriggerResponse = self
            .post("wallet/triggerconstantcontract", &request)
            .await?;
        if !response.result.result {
            return Err(Error::Refused(response.result.detail()));
        }
        let output = response
            .constant_result
            .first()
            .ok_or_else(|| Error::Malformed("no constant_result".to_string()))?;
        hex::decode(output).map_err(|err| Error::Malformed(format!("constant_result: {err}")))
    }

    /// Has the node build an unsigned contract call transaction.
    pub async fn trigger_smart_contract(
        &self,
        owner: &TronAddress,
        contract: &TronAddress,
        call: &EncodedCall,
        fee_limit: u64,
        call_value: u64,
    ) -> Result<UnsignedTransaction, Error> {
        let request = TriggerRequest {
            owner_address: owner.to_base58(),
            contract_address: contract.to_base58(),
            function_selector: call.function_selector,
            parameter: &call.parameter,
            fee_limit: Some(fee_limit),
            call_value,
            visible: true,
        };
        let response: TriggerResponse = self
            .post("wallet/triggersmartcontract", &request)
            .await?;
        if !response.result.result {
            return Err(Error::Refused(response.result.detail()));
        }
        response
            .transaction
            .ok_or_else(|| Error::Malformed("trigger returned no transaction".to_string()))
    }

    pub async fn broadcast_hex(&self, encoded: &[u8]) -> Result<BroadcastResponse, Error> {
        self.post(
            "wallet/broadcasthex",
            &serde_json::json!({ "transaction": hex::encode(encoded) }),
        )
        .await
    }

    /// Solidified transaction info, `None` while the transaction is not yet included.
    pub async fn transaction_info(&self, tx_id: &str) -> Result<Option<TransactionInfo>, Error> {
        let info: TransactionInfo = self
            .post(
                "walletsolidity/gettransactioninfobyid",
                &serde_json::json!({ "value": tx_id }),
            )
            .await?;
        Ok((!info.is_pending()).then_some(info))
    }
}

/// Node messages are hex encoded UTF-8, fall back to the raw text otherwise.
pub fn decode_message(message: &str) -> String {
    hex::decode(message)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| message.to_string())
}

fn describe(code: Option<&str>, message: Option<&str>) -> String {
    match (code, message.map(decode_message)) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_string(),
        (None, Some(message)) => message,
        (None, None) => "no detail".to_string(),
    }
}
