//! Request/response payload shapes for the subset of the `rippled` JSON-RPC
//! API this bridge needs. Field names follow the wire protocol exactly
//! (snake_case, matching the actual RPC), not Rust convention.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_false() -> bool {
    false
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountInfoRequest<'a> {
    pub account: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_index: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfoResult {
    pub account_data: AccountData,
    pub ledger_index: Option<u64>,
    pub validated: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountData {
    pub Account: String,
    pub Balance: String,
    pub Sequence: u32,
    #[serde(default)]
    pub OwnerCount: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountLinesRequest<'a> {
    pub account: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountLinesResult {
    pub lines: Vec<TrustLine>,
    #[serde(default)]
    pub marker: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrustLine {
    pub account: String,
    pub balance: String,
    pub currency: String,
    pub limit: String,
}

/// `account_tx`: paged transaction history for an account, ordered by
/// (ledger_index, meta's transaction index) within a page.
#[derive(Debug, Clone, Serialize)]
pub struct AccountTxRequest<'a> {
    pub account: &'a str,
    pub ledger_index_min: i64,
    pub ledger_index_max: i64,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Value>,
    #[serde(default = "default_false")]
    pub forward: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountTxResult {
    pub account: String,
    pub ledger_index_min: i64,
    pub ledger_index_max: i64,
    pub transactions: Vec<AccountTxRecord>,
    #[serde(default)]
    pub marker: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountTxRecord {
    pub tx: Value,
    pub meta: Value,
    pub validated: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequest<'a> {
    pub tx_blob: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResult {
    pub engine_result: String,
    pub engine_result_code: i32,
    pub engine_result_message: String,
    #[serde(default)]
    pub tx_json: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TxRequest<'a> {
    pub transaction: &'a str,
    #[serde(default = "default_false")]
    pub binary: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxResult {
    pub hash: String,
    pub validated: Option<bool>,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(default)]
    pub ledger_index: Option<u64>,
    #[serde(rename = "TransactionType")]
    pub transaction_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerStateResult {
    pub state: ServerState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerState {
    pub validated_ledger: Option<ValidatedLedger>,
    pub load_base: u32,
    pub load_factor: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidatedLedger {
    pub seq: u64,
    pub base_fee: u64,
    pub reserve_base: u64,
    pub reserve_inc: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerCurrentResult {
    pub ledger_current_index: u64,
}

/// Generic JSON-RPC envelope: `{"method": ..., "params": [ {...} ]}`.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a, P> {
    pub method: &'a str,
    pub params: [P; 1],
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcEnvelope<R> {
    pub result: RpcResultEnvelope<R>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RpcResultEnvelope<R> {
    Err { error: String, error_message: Option<String> },
    Ok(R),
}
