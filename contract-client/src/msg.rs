//! Mirrors the JSON wire shape of `contract::msg` / `contract::operation` /
//! `contract::evidence` / `contract::state`. Kept as an independent, plain
//! `serde`-only copy rather than a path dependency on the `contract` crate
//! itself: `contract` targets `wasm32-unknown-unknown` with its own
//! `panic = "abort"` release profile (see the workspace root `Cargo.toml`),
//! which would leak into this crate's build graph the moment a native
//! binary path-depended on it. The contract remains the single source of
//! truth for the schema; this module is reviewed against it by hand, the
//! same way the Go relayer in the upstream project mirrors the contract's
//! `msg.rs` without importing Rust at all.

use serde::{Deserialize, Serialize};

/// Cosmos SDK coin: `{"denom": "...", "amount": "123"}`, amount always a
/// decimal string regardless of magnitude.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relayer {
    pub coreum_address: String,
    pub xrpl_address: String,
    pub xrpl_pub_key: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BridgeState {
    Active,
    Halted,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenState {
    Processing,
    Inactive,
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct XrplToken {
    pub issuer: Option<String>,
    pub currency: Option<String>,
    pub coreum_denom: String,
    pub sending_precision: i32,
    pub max_holding_amount: String,
    pub bridging_fee: String,
    pub state: TokenState,
    pub transfer_rate: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoreumToken {
    pub denom: String,
    pub decimals: u32,
    pub xrpl_currency: String,
    pub sending_precision: i32,
    pub max_holding_amount: String,
    pub bridging_fee: String,
    pub state: TokenState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Signature {
    pub relayer_coreum_address: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum OperationType {
    AllocateTickets {
        number: u32,
    },
    TrustSet {
        issuer: String,
        currency: String,
        trust_set_limit_amount: String,
    },
    RotateKeys {
        new_relayers: Vec<Relayer>,
        new_evidence_threshold: u32,
    },
    #[serde(rename = "coreum_to_xrpl_transfer")]
    CoreumToXRPLTransfer {
        issuer: String,
        currency: String,
        amount: String,
        max_amount: Option<String>,
        sender: String,
        recipient: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Operation {
    pub id: u64,
    pub version: u64,
    pub ticket_sequence: Option<u64>,
    pub account_sequence: Option<u64>,
    pub signatures: Vec<Signature>,
    pub operation_type: OperationType,
    pub xrpl_base_fee: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionResult {
    Accepted,
    Rejected,
    Invalid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum OperationResult {
    TicketsAllocation { tickets: Option<Vec<u64>> },
    TrustSet {},
    CoreumToXRPLTransfer {},
    KeysRotation {},
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Evidence {
    XRPLToCoreumTransfer {
        tx_hash: String,
        issuer: String,
        currency: String,
        amount: String,
        recipient: String,
        memo: Option<String>,
    },
    XRPLTransactionResult {
        tx_hash: Option<String>,
        account_sequence: Option<u64>,
        ticket_sequence: Option<u64>,
        transaction_result: TransactionResult,
        operation_result: Option<OperationResult>,
    },
}

/// `cw_ownable`'s proposal action, mirrored for `UpdateOwnership`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum OwnershipAction {
    TransferOwnership { new_owner: String, expiry: Option<u64> },
    AcceptOwnership,
    RenounceOwnership,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExecuteMsg {
    UpdateOwnership(OwnershipAction),
    RegisterCoreumToken {
        denom: String,
        decimals: u32,
        sending_precision: i32,
        max_holding_amount: String,
        bridging_fee: String,
    },
    RegisterXRPLToken {
        issuer: Option<String>,
        currency: Option<String>,
        sending_precision: i32,
        max_holding_amount: String,
        bridging_fee: String,
        transfer_rate: Option<String>,
    },
    SaveEvidence {
        evidence: Evidence,
    },
    SaveSignature {
        operation_id: u64,
        operation_version: u64,
        signature: String,
    },
    SendToXRPL {
        recipient: String,
        deliver_amount: Option<String>,
    },
    ClaimRefund {
        pending_refund_id: u64,
    },
    ClaimRelayerFees {},
    RecoverTickets {
        account_sequence: u64,
        number_of_tickets: Option<u32>,
    },
    RecoverXRPLTokenRegistration {
        issuer: String,
        currency: String,
    },
    HaltBridge {},
    ResumeBridge {},
    RotateKeys {
        new_relayers: Vec<Relayer>,
        new_evidence_threshold: u32,
    },
    UpdateXRPLToken {
        issuer: String,
        currency: String,
        state: Option<TokenState>,
        sending_precision: Option<i32>,
        bridging_fee: Option<String>,
        max_holding_amount: Option<String>,
        transfer_rate: Option<String>,
    },
    UpdateCoreumToken {
        denom: String,
        state: Option<TokenState>,
        sending_precision: Option<i32>,
        bridging_fee: Option<String>,
        max_holding_amount: Option<String>,
    },
    UpdateProhibitedXRPLRecipients {
        prohibited_xrpl_recipients: Vec<String>,
    },
    UpdateXRPLBaseFee {
        xrpl_base_fee: u64,
    },
    CancelPendingOperation {
        operation_id: u64,
    },
}

#[derive(Debug, Clone, Serialize)]
pub enum QueryMsg {
    Ownership {},
    Config {},
    XRPLTokens { offset: Option<u64>, limit: Option<u32> },
    CoreumTokens { offset: Option<u64>, limit: Option<u32> },
    XRPLToken { issuer: String, currency: String },
    CoreumToken { denom: String },
    AvailableTickets {},
    PendingOperations {},
    PendingRefunds { address: String },
    FeesCollected {},
    ProcessedTx { hash: String },
    ProhibitedXRPLRecipients {},
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnershipResponse {
    pub owner: Option<String>,
    pub pending_owner: Option<String>,
    pub pending_expiry: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigResponse {
    pub relayers: Vec<Relayer>,
    pub evidence_threshold: u32,
    pub used_ticket_sequence_threshold: u32,
    pub trust_set_limit_amount: String,
    pub bridge_xrpl_address: String,
    pub xrpl_base_fee: u64,
    pub bridge_state: BridgeState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XrplTokensResponse {
    pub tokens: Vec<XrplToken>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoreumTokensResponse {
    pub tokens: Vec<CoreumToken>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XrplTokenResponse {
    pub token: XrplToken,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoreumTokenResponse {
    pub token: CoreumToken,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailableTicketsResponse {
    pub tickets: Vec<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PendingOperationsResponse {
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PendingRefundResponse {
    pub operation_id: u64,
    pub xrpl_tx_hash: Option<String>,
    pub coin: Coin,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PendingRefundsResponse {
    pub pending_refunds: Vec<PendingRefundResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeesCollectedResponse {
    pub fees_collected: Vec<Coin>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessedTxResponse {
    pub processed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProhibitedXRPLRecipientsResponse {
    pub prohibited_xrpl_recipients: Vec<String>,
}
