use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Coin, Uint128};
use cw_ownable::{cw_ownable_execute, cw_ownable_query};

use crate::{
    evidence::Evidence,
    operation::Operation,
    relayer::Relayer,
    state::{BridgeState, CoreumToken, TokenState, XRPLToken},
};

#[cw_serde]
pub struct InstantiateMsg {
    pub owner: String,
    pub relayers: Vec<Relayer>,
    pub evidence_threshold: u32,
    pub used_ticket_sequence_threshold: u32,
    pub trust_set_limit_amount: Uint128,
    pub bridge_xrpl_address: String,
    pub xrpl_base_fee: u64,
}

#[cw_ownable_execute]
#[cw_serde]
pub enum ExecuteMsg {
    /// Registers a Coreum-native token for bridging, deriving its XRPL
    /// currency code and reserving the asset-ft issue fee.
    RegisterCoreumToken {
        denom: String,
        decimals: u32,
        sending_precision: i32,
        max_holding_amount: Uint128,
        bridging_fee: Uint128,
    },
    /// Registers an XRPL-issued token (or the native XRP token when `issuer`
    /// and `currency` are omitted), kicking off a TrustSet operation.
    RegisterXRPLToken {
        issuer: Option<String>,
        currency: Option<String>,
        sending_precision: i32,
        max_holding_amount: Uint128,
        bridging_fee: Uint128,
        transfer_rate: Option<Uint128>,
    },
    /// A relayer's vote on an observed fact: either an incoming XRPL payment
    /// or the result of a transaction the bridge itself submitted.
    SaveEvidence {
        evidence: Evidence,
    },
    /// A relayer's multisignature over a pending operation's unsigned
    /// transaction blob.
    SaveSignature {
        operation_id: u64,
        operation_version: u64,
        signature: String,
    },
    /// Bridges Coreum-side funds out to an XRPL recipient.
    SendToXRPL {
        recipient: String,
        deliver_amount: Option<Uint128>,
    },
    /// Claims back funds from an operation that was confirmed Rejected on
    /// XRPL.
    ClaimRefund {
        pending_refund_id: u64,
    },
    /// Distributes all collected bridging/transfer fees evenly across
    /// relayers.
    ClaimRelayerFees {},
    /// Bootstraps a new ticket-allocation operation keyed by the bridge
    /// account's own sequence number, for use only when the pool is fully
    /// drained.
    RecoverTickets {
        account_sequence: u64,
        number_of_tickets: Option<u32>,
    },
    /// Retries registration of an XRPL token stuck in the `Inactive` state
    /// after a failed TrustSet.
    RecoverXRPLTokenRegistration {
        issuer: String,
        currency: String,
    },
    HaltBridge {},
    ResumeBridge {},
    /// Proposes a new relayer set and threshold, halting the bridge until
    /// the rotation is confirmed on XRPL.
    RotateKeys {
        new_relayers: Vec<Relayer>,
        new_evidence_threshold: u32,
    },
    UpdateXRPLToken {
        issuer: String,
        currency: String,
        state: Option<TokenState>,
        sending_precision: Option<i32>,
        bridging_fee: Option<Uint128>,
        max_holding_amount: Option<Uint128>,
        transfer_rate: Option<Uint128>,
    },
    UpdateCoreumToken {
        denom: String,
        state: Option<TokenState>,
        sending_precision: Option<i32>,
        bridging_fee: Option<Uint128>,
        max_holding_amount: Option<Uint128>,
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

#[cw_ownable_query]
#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    #[returns(XRPLTokensResponse)]
    XRPLTokens {
        offset: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(CoreumTokensResponse)]
    CoreumTokens {
        offset: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(XRPLTokenResponse)]
    XRPLToken {
        issuer: String,
        currency: String,
    },
    #[returns(CoreumTokenResponse)]
    CoreumToken {
        denom: String,
    },
    #[returns(AvailableTicketsResponse)]
    AvailableTickets {},
    #[returns(PendingOperationsResponse)]
    PendingOperations {},
    #[returns(PendingRefundsResponse)]
    PendingRefunds {
        address: String,
    },
    #[returns(FeesCollectedResponse)]
    FeesCollected {},
    #[returns(ProcessedTxResponse)]
    ProcessedTx {
        hash: String,
    },
    #[returns(ProhibitedXRPLRecipientsResponse)]
    ProhibitedXRPLRecipients {},
}

#[cw_serde]
pub struct ConfigResponse {
    pub relayers: Vec<Relayer>,
    pub evidence_threshold: u32,
    pub used_ticket_sequence_threshold: u32,
    pub trust_set_limit_amount: Uint128,
    pub bridge_xrpl_address: String,
    pub xrpl_base_fee: u64,
    pub bridge_state: BridgeState,
}

#[cw_serde]
pub struct XRPLTokensResponse {
    pub tokens: Vec<XRPLToken>,
}

#[cw_serde]
pub struct CoreumTokensResponse {
    pub tokens: Vec<CoreumToken>,
}

#[cw_serde]
pub struct XRPLTokenResponse {
    pub token: XRPLToken,
}

#[cw_serde]
pub struct CoreumTokenResponse {
    pub token: CoreumToken,
}

#[cw_serde]
pub struct AvailableTicketsResponse {
    pub tickets: Vec<u64>,
}

#[cw_serde]
pub struct PendingOperationsResponse {
    pub operations: Vec<Operation>,
}

#[cw_serde]
pub struct PendingRefundResponse {
    pub operation_id: u64,
    pub xrpl_tx_hash: Option<String>,
    pub coin: Coin,
}

#[cw_serde]
pub struct PendingRefundsResponse {
    pub pending_refunds: Vec<PendingRefundResponse>,
}

#[cw_serde]
pub struct FeesCollectedResponse {
    pub fees_collected: Vec<Coin>,
}

#[cw_serde]
pub struct ProcessedTxResponse {
    pub processed: bool,
}

#[cw_serde]
pub struct ProhibitedXRPLRecipientsResponse {
    pub prohibited_xrpl_recipients: Vec<String>,
}

#[cw_serde]
pub struct MigrateMsg {}
