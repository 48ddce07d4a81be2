use std::collections::VecDeque;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Coin, Uint128};
use cw_storage_plus::{Item, Map};

use crate::{operation::Operation, relayer::Relayer};

/// Top level storage key. Values must not conflict.
/// Each key is only one byte long to ensure we use the smallest possible storage keys.
#[repr(u8)]
pub enum TopKey {
    Config = b'c',
    TokensCoreum = b'1',
    TokensXRPL = b'2',
    CoreumDenoms = b'3',
    XRPLCurrencies = b'4',
    PendingOperations = b'5',
    PendingTicketUpdate = b'6',
    PendingRotateKeys = b'7',
    AvailableTickets = b'8',
    UsedTicketsCounter = b'9',
    Evidences = b'e',
    ProcessedTxs = b'p',
    PendingRefunds = b'r',
    FeesCollected = b'f',
    ProhibitedXRPLRecipients = b'x',
    NetBridgedIn = b'n',
    XRPLTokensByDenom = b'd',
}

impl TopKey {
    const fn as_str(&self) -> &str {
        let array_ref = unsafe { std::mem::transmute::<_, &[u8; 1]>(self) };
        match core::str::from_utf8(array_ref) {
            Ok(a) => a,
            Err(_) => panic!("Non-utf8 enum value found. Use a-z, A-Z and 0-9"),
        }
    }
}

#[cw_serde]
#[derive(Eq)]
pub enum BridgeState {
    Active,
    Halted,
}

#[cw_serde]
#[derive(Eq)]
pub enum TokenState {
    Processing,
    Inactive,
    Enabled,
    Disabled,
}

#[cw_serde]
pub struct Config {
    pub relayers: Vec<Relayer>,
    pub evidence_threshold: u32,
    pub used_ticket_sequence_threshold: u32,
    pub trust_set_limit_amount: Uint128,
    pub bridge_xrpl_address: String,
    pub xrpl_base_fee: u64,
    pub bridge_state: BridgeState,
}

/// A token whose issuer lives on XRPL (`issuer`/`currency` are `None` only for
/// the native XRP entry, keyed separately from hex-derived issued tokens).
#[cw_serde]
pub struct XRPLToken {
    pub issuer: Option<String>,
    pub currency: Option<String>,
    pub coreum_denom: String,
    pub sending_precision: i32,
    pub max_holding_amount: Uint128,
    pub bridging_fee: Uint128,
    pub state: TokenState,
    /// The issuer's XRPL `TransferRate`, as reported off-chain by the owner
    /// at registration time (the contract has no way to query XRPL itself).
    /// `None` for the native XRP entry and for issuers that never set one.
    pub transfer_rate: Option<Uint128>,
}

/// A token whose issuer lives on Coreum, bridged out to XRPL under a
/// hex-fingerprint currency code owned by the bridge's multisig account.
#[cw_serde]
pub struct CoreumToken {
    pub denom: String,
    pub decimals: u32,
    pub xrpl_currency: String,
    pub sending_precision: i32,
    pub max_holding_amount: Uint128,
    pub bridging_fee: Uint128,
    pub state: TokenState,
}

#[cw_serde]
pub struct Evidences {
    pub relayers: Vec<Addr>,
}

#[cw_serde]
pub struct PendingRefund {
    pub xrpl_tx_hash: Option<String>,
    pub coin: Coin,
}

pub const CONFIG: Item<Config> = Item::new(TopKey::Config.as_str());

// Tokens registered from the Coreum side - key is denom on Coreum.
pub const COREUM_TOKENS: Map<String, CoreumToken> = Map::new(TopKey::TokensCoreum.as_str());
// Tokens registered from the XRPL side - key is issuer+currency (or "XRP").
pub const XRPL_TOKENS: Map<String, XRPLToken> = Map::new(TopKey::TokensXRPL.as_str());
// Reverse index: the asset-ft denom minted on Coreum for an XRPL-originated
// token -> its XRPL_TOKENS key, so SendToXRPL can identify the token from the
// funds it's sent without scanning the whole registry.
pub const XRPL_TOKENS_BY_DENOM: Map<String, String> = Map::new(TopKey::XRPLTokensByDenom.as_str());

// Dedup set guarding against hash collisions when deriving denoms for new XRPL tokens.
pub const COREUM_DENOMS: Map<String, cosmwasm_std::Empty> = Map::new(TopKey::CoreumDenoms.as_str());
// Derived XRPL currency -> owning Coreum denom. Doubles as the collision guard
// for `derive_xrpl_currency_for_coreum_token` and as the reverse index used to
// look up a CoreumToken when only the XRPL-side currency code is known.
pub const XRPL_CURRENCIES: Map<String, String> = Map::new(TopKey::XRPLCurrencies.as_str());

// Operation id (ticket_sequence if set, else account_sequence) -> Operation.
pub const PENDING_OPERATIONS: Map<u64, Operation> = Map::new(TopKey::PendingOperations.as_str());
pub const PENDING_TICKET_UPDATE: Item<bool> = Item::new(TopKey::PendingTicketUpdate.as_str());
pub const PENDING_ROTATE_KEYS: Item<bool> = Item::new(TopKey::PendingRotateKeys.as_str());

pub const AVAILABLE_TICKETS: Item<VecDeque<u64>> = Item::new(TopKey::AvailableTickets.as_str());
pub const USED_TICKETS_COUNTER: Item<u32> = Item::new(TopKey::UsedTicketsCounter.as_str());

// Evidence hash -> relayers that have voted for it so far (pre-threshold).
pub const EVIDENCES: Map<String, Evidences> = Map::new(TopKey::Evidences.as_str());
// tx_hash (lowercase) -> () once an evidence referencing it crossed threshold.
pub const PROCESSED_TXS: Map<String, cosmwasm_std::Empty> = Map::new(TopKey::ProcessedTxs.as_str());

// (recipient, operation id) -> refundable coin, for CoreumToXRPLTransfer operations
// that resolved as Rejected.
pub const PENDING_REFUNDS: Map<(Addr, u64), PendingRefund> = Map::new(TopKey::PendingRefunds.as_str());

// Denom -> amount of bridging/transfer fees collected and not yet claimed.
pub const FEES_COLLECTED: Map<String, Uint128> = Map::new(TopKey::FeesCollected.as_str());

pub const PROHIBITED_XRPL_RECIPIENTS: Map<String, cosmwasm_std::Empty> =
    Map::new(TopKey::ProhibitedXRPLRecipients.as_str());

// Running net amount (XRPL-decimal scale, signed) bridged into Coreum per
// externally-originated token key, used for the max-holding-amount check.
pub const NET_BRIDGED_IN: Map<String, i128> = Map::new(TopKey::NetBridgedIn.as_str());
