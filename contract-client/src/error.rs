//! The contract's error taxonomy: failures are reported as plain strings
//! inside an ABCI `RawLog`/`codespace` error (cosmwasm wraps the contract's
//! `Display` impl verbatim), so the façade's job is to classify that string
//! back into a typed error the orchestrator can match on, the same way
//! `xrpl_client::engine_result` classifies XRPL's string result codes.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractClientError {
    #[error("grpc transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("grpc call failed: {0}")]
    Grpc(#[from] tonic::Status),

    #[error("malformed contract response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("tx build error: {0}")]
    TxBuild(String),

    #[error("broadcast rejected, code {code}: {raw_log}")]
    BroadcastRejected { code: u32, raw_log: String },

    #[error("simulation failed: {0}")]
    SimulationFailed(String),

    // ---- typed contract error taxonomy ----
    #[error("NotOwner")]
    NotOwner,
    #[error("UnauthorizedSender")]
    UnauthorizedSender,
    #[error("CoreumTokenAlreadyRegistered")]
    CoreumTokenAlreadyRegistered,
    #[error("XRPLTokenAlreadyRegistered")]
    XRPLTokenAlreadyRegistered,
    #[error("XRPLTokenNotInactive")]
    XRPLTokenNotInactive,
    #[error("XRPLTokenNotEnabled")]
    XRPLTokenNotEnabled,
    #[error("TokenNotRegistered")]
    TokenNotRegistered,
    #[error("EvidenceAlreadyProvided")]
    EvidenceAlreadyProvided,
    #[error("OperationAlreadyExecuted")]
    OperationAlreadyExecuted,
    #[error("PendingOperationNotFound")]
    PendingOperationNotFound,
    #[error("SignatureAlreadyProvided")]
    SignatureAlreadyProvided,
    #[error("OperationVersionMismatch")]
    OperationVersionMismatch,
    #[error("InvalidTicketSequenceToAllocate")]
    InvalidTicketSequenceToAllocate,
    #[error("PendingTicketUpdate")]
    PendingTicketUpdate,
    #[error("StillHaveAvailableTickets")]
    StillHaveAvailableTickets,
    #[error("LastTicketReserved")]
    LastTicketReserved,
    #[error("InvalidXRPLAddress")]
    InvalidXRPLAddress,
    #[error("AmountSentIsZeroAfterTruncation")]
    AmountSentIsZeroAfterTruncation,
    #[error("MaximumBridgedAmountReached")]
    MaximumBridgedAmountReached,
    #[error("AssetFTFreezing")]
    AssetFTFreezing,
    #[error("AssetFTGlobalFreezing")]
    AssetFTGlobalFreezing,
    #[error("AssetFTWhitelistedLimitExceeded")]
    AssetFTWhitelistedLimitExceeded,
    #[error("BridgeHalted")]
    BridgeHalted,

    #[error("out of gas")]
    OutOfGas,

    #[error("unrecognized contract error: {0}")]
    Other(String),
}

impl ContractClientError {
    /// Error-class policy: benign-idempotent errors are logged and
    /// swallowed by the orchestrator rather than retried or surfaced.
    pub fn is_benign_idempotent(&self) -> bool {
        matches!(
            self,
            Self::EvidenceAlreadyProvided | Self::OperationAlreadyExecuted | Self::SignatureAlreadyProvided
        )
    }

    /// Transient errors are retried with bounded backoff; everything else is
    /// terminal for the current unit of work.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Grpc(_) | Self::OutOfGas | Self::SimulationFailed(_))
    }
}

/// Parses a raw ABCI `raw_log` string (the contract's `Display` impl,
/// verbatim, somewhere inside cosmos-sdk's wrapping) into a typed error.
/// Order matters: longer/more specific identifiers are matched before
/// shorter ones that could be substrings of another (there are none in this
/// taxonomy, but the ordering is kept deliberate for future additions).
pub fn classify_raw_log(raw_log: &str) -> ContractClientError {
    const TABLE: &[(&str, fn() -> ContractClientError)] = &[
        ("NotOwner", || ContractClientError::NotOwner),
        ("UnauthorizedSender", || ContractClientError::UnauthorizedSender),
        ("CoreumTokenAlreadyRegistered", || ContractClientError::CoreumTokenAlreadyRegistered),
        ("XRPLTokenAlreadyRegistered", || ContractClientError::XRPLTokenAlreadyRegistered),
        ("XRPLTokenNotInactive", || ContractClientError::XRPLTokenNotInactive),
        ("XRPLTokenNotEnabled", || ContractClientError::XRPLTokenNotEnabled),
        ("TokenNotRegistered", || ContractClientError::TokenNotRegistered),
        ("EvidenceAlreadyProvided", || ContractClientError::EvidenceAlreadyProvided),
        ("OperationAlreadyExecuted", || ContractClientError::OperationAlreadyExecuted),
        ("PendingOperationNotFound", || ContractClientError::PendingOperationNotFound),
        ("SignatureAlreadyProvided", || ContractClientError::SignatureAlreadyProvided),
        ("OperationVersionMismatch", || ContractClientError::OperationVersionMismatch),
        ("InvalidTicketSequenceToAllocate", || ContractClientError::InvalidTicketSequenceToAllocate),
        ("PendingTicketUpdate", || ContractClientError::PendingTicketUpdate),
        ("StillHaveAvailableTickets", || ContractClientError::StillHaveAvailableTickets),
        ("LastTicketReserved", || ContractClientError::LastTicketReserved),
        ("InvalidXRPLAddress", || ContractClientError::InvalidXRPLAddress),
        ("AmountSentIsZeroAfterTruncation", || ContractClientError::AmountSentIsZeroAfterTruncation),
        ("MaximumBridgedAmountReached", || ContractClientError::MaximumBridgedAmountReached),
        ("AssetFTFreezing", || ContractClientError::AssetFTFreezing),
        ("AssetFTGlobalFreezing", || ContractClientError::AssetFTGlobalFreezing),
        ("AssetFTWhitelistedLimitExceeded", || ContractClientError::AssetFTWhitelistedLimitExceeded),
        ("BridgeHalted", || ContractClientError::BridgeHalted),
        ("out of gas", || ContractClientError::OutOfGas),
    ];

    for (needle, build) in TABLE {
        if raw_log.contains(needle) {
            return build();
        }
    }
    ContractClientError::Other(raw_log.to_string())
}

pub type Result<T> = std::result::Result<T, ContractClientError>;
