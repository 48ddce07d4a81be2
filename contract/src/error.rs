use cosmwasm_std::StdError;
use cw_ownable::OwnershipError;
use cw_utils::PaymentError;
use thiserror::Error;
use xrpl_amount::AmountCodecError;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error(transparent)]
    Ownership(#[from] OwnershipError),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    #[error("{0}")]
    Amount(#[from] AmountCodecError),

    #[error("{0}")]
    Overflow(#[from] cosmwasm_std::OverflowError),

    // ---- config / relayer set ----
    #[error("InvalidThreshold: evidence threshold can not be higher than the number of relayers")]
    InvalidThreshold {},

    #[error("InvalidUsedTicketSequenceThreshold: must be between 2 and the number of reserved tickets")]
    InvalidUsedTicketSequenceThreshold {},

    #[error("DuplicatedRelayer: relayer addresses, XRPL addresses and XRPL public keys must be unique")]
    DuplicatedRelayer {},

    #[error("TooManyRelayers: a bridge can have at most {} relayers", crate::contract::MAX_RELAYERS)]
    TooManyRelayers {},

    #[error("UnauthorizedSender: sender is not a registered relayer")]
    UnauthorizedSender {},

    #[error("RotateKeysOngoing: a key rotation operation is already pending")]
    RotateKeysOngoing {},

    // ---- tokens ----
    #[error("CoreumTokenAlreadyRegistered: token {denom} is already registered")]
    CoreumTokenAlreadyRegistered { denom: String },

    #[error("XRPLTokenAlreadyRegistered: token with issuer {issuer} and currency {currency} is already registered")]
    XRPLTokenAlreadyRegistered { issuer: String, currency: String },

    #[error("TokenNotRegistered: the token must be registered before it can be bridged")]
    TokenNotRegistered {},

    #[error("TokenNotEnabled: the token is not in the Enabled state")]
    TokenNotEnabled {},

    #[error("XRPLTokenNotInactive: the XRPL token must be in the Inactive state to recover its registration")]
    XRPLTokenNotInactive {},

    #[error("XRPLTokenNotEnabled: the XRPL token must be in the Enabled state")]
    XRPLTokenNotEnabled {},

    #[error("InvalidTargetTokenState: a token can only move to Enabled or Disabled")]
    InvalidTargetTokenState {},

    #[error("TokenStateIsImmutable: a token in Processing or Inactive state can't have its state changed directly")]
    TokenStateIsImmutable {},

    #[error("InvalidSendingPrecision: sending precision must be between -15 and 15 and fit the token's decimals")]
    InvalidSendingPrecision {},

    #[error("InvalidTargetMaxHoldingAmount: new max holding amount is lower than the currently bridged amount")]
    InvalidTargetMaxHoldingAmount {},

    #[error("RegistrationFailure: the randomly generated currency/denom already exists, please retry")]
    RegistrationFailure {},

    #[error("InvalidIssueFee: the exact asset-ft issue fee must be sent, no more no less")]
    InvalidIssueFee {},

    // ---- evidence / operations ----
    #[error("EvidenceAlreadyProvided: this relayer already submitted this evidence")]
    EvidenceAlreadyProvided {},

    #[error("OperationAlreadyExecuted: the transaction hash was already consumed by a previous evidence")]
    OperationAlreadyExecuted {},

    #[error("PendingOperationNotFound: there is no pending operation with this ticket/account sequence")]
    PendingOperationNotFound {},

    #[error("PendingOperationAlreadyExists: there is already a pending operation for this ticket/account sequence")]
    PendingOperationAlreadyExists {},

    #[error("SignatureAlreadyProvided: this relayer already provided a signature for this operation")]
    SignatureAlreadyProvided {},

    #[error("OperationVersionMismatch: the operation's xrpl_base_fee changed, discard and re-sign")]
    OperationVersionMismatch {},

    #[error("InvalidOperationResult: evidence operation_result does not match the pending operation's type")]
    InvalidOperationResult {},

    #[error("InvalidTransactionResultEvidence: tx_hash is required unless the result is Invalid")]
    InvalidTransactionResultEvidence {},

    #[error("InvalidSuccessfulTransactionResultEvidence: Accepted evidence for a ticket allocation must include the allocated tickets")]
    InvalidSuccessfulTransactionResultEvidence {},

    #[error("InvalidFailedTransactionResultEvidence: Rejected/Invalid evidence must not include allocated tickets")]
    InvalidFailedTransactionResultEvidence {},

    #[error("InvalidTicketAllocationEvidence: evidence must reference an account_sequence or ticket_sequence")]
    InvalidTicketAllocationEvidence {},

    #[error("InvalidSignatureLength: signature exceeds the maximum allowed length")]
    InvalidSignatureLength {},

    // ---- tickets ----
    #[error("InvalidTicketSequenceToAllocate: number of tickets to allocate must be between 1 and 250")]
    InvalidTicketSequenceToAllocate {},

    #[error("PendingTicketUpdate: there is already a pending ticket allocation operation")]
    PendingTicketUpdate {},

    #[error("StillHaveAvailableTickets: tickets can only be recovered once the pool is fully consumed")]
    StillHaveAvailableTickets {},

    #[error("NoAvailableTickets: the ticket pool is empty")]
    NoAvailableTickets {},

    #[error("LastTicketReserved: the last available ticket is reserved for ticket reallocation")]
    LastTicketReserved {},

    // ---- amounts / transfers ----
    #[error("InvalidAmount: amount must be greater than zero")]
    InvalidAmount {},

    #[error("InvalidXRPLAmount: amount does not fit the XRPL decimal representation")]
    InvalidXRPLAmount {},

    #[error("InvalidXRPLCurrency: currency code is not a valid XRPL 3-letter code or 160-bit hex value")]
    InvalidXRPLCurrency {},

    #[error("InvalidDeliverAmount: max_amount can only be set when bridging XRP or an XRPL originated token")]
    InvalidDeliverAmount {},

    #[error("DeliverAmountIsProhibited: the recipient's trust line disallows delivering the requested amount")]
    DeliverAmountIsProhibited {},

    #[error("InvalidFundsAmount: funds sent do not match the requested transfer amount")]
    InvalidFundsAmount {},

    #[error("InvalidDenom: denom sent does not match a registered token")]
    InvalidDenom {},

    #[error("CannotCoverBridgingFees: amount sent is not enough to cover the bridging fee")]
    CannotCoverBridgingFees {},

    #[error("NotEnoughFeesToClaim: there are no collected fees of denom {denom} to claim")]
    NotEnoughFeesToClaim { denom: String },

    // ---- addressing / recipients ----
    #[error("InvalidXRPLAddress: {address} is not a valid XRPL address")]
    InvalidXRPLAddress { address: String },

    #[error("ProhibitedRecipient: this XRPL address is not allowed to receive bridged funds")]
    ProhibitedRecipient {},

    // ---- refunds ----
    #[error("PendingRefundNotFound: there is no pending refund with this id for this sender")]
    PendingRefundNotFound {},

    // ---- asset-ft passthrough ----
    #[error("AssetFTFreezing: the token is frozen for this account")]
    AssetFTFreezing {},

    #[error("AssetFTGlobalFreezing: the token is globally frozen")]
    AssetFTGlobalFreezing {},

    #[error("AssetFTWhitelistedLimitExceeded: the recipient's whitelisted limit would be exceeded")]
    AssetFTWhitelistedLimitExceeded {},

    // ---- bridge halt ----
    #[error("BridgeHalted: the bridge is halted, only recovery operations are allowed")]
    BridgeHalted {},
}
