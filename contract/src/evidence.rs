use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Storage, Uint128};
use sha2::{Digest, Sha256};

use crate::{
    error::ContractError,
    state::{Evidences, CONFIG, EVIDENCES, PROCESSED_TXS},
};

#[cw_serde]
#[derive(Eq)]
pub enum TransactionResult {
    Accepted,
    Rejected,
    Invalid,
}

#[cw_serde]
pub enum OperationResult {
    TicketsAllocation { tickets: Option<Vec<u64>> },
    TrustSet {},
    CoreumToXRPLTransfer {},
    KeysRotation {},
}

#[cw_serde]
pub enum Evidence {
    /// A confirmed XRPL Payment to the bridge account with a registered
    /// (issuer, currency) and a recipient decoded from the memo.
    XRPLToCoreumTransfer {
        tx_hash: String,
        issuer: String,
        currency: String,
        amount: Uint128,
        recipient: Addr,
        memo: Option<String>,
    },
    /// The on-chain result of a transaction the bridge itself submitted to
    /// XRPL to fulfil a pending operation.
    XRPLTransactionResult {
        tx_hash: Option<String>,
        account_sequence: Option<u64>,
        ticket_sequence: Option<u64>,
        transaction_result: TransactionResult,
        operation_result: Option<OperationResult>,
    },
}

impl Evidence {
    /// Hash used for vote-deduplication: two relayers submitting the exact
    /// same fact must land on the same hash so `EVIDENCES` can tally votes.
    pub fn get_hash(&self) -> String {
        let to_hash = match self {
            Evidence::XRPLToCoreumTransfer {
                tx_hash,
                issuer,
                currency,
                amount,
                recipient,
                ..
            } => format!("XRPLToCoreumTransfer{tx_hash}{issuer}{currency}{amount}{recipient}"),
            Evidence::XRPLTransactionResult {
                tx_hash,
                account_sequence,
                ticket_sequence,
                transaction_result,
                operation_result,
            } => format!(
                "XRPLTransactionResult{:?}{:?}{:?}{:?}{:?}",
                tx_hash, account_sequence, ticket_sequence, transaction_result, operation_result
            ),
        };
        hash_bytes(to_hash.into_bytes())
    }

    pub fn get_tx_hash(&self) -> Option<String> {
        match self {
            Evidence::XRPLToCoreumTransfer { tx_hash, .. } => Some(tx_hash.clone()),
            Evidence::XRPLTransactionResult { tx_hash, .. } => tx_hash.clone(),
        }
    }

    /// The operation id this evidence resolves, if any (only transaction
    /// result evidence refers back to a pending operation).
    pub fn operation_id(&self) -> Option<u64> {
        match self {
            Evidence::XRPLToCoreumTransfer { .. } => None,
            Evidence::XRPLTransactionResult {
                ticket_sequence,
                account_sequence,
                ..
            } => ticket_sequence.or(*account_sequence),
        }
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        match self {
            Evidence::XRPLToCoreumTransfer { amount, .. } => {
                if amount.is_zero() {
                    return Err(ContractError::InvalidAmount {});
                }
                Ok(())
            }
            Evidence::XRPLTransactionResult {
                tx_hash,
                account_sequence,
                ticket_sequence,
                transaction_result,
                operation_result,
            } => {
                if account_sequence.is_none() && ticket_sequence.is_none() {
                    return Err(ContractError::InvalidTicketAllocationEvidence {});
                }
                if tx_hash.is_none() && transaction_result.ne(&TransactionResult::Invalid) {
                    return Err(ContractError::InvalidTransactionResultEvidence {});
                }
                match (transaction_result, operation_result) {
                    (
                        TransactionResult::Accepted,
                        Some(OperationResult::TicketsAllocation { tickets }),
                    ) => {
                        if tickets.is_none() {
                            return Err(ContractError::InvalidSuccessfulTransactionResultEvidence {});
                        }
                    }
                    (_, Some(OperationResult::TicketsAllocation { tickets })) => {
                        if tickets.is_some() {
                            return Err(ContractError::InvalidFailedTransactionResultEvidence {});
                        }
                    }
                    _ => {}
                }
                Ok(())
            }
        }
    }
}

pub fn hash_bytes(bytes: Vec<u8>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Records `sender`'s vote for `evidence`. Returns `Ok(true)` exactly once
/// per tx_hash, the instant the vote count reaches `evidence_threshold`
/// (invariant: quorum-before-effect, at-most-once-per-tx_hash).
pub fn handle_evidence(
    storage: &mut dyn Storage,
    sender: Addr,
    evidence: &Evidence,
) -> Result<bool, ContractError> {
    if let Some(tx_hash) = evidence.get_tx_hash() {
        if PROCESSED_TXS.has(storage, tx_hash.to_lowercase()) {
            return Err(ContractError::OperationAlreadyExecuted {});
        }
    }

    let evidence_hash = evidence.get_hash();
    let mut evidences = EVIDENCES
        .may_load(storage, evidence_hash.clone())?
        .unwrap_or(Evidences { relayers: vec![] });

    if evidences.relayers.contains(&sender) {
        return Err(ContractError::EvidenceAlreadyProvided {});
    }
    evidences.relayers.push(sender);

    let config = CONFIG.load(storage)?;
    let threshold_reached = evidences.relayers.len() >= config.evidence_threshold as usize;

    if threshold_reached {
        if let Some(tx_hash) = evidence.get_tx_hash() {
            PROCESSED_TXS.save(storage, tx_hash.to_lowercase(), &cosmwasm_std::Empty {})?;
        }
        EVIDENCES.remove(storage, evidence_hash);
    } else {
        EVIDENCES.save(storage, evidence_hash, &evidences)?;
    }

    Ok(threshold_reached)
}
