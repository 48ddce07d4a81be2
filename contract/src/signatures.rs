use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, DepsMut};

use crate::{
    error::ContractError,
    operation::check_valid_operation_if_halt,
    state::{CONFIG, PENDING_OPERATIONS},
};

/// XRPL multi-signatures are DER-encoded secp256k1/ed25519 signatures, hex
/// encoded; this comfortably bounds the longest possible encoding.
pub const MAX_SIGNATURE_LENGTH: usize = 200;

#[cw_serde]
pub struct Signature {
    pub relayer_coreum_address: Addr,
    pub signature: String,
}

pub fn add_signature(
    deps: DepsMut,
    operation_id: u64,
    operation_version: u64,
    sender: Addr,
    signature: String,
) -> Result<(), ContractError> {
    if signature.len() > MAX_SIGNATURE_LENGTH {
        return Err(ContractError::InvalidSignatureLength {});
    }

    // We get the current signatures for this specific operation
    let mut pending_operation = PENDING_OPERATIONS
        .load(deps.storage, operation_id)
        .map_err(|_| ContractError::PendingOperationNotFound {})?;

    if operation_version != pending_operation.version {
        return Err(ContractError::OperationVersionMismatch {});
    }

    let config = CONFIG.load(deps.storage)?;

    // Halted bridges only progress ticket allocation and an already-pending key rotation.
    check_valid_operation_if_halt(deps.storage, &config, &pending_operation.operation_type)?;

    let mut signatures = pending_operation.signatures;

    if signatures
        .iter()
        .any(|s| s.relayer_coreum_address == sender)
    {
        return Err(ContractError::SignatureAlreadyProvided {});
    }

    // Add signature and store it
    signatures.push(Signature {
        relayer_coreum_address: sender,
        signature,
    });

    pending_operation.signatures = signatures;
    PENDING_OPERATIONS.save(deps.storage, operation_id, &pending_operation)?;

    Ok(())
}
