use std::collections::HashSet;

use coreum_wasm_sdk::core::CoreumQueries;
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Deps, DepsMut, Storage};

use crate::{
    address::validate_xrpl_address,
    contract::MAX_RELAYERS,
    error::ContractError,
    evidence::TransactionResult,
    state::{BridgeState, CONFIG, PENDING_ROTATE_KEYS},
};

/// A relayer's identity tuple: one address/key on each chain. Every relayer
/// owns exactly one key per chain; both are required to participate.
#[cw_serde]
pub struct Relayer {
    pub coreum_address: Addr,
    pub xrpl_address: String,
    pub xrpl_pub_key: String,
}

pub fn validate_relayers(
    deps: &DepsMut<CoreumQueries>,
    relayers: &[Relayer],
) -> Result<(), ContractError> {
    if relayers.len() > MAX_RELAYERS as usize {
        return Err(ContractError::TooManyRelayers {});
    }

    let mut xrpl_addresses = HashSet::new();
    let mut xrpl_pubkeys = HashSet::new();
    let mut coreum_addresses = HashSet::new();

    for relayer in relayers {
        deps.api.addr_validate(relayer.coreum_address.as_ref())?;
        validate_xrpl_address(relayer.xrpl_address.clone())?;
        validate_xrpl_pubkey(&relayer.xrpl_pub_key)?;

        // If `insert` returns false, the value was already present: duplicate.
        if !xrpl_addresses.insert(relayer.xrpl_address.clone())
            || !xrpl_pubkeys.insert(relayer.xrpl_pub_key.clone())
            || !coreum_addresses.insert(relayer.coreum_address.clone())
        {
            return Err(ContractError::DuplicatedRelayer {});
        }
    }

    Ok(())
}

fn validate_xrpl_pubkey(pubkey: &str) -> Result<(), ContractError> {
    // XRPL public keys are 33-byte secp256k1 or ed25519 (0xED-prefixed) keys,
    // hex encoded: 66 hex characters.
    if pubkey.len() == 66 && pubkey.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(());
    }
    Err(ContractError::InvalidXRPLAddress {
        address: pubkey.to_owned(),
    })
}

pub fn assert_relayer(deps: Deps, sender: &Addr) -> Result<(), ContractError> {
    let config = CONFIG.load(deps.storage)?;

    if config.relayers.iter().any(|r| &r.coreum_address == sender) {
        return Ok(());
    }

    Err(ContractError::UnauthorizedSender {})
}

/// Deterministic submitter rotation: the relayer responsible for broadcasting
/// a given operation once quorum signatures are collected.
pub fn submitter_index(operation_id: u64, relayer_count: usize) -> usize {
    if relayer_count == 0 {
        return 0;
    }
    (operation_id % relayer_count as u64) as usize
}

/// Applies the outcome of a RotateKeys operation. On success the new relayer
/// set and threshold take over and the bridge resumes; on failure the
/// pending-rotation flag is simply cleared so the owner can retry, and the
/// bridge stays halted.
pub fn handle_rotate_keys_confirmation(
    storage: &mut dyn Storage,
    new_relayers: Vec<Relayer>,
    new_evidence_threshold: u32,
    transaction_result: &TransactionResult,
) -> Result<(), ContractError> {
    if transaction_result.eq(&TransactionResult::Accepted) {
        let mut config = CONFIG.load(storage)?;
        config.relayers = new_relayers;
        config.evidence_threshold = new_evidence_threshold;
        config.bridge_state = BridgeState::Active;
        CONFIG.save(storage, &config)?;
    }

    PENDING_ROTATE_KEYS.save(storage, &false)?;
    Ok(())
}
