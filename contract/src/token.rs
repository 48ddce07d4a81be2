use cosmwasm_std::Uint128;
use sha2::{Digest, Sha256};

use crate::{
    contract::{validate_sending_precision, XRP_CURRENCY, XRP_ISSUER},
    error::ContractError,
    state::TokenState,
};

/// Key used to look up an XRPL-originated token: issuer+currency concatenated,
/// or the literal `"XRP"` for the native token.
pub fn build_xrpl_token_key(issuer: &str, currency: &str) -> String {
    let mut key = issuer.to_owned();
    key.push_str(currency);
    key
}

pub fn is_token_xrp(issuer: &str, currency: &str) -> bool {
    issuer == XRP_ISSUER && currency == XRP_CURRENCY
}

/// Deterministically derives the 160-bit hex currency code a home-originated
/// token is bridged under on XRPL: an uppercase hex fingerprint of the denom,
/// decimals and a nonce, so repeated registrations of the same denom (after a
/// failed attempt) don't collide.
pub fn derive_xrpl_currency_for_coreum_token(denom: &str, decimals: u32, nonce: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(denom.as_bytes());
    hasher.update(decimals.to_be_bytes());
    hasher.update(nonce.to_be_bytes());
    let digest = hasher.finalize();
    hex::encode_upper(&digest[..20])
}

/// Helper to update a token's state, enforcing the only transitions the
/// bridge allows to be made directly (Processing/Inactive are driven by
/// evidence, never by an owner call).
pub fn set_token_state(
    state: &mut TokenState,
    target_state: Option<TokenState>,
) -> Result<(), ContractError> {
    if let Some(target_state) = target_state {
        if state.eq(&TokenState::Inactive) || state.eq(&TokenState::Processing) {
            return Err(ContractError::TokenStateIsImmutable {});
        }
        if target_state.eq(&TokenState::Inactive) || target_state.eq(&TokenState::Processing) {
            return Err(ContractError::InvalidTargetTokenState {});
        }

        *state = target_state;
    }

    Ok(())
}

pub fn set_token_sending_precision(
    sending_precision: &mut i32,
    target_sending_precision: Option<i32>,
    decimals: u32,
) -> Result<(), ContractError> {
    if let Some(target_sending_precision) = target_sending_precision {
        validate_sending_precision(target_sending_precision, decimals)?;
        *sending_precision = target_sending_precision;
    }

    Ok(())
}

pub fn set_token_bridging_fee(
    bridging_fee: &mut Uint128,
    target_bridging_fee: Option<Uint128>,
) -> Result<(), ContractError> {
    if let Some(target_bridging_fee) = target_bridging_fee {
        *bridging_fee = target_bridging_fee;
    }

    Ok(())
}

pub fn set_token_transfer_rate(
    transfer_rate: &mut Option<Uint128>,
    target_transfer_rate: Option<Uint128>,
) {
    if target_transfer_rate.is_some() {
        *transfer_rate = target_transfer_rate;
    }
}

pub fn set_token_max_holding_amount(
    current_bridged_amount: Uint128,
    max_holding_amount: &mut Uint128,
    target_max_holding_amount: Option<Uint128>,
) -> Result<(), ContractError> {
    if let Some(target_max_holding_amount) = target_max_holding_amount {
        if current_bridged_amount > target_max_holding_amount {
            return Err(ContractError::InvalidTargetMaxHoldingAmount {});
        }
        *max_holding_amount = target_max_holding_amount;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_currency_is_uppercase_hex_and_deterministic() {
        let a = derive_xrpl_currency_for_coreum_token("ucore", 6, 1);
        let b = derive_xrpl_currency_for_coreum_token("ucore", 6, 1);
        let c = derive_xrpl_currency_for_coreum_token("ucore", 6, 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 40);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_lowercase()));
    }

    #[test]
    fn token_key_concatenates_issuer_and_currency() {
        assert_eq!(build_xrpl_token_key("rIssuer", "USD"), "rIssuerUSD");
    }
}
