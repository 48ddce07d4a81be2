use coreum_wasm_sdk::core::CoreumMsg;
use cosmwasm_std::{coin, BankMsg, Decimal, Response, Storage, Uint128};

use crate::{contract::XRPL_MIN_TRANSFER_RATE, error::ContractError, state::{CONFIG, FEES_COLLECTED}};

pub fn amount_after_bridge_fees(
    amount: Uint128,
    bridging_fee: Uint128,
) -> Result<Uint128, ContractError> {
    amount
        .checked_sub(bridging_fee)
        .map_err(|_| ContractError::CannotCoverBridgingFees {})
}

/// Applies an XRPL issuer's `TransferRate`, if any, to the amount being
/// delivered. A rate of `1000000000` (the XRPL minimum) means no fee; e.g. a
/// rate of `1020000000` charges 2%.
pub fn amount_after_transfer_fees(
    amount: Uint128,
    transfer_rate: Option<Uint128>,
) -> Result<(Uint128, Uint128), ContractError> {
    let Some(rate) = transfer_rate else {
        return Ok((amount, Uint128::zero()));
    };

    let rate_value = rate.checked_sub(Uint128::new(XRPL_MIN_TRANSFER_RATE))?;
    let rate_percentage = Decimal::from_ratio(rate_value, XRPL_MIN_TRANSFER_RATE);
    let transfer_fee = amount.mul_ceil(rate_percentage);
    let remaining = amount.checked_sub(transfer_fee)?;

    Ok((remaining, transfer_fee))
}

/// Records bridging fee, truncation remainder and (if any) XRPL transfer fee
/// under `token_denom`'s running collected-fees total.
pub fn handle_fee_collection(
    storage: &mut dyn Storage,
    bridging_fee: Uint128,
    token_denom: String,
    truncated_portion: Uint128,
    transfer_fee: Option<Uint128>,
) -> Result<Uint128, ContractError> {
    let mut fee_collected = bridging_fee.checked_add(truncated_portion)?;
    if let Some(fee) = transfer_fee {
        fee_collected = fee_collected.checked_add(fee)?;
    }

    collect_fees(storage, &token_denom, fee_collected)?;
    Ok(fee_collected)
}

pub fn collect_fees(storage: &mut dyn Storage, denom: &str, fee: Uint128) -> Result<(), ContractError> {
    if fee.is_zero() {
        return Ok(());
    }

    let current = FEES_COLLECTED
        .may_load(storage, denom.to_string())?
        .unwrap_or_default();
    FEES_COLLECTED.save(storage, denom.to_string(), &current.checked_add(fee)?)?;
    Ok(())
}

/// Splits every collected-fee denom evenly across all relayers via one
/// multi-send message per relayer. Remainders from the integer division are
/// left in `FEES_COLLECTED` to be swept up on a future claim, never lost.
pub fn claim_fees_for_relayers(storage: &mut dyn Storage) -> Result<Response<CoreumMsg>, ContractError> {
    let relayers = CONFIG.load(storage)?.relayers;
    if relayers.is_empty() {
        return Ok(Response::new());
    }

    let denoms: Vec<String> = FEES_COLLECTED
        .keys(storage, None, None, cosmwasm_std::Order::Ascending)
        .collect::<Result<_, _>>()?;

    let mut coins_for_each_relayer = vec![];
    for denom in denoms {
        let total = FEES_COLLECTED.load(storage, denom.clone())?;
        let per_relayer = total.u128() / relayers.len() as u128;

        if per_relayer != 0 {
            coins_for_each_relayer.push(coin(per_relayer, denom.clone()));
        }

        let distributed = Uint128::new(per_relayer * relayers.len() as u128);
        let remainder = total.checked_sub(distributed)?;
        if remainder.is_zero() {
            FEES_COLLECTED.remove(storage, denom);
        } else {
            FEES_COLLECTED.save(storage, denom, &remainder)?;
        }
    }

    let send_messages = relayers.iter().map(|relayer| BankMsg::Send {
        to_address: relayer.coreum_address.to_string(),
        amount: coins_for_each_relayer.clone(),
    });

    Ok(Response::new().add_messages(send_messages))
}
