//! Bidirectional conversion between Coreum integer token amounts and XRPL
//! decimal amounts, plus the sending-precision truncation and max-holding
//! bookkeeping the bridge applies on every transfer.
//!
//! Shared by the `contract` crate (minting/burning math) and the `relayer`
//! crate (building the XRPL transaction payload for a `CoreumToXRPLTransfer`
//! operation), so both sides of the bridge truncate identically.

pub mod error;

use rust_decimal::{Decimal, RoundingStrategy};

pub use error::AmountCodecError;

/// Effective decimals XRPL issued (non-XRP) tokens are represented with.
pub const XRPL_ISSUED_TOKEN_DECIMALS: u32 = 15;
/// Effective decimals the native XRP token (drops) is represented with.
pub const XRPL_NATIVE_TOKEN_DECIMALS: u32 = 6;

pub const MIN_SENDING_PRECISION: i32 = -15;
pub const MAX_SENDING_PRECISION: i32 = 15;

pub fn effective_xrpl_decimals(is_native: bool) -> u32 {
    if is_native {
        XRPL_NATIVE_TOKEN_DECIMALS
    } else {
        XRPL_ISSUED_TOKEN_DECIMALS
    }
}

/// Converts a raw Coreum integer amount (scaled by `token_decimals`) into its
/// canonical decimal representation.
pub fn home_amount_to_decimal(value: u128, token_decimals: u32) -> Result<Decimal, AmountCodecError> {
    if token_decimals > 28 {
        return Err(AmountCodecError::InvalidAmount(format!(
            "token_decimals {token_decimals} exceeds maximum representable scale"
        )));
    }
    let raw = i128::try_from(value)
        .map_err(|_| AmountCodecError::InvalidAmount("amount exceeds supported range".into()))?;
    Ok(Decimal::from_i128_with_scale(raw, token_decimals))
}

/// Converts a canonical decimal amount back into a raw Coreum integer amount
/// scaled by `token_decimals`. Trailing zeros are stripped before checking,
/// so `1.500000` converts cleanly into 2 decimals; a nonzero digit beyond
/// `token_decimals` is an error rather than a silent rounding.
pub fn decimal_to_home_amount(amount: Decimal, token_decimals: u32) -> Result<u128, AmountCodecError> {
    if amount.is_sign_negative() {
        return Err(AmountCodecError::InvalidAmount("amount must not be negative".into()));
    }
    let mut normalized = amount.normalize();
    if normalized.scale() > token_decimals {
        return Err(AmountCodecError::InvalidAmount(format!(
            "amount has more than {token_decimals} fractional digits"
        )));
    }
    normalized.rescale(token_decimals);
    u128::try_from(normalized.mantissa())
        .map_err(|_| AmountCodecError::InvalidAmount("amount overflows u128".into()))
}

/// Truncates `amount` to a multiple of `10^(-sending_precision)`, per the
/// bridge's sending-precision rule: positive values keep that many
/// fractional digits, zero keeps integers, negative values round down to a
/// higher power of ten. Returns `(kept, discarded)`.
pub fn truncate_amount(
    amount: Decimal,
    sending_precision: i32,
) -> Result<(Decimal, Decimal), AmountCodecError> {
    if amount.is_sign_negative() {
        return Err(AmountCodecError::InvalidAmount("amount must not be negative".into()));
    }
    if !(MIN_SENDING_PRECISION..=MAX_SENDING_PRECISION).contains(&sending_precision) {
        return Err(AmountCodecError::InvalidAmount(format!(
            "sending_precision {sending_precision} out of range [{MIN_SENDING_PRECISION}, {MAX_SENDING_PRECISION}]"
        )));
    }

    let truncated = if sending_precision >= 0 {
        amount.round_dp_with_strategy(sending_precision as u32, RoundingStrategy::ToZero)
    } else {
        let factor = Decimal::from(10u64.pow((-sending_precision) as u32));
        (amount / factor).round_dp_with_strategy(0, RoundingStrategy::ToZero) * factor
    };

    if truncated.is_zero() && !amount.is_zero() {
        return Err(AmountCodecError::AmountSentIsZeroAfterTruncation);
    }

    let discarded = amount - truncated;
    Ok((truncated, discarded))
}

/// Number of significant decimal digits in `amount` (trailing and leading
/// zeros around the decimal point don't count). Zero has zero significant
/// digits.
pub fn significant_digits(amount: Decimal) -> u32 {
    if amount.is_zero() {
        return 0;
    }
    let normalized = amount.normalize();
    normalized.mantissa().unsigned_abs().to_string().len() as u32
}

/// Checks that `amount`, once normalized, fits within `max_significant_digits`
/// — XRPL issued amounts carry at most 15, so a value like
/// `123456789012345.6` (16 significant digits) is rejected as `InvalidAmount`.
pub fn validate_significant_digits(
    amount: Decimal,
    max_significant_digits: u32,
) -> Result<(), AmountCodecError> {
    let digits = significant_digits(amount);
    if digits > max_significant_digits {
        return Err(AmountCodecError::InvalidAmount(format!(
            "amount has {digits} significant digits, maximum is {max_significant_digits}"
        )));
    }
    Ok(())
}

/// Applies `delta` (positive for XRPL->Coreum, negative for Coreum->XRPL) to
/// the running net-bridged-in total for an externally-originated token and
/// checks it against `max_holding_amount`, both on the XRPL decimal scale.
/// Returns the updated total on success.
pub fn check_max_holding_amount(
    net_bridged_in: i128,
    delta: i128,
    max_holding_amount: u128,
) -> Result<i128, AmountCodecError> {
    let max = i128::try_from(max_holding_amount)
        .map_err(|_| AmountCodecError::InvalidAmount("max_holding_amount exceeds supported range".into()))?;
    let updated = net_bridged_in
        .checked_add(delta)
        .ok_or_else(|| AmountCodecError::InvalidAmount("overflow computing bridged total".into()))?;
    if updated > max {
        return Err(AmountCodecError::MaximumBridgedAmountReached);
    }
    Ok(updated)
}
