//! XRPL currency-code encoding. A currency is either a
//! 3-character ISO-like code (left-padded with zero bytes into a 160-bit
//! field) or an arbitrary 160-bit value given as 40 hex characters.

use crate::error::{Result, XrplClientError};

pub const CURRENCY_CODE_BYTES: usize = 20;

/// Encodes a currency string (e.g. `"USD"` or a 40-hex-char fingerprint) into
/// its canonical 160-bit on-the-wire representation.
pub fn encode_currency(currency: &str) -> Result<[u8; CURRENCY_CODE_BYTES]> {
    if currency.len() == 3 && currency.is_ascii() && currency != "XRP" {
        let mut bytes = [0u8; CURRENCY_CODE_BYTES];
        bytes[12..15].copy_from_slice(currency.as_bytes());
        return Ok(bytes);
    }
    if currency.len() == 40 {
        let decoded = hex::decode(currency)
            .map_err(|_| XrplClientError::Codec(format!("invalid hex currency code: {currency}")))?;
        let mut bytes = [0u8; CURRENCY_CODE_BYTES];
        bytes.copy_from_slice(&decoded);
        return Ok(bytes);
    }
    Err(XrplClientError::Codec(format!(
        "currency {currency} is neither a 3-char code nor 40 hex chars"
    )))
}

/// Inverse of [`encode_currency`]: a standard-form currency field decodes
/// back to its 3-letter code when bytes 0..12 and 15..20 are all zero,
/// otherwise to its uppercase hex fingerprint.
pub fn decode_currency(bytes: &[u8; CURRENCY_CODE_BYTES]) -> String {
    let is_standard = bytes[0..12].iter().all(|b| *b == 0) && bytes[15..20].iter().all(|b| *b == 0);
    if is_standard {
        if let Ok(code) = std::str::from_utf8(&bytes[12..15]) {
            if code.chars().all(|c| c.is_ascii_graphic()) {
                return code.to_string();
            }
        }
    }
    hex::encode_upper(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_letter_code_round_trips() {
        let encoded = encode_currency("USD").unwrap();
        assert_eq!(decode_currency(&encoded), "USD");
    }

    #[test]
    fn xrp_is_rejected_as_a_currency_code() {
        assert!(encode_currency("XRP").is_err());
    }

    #[test]
    fn hex_fingerprint_round_trips() {
        let fingerprint = "0158415500000000C1F76FF6ECB0BAC600000000";
        let encoded = encode_currency(fingerprint).unwrap();
        assert_eq!(decode_currency(&encoded), fingerprint);
    }
}
