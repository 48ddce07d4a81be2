//! XRPL classic-address <-> 20-byte `AccountID` conversion, ripple-alphabet
//! base58 with a version byte and a double-SHA256 checksum — the same rule
//! the contract's `address::validate_xrpl_address` enforces.

use sha2::{Digest, Sha256};

use crate::error::{Result, XrplClientError};

fn checksum(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

pub fn decode_account_id(address: &str) -> Result<[u8; 20]> {
    let data = bs58::decode(address)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_vec()
        .map_err(|_| XrplClientError::Codec(format!("invalid XRPL address: {address}")))?;

    if data.len() != 25 || data[0] != 0 {
        return Err(XrplClientError::Codec(format!("invalid XRPL address: {address}")));
    }
    if checksum(&data[..21])[..4] != data[21..] {
        return Err(XrplClientError::Codec(format!("bad checksum for XRPL address: {address}")));
    }

    let mut account_id = [0u8; 20];
    account_id.copy_from_slice(&data[1..21]);
    Ok(account_id)
}

pub fn encode_account_id(account_id: &[u8; 20]) -> String {
    let mut payload = vec![0u8];
    payload.extend_from_slice(account_id);
    let sum = checksum(&payload);
    payload.extend_from_slice(&sum[..4]);
    bs58::encode(payload).with_alphabet(bs58::Alphabet::RIPPLE).into_string()
}
