use sha2::{Digest, Sha256};

use crate::error::ContractError;

/// Validates an XRPL classic address: Ripple-alphabet base58, 25 raw bytes
/// (1 version byte + 20 byte account id + 4 byte checksum), version byte 0.
pub fn validate_xrpl_address(address: String) -> Result<(), ContractError> {
    let data = bs58::decode(&address)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_vec()
        .map_err(|_| ContractError::InvalidXRPLAddress {
            address: address.to_owned(),
        })?;

    if data.len() != 25 || data[0] != 0 {
        return Err(ContractError::InvalidXRPLAddress { address });
    }

    // Check if the payload produces the provided checksum.
    let expected_checksum = &checksum(&data[..21])[..4];
    let provided_checksum = &data[21..];

    if expected_checksum != provided_checksum {
        return Err(ContractError::InvalidXRPLAddress { address });
    }

    Ok(())
}

pub fn checksum(data: &[u8]) -> Vec<u8> {
    Sha256::digest(Sha256::digest(data)).to_vec()
}
