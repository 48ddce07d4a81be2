//! Canonical reconstruction: every relayer derives byte-identical
//! XRPL transaction bytes from contract state alone, so independently
//! collected signatures assemble into one valid multi-signed transaction.

use contract_client::msg::{ConfigResponse, Operation, OperationType, Relayer};
use xrpl_amount::{decimal_to_home_amount, home_amount_to_decimal, XRPL_ISSUED_TOKEN_DECIMALS};
use xrpl_client::binary::{Amount, SignerEntry, TxData, UnsignedTransaction, TF_FULLY_CANONICAL_SIG};
use xrpl_client::fee::multisign_fee;

use crate::error::{RelayerError, Result};

/// `XRP_ISSUER`/`XRP_CURRENCY` mirrored from the contract's own constants
/// (`contract::contract::{XRP_ISSUER, XRP_CURRENCY}`): the empty issuer
/// paired with the literal `"XRP"` currency marks the native token.
pub const XRP_ISSUER: &str = "";
pub const XRP_CURRENCY: &str = "XRP";

fn is_xrp(issuer: &str, currency: &str) -> bool {
    issuer == XRP_ISSUER && currency == XRP_CURRENCY
}

/// `decimal_to_home_amount` would reject an amount that had a fractional
/// drop after rescaling to 6 decimals; that can't happen here because the
/// contract already truncated at the token's sending precision before
/// creating the operation.
fn home_to_xrpl_amount(raw_amount: &str, issuer: &str, currency: &str) -> Result<Amount> {
    let amount: u128 = raw_amount.parse().map_err(|_| RelayerError::Config(format!("invalid operation amount {raw_amount}")))?;
    let decimal = home_amount_to_decimal(amount, XRPL_ISSUED_TOKEN_DECIMALS)?;
    if is_xrp(issuer, currency) {
        let drops = decimal_to_home_amount(decimal, xrpl_amount::XRPL_NATIVE_TOKEN_DECIMALS)?;
        let drops = u64::try_from(drops).map_err(|_| RelayerError::Config("drops amount overflows u64".into()))?;
        Ok(Amount::Native(drops))
    } else {
        Ok(Amount::Issued { value: decimal, currency: currency.to_string(), issuer: issuer.to_string() })
    }
}

/// Builds the unsigned transaction a pending `operation` maps to, given the
/// bridge's current `config` and the number of relayers that will sign it.
pub fn build_unsigned_tx(operation: &Operation, config: &ConfigResponse) -> Result<UnsignedTransaction> {
    let signer_count = config.relayers.len() as u32;
    let fee_drops = multisign_fee(operation.xrpl_base_fee, signer_count);

    let (sequence, ticket_sequence) = match operation.ticket_sequence {
        Some(ticket) => (0u32, Some(ticket as u32)),
        None => (operation.account_sequence.unwrap_or(0) as u32, None),
    };

    let data = match &operation.operation_type {
        OperationType::AllocateTickets { number } => TxData::TicketCreate { ticket_count: *number },
        OperationType::TrustSet { issuer, currency, trust_set_limit_amount } => TxData::TrustSet {
            limit_amount: home_to_xrpl_amount(trust_set_limit_amount, issuer, currency)?,
        },
        OperationType::RotateKeys { new_relayers, new_evidence_threshold } => TxData::SignerListSet {
            signer_quorum: *new_evidence_threshold,
            signer_entries: new_relayers.iter().map(relayer_to_signer_entry).collect(),
        },
        OperationType::CoreumToXRPLTransfer { issuer, currency, amount, recipient, .. } => TxData::Payment {
            amount: home_to_xrpl_amount(amount, issuer, currency)?,
            destination: recipient.clone(),
            destination_tag: None,
            memos: vec![],
        },
    };

    Ok(UnsignedTransaction {
        account: config.bridge_xrpl_address.clone(),
        fee_drops,
        sequence,
        ticket_sequence,
        flags: TF_FULLY_CANONICAL_SIG,
        data,
    })
}

fn relayer_to_signer_entry(relayer: &Relayer) -> SignerEntry {
    SignerEntry { account: relayer.xrpl_address.clone(), weight: 1 }
}
