//! Canonical serialization of the five XRPL transaction types this bridge
//! submits (`Payment`, `TrustSet`, `TicketCreate`, `SignerListSet`,
//! `AccountSet`), plus the single- and multi-signing blobs derived from
//! them. Every relayer must derive byte-identical bytes from the same
//! operation payload and bridge config.

use rust_decimal::Decimal;
use sha2::{Digest, Sha512};

use super::account_id::{decode_account_id, encode_account_id};
use super::amount::{encode_drops, encode_issued};
use super::field::{self, FieldId};
use crate::error::Result;

/// 4-byte prefixes prepended before hashing a signing blob (rippled's
/// `HashPrefix` table).
pub mod hash_prefix {
    pub const TRANSACTION_SIG: [u8; 4] = [0x53, 0x54, 0x58, 0x00]; // "STX\0"
    pub const TRANSACTION_MULTISIG: [u8; 4] = [0x53, 0x4D, 0x54, 0x00]; // "SMT\0"
}

pub mod tx_type {
    pub const PAYMENT: u16 = 0;
    pub const ACCOUNT_SET: u16 = 3;
    pub const TICKET_CREATE: u16 = 10;
    pub const SIGNER_LIST_SET: u16 = 12;
    pub const TRUST_SET: u16 = 20;
}

/// tfFullyCanonicalSig — required on every transaction so signatures are
/// canonical and malleability-free.
pub const TF_FULLY_CANONICAL_SIG: u32 = 0x8000_0000;

#[derive(Debug, Clone)]
pub enum Amount {
    Native(u64),
    Issued { value: Decimal, currency: String, issuer: String },
}

#[derive(Debug, Clone)]
pub struct Memo {
    pub memo_type: Option<Vec<u8>>,
    pub memo_data: Option<Vec<u8>>,
    pub memo_format: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct SignerEntry {
    pub account: String,
    pub weight: u16,
}

#[derive(Debug, Clone)]
pub enum TxData {
    Payment {
        amount: Amount,
        destination: String,
        destination_tag: Option<u32>,
        memos: Vec<Memo>,
    },
    TrustSet {
        limit_amount: Amount,
    },
    TicketCreate {
        ticket_count: u32,
    },
    SignerListSet {
        signer_quorum: u32,
        signer_entries: Vec<SignerEntry>,
    },
    AccountSet {
        set_flag: Option<u32>,
    },
}

impl TxData {
    fn transaction_type(&self) -> u16 {
        match self {
            TxData::Payment { .. } => tx_type::PAYMENT,
            TxData::TrustSet { .. } => tx_type::TRUST_SET,
            TxData::TicketCreate { .. } => tx_type::TICKET_CREATE,
            TxData::SignerListSet { .. } => tx_type::SIGNER_LIST_SET,
            TxData::AccountSet { .. } => tx_type::ACCOUNT_SET,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnsignedTransaction {
    pub account: String,
    pub fee_drops: u64,
    /// Zero when `ticket_sequence` is set, per the canonical reconstruction rule.
    pub sequence: u32,
    pub ticket_sequence: Option<u32>,
    pub flags: u32,
    pub data: TxData,
}

struct FieldWriter {
    fields: Vec<(FieldId, Vec<u8>)>,
}

impl FieldWriter {
    fn new() -> Self {
        Self { fields: vec![] }
    }

    fn push(&mut self, id: FieldId, value: Vec<u8>) {
        self.fields.push((id, value));
    }

    fn push_vl(&mut self, id: FieldId, payload: &[u8]) {
        let mut value = encode_vl_length(payload.len());
        value.extend_from_slice(payload);
        self.push(id, value);
    }

    fn finish(mut self) -> Vec<u8> {
        self.fields.sort_by_key(|(id, _)| *id);
        let mut out = vec![];
        for (id, value) in self.fields {
            id.encode(&mut out);
            out.extend_from_slice(&value);
        }
        out
    }
}

fn encode_vl_length(len: usize) -> Vec<u8> {
    if len <= 192 {
        vec![len as u8]
    } else if len <= 12480 {
        let len = len - 193;
        vec![193 + (len >> 8) as u8, (len & 0xff) as u8]
    } else {
        let len = len - 12481;
        vec![
            241 + (len >> 16) as u8,
            ((len >> 8) & 0xff) as u8,
            (len & 0xff) as u8,
        ]
    }
}

fn encode_amount(amount: &Amount) -> Result<Vec<u8>> {
    match amount {
        Amount::Native(drops) => Ok(encode_drops(*drops)?.to_vec()),
        Amount::Issued { value, currency, issuer } => {
            let issuer_id = decode_account_id(issuer)?;
            Ok(encode_issued(*value, currency, &issuer_id)?.to_vec())
        }
    }
}

fn encode_memo(memo: &Memo) -> Vec<u8> {
    let mut inner = FieldWriter::new();
    if let Some(ty) = &memo.memo_type {
        inner.push_vl(field::MEMO_TYPE, ty);
    }
    if let Some(data) = &memo.memo_data {
        inner.push_vl(field::MEMO_DATA, data);
    }
    if let Some(format) = &memo.memo_format {
        inner.push_vl(field::MEMO_FORMAT, format);
    }
    let mut out = inner.finish();
    out.push(field::OBJECT_END_MARKER);
    out
}

fn encode_memos_array(memos: &[Memo]) -> Vec<u8> {
    let mut out = vec![];
    for memo in memos {
        field::MEMO.encode(&mut out);
        out.extend_from_slice(&encode_memo(memo));
    }
    out.push(field::ARRAY_END_MARKER);
    out
}

fn encode_signer_entry(entry: &SignerEntry) -> Result<Vec<u8>> {
    let mut inner = FieldWriter::new();
    inner.push(field::ACCOUNT, {
        let mut v = encode_vl_length(20);
        v.extend_from_slice(&decode_account_id(&entry.account)?);
        v
    });
    inner.push(field::SIGNER_WEIGHT, entry.weight.to_be_bytes().to_vec());
    let mut out = inner.finish();
    out.push(field::OBJECT_END_MARKER);
    Ok(out)
}

fn encode_signer_entries_array(entries: &[SignerEntry]) -> Result<Vec<u8>> {
    let mut out = vec![];
    for entry in entries {
        field::SIGNER_ENTRY.encode(&mut out);
        out.extend_from_slice(&encode_signer_entry(entry)?);
    }
    out.push(field::ARRAY_END_MARKER);
    Ok(out)
}

impl UnsignedTransaction {
    /// Serializes every field except `SigningPubKey`/`TxnSignature`/`Signers`,
    /// which callers add depending on whether they're building a single- or
    /// multi-signing blob, or the final signed tx.
    fn base_fields(&self) -> Result<FieldWriter> {
        let mut w = FieldWriter::new();
        w.push(field::TRANSACTION_TYPE, self.data.transaction_type().to_be_bytes().to_vec());
        w.push(field::FLAGS, self.flags.to_be_bytes().to_vec());
        if let Some(ticket) = self.ticket_sequence {
            w.push(field::TICKET_SEQUENCE, ticket.to_be_bytes().to_vec());
        }
        w.push(field::SEQUENCE, self.sequence.to_be_bytes().to_vec());
        w.push(field::FEE, encode_drops(self.fee_drops)?.to_vec());
        w.push(field::ACCOUNT, {
            let mut v = encode_vl_length(20);
            v.extend_from_slice(&decode_account_id(&self.account)?);
            v
        });

        match &self.data {
            TxData::Payment { amount, destination, destination_tag, memos } => {
                w.push(field::AMOUNT, encode_amount(amount)?);
                w.push(field::DESTINATION, {
                    let mut v = encode_vl_length(20);
                    v.extend_from_slice(&decode_account_id(destination)?);
                    v
                });
                if let Some(tag) = destination_tag {
                    w.push(field::DESTINATION_TAG, tag.to_be_bytes().to_vec());
                }
                if !memos.is_empty() {
                    w.push(field::MEMOS, encode_memos_array(memos));
                }
            }
            TxData::TrustSet { limit_amount } => {
                w.push(field::LIMIT_AMOUNT, encode_amount(limit_amount)?);
            }
            TxData::TicketCreate { ticket_count } => {
                w.push(field::TICKET_COUNT, ticket_count.to_be_bytes().to_vec());
            }
            TxData::SignerListSet { signer_quorum, signer_entries } => {
                w.push(field::SIGNER_QUORUM, signer_quorum.to_be_bytes().to_vec());
                if !signer_entries.is_empty() {
                    w.push(field::SIGNER_ENTRIES, encode_signer_entries_array(signer_entries)?);
                }
            }
            TxData::AccountSet { set_flag } => {
                if let Some(flag) = set_flag {
                    w.push(field::SET_FLAG, flag.to_be_bytes().to_vec());
                }
            }
        }

        Ok(w)
    }

    /// The bytes a single signer hashes and signs for a non-multisig tx.
    pub fn single_signing_blob(&self, public_key: &[u8]) -> Result<Vec<u8>> {
        let mut w = self.base_fields()?;
        w.push_vl(field::SIGNING_PUB_KEY, public_key);
        let mut out = hash_prefix::TRANSACTION_SIG.to_vec();
        out.extend_from_slice(&w.finish());
        Ok(out)
    }

    /// The bytes one relayer in a multi-signed transaction hashes and signs:
    /// `SigningPubKey` is always empty and the signer's own
    /// account id is appended after the serialized fields.
    pub fn multi_signing_blob(&self, signer_account: &str) -> Result<Vec<u8>> {
        let mut w = self.base_fields()?;
        w.push_vl(field::SIGNING_PUB_KEY, &[]);
        let mut out = hash_prefix::TRANSACTION_MULTISIG.to_vec();
        out.extend_from_slice(&w.finish());
        out.extend_from_slice(&decode_account_id(signer_account)?);
        Ok(out)
    }

    /// Assembles the final signed transaction, with every collected signer
    /// entry in canonical (ascending `Account`) order, ready for `submit`.
    pub fn assemble_multisigned(&self, signers: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
        let mut w = self.base_fields()?;
        w.push_vl(field::SIGNING_PUB_KEY, &[]);

        let mut sorted: Vec<(&String, &Vec<u8>, [u8; 20])> = vec![];
        for (account, sig) in signers {
            sorted.push((account, sig, decode_account_id(account)?));
        }
        sorted.sort_by(|a, b| a.2.cmp(&b.2));

        let mut signers_array = vec![];
        for (account, sig, account_id) in &sorted {
            field::SIGNER.encode(&mut signers_array);
            let mut inner = FieldWriter::new();
            inner.push(field::ACCOUNT, {
                let mut v = encode_vl_length(20);
                v.extend_from_slice(account_id);
                v
            });
            inner.push_vl(field::SIGNING_PUB_KEY, &[]);
            inner.push_vl(field::TXN_SIGNATURE, sig);
            let _ = account;
            let mut inner_bytes = inner.finish();
            inner_bytes.push(field::OBJECT_END_MARKER);
            signers_array.extend_from_slice(&inner_bytes);
        }
        signers_array.push(field::ARRAY_END_MARKER);
        w.push(field::SIGNERS, signers_array);

        Ok(w.finish())
    }

    /// Assembles a single-signed transaction (used only by integration test
    /// helpers and `bootstrap-bridge`; production submissions are always
    /// multi-signed in production).
    pub fn assemble_signed(&self, public_key: &[u8], signature: &[u8]) -> Result<Vec<u8>> {
        let mut w = self.base_fields()?;
        w.push_vl(field::SIGNING_PUB_KEY, public_key);
        w.push_vl(field::TXN_SIGNATURE, signature);
        Ok(w.finish())
    }
}

/// SHA512Half: the first 32 bytes of a SHA-512 digest, XRPL's transaction
/// hashing primitive.
pub fn sha512_half(data: &[u8]) -> [u8; 32] {
    let digest = Sha512::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    out
}

pub fn account_id_from_address(address: &str) -> Result<[u8; 20]> {
    decode_account_id(address)
}

pub fn address_from_account_id(account_id: &[u8; 20]) -> String {
    encode_account_id(account_id)
}
