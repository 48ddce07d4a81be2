//! Loop A: a `Payment` to the bridge account carries the
//! Coreum recipient address inside its XRPL `Memos` array. A memo that
//! doesn't decode to a valid address means the sender's funds can't be
//! routed anywhere; that's classified as refund-pending and no
//! evidence is submitted for it (nothing to vote on yet — the sender is
//! expected to notice and resubmit, or a future owner-level recovery
//! command handles it out of band).

use std::str::FromStr;

use cosmrs::AccountId;

const MEMO_TYPE: &[u8] = b"coreum_address";
const MEMO_FORMAT: &[u8] = b"text/plain";

pub fn encode_recipient_memo(recipient: &AccountId) -> xrpl_client::binary::Memo {
    xrpl_client::binary::Memo {
        memo_type: Some(MEMO_TYPE.to_vec()),
        memo_data: Some(recipient.to_string().into_bytes()),
        memo_format: Some(MEMO_FORMAT.to_vec()),
    }
}

/// Looks for a memo tagged `coreum_address` whose data parses as a valid
/// bech32 Coreum account id. Returns `None` if no memo matches or the
/// matching memo's data isn't a valid address — the caller treats both the
/// same way (no vote).
pub fn decode_recipient_memo(memos: &[serde_json::Value]) -> Option<AccountId> {
    for entry in memos {
        let memo = entry.get("Memo")?;
        let memo_type = memo.get("MemoType").and_then(|v| v.as_str()).and_then(|hex_str| hex::decode(hex_str).ok())?;
        if memo_type != MEMO_TYPE {
            continue;
        }
        let data_hex = memo.get("MemoData").and_then(|v| v.as_str())?;
        let data = hex::decode(data_hex).ok()?;
        let address = String::from_utf8(data).ok()?;
        if let Ok(account_id) = AccountId::from_str(address.trim()) {
            return Some(account_id);
        }
    }
    None
}
