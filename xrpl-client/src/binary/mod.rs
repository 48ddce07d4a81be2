pub mod account_id;
pub mod amount;
pub mod field;
pub mod tx;

pub use account_id::{decode_account_id, encode_account_id};
pub use tx::{sha512_half, Amount, Memo, SignerEntry, TxData, UnsignedTransaction, TF_FULLY_CANONICAL_SIG};
