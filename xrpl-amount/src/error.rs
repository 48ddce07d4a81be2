use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AmountCodecError {
    #[error("InvalidAmount: {0}")]
    InvalidAmount(String),

    #[error("AmountSentIsZeroAfterTruncation: sending precision truncated the amount to zero")]
    AmountSentIsZeroAfterTruncation,

    #[error("MaximumBridgedAmountReached: transfer would exceed the token's max holding amount")]
    MaximumBridgedAmountReached,
}
