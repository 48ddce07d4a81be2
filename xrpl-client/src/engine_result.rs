//! Classification of `rippled` engine result codes (the `engine_result`
//! string returned by `submit`, or the `TransactionResult` field inside a
//! validated transaction's metadata).

/// What a `submit` or `tx` lookup's engine result means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineResultClass {
    /// `tes*` — applied successfully.
    Success,
    /// `tec*` — applied but failed; consumes the sequence/ticket.
    ClaimedCost,
    /// `ter*` — not yet applied, worth retrying (e.g. pre-seq, fee too low).
    Retry,
    /// Anything else (`tem*` malformed, `tef*` failure) — not retryable.
    Error,
}

pub fn classify(engine_result: &str) -> EngineResultClass {
    match engine_result.get(..3) {
        Some("tes") => EngineResultClass::Success,
        Some("tec") => EngineResultClass::ClaimedCost,
        Some("ter") => EngineResultClass::Retry,
        _ => EngineResultClass::Error,
    }
}

/// `Invalid` vs `Rejected` per the operation lifecycle: an engine
/// result means the ticket/sequence was never consumed (`Invalid`, e.g.
/// `tem*`/`tef*`/`ter*` that never gets applied) or was consumed but failed
/// (`Rejected`, `tec*`). `tes*` is `Accepted`. Used once a `tx` lookup
/// confirms the final on-ledger outcome of a submitted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalOutcome {
    Accepted,
    Rejected,
    Invalid,
}

pub fn final_outcome(engine_result: &str) -> FinalOutcome {
    match classify(engine_result) {
        EngineResultClass::Success => FinalOutcome::Accepted,
        EngineResultClass::ClaimedCost => FinalOutcome::Rejected,
        _ => FinalOutcome::Invalid,
    }
}
