//! Typed façade over the bridge contract's execute/query messages,
//! over a Coreum gRPC connection.

pub mod client;
pub mod config;
pub mod error;
pub mod msg;

pub use client::{ContractClient, CoreumSigner, TxOutcome};
pub use config::CoreumClientConfig;
pub use error::{classify_raw_log, ContractClientError, Result};
