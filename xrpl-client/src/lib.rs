//! Thin request/response layer over an XRPL (`rippled`) node, plus
//! the binary transaction codec the relayer uses to build and multi-sign
//! canonical reconstructions of pending contract operations.

pub mod binary;
pub mod client;
pub mod currency;
pub mod engine_result;
pub mod error;
pub mod fee;
pub mod types;

pub use client::{HttpClientConfig, XrplClient};
pub use error::{Result, XrplClientError};
