//! Celo-specific RPC types.

pub mod request;

pub use request::CeloTransactionRequest;
