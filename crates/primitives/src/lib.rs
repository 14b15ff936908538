//! Celo primitive types
//!
//! This crate provides the Celo fee currency transaction types and their
//! EIP-2718 codec.
//!
//! # Transaction Types
//!
//! Celo extends Ethereum's transaction types with:
//!
//! - [`TxCip42`]: CIP-42 transactions (type `0x7C`) - fee currency and gateway fee
//! - [`TxCip64`]: CIP-64 transactions (type `0x7B`) - fee currency
//! - [`TxCip66`]: CIP-66 transactions (type `0x7A`) - fee currency with a cap in that currency
//! - [`CeloTypedTransaction`]: one of the above
//!
//! # Codec
//!
//! [`CeloTypedTransaction::serialize`] writes `tag || rlp([fields..., (v, r, s)?])`.
//! [`ParsedTransaction::parse`] reads any of the three types, signed or
//! unsigned, and hands every other tag to the Ethereum [`TxEnvelope`] decoder.
//!
//! Empty and absent fields are the same thing on the wire, see
//! [`FieldPresence`].
//!
//! [`TxEnvelope`]: alloy_consensus::TxEnvelope

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg), allow(unexpected_cfgs))]

pub mod error;
pub mod transaction;

pub use error::CeloTxError;

// Re-export transaction types
pub use transaction::{
    CIP42_TX_TYPE_ID, CIP64_TX_TYPE_ID, CIP66_TX_TYPE_ID, CeloTransaction, CeloTxType,
    CeloTypedTransaction, FieldPresence, ParsedCeloTransaction, ParsedTransaction, TxCip42,
    TxCip64, TxCip66, is_empty, is_present, present,
};
