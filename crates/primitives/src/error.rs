//! Error types for the Celo transaction codec.

use crate::transaction::CeloTxType;
use alloy_eips::eip2718::Eip2718Error;
use alloy_primitives::{Bytes, U256};
use thiserror::Error;

/// Errors returned while serializing, parsing or validating a Celo transaction.
#[derive(Debug, Error)]
pub enum CeloTxError {
    /// The decoded field count matches neither the unsigned nor the signed layout.
    #[error(
        "invalid serialized {ty} transaction: expected {} or {} fields, got {}",
        ty.unsigned_field_count(),
        ty.signed_field_count(),
        field_count
    )]
    InvalidSerializedTransaction {
        /// Transaction type selected by the tag byte.
        ty: CeloTxType,
        /// Number of RLP items found in the payload list.
        field_count: usize,
        /// Raw RLP items keyed by the field name they were decoded as.
        attributes: Vec<(&'static str, Bytes)>,
        /// The full input, tag byte included.
        serialized: Bytes,
    },

    /// The transaction violates a structural rule of its type.
    #[error("invalid {ty} transaction: {reason}")]
    InvalidTransaction {
        /// Transaction type.
        ty: CeloTxType,
        /// The violated rule.
        reason: &'static str,
    },

    /// `maxFeePerGas` does not fit in 256 bits.
    #[error("max fee per gas ({max_fee_per_gas}) is higher than the maximum allowed value (2^256-1)")]
    FeeCapTooHigh {
        /// Big-endian bytes of the rejected value.
        max_fee_per_gas: Bytes,
    },

    /// `maxPriorityFeePerGas` is higher than `maxFeePerGas`.
    #[error(
        "max priority fee per gas ({max_priority_fee_per_gas}) cannot be higher than max fee per gas ({max_fee_per_gas})"
    )]
    TipAboveFeeCap {
        /// The fee cap.
        max_fee_per_gas: U256,
        /// The tip.
        max_priority_fee_per_gas: U256,
    },

    /// An address field is not 20 bytes long.
    #[error("invalid address in field `{field}`: {raw}")]
    InvalidAddress {
        /// Name of the field.
        field: &'static str,
        /// Raw bytes of the field.
        raw: Bytes,
    },

    /// Chain id must be positive.
    #[error("chain id {chain_id} is invalid")]
    InvalidChainId {
        /// The rejected chain id.
        chain_id: u64,
    },

    /// The signature `v` value is not a valid y-parity.
    #[error("invalid signature y-parity value {0}")]
    InvalidSignature(u64),

    /// RLP decoding error.
    #[error(transparent)]
    Rlp(#[from] alloy_rlp::Error),

    /// Error from the base EIP-2718 decoder.
    #[error(transparent)]
    Eip2718(#[from] Eip2718Error),
}

impl CeloTxError {
    /// Shorthand for [`CeloTxError::InvalidTransaction`].
    pub const fn invalid(ty: CeloTxType, reason: &'static str) -> Self {
        Self::InvalidTransaction { ty, reason }
    }

    /// Returns the transaction type the error refers to, if any.
    pub const fn tx_type(&self) -> Option<CeloTxType> {
        match self {
            Self::InvalidSerializedTransaction { ty, .. } | Self::InvalidTransaction { ty, .. } => {
                Some(*ty)
            }
            _ => None,
        }
    }
}
