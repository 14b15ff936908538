//! Celo transaction types.
//!
//! Three EIP-2718 typed transactions that let the sender pay gas in an ERC20
//! fee currency:
//!
//! - [`TxCip42`] (`0x7c`): fee currency plus gateway fee fields
//! - [`TxCip64`] (`0x7b`): fee currency
//! - [`TxCip66`] (`0x7a`): fee currency plus a cap denominated in that currency
//!
//! [`ParsedTransaction`] parses any of them, falling back to the Ethereum
//! envelope for every other tag.

pub mod cip42;
pub mod cip64;
pub mod cip66;
pub mod envelope;
pub(crate) mod fields;
pub mod presence;

pub use cip42::{CIP42_TX_TYPE_ID, TxCip42};
pub use cip64::{CIP64_TX_TYPE_ID, TxCip64};
pub use cip66::{CIP66_TX_TYPE_ID, TxCip66};
pub use envelope::{CeloTxType, CeloTypedTransaction, ParsedCeloTransaction, ParsedTransaction};
pub use presence::{FieldPresence, is_empty, is_present, present};

use crate::error::CeloTxError;
use alloy_primitives::{Bytes, Signature, U256};
use alloy_rlp::{BufMut, Header};

/// RLP layout shared by the Celo transaction types.
///
/// The wire form is `tag || rlp([fields..., (v, r, s)?])`.
pub trait CeloTransaction {
    /// The transaction type.
    const TX_TYPE: CeloTxType;

    /// Names of the unsigned fields, in wire order.
    const FIELD_NAMES: &'static [&'static str];

    /// Length of the RLP encoded fields, without a list header.
    fn fields_len(&self) -> usize;

    /// Encodes the fields without a list header.
    fn encode_fields(&self, out: &mut dyn BufMut);

    /// Checks the structural rules of the type.
    fn validate(&self) -> Result<(), CeloTxError>;

    /// Returns the list header of the payload.
    fn rlp_header(&self, signature: Option<&Signature>) -> Header {
        let payload_length = self.fields_len() + signature.map_or(0, fields::signature_len);
        Header { list: true, payload_length }
    }

    /// Length of [`CeloTransaction::encode_with_signature`]'s output.
    fn encoded_len_with_signature(&self, signature: Option<&Signature>) -> usize {
        1 + self.rlp_header(signature).length_with_payload()
    }

    /// Encodes the tag byte and the field list, appending `v, r, s` when a
    /// signature is given. Does not validate.
    fn encode_with_signature(&self, signature: Option<&Signature>, out: &mut dyn BufMut) {
        out.put_u8(Self::TX_TYPE as u8);
        self.rlp_header(signature).encode(out);
        self.encode_fields(out);
        if let Some(signature) = signature {
            fields::encode_signature(signature, out);
        }
    }

    /// Validates the transaction and returns its wire encoding.
    fn serialize(&self, signature: Option<&Signature>) -> Result<Bytes, CeloTxError> {
        self.validate()?;
        let mut out = Vec::with_capacity(self.encoded_len_with_signature(signature));
        self.encode_with_signature(signature, &mut out);
        Ok(out.into())
    }
}

/// Rules shared by every Celo transaction type: a positive chain id and a tip
/// no higher than the fee cap.
pub(crate) fn validate_fee_market(
    chain_id: u64,
    max_fee_per_gas: Option<U256>,
    max_priority_fee_per_gas: Option<U256>,
) -> Result<(), CeloTxError> {
    if chain_id == 0 {
        return Err(CeloTxError::InvalidChainId { chain_id });
    }
    if let (Some(max_fee_per_gas), Some(max_priority_fee_per_gas)) =
        (max_fee_per_gas, max_priority_fee_per_gas)
        && max_priority_fee_per_gas > max_fee_per_gas
    {
        return Err(CeloTxError::TipAboveFeeCap { max_fee_per_gas, max_priority_fee_per_gas });
    }
    Ok(())
}
