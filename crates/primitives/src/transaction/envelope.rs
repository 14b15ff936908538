//! Celo transaction type tag, typed transaction sum type and the tag dispatching parser.

use crate::{
    error::CeloTxError,
    transaction::{
        CIP42_TX_TYPE_ID, CIP64_TX_TYPE_ID, CIP66_TX_TYPE_ID, CeloTransaction, TxCip42, TxCip64,
        TxCip66,
        fields::{RawField, SIGNATURE_FIELD_NAMES, decode_field_list, decode_signature},
    },
};
use alloy_consensus::TxEnvelope;
use alloy_eips::{
    Typed2718,
    eip2718::{Decodable2718, Eip2718Error, Encodable2718},
};
use alloy_primitives::{Address, Bytes, Signature};
use core::fmt;
use tracing::{debug, trace};

/// Celo transaction type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CeloTxType {
    /// CIP-42 transaction (type 0x7c)
    Cip42 = CIP42_TX_TYPE_ID,
    /// CIP-64 transaction (type 0x7b)
    Cip64 = CIP64_TX_TYPE_ID,
    /// CIP-66 transaction (type 0x7a)
    Cip66 = CIP66_TX_TYPE_ID,
}

impl CeloTxType {
    /// All Celo transaction types, oldest first.
    pub const ALL: [Self; 3] = [Self::Cip42, Self::Cip64, Self::Cip66];

    /// Names of the unsigned fields, in wire order.
    pub const fn field_names(self) -> &'static [&'static str] {
        match self {
            Self::Cip42 => TxCip42::FIELD_NAMES,
            Self::Cip64 => TxCip64::FIELD_NAMES,
            Self::Cip66 => TxCip66::FIELD_NAMES,
        }
    }

    /// Number of fields of an unsigned payload.
    pub const fn unsigned_field_count(self) -> usize {
        self.field_names().len()
    }

    /// Number of fields of a signed payload.
    pub const fn signed_field_count(self) -> usize {
        self.unsigned_field_count() + SIGNATURE_FIELD_NAMES.len()
    }
}

impl fmt::Display for CeloTxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cip42 => "cip42",
            Self::Cip64 => "cip64",
            Self::Cip66 => "cip66",
        })
    }
}

impl From<CeloTxType> for u8 {
    fn from(ty: CeloTxType) -> Self {
        ty as Self
    }
}

impl TryFrom<u8> for CeloTxType {
    type Error = Eip2718Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            CIP42_TX_TYPE_ID => Self::Cip42,
            CIP64_TX_TYPE_ID => Self::Cip64,
            CIP66_TX_TYPE_ID => Self::Cip66,
            _ => return Err(Eip2718Error::UnexpectedType(value)),
        })
    }
}

impl Typed2718 for CeloTxType {
    fn ty(&self) -> u8 {
        (*self).into()
    }
}

/// One of the Celo transaction types.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum CeloTypedTransaction {
    /// CIP-42 transaction.
    #[cfg_attr(feature = "serde", serde(rename = "0x7c", alias = "0x7C"))]
    Cip42(TxCip42),
    /// CIP-64 transaction.
    #[cfg_attr(feature = "serde", serde(rename = "0x7b", alias = "0x7B"))]
    Cip64(TxCip64),
    /// CIP-66 transaction.
    #[cfg_attr(feature = "serde", serde(rename = "0x7a", alias = "0x7A"))]
    Cip66(TxCip66),
}

impl CeloTypedTransaction {
    /// Return the [`CeloTxType`] of the inner txn.
    pub const fn tx_type(&self) -> CeloTxType {
        match self {
            Self::Cip42(_) => CeloTxType::Cip42,
            Self::Cip64(_) => CeloTxType::Cip64,
            Self::Cip66(_) => CeloTxType::Cip66,
        }
    }

    /// Returns the chain id.
    pub const fn chain_id(&self) -> u64 {
        match self {
            Self::Cip42(tx) => tx.chain_id,
            Self::Cip64(tx) => tx.chain_id,
            Self::Cip66(tx) => tx.chain_id,
        }
    }

    /// Returns the fee currency, if any.
    pub const fn fee_currency(&self) -> Option<Address> {
        match self {
            Self::Cip42(tx) => tx.fee_currency,
            Self::Cip64(tx) => tx.fee_currency,
            Self::Cip66(tx) => tx.fee_currency,
        }
    }

    /// Checks the structural rules of the inner transaction.
    pub fn validate(&self) -> Result<(), CeloTxError> {
        match self {
            Self::Cip42(tx) => tx.validate(),
            Self::Cip64(tx) => tx.validate(),
            Self::Cip66(tx) => tx.validate(),
        }
    }

    /// Validates the transaction and returns `tag || rlp([fields..., (v, r, s)?])`.
    pub fn serialize(&self, signature: Option<&Signature>) -> Result<Bytes, CeloTxError> {
        let encoded = match self {
            Self::Cip42(tx) => tx.serialize(signature),
            Self::Cip64(tx) => tx.serialize(signature),
            Self::Cip66(tx) => tx.serialize(signature),
        }?;
        trace!(
            target: "celo_primitives::codec",
            ty = %self.tx_type(),
            signed = signature.is_some(),
            len = encoded.len(),
            "serialized celo transaction"
        );
        Ok(encoded)
    }

    fn from_fields(ty: CeloTxType, fields: &[RawField<'_>]) -> Result<Self, CeloTxError> {
        Ok(match ty {
            CeloTxType::Cip42 => Self::Cip42(TxCip42::from_fields(fields)?),
            CeloTxType::Cip64 => Self::Cip64(TxCip64::from_fields(fields)?),
            CeloTxType::Cip66 => Self::Cip66(TxCip66::from_fields(fields)?),
        })
    }
}

impl Typed2718 for CeloTypedTransaction {
    fn ty(&self) -> u8 {
        self.tx_type().into()
    }
}

impl From<TxCip42> for CeloTypedTransaction {
    fn from(tx: TxCip42) -> Self {
        Self::Cip42(tx)
    }
}

impl From<TxCip64> for CeloTypedTransaction {
    fn from(tx: TxCip64) -> Self {
        Self::Cip64(tx)
    }
}

impl From<TxCip66> for CeloTypedTransaction {
    fn from(tx: TxCip66) -> Self {
        Self::Cip66(tx)
    }
}

/// A decoded Celo transaction and its signature, if the payload was signed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCeloTransaction {
    /// The transaction.
    pub transaction: CeloTypedTransaction,
    /// The signature, present when the payload carried `v, r, s`.
    pub signature: Option<Signature>,
}

impl ParsedCeloTransaction {
    /// Decodes `serialized`, whose first byte is the tag of `ty`.
    fn decode(ty: CeloTxType, serialized: &[u8]) -> Result<Self, CeloTxError> {
        let mut buf = serialized.get(1..).unwrap_or_default();
        let fields = decode_field_list(&mut buf)?;
        if !buf.is_empty() {
            return Err(alloy_rlp::Error::UnexpectedLength.into());
        }

        let unsigned = ty.unsigned_field_count();
        let signed = fields.len() == ty.signed_field_count();
        if fields.len() != unsigned && !signed {
            debug!(
                target: "celo_primitives::codec",
                %ty,
                field_count = fields.len(),
                "invalid celo transaction field count"
            );
            return Err(CeloTxError::InvalidSerializedTransaction {
                ty,
                field_count: fields.len(),
                attributes: present_attributes(ty, &fields),
                serialized: Bytes::copy_from_slice(serialized),
            });
        }

        let (tx_fields, signature_fields) = fields.split_at(unsigned);
        let transaction = CeloTypedTransaction::from_fields(ty, tx_fields)?;
        let signature = signed.then(|| decode_signature(signature_fields)).transpose()?;
        transaction.validate()?;

        trace!(target: "celo_primitives::codec", %ty, signed, "parsed celo transaction");
        Ok(Self { transaction, signature })
    }

    /// Re-encodes the transaction with its signature, if any.
    pub fn serialize(&self) -> Result<Bytes, CeloTxError> {
        self.transaction.serialize(self.signature.as_ref())
    }
}

/// Pairs each non-empty item with the name of the field it sits in.
fn present_attributes(ty: CeloTxType, fields: &[RawField<'_>]) -> Vec<(&'static str, Bytes)> {
    ty.field_names()
        .iter()
        .chain(SIGNATURE_FIELD_NAMES.iter())
        .zip(fields)
        .filter(|(_, field)| !field.is_empty())
        .map(|(name, field)| (*name, field.encoded()))
        .collect()
}

/// A transaction parsed from its EIP-2718 encoding.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedTransaction {
    /// One of the Celo transaction types.
    Celo(ParsedCeloTransaction),
    /// Any other type, decoded by the Ethereum envelope.
    Ethereum(TxEnvelope),
}

impl ParsedTransaction {
    /// Parses a type-tagged transaction.
    ///
    /// Tags `0x7c`, `0x7b` and `0x7a` select the Celo decoders. Every other
    /// input is handed unchanged to [`TxEnvelope`]'s EIP-2718 decoder.
    pub fn parse(serialized: &[u8]) -> Result<Self, CeloTxError> {
        let Some(&tag) = serialized.first() else {
            return Err(alloy_rlp::Error::InputTooShort.into());
        };
        match CeloTxType::try_from(tag) {
            Ok(ty) => ParsedCeloTransaction::decode(ty, serialized).map(Self::Celo),
            Err(_) => {
                trace!(target: "celo_primitives::codec", tag, "falling back to ethereum decoder");
                let mut buf = serialized;
                Ok(Self::Ethereum(TxEnvelope::decode_2718(&mut buf)?))
            }
        }
    }

    /// Re-encodes the transaction.
    pub fn serialize(&self) -> Result<Bytes, CeloTxError> {
        match self {
            Self::Celo(tx) => tx.serialize(),
            Self::Ethereum(envelope) => Ok(envelope.encoded_2718().into()),
        }
    }

    /// Returns the Celo transaction, if this is one.
    pub const fn as_celo(&self) -> Option<&ParsedCeloTransaction> {
        match self {
            Self::Celo(tx) => Some(tx),
            Self::Ethereum(_) => None,
        }
    }

    /// Returns the signature. Always present for the Ethereum fallback.
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            Self::Celo(tx) => tx.signature.as_ref(),
            Self::Ethereum(envelope) => Some(envelope.signature()),
        }
    }
}

impl Typed2718 for ParsedTransaction {
    fn ty(&self) -> u8 {
        match self {
            Self::Celo(tx) => tx.transaction.ty(),
            Self::Ethereum(envelope) => envelope.ty(),
        }
    }
}
