//! RLP field list reading and writing shared by the Celo transaction types.
//!
//! The payload list is first split into undecoded [`RawField`]s so that the field
//! count can be checked before any field is interpreted. Absent fields are written
//! as the empty string, except the access list which is written as the empty list.

use crate::{
    error::CeloTxError,
    transaction::presence::{FieldPresence, present},
};
use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, Bytes, Signature, U256};
use alloy_rlp::{BufMut, Decodable, EMPTY_LIST_CODE, EMPTY_STRING_CODE, Encodable, Header};

/// Names of the signature fields appended to a signed payload.
pub(crate) const SIGNATURE_FIELD_NAMES: [&str; 3] = ["v", "r", "s"];

const ADDRESS_LEN: usize = 20;

/// One undecoded item of a transaction field list.
#[derive(Debug, Clone)]
pub(crate) struct RawField<'a> {
    encoded: &'a [u8],
    header: Header,
    payload: &'a [u8],
}

impl<'a> RawField<'a> {
    /// Returns the item including its RLP header.
    pub(crate) fn encoded(&self) -> Bytes {
        Bytes::copy_from_slice(self.encoded)
    }

    /// Returns `true` if the item carries no data, e.g. `0x80`, `0xc0` or `0x00`.
    pub(crate) fn is_empty(&self) -> bool {
        self.payload.is_empty_field()
    }

    fn string(&self) -> alloy_rlp::Result<&'a [u8]> {
        if self.header.list {
            return Err(alloy_rlp::Error::UnexpectedList);
        }
        Ok(self.payload)
    }

    /// Decodes a big-endian integer that must fit in 64 bits.
    pub(crate) fn u64(&self) -> Result<Option<u64>, CeloTxError> {
        let bytes = trim_leading_zeros(self.string()?);
        if bytes.len() > 8 {
            return Err(alloy_rlp::Error::Overflow.into());
        }
        let value = bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
        Ok(present(Some(value)))
    }

    /// Decodes a big-endian integer that must fit in 256 bits.
    pub(crate) fn u256(&self) -> Result<Option<U256>, CeloTxError> {
        let bytes = trim_leading_zeros(self.string()?);
        if bytes.len() > 32 {
            return Err(alloy_rlp::Error::Overflow.into());
        }
        Ok(present(Some(U256::from_be_slice(bytes))))
    }

    /// Decodes `maxFeePerGas`, rejecting anything above `2^256 - 1` with
    /// [`CeloTxError::FeeCapTooHigh`].
    pub(crate) fn fee_cap(&self) -> Result<Option<U256>, CeloTxError> {
        let bytes = trim_leading_zeros(self.string()?);
        if bytes.len() > 32 {
            return Err(CeloTxError::FeeCapTooHigh {
                max_fee_per_gas: Bytes::copy_from_slice(bytes),
            });
        }
        Ok(present(Some(U256::from_be_slice(bytes))))
    }

    /// Decodes a 20 byte address. The empty string and the zero address are absent.
    pub(crate) fn address(&self, field: &'static str) -> Result<Option<Address>, CeloTxError> {
        let bytes = self.string()?;
        if bytes.is_empty() {
            return Ok(None);
        }
        if bytes.len() != ADDRESS_LEN {
            return Err(CeloTxError::InvalidAddress {
                field,
                raw: Bytes::copy_from_slice(bytes),
            });
        }
        Ok(present(Some(Address::from_slice(bytes))))
    }

    /// Decodes an opaque byte string.
    pub(crate) fn bytes(&self) -> Result<Option<Bytes>, CeloTxError> {
        Ok(present(Some(Bytes::copy_from_slice(self.string()?))))
    }

    /// Decodes an access list. Both `0xc0` and `0x80` decode as absent.
    pub(crate) fn access_list(&self) -> Result<Option<AccessList>, CeloTxError> {
        if !self.header.list {
            if self.payload.is_empty() {
                return Ok(None);
            }
            return Err(alloy_rlp::Error::UnexpectedString.into());
        }
        let mut buf = self.encoded;
        let access_list = AccessList::decode(&mut buf)?;
        Ok(present(Some(access_list)))
    }
}

/// Splits an RLP list into its items without decoding them.
///
/// Advances `buf` past the list.
pub(crate) fn decode_field_list<'a>(buf: &mut &'a [u8]) -> alloy_rlp::Result<Vec<RawField<'a>>> {
    let header = Header::decode(buf)?;
    if !header.list {
        return Err(alloy_rlp::Error::UnexpectedString);
    }
    if buf.len() < header.payload_length {
        return Err(alloy_rlp::Error::InputTooShort);
    }
    let (mut payload, rest) = buf.split_at(header.payload_length);
    *buf = rest;

    let mut fields = Vec::new();
    while !payload.is_empty() {
        let start = payload;
        let header = Header::decode(&mut payload)?;
        if payload.len() < header.payload_length {
            return Err(alloy_rlp::Error::InputTooShort);
        }
        let (item, rest) = payload.split_at(header.payload_length);
        let consumed = start.len() - rest.len();
        fields.push(RawField {
            encoded: &start[..consumed],
            header,
            payload: item,
        });
        payload = rest;
    }
    Ok(fields)
}

/// Decodes the trailing `v, r, s` triple of a signed payload.
pub(crate) fn decode_signature(fields: &[RawField<'_>]) -> Result<Signature, CeloTxError> {
    let [v, r, s] = fields else {
        return Err(alloy_rlp::Error::UnexpectedLength.into());
    };
    let y_parity = match v.u64()?.unwrap_or_default() {
        0 | 27 => false,
        1 | 28 => true,
        v => return Err(CeloTxError::InvalidSignature(v)),
    };
    Ok(Signature::new(
        r.u256()?.unwrap_or_default(),
        s.u256()?.unwrap_or_default(),
        y_parity,
    ))
}

/// Length of the encoded `v, r, s` triple.
pub(crate) fn signature_len(signature: &Signature) -> usize {
    u8::from(signature.v()).length() + signature.r().length() + signature.s().length()
}

/// Encodes `v, r, s` with `v` as the y-parity bit.
pub(crate) fn encode_signature(signature: &Signature, out: &mut dyn BufMut) {
    u8::from(signature.v()).encode(out);
    signature.r().encode(out);
    signature.s().encode(out);
}

/// Encodes the value if present, the empty string otherwise.
pub(crate) fn encode_optional<T: Encodable + FieldPresence>(value: Option<&T>, out: &mut dyn BufMut) {
    match value.filter(|value| value.is_present_field()) {
        Some(value) => value.encode(out),
        None => out.put_u8(EMPTY_STRING_CODE),
    }
}

/// Length of [`encode_optional`]'s output.
pub(crate) fn optional_len<T: Encodable + FieldPresence>(value: Option<&T>) -> usize {
    value.filter(|value| value.is_present_field()).map_or(1, |value| value.length())
}

/// Encodes the access list, or the empty list when absent.
pub(crate) fn encode_access_list(access_list: Option<&AccessList>, out: &mut dyn BufMut) {
    match access_list.filter(|list| list.is_present_field()) {
        Some(list) => list.encode(out),
        None => out.put_u8(EMPTY_LIST_CODE),
    }
}

/// Length of [`encode_access_list`]'s output.
pub(crate) fn access_list_len(access_list: Option<&AccessList>) -> usize {
    access_list.filter(|list| list.is_present_field()).map_or(1, |value| value.length())
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}
