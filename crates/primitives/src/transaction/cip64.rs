//! CIP-64 transaction type.
//!
//! An EIP-1559 transaction whose gas is paid in the ERC20 token at
//! `fee_currency`.
//!
//! Reference: <https://github.com/celo-org/celo-proposals/blob/master/CIPs/cip-0064.md>

use crate::{
    error::CeloTxError,
    transaction::{
        CeloTransaction, CeloTxType,
        fields::{
            RawField, access_list_len, encode_access_list, encode_optional, optional_len,
        },
        validate_fee_market,
    },
};
use alloy_eips::{Typed2718, eip2930::AccessList};
use alloy_primitives::{Address, Bytes, ChainId, TxKind, U256};
use alloy_rlp::{BufMut, Encodable};

/// CIP-64 transaction type ID (0x7B).
pub const CIP64_TX_TYPE_ID: u8 = 0x7b;

/// A fee currency transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TxCip64 {
    /// EIP-155: Simple replay attack protection.
    #[cfg_attr(feature = "serde", serde(with = "alloy_serde::quantity"))]
    pub chain_id: ChainId,

    /// A scalar value equal to the number of transactions sent by the sender.
    #[cfg_attr(
        feature = "serde",
        serde(default, with = "alloy_serde::quantity::opt", skip_serializing_if = "Option::is_none")
    )]
    pub nonce: Option<u64>,

    /// Max Priority fee that transaction is paying, in the fee currency.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_priority_fee_per_gas: Option<U256>,

    /// Maximum total fee per gas, in the fee currency.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_fee_per_gas: Option<U256>,

    /// Gas limit.
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            rename = "gas",
            with = "alloy_serde::quantity::opt",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub gas_limit: Option<u64>,

    /// The recipient, or [`TxKind::Create`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub to: TxKind,

    /// Amount of native currency transferred.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub value: Option<U256>,

    /// Call data or init code.
    #[cfg_attr(
        feature = "serde",
        serde(default, alias = "data", skip_serializing_if = "Option::is_none")
    )]
    pub input: Option<Bytes>,

    /// EIP-2930 access list.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub access_list: Option<AccessList>,

    /// ERC20 token used to pay for gas.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub fee_currency: Option<Address>,
}

impl TxCip64 {
    /// Get the transaction type.
    #[doc(alias = "transaction_type")]
    pub const fn tx_type() -> u8 {
        CIP64_TX_TYPE_ID
    }

    /// Builds the transaction from the unsigned part of a decoded field list.
    pub(crate) fn from_fields(fields: &[RawField<'_>]) -> Result<Self, CeloTxError> {
        let [
            chain_id,
            nonce,
            max_priority_fee_per_gas,
            max_fee_per_gas,
            gas_limit,
            to,
            value,
            input,
            access_list,
            fee_currency,
        ] = fields
        else {
            return Err(alloy_rlp::Error::UnexpectedLength.into());
        };

        Ok(Self {
            chain_id: chain_id.u64()?.unwrap_or_default(),
            nonce: nonce.u64()?,
            max_priority_fee_per_gas: max_priority_fee_per_gas.u256()?,
            max_fee_per_gas: max_fee_per_gas.fee_cap()?,
            gas_limit: gas_limit.u64()?,
            to: to.address("to")?.into(),
            value: value.u256()?,
            input: input.bytes()?,
            access_list: access_list.access_list()?,
            fee_currency: fee_currency.address("feeCurrency")?,
        })
    }
}

impl CeloTransaction for TxCip64 {
    const TX_TYPE: CeloTxType = CeloTxType::Cip64;

    const FIELD_NAMES: &'static [&'static str] = &[
        "chainId",
        "nonce",
        "maxPriorityFeePerGas",
        "maxFeePerGas",
        "gas",
        "to",
        "value",
        "data",
        "accessList",
        "feeCurrency",
    ];

    fn fields_len(&self) -> usize {
        self.chain_id.length()
            + optional_len(self.nonce.as_ref())
            + optional_len(self.max_priority_fee_per_gas.as_ref())
            + optional_len(self.max_fee_per_gas.as_ref())
            + optional_len(self.gas_limit.as_ref())
            + optional_len(self.to.to())
            + optional_len(self.value.as_ref())
            + optional_len(self.input.as_ref())
            + access_list_len(self.access_list.as_ref())
            + optional_len(self.fee_currency.as_ref())
    }

    fn encode_fields(&self, out: &mut dyn BufMut) {
        self.chain_id.encode(out);
        encode_optional(self.nonce.as_ref(), out);
        encode_optional(self.max_priority_fee_per_gas.as_ref(), out);
        encode_optional(self.max_fee_per_gas.as_ref(), out);
        encode_optional(self.gas_limit.as_ref(), out);
        encode_optional(self.to.to(), out);
        encode_optional(self.value.as_ref(), out);
        encode_optional(self.input.as_ref(), out);
        encode_access_list(self.access_list.as_ref(), out);
        encode_optional(self.fee_currency.as_ref(), out);
    }

    fn validate(&self) -> Result<(), CeloTxError> {
        validate_fee_market(self.chain_id, self.max_fee_per_gas, self.max_priority_fee_per_gas)?;
        if self.fee_currency.is_none_or(|currency| currency.is_zero()) {
            return Err(CeloTxError::invalid(Self::TX_TYPE, "feeCurrency is required"));
        }
        Ok(())
    }
}

impl Typed2718 for TxCip64 {
    fn ty(&self) -> u8 {
        CIP64_TX_TYPE_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::fields::decode_field_list;
    use alloy_primitives::{Signature, address, bytes, hex};

    const CUSD: Address = address!("0x765DE816845861e75A25fCA122bb6898B8B1282a");

    fn transfer() -> TxCip64 {
        TxCip64 {
            chain_id: 42220,
            nonce: Some(7),
            max_priority_fee_per_gas: Some(U256::from(1_000_000_000u64)),
            max_fee_per_gas: Some(U256::from(25_000_000_000u64)),
            gas_limit: Some(21_000),
            to: TxKind::Call(address!("0x0000000000000000000000000000000000000001")),
            value: Some(U256::from(1)),
            input: None,
            access_list: None,
            fee_currency: Some(CUSD),
        }
    }

    #[test]
    fn test_cip64_tx_type() {
        assert_eq!(TxCip64::tx_type(), 0x7b);
        assert_eq!(transfer().ty(), 0x7b);
        assert_eq!(TxCip64::FIELD_NAMES.len(), 10);
    }

    #[test]
    fn test_cip64_validate() {
        assert!(transfer().validate().is_ok());

        let tx = TxCip64 { fee_currency: None, ..transfer() };
        assert!(matches!(
            tx.validate(),
            Err(CeloTxError::InvalidTransaction { ty: CeloTxType::Cip64, .. })
        ));

        let tx = TxCip64 { fee_currency: Some(Address::ZERO), ..transfer() };
        assert!(tx.validate().is_err());

        let tx = TxCip64 { chain_id: 0, ..transfer() };
        assert!(matches!(tx.validate(), Err(CeloTxError::InvalidChainId { chain_id: 0 })));
    }

    #[test]
    fn test_cip64_tip_ordering() {
        let cap = U256::from(100);
        let tx = TxCip64 {
            max_fee_per_gas: Some(cap),
            max_priority_fee_per_gas: Some(cap),
            ..transfer()
        };
        assert!(tx.validate().is_ok());

        let tx = TxCip64 { max_priority_fee_per_gas: Some(cap + U256::from(1)), ..tx };
        assert!(matches!(tx.validate(), Err(CeloTxError::TipAboveFeeCap { .. })));
    }

    #[test]
    fn test_cip64_absent_fields_encoding() {
        let tx = TxCip64 { chain_id: 1, fee_currency: Some(CUSD), ..Default::default() };
        let mut out = Vec::new();
        tx.encode_fields(&mut out);
        assert_eq!(out.len(), tx.fields_len());
        assert_eq!(&out[..8], &hex!("0180808080808080"));
        assert_eq!(out[8], 0xc0);
        assert_eq!(&out[9..], &hex!("94765de816845861e75a25fca122bb6898b8b1282a"));
    }

    #[test]
    fn test_cip64_serialize_unsigned() {
        let tx = transfer();
        let encoded = tx.serialize(None).unwrap();
        assert_eq!(encoded[0], CIP64_TX_TYPE_ID);
        assert_eq!(encoded.len(), tx.encoded_len_with_signature(None));

        let mut buf = &encoded[1..];
        let fields = decode_field_list(&mut buf).unwrap();
        assert!(buf.is_empty());
        assert_eq!(fields.len(), 10);
        assert_eq!(TxCip64::from_fields(&fields).unwrap(), tx);
    }

    #[test]
    fn test_cip64_serialize_signed() {
        let tx = TxCip64 { input: Some(bytes!("a9059cbb")), ..transfer() };
        let signature = Signature::new(U256::from(1), U256::from(2), false);
        let encoded = tx.serialize(Some(&signature)).unwrap();
        assert_eq!(encoded.len(), tx.encoded_len_with_signature(Some(&signature)));
        assert!(encoded.ends_with(&hex!("800102")));

        let mut buf = &encoded[1..];
        let fields = decode_field_list(&mut buf).unwrap();
        assert_eq!(fields.len(), 13);
        assert_eq!(TxCip64::from_fields(&fields[..10]).unwrap(), tx);
    }

    #[test]
    fn test_cip64_serialize_rejects_invalid() {
        let tx = TxCip64 { fee_currency: None, ..transfer() };
        assert!(tx.serialize(None).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_cip64_serde() {
        let tx = transfer();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["chainId"], "0xa4ec");
        assert_eq!(json["gas"], "0x5208");
        assert_eq!(
            json["feeCurrency"].as_str().unwrap().to_lowercase(),
            "0x765de816845861e75a25fca122bb6898b8b1282a"
        );
        assert!(json.get("accessList").is_none());

        let decoded: TxCip64 = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, tx);
    }
}
