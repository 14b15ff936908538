//! CIP-42 transaction type.
//!
//! The first fee currency transaction. Besides the fee currency it carries an
//! optional gateway fee paid to `gateway_fee_recipient`. Unlike the later
//! types the Celo fields sit between the gas limit and the recipient.
//!
//! Reference: <https://github.com/celo-org/celo-proposals/blob/master/CIPs/cip-0042.md>

use crate::{
    error::CeloTxError,
    transaction::{
        CeloTransaction, CeloTxType,
        fields::{
            RawField, access_list_len, encode_access_list, encode_optional, optional_len,
        },
        presence::is_present,
        validate_fee_market,
    },
};
use alloy_eips::{Typed2718, eip2930::AccessList};
use alloy_primitives::{Address, Bytes, ChainId, TxKind, U256};
use alloy_rlp::{BufMut, Encodable};

/// CIP-42 transaction type ID (0x7C).
pub const CIP42_TX_TYPE_ID: u8 = 0x7c;

/// A fee currency transaction with gateway fee fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TxCip42 {
    /// EIP-155: Simple replay attack protection.
    #[cfg_attr(feature = "serde", serde(with = "alloy_serde::quantity"))]
    pub chain_id: ChainId,

    /// A scalar value equal to the number of transactions sent by the sender.
    #[cfg_attr(
        feature = "serde",
        serde(default, with = "alloy_serde::quantity::opt", skip_serializing_if = "Option::is_none")
    )]
    pub nonce: Option<u64>,

    /// Max Priority fee that transaction is paying.
    ///
    /// This is also known as `GasTipCap`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_priority_fee_per_gas: Option<U256>,

    /// Maximum total fee per gas.
    ///
    /// This is also known as `GasFeeCap`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_fee_per_gas: Option<U256>,

    /// A scalar value equal to the maximum amount of gas that should be used
    /// in executing this transaction.
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

    /// ERC20 token used to pay for gas. Native CELO when absent.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub fee_currency: Option<Address>,

    /// Full node that receives the gateway fee.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub gateway_fee_recipient: Option<Address>,

    /// Amount paid to `gateway_fee_recipient`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub gateway_fee: Option<U256>,

    /// The 160-bit address of the message call's recipient or, for a contract
    /// creation transaction, empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub to: TxKind,

    /// A scalar value equal to the number of Wei to be transferred to the
    /// message call's recipient.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub value: Option<U256>,

    /// Input has two uses depending if transaction is Create or Call (if `to`
    /// field is None or Some).
    #[cfg_attr(
        feature = "serde",
        serde(default, alias = "data", skip_serializing_if = "Option::is_none")
    )]
    pub input: Option<Bytes>,

    /// EIP-2930 access list.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub access_list: Option<AccessList>,
}

impl TxCip42 {
    /// Get the transaction type.
    #[doc(alias = "transaction_type")]
    pub const fn tx_type() -> u8 {
        CIP42_TX_TYPE_ID
    }

    /// Builds the transaction from the unsigned part of a decoded field list.
    pub(crate) fn from_fields(fields: &[RawField<'_>]) -> Result<Self, CeloTxError> {
        let [
            chain_id,
            nonce,
            max_priority_fee_per_gas,
            max_fee_per_gas,
            gas_limit,
            fee_currency,
            gateway_fee_recipient,
            gateway_fee,
            to,
            value,
            input,
            access_list,
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
            fee_currency: fee_currency.address("feeCurrency")?,
            gateway_fee_recipient: gateway_fee_recipient.address("gatewayFeeRecipient")?,
            gateway_fee: gateway_fee.u256()?,
            to: to.address("to")?.into(),
            value: value.u256()?,
            input: input.bytes()?,
            access_list: access_list.access_list()?,
        })
    }
}

impl CeloTransaction for TxCip42 {
    const TX_TYPE: CeloTxType = CeloTxType::Cip42;

    const FIELD_NAMES: &'static [&'static str] = &[
        "chainId",
        "nonce",
        "maxPriorityFeePerGas",
        "maxFeePerGas",
        "gas",
        "feeCurrency",
        "gatewayFeeRecipient",
        "gatewayFee",
        "to",
        "value",
        "data",
        "accessList",
    ];

    fn fields_len(&self) -> usize {
        self.chain_id.length()
            + optional_len(self.nonce.as_ref())
            + optional_len(self.max_priority_fee_per_gas.as_ref())
            + optional_len(self.max_fee_per_gas.as_ref())
            + optional_len(self.gas_limit.as_ref())
            + optional_len(self.fee_currency.as_ref())
            + optional_len(self.gateway_fee_recipient.as_ref())
            + optional_len(self.gateway_fee.as_ref())
            + optional_len(self.to.to())
            + optional_len(self.value.as_ref())
            + optional_len(self.input.as_ref())
            + access_list_len(self.access_list.as_ref())
    }

    fn encode_fields(&self, out: &mut dyn BufMut) {
        self.chain_id.encode(out);
        encode_optional(self.nonce.as_ref(), out);
        encode_optional(self.max_priority_fee_per_gas.as_ref(), out);
        encode_optional(self.max_fee_per_gas.as_ref(), out);
        encode_optional(self.gas_limit.as_ref(), out);
        encode_optional(self.fee_currency.as_ref(), out);
        encode_optional(self.gateway_fee_recipient.as_ref(), out);
        encode_optional(self.gateway_fee.as_ref(), out);
        encode_optional(self.to.to(), out);
        encode_optional(self.value.as_ref(), out);
        encode_optional(self.input.as_ref(), out);
        encode_access_list(self.access_list.as_ref(), out);
    }

    fn validate(&self) -> Result<(), CeloTxError> {
        validate_fee_market(self.chain_id, self.max_fee_per_gas, self.max_priority_fee_per_gas)?;

        let has_recipient = is_present(&self.gateway_fee_recipient);
        if is_present(&self.gateway_fee) != has_recipient {
            return Err(CeloTxError::invalid(
                Self::TX_TYPE,
                "gatewayFee and gatewayFeeRecipient must be provided together",
            ));
        }
        if !has_recipient && !is_present(&self.fee_currency) {
            return Err(CeloTxError::invalid(
                Self::TX_TYPE,
                "either feeCurrency or gatewayFeeRecipient must be provided",
            ));
        }
        Ok(())
    }
}

impl Typed2718 for TxCip42 {
    fn ty(&self) -> u8 {
        CIP42_TX_TYPE_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::fields::decode_field_list;
    use alloy_primitives::{Signature, address};

    const GATEWAY: Address = address!("0x00000000000000000000000000000000000fee01");

    fn cusd_tx() -> TxCip42 {
        TxCip42 {
            chain_id: 42220,
            nonce: Some(1),
            max_priority_fee_per_gas: Some(U256::from(1)),
            max_fee_per_gas: Some(U256::from(2)),
            gas_limit: Some(50_000),
            fee_currency: Some(address!("0x765DE816845861e75A25fCA122bb6898B8B1282a")),
            to: TxKind::Call(address!("0x0000000000000000000000000000000000000002")),
            ..Default::default()
        }
    }

    fn decode(encoded: &[u8]) -> TxCip42 {
        let mut buf = &encoded[1..];
        let fields = decode_field_list(&mut buf).unwrap();
        TxCip42::from_fields(&fields[..12]).unwrap()
    }

    #[test]
    fn test_cip42_field_order() {
        assert_eq!(TxCip42::FIELD_NAMES.len(), 12);
        assert_eq!(TxCip42::FIELD_NAMES[5], "feeCurrency");
        assert_eq!(TxCip42::FIELD_NAMES[8], "to");
    }

    #[test]
    fn test_cip42_gateway_fields_together() {
        let tx = TxCip42 { gateway_fee: Some(U256::from(10)), ..cusd_tx() };
        assert!(tx.validate().unwrap_err().to_string().contains("together"));

        let tx = TxCip42 { gateway_fee_recipient: Some(GATEWAY), ..cusd_tx() };
        assert!(tx.validate().is_err());

        let tx = TxCip42 {
            fee_currency: None,
            gateway_fee_recipient: Some(GATEWAY),
            gateway_fee: Some(U256::from(10)),
            ..cusd_tx()
        };
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_cip42_requires_currency_or_recipient() {
        let tx = TxCip42 { fee_currency: None, ..cusd_tx() };
        assert!(matches!(
            tx.validate(),
            Err(CeloTxError::InvalidTransaction { ty: CeloTxType::Cip42, .. })
        ));
    }

    #[test]
    fn test_cip42_zero_gateway_fee_is_absent() {
        let zero = TxCip42 { gateway_fee: Some(U256::ZERO), ..cusd_tx() };
        let absent = cusd_tx();

        let zero_encoded = zero.serialize(None).unwrap();
        let absent_encoded = absent.serialize(None).unwrap();
        assert_eq!(zero_encoded, absent_encoded);
        assert_eq!(decode(&zero_encoded).gateway_fee, None);
        assert_eq!(decode(&absent_encoded).gateway_fee, None);
    }

    #[test]
    fn test_cip42_round_trip_signed() {
        let tx = TxCip42 {
            gateway_fee_recipient: Some(GATEWAY),
            gateway_fee: Some(U256::from(100)),
            value: Some(U256::from(5)),
            ..cusd_tx()
        };
        let signature = Signature::new(U256::MAX, U256::from(3), true);
        let encoded = tx.serialize(Some(&signature)).unwrap();
        assert_eq!(encoded.len(), tx.encoded_len_with_signature(Some(&signature)));
        assert_eq!(decode(&encoded), tx);
    }
}
