//! CIP-66 transaction type.
//!
//! Same layout as CIP-64 with a trailing `maxFeeInFeeCurrency`, the most the
//! sender will pay for the whole transaction, denominated in the fee currency.
//!
//! Reference: <https://github.com/celo-org/celo-proposals/blob/master/CIPs/cip-0066.md>

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

/// CIP-66 transaction type ID (0x7A).
pub const CIP66_TX_TYPE_ID: u8 = 0x7a;

/// A fee currency transaction with a total fee cap in that currency.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TxCip66 {
    /// EIP-155: Simple replay attack protection.
    #[cfg_attr(feature = "serde", serde(with = "alloy_serde::quantity"))]
    pub chain_id: ChainId,

    /// Sender nonce.
    #[cfg_attr(
        feature = "serde",
        serde(default, with = "alloy_serde::quantity::opt", skip_serializing_if = "Option::is_none")
    )]
    pub nonce: Option<u64>,

    /// Also known as `GasTipCap`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_priority_fee_per_gas: Option<U256>,

    /// Also known as `GasFeeCap`.
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

    /// Upper bound of the total fee, in units of `fee_currency`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max_fee_in_fee_currency: Option<U256>,
}

impl TxCip66 {
    /// Get the transaction type.
    #[doc(alias = "transaction_type")]
    pub const fn tx_type() -> u8 {
        CIP66_TX_TYPE_ID
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
            max_fee_in_fee_currency,
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
            max_fee_in_fee_currency: max_fee_in_fee_currency.u256()?,
        })
    }
}

impl CeloTransaction for TxCip66 {
    const TX_TYPE: CeloTxType = CeloTxType::Cip66;

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
        "maxFeeInFeeCurrency",
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
            + optional_len(self.max_fee_in_fee_currency.as_ref())
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
        encode_optional(self.max_fee_in_fee_currency.as_ref(), out);
    }

    fn validate(&self) -> Result<(), CeloTxError> {
        validate_fee_market(self.chain_id, self.max_fee_per_gas, self.max_priority_fee_per_gas)?;
        if self.fee_currency.is_none_or(|currency| currency.is_zero()) {
            return Err(CeloTxError::invalid(Self::TX_TYPE, "feeCurrency is required"));
        }
        if self.max_fee_in_fee_currency.is_none_or(|max| max.is_zero()) {
            return Err(CeloTxError::invalid(Self::TX_TYPE, "maxFeeInFeeCurrency is required"));
        }
        Ok(())
    }
}

impl Typed2718 for TxCip66 {
    fn ty(&self) -> u8 {
        CIP66_TX_TYPE_ID
    }
}
