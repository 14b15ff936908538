//! Celo RPC transaction request type.

use alloy_primitives::{Address, U256};
use alloy_rpc_types_eth::TransactionRequest;
use serde::{Deserialize, Serialize};

/// Celo RPC transaction request representation.
///
/// Extends standard Ethereum transaction request with:
/// - `feeCurrency`: ERC20 token used to pay for gas
/// - `gatewayFeeRecipient` / `gatewayFee`: gateway fee (CIP-42 only)
/// - `maxFeeInFeeCurrency`: total fee cap in the fee currency (CIP-66 only)
///
/// An explicit transaction type is requested through the inner `type` field.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Deref,
    derive_more::DerefMut,
)]
#[serde(rename_all = "camelCase")]
pub struct CeloTransactionRequest {
    /// Inner [`TransactionRequest`].
    #[serde(flatten)]
    #[deref]
    #[deref_mut]
    pub inner: TransactionRequest,

    /// ERC20 token used to pay for gas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_currency: Option<Address>,

    /// Recipient of the gateway fee (CIP-42 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_fee_recipient: Option<Address>,

    /// Gateway fee amount (CIP-42 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_fee: Option<U256>,

    /// Total fee cap in units of the fee currency (CIP-66 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_in_fee_currency: Option<U256>,
}

impl CeloTransactionRequest {
    /// Sets the fee currency.
    pub const fn with_fee_currency(mut self, fee_currency: Address) -> Self {
        self.fee_currency = Some(fee_currency);
        self
    }

    /// Sets the gateway fee and its recipient.
    pub const fn with_gateway_fee(mut self, recipient: Address, fee: U256) -> Self {
        self.gateway_fee_recipient = Some(recipient);
        self.gateway_fee = Some(fee);
        self
    }

    /// Sets the total fee cap in the fee currency.
    pub const fn with_max_fee_in_fee_currency(mut self, max_fee: U256) -> Self {
        self.max_fee_in_fee_currency = Some(max_fee);
        self
    }
}

impl AsRef<TransactionRequest> for CeloTransactionRequest {
    fn as_ref(&self) -> &TransactionRequest {
        &self.inner
    }
}

impl AsMut<TransactionRequest> for CeloTransactionRequest {
    fn as_mut(&mut self) -> &mut TransactionRequest {
        &mut self.inner
    }
}

impl From<TransactionRequest> for CeloTransactionRequest {
    fn from(value: TransactionRequest) -> Self {
        Self {
            inner: value,
            fee_currency: None,
            gateway_fee_recipient: None,
            gateway_fee: None,
            max_fee_in_fee_currency: None,
        }
    }
}

impl From<CeloTransactionRequest> for TransactionRequest {
    fn from(value: CeloTransactionRequest) -> Self {
        value.inner
    }
}
