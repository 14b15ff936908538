//! Celo transaction classification and construction from RPC requests.

use crate::{CeloTransactionRequest, error::RequestError};
use alloy_consensus::{SignableTransaction, TxEnvelope};
use alloy_eips::{Typed2718, eip2718::Encodable2718};
use alloy_primitives::{Bytes, Signature, TxKind, U256};
use celo_primitives::{
    CeloTxError, CeloTxType, CeloTypedTransaction, TxCip42, TxCip64, TxCip66, is_empty, is_present,
    present,
};
use tracing::debug;

/// Returns `true` if both EIP-1559 fee fields are present.
pub fn is_fee_market(request: &CeloTransactionRequest) -> bool {
    is_present(&request.max_fee_per_gas) && is_present(&request.max_priority_fee_per_gas)
}

/// Returns `true` if the request is tagged CIP-42, or is a fee market request
/// carrying any of `feeCurrency`, `gatewayFeeRecipient` or `gatewayFee`.
pub fn is_cip42(request: &CeloTransactionRequest) -> bool {
    if explicit_type(request) == Some(CeloTxType::Cip42) {
        return true;
    }
    is_fee_market(request)
        && (is_present(&request.fee_currency)
            || is_present(&request.gateway_fee_recipient)
            || is_present(&request.gateway_fee))
}

/// Returns `true` if the request is tagged CIP-64, or is a fee market request
/// with a fee currency and no gateway fee fields.
pub fn is_cip64(request: &CeloTransactionRequest) -> bool {
    if explicit_type(request) == Some(CeloTxType::Cip64) {
        return true;
    }
    is_fee_market(request)
        && is_present(&request.fee_currency)
        && is_empty(&request.gateway_fee)
        && is_empty(&request.gateway_fee_recipient)
}

/// Selects the Celo transaction type for a request, or `None` for an Ethereum
/// transaction.
///
/// An explicit `type` wins. Otherwise the first matching heuristic applies:
/// [`is_cip42`] then [`is_cip64`]. Every fee market request with a fee
/// currency matches [`is_cip42`], so CIP-64 and CIP-66 are only selected
/// through the explicit tag.
pub fn classify(request: &CeloTransactionRequest) -> Option<CeloTxType> {
    if let Some(ty) = explicit_type(request) {
        return Some(ty);
    }
    if is_cip42(request) {
        Some(CeloTxType::Cip42)
    } else if is_cip64(request) {
        Some(CeloTxType::Cip64)
    } else {
        None
    }
}

fn explicit_type(request: &CeloTransactionRequest) -> Option<CeloTxType> {
    request.transaction_type.and_then(|ty| CeloTxType::try_from(ty).ok())
}

/// Checks the fee fields of a request.
///
/// A legacy `gasPrice` cannot be combined with EIP-1559 fees, and the tip
/// cannot exceed the fee cap.
pub fn assert_request(request: &CeloTransactionRequest) -> Result<(), RequestError> {
    if request.gas_price.is_some()
        && (request.max_fee_per_gas.is_some() || request.max_priority_fee_per_gas.is_some())
    {
        return Err(RequestError::FeeConflict);
    }
    if let (Some(max_fee_per_gas), Some(max_priority_fee_per_gas)) =
        (request.max_fee_per_gas, request.max_priority_fee_per_gas)
        && max_priority_fee_per_gas > max_fee_per_gas
    {
        return Err(CeloTxError::TipAboveFeeCap {
            max_fee_per_gas: U256::from(max_fee_per_gas),
            max_priority_fee_per_gas: U256::from(max_priority_fee_per_gas),
        }
        .into());
    }
    Ok(())
}

/// Attempts to build a Celo transaction from a request.
///
/// Returns `Ok(Some(tx))` if the request classifies as a Celo transaction,
/// `Ok(None)` if it should be an Ethereum transaction, or `Err(...)` if it
/// is invalid. The returned transaction has passed validation.
pub fn try_build_celo_tx_from_request(
    request: &CeloTransactionRequest,
) -> Result<Option<CeloTypedTransaction>, RequestError> {
    let Some(ty) = classify(request) else {
        return Ok(None);
    };
    assert_request(request)?;

    let exclusive = |field: &'static str| RequestError::ExclusiveField { ty, field };
    if request.gas_price.is_some() {
        return Err(exclusive("gasPrice"));
    }
    if ty != CeloTxType::Cip42 {
        if is_present(&request.gateway_fee_recipient) {
            return Err(exclusive("gatewayFeeRecipient"));
        }
        if is_present(&request.gateway_fee) {
            return Err(exclusive("gatewayFee"));
        }
    }
    if ty != CeloTxType::Cip66 && is_present(&request.max_fee_in_fee_currency) {
        return Err(exclusive("maxFeeInFeeCurrency"));
    }

    let chain_id = request.chain_id.ok_or(RequestError::MissingChainId(ty))?;
    let nonce = present(request.nonce);
    let max_fee_per_gas = present(request.max_fee_per_gas).map(U256::from);
    let max_priority_fee_per_gas = present(request.max_priority_fee_per_gas).map(U256::from);
    let gas_limit = present(request.gas);
    let to = request.to.unwrap_or(TxKind::Create);
    let value = present(request.value);
    let input = present(request.input.input().cloned());
    let access_list = present(request.access_list.clone());
    let fee_currency = present(request.fee_currency);

    let transaction: CeloTypedTransaction = match ty {
        CeloTxType::Cip42 => TxCip42 {
            chain_id,
            nonce,
            max_priority_fee_per_gas,
            max_fee_per_gas,
            gas_limit,
            fee_currency,
            gateway_fee_recipient: present(request.gateway_fee_recipient),
            gateway_fee: present(request.gateway_fee),
            to,
            value,
            input,
            access_list,
        }
        .into(),
        CeloTxType::Cip64 => TxCip64 {
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
        }
        .into(),
        CeloTxType::Cip66 => TxCip66 {
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
            max_fee_in_fee_currency: present(request.max_fee_in_fee_currency),
        }
        .into(),
    };
    transaction.validate()?;
    Ok(Some(transaction))
}

/// Serializes a request, signed when `signature` is given.
///
/// Celo requests use the Celo codec. Any other request is built into an
/// Ethereum transaction: unsigned output is its signing payload, signed output
/// its EIP-2718 envelope.
pub fn serialize_request(
    request: &CeloTransactionRequest,
    signature: Option<&Signature>,
) -> Result<Bytes, RequestError> {
    if let Some(transaction) = try_build_celo_tx_from_request(request)? {
        debug!(
            target: "celo_rpc::transaction",
            ty = %transaction.tx_type(),
            chain_id = transaction.chain_id(),
            fee_currency = ?transaction.fee_currency(),
            signed = signature.is_some(),
            "serializing celo transaction request"
        );
        return Ok(transaction.serialize(signature)?);
    }

    assert_request(request)?;
    let typed = request.inner.clone().build_typed_tx().map_err(|request| {
        RequestError::InvalidBaseRequest(format!(
            "missing fields for a {:?} transaction",
            request.preferred_type()
        ))
    })?;
    debug!(
        target: "celo_rpc::transaction",
        ty = typed.ty(),
        signed = signature.is_some(),
        "serializing ethereum transaction request"
    );
    Ok(match signature {
        Some(signature) => TxEnvelope::from(typed.into_signed(*signature)).encoded_2718().into(),
        None => typed.encoded_for_signing().into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_eips::eip2718::Decodable2718;
    use alloy_primitives::{Address, address, bytes};
    use alloy_rpc_types_eth::TransactionRequest;
    use celo_primitives::ParsedTransaction;

    const FEE_CURRENCY: Address = address!("0x765DE816845861e75A25fCA122bb6898B8B1282a");
    const RECIPIENT: Address = address!("0x0000000000000000000000000000000000000002");

    fn fee_market() -> CeloTransactionRequest {
        let mut request = TransactionRequest::default()
            .to(RECIPIENT)
            .nonce(1)
            .gas_limit(21_000)
            .max_fee_per_gas(2_000_000_000)
            .max_priority_fee_per_gas(1_000_000_000)
            .value(U256::from(1));
        request.chain_id = Some(42220);
        request.into()
    }

    fn tagged(ty: CeloTxType, request: CeloTransactionRequest) -> CeloTransactionRequest {
        let mut request = request;
        request.transaction_type = Some(ty.into());
        request
    }

    #[test]
    fn test_classify_plain_request() {
        assert_eq!(classify(&fee_market()), None);
        assert_eq!(classify(&CeloTransactionRequest::default()), None);
    }

    #[test]
    fn test_classify_fee_currency_prefers_cip42() {
        let request = fee_market().with_fee_currency(FEE_CURRENCY);
        assert!(is_cip64(&request));
        assert!(is_cip42(&request));
        assert_eq!(classify(&request), Some(CeloTxType::Cip42));
    }

    #[test]
    fn test_classify_requires_fee_market() {
        let mut request = fee_market().with_fee_currency(FEE_CURRENCY);
        request.max_priority_fee_per_gas = None;
        assert!(!is_fee_market(&request));
        assert_eq!(classify(&request), None);

        request.max_priority_fee_per_gas = Some(0);
        assert_eq!(classify(&request), None);
    }

    #[test]
    fn test_classify_gateway_fields() {
        let request = fee_market().with_gateway_fee(Address::with_last_byte(9), U256::from(1));
        assert!(!is_cip64(&request));
        assert_eq!(classify(&request), Some(CeloTxType::Cip42));

        let zero_fee = CeloTransactionRequest {
            gateway_fee: Some(U256::ZERO),
            fee_currency: Some(FEE_CURRENCY),
            ..fee_market()
        };
        assert!(is_cip64(&zero_fee));
    }

    #[test]
    fn test_explicit_tag_wins() {
        let request = tagged(CeloTxType::Cip66, fee_market());
        assert_eq!(classify(&request), Some(CeloTxType::Cip66));

        let request = tagged(CeloTxType::Cip64, CeloTransactionRequest::default());
        assert!(is_cip64(&request));
        assert_eq!(classify(&request), Some(CeloTxType::Cip64));

        let mut request = fee_market().with_fee_currency(FEE_CURRENCY);
        request.transaction_type = Some(2);
        assert_eq!(classify(&request), Some(CeloTxType::Cip42));
    }

    #[test]
    fn test_assert_request_fee_conflict() {
        let mut request = fee_market();
        request.gas_price = Some(1);
        assert!(matches!(assert_request(&request), Err(RequestError::FeeConflict)));

        let mut request = fee_market();
        request.max_priority_fee_per_gas = Some(2_000_000_001);
        assert!(matches!(
            assert_request(&request),
            Err(RequestError::Transaction(CeloTxError::TipAboveFeeCap { .. }))
        ));

        request.max_priority_fee_per_gas = Some(2_000_000_000);
        assert!(assert_request(&request).is_ok());
    }

    #[test]
    fn test_build_cip64() {
        let request = tagged(CeloTxType::Cip64, fee_market().with_fee_currency(FEE_CURRENCY));
        let Some(CeloTypedTransaction::Cip64(tx)) =
            try_build_celo_tx_from_request(&request).unwrap()
        else {
            panic!("expected a CIP-64 transaction");
        };
        assert_eq!(tx.chain_id, 42220);
        assert_eq!(tx.nonce, Some(1));
        assert_eq!(tx.gas_limit, Some(21_000));
        assert_eq!(tx.to, TxKind::Call(RECIPIENT));
        assert_eq!(tx.fee_currency, Some(FEE_CURRENCY));
        assert_eq!(tx.max_fee_per_gas, Some(U256::from(2_000_000_000u64)));
        assert_eq!(tx.input, None);
    }

    #[test]
    fn test_build_rejects_exclusive_fields() {
        let request = tagged(
            CeloTxType::Cip64,
            fee_market()
                .with_fee_currency(FEE_CURRENCY)
                .with_gateway_fee(Address::with_last_byte(9), U256::from(1)),
        );
        assert!(matches!(
            try_build_celo_tx_from_request(&request),
            Err(RequestError::ExclusiveField { ty: CeloTxType::Cip64, field: "gatewayFeeRecipient" })
        ));

        let request = fee_market()
            .with_fee_currency(FEE_CURRENCY)
            .with_max_fee_in_fee_currency(U256::from(5));
        assert!(matches!(
            try_build_celo_tx_from_request(&request),
            Err(RequestError::ExclusiveField { ty: CeloTxType::Cip42, field: "maxFeeInFeeCurrency" })
        ));
    }

    #[test]
    fn test_build_requires_chain_id() {
        let mut request = fee_market().with_fee_currency(FEE_CURRENCY);
        request.chain_id = None;
        assert!(matches!(
            try_build_celo_tx_from_request(&request),
            Err(RequestError::MissingChainId(CeloTxType::Cip42))
        ));
    }

    #[test]
    fn test_build_validates() {
        let request = tagged(CeloTxType::Cip66, fee_market().with_fee_currency(FEE_CURRENCY));
        assert!(matches!(
            try_build_celo_tx_from_request(&request),
            Err(RequestError::Transaction(CeloTxError::InvalidTransaction {
                ty: CeloTxType::Cip66,
                ..
            }))
        ));
    }

    #[test]
    fn test_serialize_celo_request_round_trip() {
        let request = tagged(
            CeloTxType::Cip66,
            fee_market()
                .with_fee_currency(FEE_CURRENCY)
                .with_max_fee_in_fee_currency(U256::from(100_000)),
        );
        let signature = Signature::new(U256::from(1), U256::from(2), true);
        let encoded = serialize_request(&request, Some(&signature)).unwrap();
        assert_eq!(encoded[0], 0x7a);

        let parsed = ParsedTransaction::parse(&encoded).unwrap();
        let parsed = parsed.as_celo().unwrap();
        assert_eq!(parsed.signature, Some(signature));
        assert_eq!(
            Some(parsed.transaction.clone()),
            try_build_celo_tx_from_request(&request).unwrap()
        );
    }

    #[test]
    fn test_serialize_ethereum_request() {
        let mut request = fee_market();
        request.inner.input = bytes!("01").into();
        let signature = Signature::new(U256::from(1), U256::from(2), false);

        let signed = serialize_request(&request, Some(&signature)).unwrap();
        assert_eq!(signed[0], 0x02);
        let envelope = TxEnvelope::decode_2718(&mut signed.as_ref()).unwrap();
        assert_eq!(envelope.signature(), &signature);
        assert!(matches!(ParsedTransaction::parse(&signed), Ok(ParsedTransaction::Ethereum(_))));

        let unsigned = serialize_request(&request, None).unwrap();
        assert_eq!(unsigned[0], 0x02);
        assert_ne!(unsigned, signed);
    }

    #[test]
    fn test_serialize_incomplete_ethereum_request() {
        let request = CeloTransactionRequest::default();
        assert!(matches!(
            serialize_request(&request, None),
            Err(RequestError::InvalidBaseRequest(_))
        ));
    }
}
