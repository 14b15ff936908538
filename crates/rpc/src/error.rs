//! Error types for Celo RPC

use celo_primitives::{CeloTxError, CeloTxType};
use jsonrpsee::core::ClientError;
use thiserror::Error;

/// Errors raised while turning a [`CeloTransactionRequest`](crate::CeloTransactionRequest)
/// into a transaction.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Both a legacy gas price and EIP-1559 fees were set.
    #[error("cannot specify both gasPrice and maxFeePerGas/maxPriorityFeePerGas")]
    FeeConflict,

    /// A Celo transaction needs a chain id.
    #[error("missing chainId for {0} transaction")]
    MissingChainId(CeloTxType),

    /// The request carries a field that belongs to another transaction type.
    #[error("{field} is not supported by {ty} transactions")]
    ExclusiveField {
        /// The selected transaction type.
        ty: CeloTxType,
        /// The offending field.
        field: &'static str,
    },

    /// The base Ethereum builder rejected the request.
    #[error("invalid ethereum transaction request: {0}")]
    InvalidBaseRequest(String),

    /// The transaction failed structural validation.
    #[error(transparent)]
    Transaction(#[from] CeloTxError),
}

/// Errors raised while estimating fees in a fee currency.
#[derive(Debug, Error)]
pub enum FeeEstimationError {
    /// The price oracle request failed.
    #[error(transparent)]
    Transport(#[from] ClientError),

    /// The oracle returned something other than an unsigned integer.
    #[error("invalid quantity returned by {method}: {value:?}")]
    InvalidQuantity {
        /// The RPC method.
        method: &'static str,
        /// The raw response.
        value: String,
    },
}

/// Converts [`RequestError`] to a JSON-RPC error object.
impl From<RequestError> for jsonrpsee::types::ErrorObject<'static> {
    fn from(err: RequestError) -> Self {
        jsonrpsee::types::ErrorObject::owned(
            jsonrpsee::types::error::INVALID_PARAMS_CODE,
            err.to_string(),
            None::<()>,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_messages() {
        let err = RequestError::ExclusiveField { ty: CeloTxType::Cip64, field: "gatewayFee" };
        assert_eq!(err.to_string(), "gatewayFee is not supported by cip64 transactions");
        assert_eq!(
            RequestError::MissingChainId(CeloTxType::Cip66).to_string(),
            "missing chainId for cip66 transaction"
        );
    }

    #[test]
    fn test_request_error_to_rpc_error() {
        let err: jsonrpsee::types::ErrorObject<'static> = RequestError::FeeConflict.into();
        assert_eq!(err.code(), jsonrpsee::types::error::INVALID_PARAMS_CODE);
        assert!(err.message().contains("gasPrice"));
    }
}
