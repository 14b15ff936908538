//! Gas fee estimation denominated in a fee currency.
//!
//! A Celo node prices gas in any whitelisted fee currency when `eth_gasPrice`
//! and `eth_maxPriorityFeePerGas` are called with the currency address as the
//! only parameter.

use crate::{CeloTransactionRequest, error::FeeEstimationError};
use alloy_primitives::{Address, U256};
use celo_primitives::is_present;
use core::{future::Future, str::FromStr};
use jsonrpsee::{core::client::ClientT, rpc_params};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// A price oracle method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PriceQuery {
    /// `eth_gasPrice`
    GasPrice,
    /// `eth_maxPriorityFeePerGas`
    MaxPriorityFeePerGas,
}

impl PriceQuery {
    /// Returns the JSON-RPC method name.
    pub const fn method(self) -> &'static str {
        match self {
            Self::GasPrice => "eth_gasPrice",
            Self::MaxPriorityFeePerGas => "eth_maxPriorityFeePerGas",
        }
    }
}

/// EIP-1559 fees denominated in a fee currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesPerGas {
    /// The fee cap, taken from `eth_gasPrice`.
    pub max_fee_per_gas: U256,
    /// The tip, taken from `eth_maxPriorityFeePerGas`.
    pub max_priority_fee_per_gas: U256,
}

/// A source of gas prices denominated in a fee currency.
pub trait FeeCurrencyOracle: Send + Sync {
    /// Calls `query` with `[fee_currency]` and returns the raw quantity string.
    fn query(
        &self,
        query: PriceQuery,
        fee_currency: Address,
    ) -> impl Future<Output = Result<String, FeeEstimationError>> + Send;
}

/// [`FeeCurrencyOracle`] backed by a JSON-RPC client.
#[derive(Debug, Clone)]
pub struct RpcFeeCurrencyOracle<C> {
    client: C,
}

impl<C> RpcFeeCurrencyOracle<C> {
    /// Creates a new oracle.
    pub const fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C> FeeCurrencyOracle for RpcFeeCurrencyOracle<C>
where
    C: ClientT + Send + Sync,
{
    async fn query(
        &self,
        query: PriceQuery,
        fee_currency: Address,
    ) -> Result<String, FeeEstimationError> {
        trace!(
            target: "celo_rpc::fees",
            method = query.method(),
            %fee_currency,
            "querying price oracle"
        );
        Ok(self.client.request::<String, _>(query.method(), rpc_params![fee_currency]).await?)
    }
}

/// Estimates EIP-1559 fees in the request's fee currency.
///
/// Returns `Ok(None)` without querying the oracle when the request has no fee
/// currency; the caller falls back to its default estimator. Otherwise both
/// prices are queried concurrently and returned as reported, the first
/// failure aborting the other query.
pub async fn estimate_fees_per_gas<O: FeeCurrencyOracle>(
    oracle: &O,
    request: &CeloTransactionRequest,
) -> Result<Option<FeesPerGas>, FeeEstimationError> {
    let Some(fee_currency) = request.fee_currency.filter(|currency| is_present(currency)) else {
        trace!(target: "celo_rpc::fees", "no fee currency, using default estimation");
        return Ok(None);
    };

    let (max_fee_per_gas, max_priority_fee_per_gas) = tokio::try_join!(
        price(oracle, PriceQuery::GasPrice, fee_currency),
        price(oracle, PriceQuery::MaxPriorityFeePerGas, fee_currency),
    )?;

    debug!(
        target: "celo_rpc::fees",
        %fee_currency,
        %max_fee_per_gas,
        %max_priority_fee_per_gas,
        "estimated fees in fee currency"
    );
    Ok(Some(FeesPerGas { max_fee_per_gas, max_priority_fee_per_gas }))
}

async fn price<O: FeeCurrencyOracle>(
    oracle: &O,
    query: PriceQuery,
    fee_currency: Address,
) -> Result<U256, FeeEstimationError> {
    let value = oracle.query(query, fee_currency).await?;
    parse_quantity(query.method(), &value)
}

/// Parses a `0x` prefixed hex quantity. Decimal strings are accepted too.
fn parse_quantity(method: &'static str, value: &str) -> Result<U256, FeeEstimationError> {
    U256::from_str(value.trim())
        .map_err(|_| FeeEstimationError::InvalidQuantity { method, value: value.to_string() })
}
