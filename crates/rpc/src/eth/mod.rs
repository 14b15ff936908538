//! Celo `eth_` request handling: classification, serialization and fee estimation.

pub mod fees;
pub mod transaction;

pub use fees::{
    FeeCurrencyOracle, FeesPerGas, PriceQuery, RpcFeeCurrencyOracle, estimate_fees_per_gas,
};
pub use transaction::{
    assert_request, classify, is_cip42, is_cip64, is_fee_market, serialize_request,
    try_build_celo_tx_from_request,
};
