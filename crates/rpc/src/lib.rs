//! Celo RPC request handling and fee currency fee estimation.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod config;
pub mod error;
pub mod eth;
pub mod types;

pub use config::FeeOracleConfig;
pub use error::{FeeEstimationError, RequestError};
pub use eth::{
    FeeCurrencyOracle, FeesPerGas, RpcFeeCurrencyOracle, classify, estimate_fees_per_gas,
    serialize_request, try_build_celo_tx_from_request,
};
pub use types::*;
