//! Transfer Bot
//!
//! Issues a stream of small value transfers from a pool of wallets to
//! freshly generated addresses on an EVM ledger:
//! - Wallets take turns, one transfer in flight at a time
//! - Amounts, gas prices and recipients are randomized within bounds
//! - Remote calls are retried with a fixed delay
//!
//! # Security Model
//!
//! - Private keys never leave the `wallet` module
//! - Keys are held as secrets from the moment they are read
//! - Nothing logs or serializes key material

pub mod config;
pub mod issuer;
pub mod ledger;
pub mod params;
pub mod prompt;
pub mod report;
pub mod retry;
pub mod units;
pub mod wallet;

mod error;
#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{Config, RpcConfig, RunPlan};
pub use error::{Error, Result};
pub use issuer::{IssuerSettings, RunSummary, TransactionIssuer, WalletCounters};
pub use ledger::{LedgerClient, RpcLedger};
pub use params::ParameterGenerator;
pub use retry::RetryPolicy;
pub use wallet::{SigningIdentity, WalletManager};
