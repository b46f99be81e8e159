//! Remote ledger access
//!
//! `LedgerClient` is the seam between the issuance engine and the chain.
//! Every method may fail transiently; callers wrap them in a `RetryPolicy`.

use crate::retry::RetryPolicy;
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;

/// Operations the issuer needs from a ledger node
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Chain id reported by the node
    async fn chain_id(&self) -> Result<u64>;

    /// Native balance in wei at the latest block
    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Nonce including transactions still in the mempool
    async fn get_pending_nonce(&self, address: Address) -> Result<u64>;

    /// Node's suggested legacy gas price in wei
    async fn suggest_gas_price(&self) -> Result<u128>;

    /// Submit a signed, EIP-2718 encoded transaction and return its hash
    async fn broadcast(&self, raw: Bytes) -> Result<B256>;
}

/// JSON-RPC ledger client over HTTP
#[derive(Debug)]
pub struct RpcLedger {
    provider: DynProvider,
    url: url::Url,
}

impl RpcLedger {
    /// Build a client for the given endpoint.
    ///
    /// No request is made here; use `chain_id` to probe connectivity.
    pub fn connect(rpc_url: &str) -> Result<Self> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;

        let provider = ProviderBuilder::new().connect_http(url.clone()).erased();

        Ok(Self { provider, url })
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get chain id: {}", e)))
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get balance: {}", e)))
    }

    async fn get_pending_nonce(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get nonce: {}", e)))
    }

    async fn suggest_gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| Error::Rpc(format!("Failed to suggest gas price: {}", e)))
    }

    async fn broadcast(&self, raw: Bytes) -> Result<B256> {
        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| Error::Rpc(format!("Failed to send transaction: {}", e)))?;

        Ok(*pending.tx_hash())
    }
}

/// Check the endpoint answers and serves the expected chain.
///
/// Runs once at startup; both failure modes are configuration errors.
pub async fn verify_chain_id<L: LedgerClient + ?Sized>(
    ledger: &L,
    retry: &RetryPolicy,
    expected: u64,
) -> Result<()> {
    let actual = retry
        .run("chain_id", || ledger.chain_id())
        .await
        .map_err(|e| Error::Config(format!("RPC endpoint unreachable: {}", e)))?;

    if actual != expected {
        return Err(Error::Config(format!(
            "RPC endpoint serves chain {}, expected {}",
            actual, expected
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockLedger, Op};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_verify_chain_id() {
        let ledger = MockLedger::new();
        let retry = RetryPolicy::new(2, Duration::from_secs(1));

        tokio_test::assert_ok!(verify_chain_id(&ledger, &retry, 88817).await);

        ledger.set_chain_id(1);
        let err = verify_chain_id(&ledger, &retry, 88817).await.unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("chain 1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_verify_chain_id_unreachable() {
        let ledger = MockLedger::new();
        ledger.fail_next(Op::ChainId, u32::MAX);
        let retry = RetryPolicy::new(2, Duration::from_secs(1));

        let err = verify_chain_id(&ledger, &retry, 88817).await.unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(ledger.calls(Op::ChainId), 2);
    }

    #[test]
    fn test_connect_accepts_http_url() {
        let ledger = RpcLedger::connect("https://rpc-testnet.unit0.dev").unwrap();
        assert_eq!(ledger.url().host_str(), Some("rpc-testnet.unit0.dev"));
    }

    #[test]
    fn test_connect_rejects_garbage() {
        let err = RpcLedger::connect("not a url").unwrap_err();
        assert!(err.is_configuration());
    }
}
