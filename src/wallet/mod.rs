//! Wallet management
//!
//! Turns configured private keys into signing identities and keeps their
//! nonces in step with the network. The network is the source of truth:
//! the pending nonce is re-read before every transfer and nothing is
//! tracked locally.

mod signer;

pub use signer::{SignedTransfer, SigningIdentity, TransferIntent};

use crate::ledger::LedgerClient;
use crate::retry::RetryPolicy;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashSet;
use std::sync::Arc;

/// Builds identities and refreshes their network state
pub struct WalletManager<L> {
    ledger: Arc<L>,
    retry: RetryPolicy,
    chain_id: u64,
    gas_limit: u64,
}

impl<L: LedgerClient> WalletManager<L> {
    pub fn new(ledger: Arc<L>, retry: RetryPolicy, chain_id: u64, gas_limit: u64) -> Self {
        Self {
            ledger,
            retry,
            chain_id,
            gas_limit,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Create an identity and snapshot its pending nonce and gas price.
    ///
    /// A malformed key, or a node that never answers the gas price query,
    /// is a configuration error.
    pub async fn create_identity(&self, private_key: &SecretString) -> Result<SigningIdentity> {
        let mut identity =
            SigningIdentity::from_hex(private_key.expose_secret(), self.chain_id, self.gas_limit)
                .map_err(|e| Error::Config(format!("Failed to load private key: {}", e)))?;

        let address = identity.address();
        identity.current_nonce = self
            .retry
            .read_or("nonce", 0, || self.ledger.get_pending_nonce(address))
            .await;

        identity.last_known_gas_price = self
            .retry
            .run("gas_price", || self.ledger.suggest_gas_price())
            .await
            .map_err(|e| Error::Config(format!("Failed to suggest gas price: {}", e)))?;

        tracing::debug!(
            address = %address,
            nonce = identity.current_nonce,
            gas_price = identity.last_known_gas_price,
            "Loaded signing identity"
        );

        Ok(identity)
    }

    /// Create one identity per key, rejecting duplicates
    pub async fn create_identities(&self, keys: &[SecretString]) -> Result<Vec<SigningIdentity>> {
        let mut identities = Vec::with_capacity(keys.len());
        let mut seen = HashSet::new();

        for (index, key) in keys.iter().enumerate() {
            let identity = self.create_identity(key).await?;
            if !seen.insert(identity.address()) {
                return Err(Error::Config(format!(
                    "Duplicate private key at position {} ({})",
                    index,
                    identity.address()
                )));
            }
            identities.push(identity);
        }

        Ok(identities)
    }

    /// Re-read the pending nonce from the network.
    ///
    /// Falls back to 0 when every attempt fails, in which case the next
    /// broadcast will most likely be rejected.
    pub async fn refresh_nonce(&self, identity: &mut SigningIdentity) -> u64 {
        let address = identity.address();
        let nonce = self
            .retry
            .read_or("nonce", 0, || self.ledger.get_pending_nonce(address))
            .await;

        identity.current_nonce = nonce;
        nonce
    }
}
