//! Signing identities and transfer signing
//!
//! SECURITY: this is the only place private keys exist after loading.
//! - Keys are held in alloy's PrivateKeySigner
//! - Keys are never serialized
//! - Keys are never logged; Debug output is redacted

use crate::{Error, Result};
use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind, B256, U256};
use alloy::signers::local::PrivateKeySigner;

/// A private key bound to a chain and its current sequencing state
pub struct SigningIdentity {
    /// The signer
    signer: PrivateKeySigner,
    /// Public address (safe to expose)
    address: Address,
    /// Chain id for EIP-155 replay protection
    chain_id: u64,
    /// Pending nonce as last reported by the network
    pub(crate) current_nonce: u64,
    /// Gas price suggested by the node at startup (wei)
    pub(crate) last_known_gas_price: u128,
    /// Gas limit for every transfer from this identity
    gas_limit: u64,
    /// Template value; each transfer carries its own amount
    transfer_value: U256,
}

impl SigningIdentity {
    /// Create an identity from a hex-encoded private key
    pub fn from_hex(key_hex: &str, chain_id: u64, gas_limit: u64) -> Result<Self> {
        // Remove 0x prefix if present
        let key_hex = key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Wallet(format!("Invalid private key: {}", e)))?;

        let address = signer.address();

        Ok(Self {
            signer,
            address,
            chain_id,
            current_nonce: 0,
            last_known_gas_price: 0,
            gas_limit,
            transfer_value: U256::ZERO,
        })
    }

    /// Get the public address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get the address as a checksummed string
    pub fn address_string(&self) -> String {
        self.address.to_checksum(None)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn current_nonce(&self) -> u64 {
        self.current_nonce
    }

    pub fn last_known_gas_price(&self) -> u128 {
        self.last_known_gas_price
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn transfer_value(&self) -> U256 {
        self.transfer_value
    }

    /// Describe a transfer from this identity at its current nonce
    pub fn transfer_intent(
        &self,
        recipient: Address,
        amount: U256,
        gas_price: u128,
    ) -> TransferIntent<'_> {
        TransferIntent {
            sender: self,
            recipient,
            amount,
            gas_price,
            gas_limit: self.gas_limit,
            nonce: self.current_nonce,
        }
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("current_nonce", &self.current_nonce)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}

/// An unsigned value transfer
#[derive(Debug, Clone)]
pub struct TransferIntent<'a> {
    pub sender: &'a SigningIdentity,
    pub recipient: Address,
    /// Amount in wei
    pub amount: U256,
    /// Gas price in wei
    pub gas_price: u128,
    pub gas_limit: u64,
    pub nonce: u64,
}

impl TransferIntent<'_> {
    /// Sign as a legacy EIP-155 transaction
    pub fn sign(&self) -> Result<SignedTransfer> {
        let mut tx = TxLegacy {
            chain_id: Some(self.sender.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.recipient),
            value: self.amount,
            input: Bytes::new(),
        };

        let signature = self
            .sender
            .signer
            .sign_transaction_sync(&mut tx)
            .map_err(|e| Error::Signing(e.to_string()))?;

        let envelope: TxEnvelope = tx.into_signed(signature).into();

        Ok(SignedTransfer {
            raw: Bytes::from(envelope.encoded_2718()),
            hash: *envelope.tx_hash(),
            nonce: self.nonce,
        })
    }
}

/// A signed transaction ready for broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    raw: Bytes,
    hash: B256,
    nonce: u64,
}

impl SignedTransfer {
    /// EIP-2718 encoded bytes
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Nonce this transaction consumes
    pub fn nonce(&self) -> u64 {
        self.nonce
    }
}
