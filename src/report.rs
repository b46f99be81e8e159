//! Per-slot outcomes and their console lines

use crate::units::{shorten_address, to_display_unit};
use alloy::primitives::{Address, B256, U256};
use std::fmt;

/// A transfer that reached the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub wallet_index: usize,
    pub sender: Address,
    pub recipient: Address,
    /// Amount in wei
    pub amount: U256,
    pub tx_hash: B256,
    /// Successful transfers from this wallet so far, this one included
    pub wallet_count: u64,
}

impl fmt::Display for TransferReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "From: {}, To: {}, Amount: {} ETH, Tx: {}, Transactions: {}",
            shorten_address(&self.sender.to_checksum(None)),
            shorten_address(&self.recipient.to_checksum(None)),
            to_display_unit(self.amount),
            self.tx_hash,
            self.wallet_count
        )
    }
}

/// Why a slot did not produce a transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Balance (wei) under the reserve, or unreadable
    InsufficientBalance(U256),
    /// Parameter generation rejected the configured bounds
    InvalidParameters(String),
    Signing(String),
    Broadcast(String),
    /// The run was interrupted before the transfer was signed
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientBalance(balance) => write!(
                f,
                "insufficient balance ({} ETH)",
                to_display_unit(*balance)
            ),
            SkipReason::InvalidParameters(e) => write!(f, "invalid transfer parameters: {}", e),
            SkipReason::Signing(e) => write!(f, "transaction signing failed: {}", e),
            SkipReason::Broadcast(e) => write!(f, "failed to send transaction: {}", e),
            SkipReason::Cancelled => write!(f, "run interrupted"),
        }
    }
}

/// Result of one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome {
    Sent(TransferReport),
    Skipped {
        wallet_index: usize,
        sender: Address,
        reason: SkipReason,
    },
}

impl SlotOutcome {
    pub fn wallet_index(&self) -> usize {
        match self {
            SlotOutcome::Sent(report) => report.wallet_index,
            SlotOutcome::Skipped { wallet_index, .. } => *wallet_index,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, SlotOutcome::Sent(_))
    }

    /// Abandoned because the run was interrupted mid-slot
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            SlotOutcome::Skipped {
                reason: SkipReason::Cancelled,
                ..
            }
        )
    }
}

impl fmt::Display for SlotOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotOutcome::Sent(report) => report.fmt(f),
            SlotOutcome::Skipped { sender, reason, .. } => write!(
                f,
                "Wallet {}: {}, skipping to next transaction",
                shorten_address(&sender.to_checksum(None)),
                reason
            ),
        }
    }
}
