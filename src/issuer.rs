//! Transaction issuance loop
//!
//! One slot at a time, strictly sequential. Each slot picks its wallet,
//! checks the balance, draws parameters, refreshes the nonce, signs,
//! broadcasts and records the result, then waits out the interval.
//! Failures along the way skip the slot instead of aborting the run.
//!
//! Slot `i` always belongs to wallet `i % wallet_count`. Only cancellation
//! ends a run early, and it is checked again before anything is signed.

use crate::config::{Config, RunPlan};
use crate::ledger::LedgerClient;
use crate::params::ParameterGenerator;
use crate::report::{SkipReason, SlotOutcome, TransferReport};
use crate::retry::RetryPolicy;
use crate::wallet::{SigningIdentity, WalletManager};
use crate::Result;
use alloy::primitives::U256;
use rand::Rng;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Bounds the issuer draws transfer parameters from
#[derive(Debug, Clone)]
pub struct IssuerSettings {
    pub min_amount: f64,
    pub max_amount: f64,
    pub min_gas_price: u128,
    pub max_gas_price: u128,
    /// Wallets below this balance (wei) are skipped
    pub min_balance: U256,
    pub wait_after_skip: bool,
}

impl IssuerSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            min_amount: config.transfer.min_amount,
            max_amount: config.transfer.max_amount,
            min_gas_price: config.transfer.min_gas_price.into(),
            max_gas_price: config.transfer.max_gas_price.into(),
            min_balance: config.min_balance_wei()?,
            wait_after_skip: config.wait_after_skip,
        })
    }
}

/// Successful transfers per wallet index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletCounters {
    counts: Vec<u64>,
}

impl WalletCounters {
    pub fn new(wallet_count: usize) -> Self {
        Self {
            counts: vec![0; wallet_count],
        }
    }

    /// Count one more success and return the new total for the wallet
    pub fn increment(&mut self, wallet_index: usize) -> u64 {
        if wallet_index >= self.counts.len() {
            self.counts.resize(wallet_index + 1, 0);
        }
        self.counts[wallet_index] += 1;
        self.counts[wallet_index]
    }

    pub fn get(&self, wallet_index: usize) -> u64 {
        self.counts.get(wallet_index).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// What a run did
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Slots that started, whatever their outcome
    pub attempted: u64,
    pub outcomes: Vec<SlotOutcome>,
    pub counters: WalletCounters,
    /// Stopped before the last slot
    pub cancelled: bool,
}

impl RunSummary {
    pub fn sent(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_sent()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.sent()
    }
}

/// Wallet index that owns `slot`
pub fn slot_wallet(slot: u64, wallet_count: usize) -> usize {
    (slot % wallet_count as u64) as usize
}

/// Drives transfers across a pool of signing identities
pub struct TransactionIssuer<L, R> {
    ledger: Arc<L>,
    wallets: WalletManager<L>,
    identities: Vec<SigningIdentity>,
    params: ParameterGenerator<R>,
    retry: RetryPolicy,
    settings: IssuerSettings,
    cancel: CancellationToken,
}

impl<L: LedgerClient, R: Rng> TransactionIssuer<L, R> {
    pub fn new(
        ledger: Arc<L>,
        wallets: WalletManager<L>,
        identities: Vec<SigningIdentity>,
        params: ParameterGenerator<R>,
        retry: RetryPolicy,
        settings: IssuerSettings,
    ) -> Self {
        Self {
            ledger,
            wallets,
            identities,
            params,
            retry,
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop between slots, during waits and before signing once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn identities(&self) -> &[SigningIdentity] {
        &self.identities
    }

    /// Run every slot of `plan` and report each outcome on stdout
    pub async fn run(&mut self, plan: &RunPlan) -> RunSummary {
        let wallet_count = self.identities.len();
        let total_slots = plan.total_slots(wallet_count);
        let mut summary = RunSummary {
            counters: WalletCounters::new(wallet_count),
            ..Default::default()
        };

        tracing::info!(
            wallets = wallet_count,
            transactions_per_wallet = plan.transactions_per_wallet,
            total_slots,
            wait_secs = plan.wait.as_secs(),
            "Starting transfer run"
        );

        for slot in 0..total_slots {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let wallet_index = slot_wallet(slot, wallet_count);
            let outcome = self
                .run_slot(wallet_index, &mut summary.counters)
                .await;
            summary.attempted += 1;

            if outcome.is_cancelled() {
                summary.outcomes.push(outcome);
                summary.cancelled = true;
                break;
            }

            println!("{}", outcome);
            let sent = outcome.is_sent();
            summary.outcomes.push(outcome);

            if sent || self.settings.wait_after_skip {
                let cancelled = tokio::select! {
                    _ = self.cancel.cancelled() => true,
                    _ = tokio::time::sleep(plan.wait) => false,
                };
                if cancelled {
                    summary.cancelled = slot + 1 < total_slots;
                    break;
                }
            }
        }

        tracing::info!(
            attempted = summary.attempted,
            sent = summary.sent(),
            skipped = summary.skipped(),
            cancelled = summary.cancelled,
            "Transfer run finished"
        );

        summary
    }

    async fn run_slot(&mut self, wallet_index: usize, counters: &mut WalletCounters) -> SlotOutcome {
        let identity = &mut self.identities[wallet_index];
        let sender = identity.address();
        let skip = |reason: SkipReason| {
            tracing::debug!(wallet_index, sender = %sender, reason = %reason, "Slot skipped");
            SlotOutcome::Skipped {
                wallet_index,
                sender,
                reason,
            }
        };

        let ledger = &self.ledger;
        let balance = self
            .retry
            .read_or("balance", U256::ZERO, || ledger.get_balance(sender))
            .await;
        if self.cancel.is_cancelled() {
            return skip(SkipReason::Cancelled);
        }
        if balance < self.settings.min_balance {
            return skip(SkipReason::InsufficientBalance(balance));
        }

        // Fresh recipient, amount and gas price for every transfer
        let recipient = self.params.random_recipient_address();
        let amount = match self
            .params
            .random_amount(self.settings.min_amount, self.settings.max_amount)
        {
            Ok(amount) => amount,
            Err(e) => return skip(SkipReason::InvalidParameters(e.to_string())),
        };
        let gas_price = match self
            .params
            .random_gas_price(self.settings.min_gas_price, self.settings.max_gas_price)
        {
            Ok(price) => price,
            Err(e) => return skip(SkipReason::InvalidParameters(e.to_string())),
        };
        self.wallets.refresh_nonce(identity).await;

        // An interrupted nonce read leaves a fallback value; never sign with it
        if self.cancel.is_cancelled() {
            return skip(SkipReason::Cancelled);
        }

        let signed = match identity.transfer_intent(recipient, amount, gas_price).sign() {
            Ok(signed) => signed,
            Err(e) => return skip(SkipReason::Signing(e.to_string())),
        };

        let tx_hash = match self
            .retry
            .run("broadcast", || ledger.broadcast(signed.raw().clone()))
            .await
        {
            Ok(hash) => hash,
            Err(e) => return skip(SkipReason::Broadcast(e.to_string())),
        };

        let wallet_count = counters.increment(wallet_index);
        tracing::debug!(
            wallet_index,
            sender = %sender,
            recipient = %recipient,
            nonce = signed.nonce(),
            gas_price,
            tx_hash = %tx_hash,
            "Transfer broadcast"
        );

        SlotOutcome::Sent(TransferReport {
            wallet_index,
            sender,
            recipient,
            amount,
            tx_hash,
            wallet_count,
        })
    }
}
