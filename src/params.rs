//! Randomized transfer parameters
//!
//! The generator owns its RNG instead of reaching for a process-wide one,
//! so a fixed seed reproduces the exact sequence of amounts, gas prices
//! and recipients.

use crate::units::to_smallest_unit;
use crate::{Error, Result};
use alloy::primitives::{Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of random transfer parameters
pub struct ParameterGenerator<R> {
    rng: R,
}

impl ParameterGenerator<StdRng> {
    /// Generator seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Generator with a fixed seed (reproducible runs and tests)
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ParameterGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Random ether amount in `[min, max)`, returned in wei.
    ///
    /// Conversion happens after the draw, so the result lands in
    /// `[to_smallest_unit(min), to_smallest_unit(max)]`.
    pub fn random_amount(&mut self, min: f64, max: f64) -> Result<U256> {
        if min > max {
            return Err(Error::InvalidArgument(format!(
                "amount bounds inverted: min {} > max {}",
                min, max
            )));
        }

        let unit: f64 = self.rng.gen();
        to_smallest_unit(min + unit * (max - min))
    }

    /// Random gas price in wei, both bounds inclusive
    pub fn random_gas_price(&mut self, min: u128, max: u128) -> Result<u128> {
        if min > max {
            return Err(Error::InvalidArgument(format!(
                "gas price bounds inverted: min {} > max {}",
                min, max
            )));
        }

        Ok(self.rng.gen_range(min..=max))
    }

    /// Address of a freshly generated key pair.
    ///
    /// The private key is dropped before returning; funds sent to the
    /// address cannot be recovered by this process.
    pub fn random_recipient_address(&mut self) -> Address {
        loop {
            let mut bytes = [0u8; 32];
            self.rng.fill(&mut bytes[..]);

            // Zero or out-of-range scalars are rejected by the curve; draw again
            if let Ok(signer) = PrivateKeySigner::from_bytes(&B256::from(bytes)) {
                return signer.address();
            }
        }
    }
}
