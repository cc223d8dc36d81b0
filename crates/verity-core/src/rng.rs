//! Seeded random streams for the stochastic evaluator modes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Random stream derived from a seed stored in the snapshot, so a stochastic
/// evaluation stays a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Stream number `substream` of `master_seed`.
    pub fn substream(master_seed: u64, substream: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(derive_substream_seed(master_seed, substream)),
        }
    }

    /// Bernoulli draw that succeeds with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }
}

/// SipHash-1-3 (zero keys) of `(master_seed, substream)`.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
