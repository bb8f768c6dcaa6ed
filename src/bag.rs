//! Shuffle-bag dispenser for tile values 1..=9.

use clap::ValueEnum;
use rand::Rng;
use rand::seq::SliceRandom;

/// Complete 1..=9 cycles per uniform refill (162 values, one board's worth
/// with headroom so we aren't reshuffling every few draws).
const UNIFORM_CYCLES: usize = 18;

/// Weighted replication per value: `(11 - v) * 3`. Small values are common,
/// so isolated 8s and 9s are less likely to be left without a partner.
fn weighted_count(value: u8) -> usize {
    (11 - value as usize) * 3
}

/// Refill policy. Uniform deals every value equally often; Weighted skews
/// toward small values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BagPolicy {
    Uniform,
    #[default]
    Weighted,
}

/// Fairness-controlled dispenser. Values are inserted in bulk, shuffled with
/// a uniform Fisher–Yates permutation, then drained one at a time; between
/// refills nothing is ever dispensed more often than it was inserted.
#[derive(Debug, Clone)]
pub struct Bag<R: Rng> {
    policy: BagPolicy,
    pending: Vec<u8>,
    rng: R,
}

impl Bag<rand::rngs::ThreadRng> {
    pub fn new(policy: BagPolicy) -> Self {
        Self::with_rng(policy, rand::rng())
    }
}

impl<R: Rng> Bag<R> {
    pub fn with_rng(policy: BagPolicy, rng: R) -> Self {
        Self {
            policy,
            pending: Vec::new(),
            rng,
        }
    }

    /// Next tile value in 1..=9.
    pub fn next(&mut self) -> u8 {
        loop {
            if let Some(v) = self.pending.pop() {
                return v;
            }
            self.refill();
        }
    }

    /// Deal `n` values at once (initial board, bulk refill).
    pub fn deal(&mut self, n: usize) -> Vec<u8> {
        (0..n).map(|_| self.next()).collect()
    }

    fn refill(&mut self) {
        match self.policy {
            BagPolicy::Uniform => {
                for _ in 0..UNIFORM_CYCLES {
                    self.pending.extend(1..=9u8);
                }
            }
            BagPolicy::Weighted => {
                for v in 1..=9u8 {
                    for _ in 0..weighted_count(v) {
                        self.pending.push(v);
                    }
                }
            }
        }
        self.pending.shuffle(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn counts(values: &[u8]) -> [usize; 10] {
        let mut out = [0usize; 10];
        for &v in values {
            out[v as usize] += 1;
        }
        out
    }

    #[test]
    fn test_uniform_refill_exact_counts() {
        let mut bag = Bag::with_rng(BagPolicy::Uniform, StdRng::seed_from_u64(7));
        let drawn = bag.deal(9 * UNIFORM_CYCLES);
        let c = counts(&drawn);
        for v in 1..=9 {
            assert_eq!(c[v], UNIFORM_CYCLES, "value {v} over- or under-dispensed");
        }
    }

    #[test]
    fn test_weighted_refill_exact_counts_over_cycles() {
        let mut bag = Bag::with_rng(BagPolicy::Weighted, StdRng::seed_from_u64(11));
        let per_refill: usize = (1..=9u8).map(weighted_count).sum();
        let drawn = bag.deal(per_refill * 10);
        let c = counts(&drawn);
        for v in 1..=9u8 {
            assert_eq!(c[v as usize], weighted_count(v) * 10);
        }
    }

    #[test]
    fn test_values_in_range() {
        let mut bag = Bag::with_rng(BagPolicy::Weighted, StdRng::seed_from_u64(3));
        for _ in 0..500 {
            let v = bag.next();
            assert!((1..=9).contains(&v));
        }
    }

    #[test]
    fn test_shuffle_first_draw_roughly_uniform() {
        // Uniform policy: each value holds 1/9 of a refill, so the first
        // draw after a refill should land on each value ~1/9 of the time.
        let mut hits = [0usize; 10];
        let trials = 2000;
        for seed in 0..trials {
            let mut bag = Bag::with_rng(BagPolicy::Uniform, StdRng::seed_from_u64(seed));
            hits[bag.next() as usize] += 1;
        }
        let expected = trials as usize / 9;
        for v in 1..=9 {
            let delta = hits[v].abs_diff(expected);
            assert!(delta < 70, "value {v}: {} draws vs ~{expected}", hits[v]);
        }
    }
}
