//! Deterministic random number generation.
//!
//! RULE: Nothing in the tick may call any platform RNG.
//! All randomness flows through the single TickRng derived from
//! (turn_seed XOR turn_index). Every stage draws from the same
//! stream, so draw ORDER is part of the observable contract:
//!   - Stages run in the fixed order documented in engine.rs.
//!   - Inside a stage, entities are visited in ascending id order.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::types::{TurnIndex, TurnSeed};

/// Number of uniforms summed by `normal_approx`. Twelve makes the
/// Irwin-Hall variance exactly 1 before scaling.
const NORMAL_APPROX_TERMS: u32 = 12;

/// The one RNG stream of a single tick.
pub struct TickRng {
    seed:  u32,
    draws: u64,
    inner: Pcg64Mcg,
}

impl TickRng {
    /// Seed a stream directly. Identical seeds yield identical streams.
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            draws: 0,
            inner: Pcg64Mcg::seed_from_u64(u64::from(seed)),
        }
    }

    /// Derive the stream for one tick from the game seed and turn index.
    pub fn for_turn(turn_seed: TurnSeed, turn_index: TurnIndex) -> Self {
        Self::new(tick_seed(turn_seed, turn_index))
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Uniform draws consumed so far. Recorded in audits for replay.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        self.draws += 1;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Sum-of-uniforms approximation of a normal draw.
    /// Matches mean and stdev; tails are bounded at ±6 stdev.
    pub fn normal_approx(&mut self, mean: f64, stdev: f64) -> f64 {
        let mut sum = 0.0;
        for _ in 0..NORMAL_APPROX_TERMS {
            sum += self.next_f64();
        }
        let standard = sum - f64::from(NORMAL_APPROX_TERMS) / 2.0;
        mean + standard * stdev
    }
}

/// Per-tick seed: the game seed XOR the low 32 bits of the turn index.
pub fn tick_seed(turn_seed: TurnSeed, turn_index: TurnIndex) -> u32 {
    turn_seed ^ (turn_index as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_seeds_give_identical_streams() {
        let mut a = TickRng::new(7);
        let mut b = TickRng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn uniform_draws_stay_in_unit_interval() {
        let mut rng = TickRng::new(12345);
        for _ in 0..10_000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x), "draw {x} outside [0,1)");
        }
    }

    #[test]
    fn normal_approx_matches_moments() {
        let mut rng = TickRng::new(99);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| rng.normal_approx(3.0, 2.0)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 3.0).abs() < 0.1, "mean {mean} too far from 3.0");
        assert!((var.sqrt() - 2.0).abs() < 0.1, "stdev {} too far from 2.0", var.sqrt());
    }

    #[test]
    fn tick_seed_xors_turn_index() {
        assert_eq!(tick_seed(0b1010, 0b0110), 0b1100);
        assert_eq!(tick_seed(42, 0), 42);
    }

    #[test]
    fn draws_are_counted() {
        let mut rng = TickRng::for_turn(1, 2);
        rng.next_f64();
        rng.normal_approx(0.0, 1.0);
        assert_eq!(rng.draws(), 1 + u64::from(NORMAL_APPROX_TERMS));
    }
}
