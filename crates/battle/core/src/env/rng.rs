//! RNG oracle for deterministic random number generation.
//!
//! Turn tiebreaks, flee rolls, and aggro target sampling all draw from this
//! oracle. Implementations must be deterministic: given the same seed they
//! produce the same value, which keeps battles replayable and tests exact.

/// RNG oracle for deterministic random number generation.
///
/// Stateless by design: every draw takes an explicit seed, derived from
/// `(battle_seed, clock, nonce)` via [`derive_seed`], so call sites never
/// share hidden sequence state.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a d100 (1-100 inclusive).
    ///
    /// Used for percentage mechanics like flee chance.
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// Generate a random index in `[0, len)`.
    ///
    /// Used for uniform tiebreaks. `len` must be non-zero.
    fn pick_index(&self, seed: u64, len: usize) -> usize {
        (self.next_u32(seed) as usize) % len
    }

    /// Cumulative weighted draw over `weights`, returning the chosen index.
    ///
    /// Weights must be non-negative. Returns `None` for an empty slice or
    /// an all-zero total (the caller decides the fallback policy).
    fn weighted_pick(&self, seed: u64, weights: &[f64]) -> Option<usize> {
        if weights.is_empty() {
            return None;
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return None;
        }
        // Map the u32 draw onto [0, total).
        let roll = (self.next_u32(seed) as f64 / (u32::MAX as f64 + 1.0)) * total;
        let mut cumulative = 0.0;
        for (index, weight) in weights.iter().enumerate() {
            cumulative += weight;
            if roll < cumulative {
                return Some(index);
            }
        }
        // Floating error can leave roll a hair past the last boundary.
        Some(weights.len() - 1)
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR produces 32-bit output from 64-bit state with a single
/// multiply, xorshift, and rotate. Deterministic, fast, and statistically
/// solid, which is all the battle engine asks of it.
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Advance the PCG state by one LCG step.
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// PCG output permutation (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        let state = Self::pcg_step(seed);
        Self::pcg_output(state)
    }
}

/// Derives a unique seed for one random event.
///
/// Mixes the battle seed, the clock, and the per-draw nonce so that no two
/// draws in a battle see the same seed, while replays with the same battle
/// seed reproduce the exact sequence.
pub fn derive_seed(battle_seed: u64, clock: u64, nonce: u64) -> u64 {
    let mut mixed = battle_seed ^ clock.rotate_left(17) ^ nonce.rotate_left(41);
    // splitmix64 finalizer to spread low-entropy inputs.
    mixed = mixed.wrapping_add(0x9E3779B97F4A7C15);
    mixed = (mixed ^ (mixed >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    mixed = (mixed ^ (mixed >> 27)).wrapping_mul(0x94D049BB133111EB);
    mixed ^ (mixed >> 31)
}
