//! Deterministic environment services consumed by the engine.
pub mod rng;

pub use rng::{PcgRng, RngOracle, derive_seed};
