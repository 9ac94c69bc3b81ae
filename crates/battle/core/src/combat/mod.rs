//! Brave/HP combat resolution.
//!
//! This module provides pure functions for the two damage types and the
//! outcome types the engine reports. All calculation here is deterministic
//! and side-effect free; stateful application lives in
//! [`crate::engine::BattleEngine`].
//!
//! # Damage model
//!
//! - **BRV attack**: chips the defender's brave pool; hitting an already
//!   empty pool triggers BREAK.
//! - **HP attack**: converts the attacker's entire brave pool into HP
//!   damage, amplified against broken targets.

pub mod brv;
pub mod hp;
pub mod result;

pub use brv::{brv_gain, calculate_brv_damage};
pub use hp::calculate_hp_damage;
pub use result::{
    ActionOutcome, ActionReport, BrvAttackReport, CastResolution, HealReport, HpAttackReport,
    Victor,
};
