//! Turn and clock bookkeeping.

use super::{CombatantId, Tick};

/// Scheduler-facing bookkeeping shared by the whole battle.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    /// Ticks elapsed since battle start.
    pub clock: Tick,
    /// Number of completed game turns (one per resolved action).
    pub turn_count: u64,
    /// Combatant currently holding a turn, if one was offered.
    pub current_actor: Option<CombatantId>,
    /// Monotonic counter mixed into every derived RNG seed.
    ///
    /// Incremented on each random draw so no two draws in a battle share
    /// a seed.
    pub nonce: u64,
    /// Consecutive tick rounds in which nobody reached the ready line.
    /// Drives the anti-deadlock valve.
    pub stalled_rounds: u32,
}

impl TurnState {
    /// Advances the clock by `dt` ticks.
    pub fn advance_clock(&mut self, dt: u64) {
        self.clock = self.clock + dt;
    }

    /// Claims the next RNG nonce.
    pub fn next_nonce(&mut self) -> u64 {
        let nonce = self.nonce;
        self.nonce += 1;
        nonce
    }
}
