//! Authoritative battle state representation.
//!
//! This module owns the data structures that describe combatants and turn
//! bookkeeping. Runtime layers clone or query this state but mutate it
//! exclusively through [`crate::engine::BattleEngine`].
pub mod combatant;
pub mod common;
pub mod turn;

pub use combatant::{CombatantState, CombatantStats};
pub use common::{BraveMeter, CombatantId, ResourceMeter, Role, Side, Tick};
pub use turn::TurnState;

use crate::combat::Victor;

/// Canonical snapshot of one battle's deterministic state.
///
/// Owns every combatant for the duration of a single battle; the whole
/// structure is discarded when the battle ends. Nothing here persists
/// across battles.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    /// RNG seed for deterministic random draws.
    ///
    /// Set once at battle initialization and never modified. Combined with
    /// `turn.nonce` to derive a unique seed for each random event.
    pub battle_seed: u64,

    /// Sequential combatant ID allocator (monotonically increasing).
    next_combatant_id: u32,

    /// Turn and clock bookkeeping.
    pub turn: TurnState,
    /// Every combatant in the battle, both sides, dead or alive.
    pub combatants: Vec<CombatantState>,
}

impl BattleState {
    /// Creates an empty battle with the given seed.
    pub fn with_seed(battle_seed: u64) -> Self {
        Self {
            battle_seed,
            next_combatant_id: 0,
            turn: TurnState::default(),
            combatants: Vec::new(),
        }
    }

    /// Spawns a combatant, allocating its id.
    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        side: Side,
        role: Role,
        stats: CombatantStats,
        hp_max: u32,
        mp_max: u32,
    ) -> CombatantId {
        let id = CombatantId(self.next_combatant_id);
        self.next_combatant_id += 1;
        self.combatants
            .push(CombatantState::new(id, name, side, role, stats, hp_max, mp_max));
        id
    }

    /// Looks up a combatant by id.
    pub fn combatant(&self, id: CombatantId) -> Option<&CombatantState> {
        self.combatants.iter().find(|c| c.id == id)
    }

    /// Looks up a combatant mutably by id.
    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut CombatantState> {
        self.combatants.iter_mut().find(|c| c.id == id)
    }

    /// Iterates over living combatants.
    pub fn alive(&self) -> impl Iterator<Item = &CombatantState> {
        self.combatants.iter().filter(|c| c.is_alive())
    }

    /// Iterates over living combatants of one side.
    pub fn alive_on(&self, side: Side) -> impl Iterator<Item = &CombatantState> {
        self.alive().filter(move |c| c.side == side)
    }

    /// Average speed across all living combatants.
    ///
    /// Returns `None` when nobody is alive (the battle is already over).
    pub fn average_alive_speed(&self) -> Option<f64> {
        let mut total = 0u64;
        let mut count = 0u64;
        for c in self.alive() {
            total += u64::from(c.stats.speed);
            count += 1;
        }
        (count > 0).then(|| total as f64 / count as f64)
    }

    /// Win/lose check: the only legitimate way a battle ends.
    pub fn victor(&self) -> Option<Victor> {
        if self.alive_on(Side::Enemy).next().is_none() {
            Some(Victor::Allies)
        } else if self.alive_on(Side::Ally).next().is_none() {
            Some(Victor::Enemies)
        } else {
            None
        }
    }
}

impl Default for BattleState {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_sided_state() -> BattleState {
        let mut state = BattleState::with_seed(7);
        state.spawn(
            "Aria",
            Side::Ally,
            Role::Dps,
            CombatantStats::default(),
            300,
            100,
        );
        state.spawn(
            "Ghoul",
            Side::Enemy,
            Role::Dps,
            CombatantStats::default(),
            250,
            50,
        );
        state
    }

    #[test]
    fn spawn_allocates_sequential_ids() {
        let state = two_sided_state();
        assert_eq!(state.combatants[0].id, CombatantId(0));
        assert_eq!(state.combatants[1].id, CombatantId(1));
    }

    #[test]
    fn victor_requires_a_side_to_be_wiped() {
        let mut state = two_sided_state();
        assert_eq!(state.victor(), None);

        state.combatants[1].mark_defeated();
        assert_eq!(state.victor(), Some(Victor::Allies));

        let mut state = two_sided_state();
        state.combatants[0].mark_defeated();
        assert_eq!(state.victor(), Some(Victor::Enemies));
    }

    #[test]
    fn average_speed_ignores_the_dead() {
        let mut state = two_sided_state();
        state.combatants[0].stats.speed = 50;
        state.combatants[1].stats.speed = 100;
        assert_eq!(state.average_alive_speed(), Some(75.0));

        state.combatants[1].mark_defeated();
        assert_eq!(state.average_alive_speed(), Some(50.0));

        state.combatants[0].mark_defeated();
        assert_eq!(state.average_alive_speed(), None);
    }
}
