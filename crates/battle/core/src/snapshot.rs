//! Read-only presentation snapshots.
//!
//! The presentation layer never touches [`crate::state::BattleState`]
//! directly; it renders from these views, captured per tick by the
//! runtime. Capturing is cheap and the core never blocks on whatever
//! consumes the result.

use crate::config::BattleConfig;
use crate::state::{BattleState, CombatantId, Role, Side, Tick};


/// Per-combatant view: everything a gauge bar or status row needs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantView {
    pub id: CombatantId,
    pub name: String,
    pub side: Side,
    pub role: Role,
    pub hp: (u32, u32),
    pub mp: (u32, u32),
    pub brv: (u32, u32),
    pub atb: u32,
    pub alive: bool,
    pub broken: bool,
    /// Cast progress in `[0, 1]` when a cast is in flight.
    pub cast_progress: Option<f32>,
}

/// Whole-battle view at one instant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleView {
    pub clock: Tick,
    pub combatants: Vec<CombatantView>,
}

impl BattleView {
    /// Captures the current state into an owned, detached view.
    pub fn capture(state: &BattleState) -> Self {
        let combatants = state
            .combatants
            .iter()
            .map(|c| CombatantView {
                id: c.id,
                name: c.name.clone(),
                side: c.side,
                role: c.role,
                hp: (c.hp.current, c.hp.maximum),
                mp: (c.mp.current, c.mp.maximum),
                brv: (c.brv.current, c.brv.maximum),
                atb: c.atb,
                alive: c.alive,
                broken: c.broken,
                cast_progress: c.casting.as_ref().map(|cast| cast.progress(c.atb)),
            })
            .collect();
        Self {
            clock: state.turn.clock,
            combatants,
        }
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&CombatantView> {
        self.combatants.iter().find(|c| c.id == id)
    }

    /// Readiness as a display fraction of the ready line.
    pub fn readiness(&self, id: CombatantId, config: &BattleConfig) -> Option<f32> {
        self.combatant(id)
            .map(|c| (c.atb as f32 / config.ready_threshold as f32).min(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CombatantStats, Role, Side};

    #[test]
    fn capture_reflects_state_without_holding_it() {
        let config = BattleConfig::default();
        let mut state = BattleState::with_seed(1);
        let id = state.spawn(
            "Aria",
            Side::Ally,
            Role::Healer,
            CombatantStats::default(),
            300,
            100,
        );
        state.combatant_mut(id).unwrap().atb = 750;

        let view = BattleView::capture(&state);
        // Mutating the state afterward must not affect the captured view.
        state.combatant_mut(id).unwrap().atb = 0;

        let c = view.combatant(id).unwrap();
        assert_eq!(c.atb, 750);
        assert_eq!(c.hp, (300, 300));
        assert_eq!(c.cast_progress, None);
        assert_eq!(view.readiness(id, &config), Some(0.75));
    }
}
