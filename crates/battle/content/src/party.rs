//! Party and encounter specs: the bridge from character sheets to
//! battle-ready combatants.

use battle_core::{BattleState, CombatantId, CombatantStats, Side};

use crate::roles::role_for_class;

/// One combatant as content describes it, before battle state exists.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantSpec {
    pub name: String,
    /// Character class; classified into a role for threat baselines.
    pub class: String,
    pub side: Side,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub int_brv: u32,
    pub max_brv: u32,
    pub hp_max: u32,
    pub mp_max: u32,
}

impl CombatantSpec {
    /// Spawns this spec into a battle, deriving the role from the class.
    pub fn spawn_into(&self, state: &mut BattleState) -> CombatantId {
        state.spawn(
            self.name.clone(),
            self.side,
            role_for_class(&self.class),
            CombatantStats::new(self.attack, self.defense, self.speed, self.int_brv, self.max_brv),
            self.hp_max,
            self.mp_max,
        )
    }
}

/// Builds a battle from ally and enemy specs.
pub fn assemble_battle(
    seed: u64,
    allies: &[CombatantSpec],
    enemies: &[CombatantSpec],
) -> BattleState {
    let mut state = BattleState::with_seed(seed);
    for spec in allies.iter().chain(enemies) {
        spec.spawn_into(&mut state);
    }
    state
}
