//! Actions a combatant can take on an offered turn.

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::skill::{ItemProfile, SkillProfile};
use crate::state::CombatantId;

/// One chosen action, attributed to its actor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleAction {
    pub actor: CombatantId,
    pub kind: BattleActionKind,
}

impl BattleAction {
    pub fn new(actor: CombatantId, kind: BattleActionKind) -> Self {
        Self { actor, kind }
    }

    /// Convenience constructor for the basic BRV attack.
    pub fn brv_attack(actor: CombatantId, target: CombatantId) -> Self {
        Self::new(actor, BattleActionKind::BrvAttack { target })
    }

    /// Convenience constructor for the basic HP attack.
    pub fn hp_attack(actor: CombatantId, target: CombatantId) -> Self {
        Self::new(actor, BattleActionKind::HpAttack { target })
    }

    /// Convenience constructor for a skill use; extra targets past the
    /// cap are dropped.
    pub fn use_skill(actor: CombatantId, skill: SkillProfile, targets: &[CombatantId]) -> Self {
        let mut stored: ArrayVec<CombatantId, { BattleConfig::MAX_TARGETS }> = ArrayVec::new();
        for &target in targets.iter().take(BattleConfig::MAX_TARGETS) {
            stored.push(target);
        }
        Self::new(
            actor,
            BattleActionKind::UseSkill {
                skill,
                targets: stored,
            },
        )
    }

    /// Convenience constructor for an item use.
    pub fn use_item(actor: CombatantId, item: ItemProfile, target: CombatantId) -> Self {
        Self::new(actor, BattleActionKind::UseItem { item, target })
    }

    pub fn cancel(actor: CombatantId) -> Self {
        Self::new(actor, BattleActionKind::Cancel)
    }
}

/// The action vocabulary the engine resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleActionKind {
    /// Basic brave-chip attack at standard power.
    BrvAttack { target: CombatantId },
    /// Convert the entire brave pool into HP damage.
    HpAttack { target: CombatantId },
    /// Use a skill; cast-time skills enter the casting state instead of
    /// resolving immediately.
    UseSkill {
        skill: SkillProfile,
        targets: ArrayVec<CombatantId, { BattleConfig::MAX_TARGETS }>,
    },
    /// Consume an item on a target.
    UseItem {
        item: ItemProfile,
        target: CombatantId,
    },
    /// Attempt to escape the battle.
    Flee,
    /// Explicitly give up the offered turn.
    Cancel,
}
