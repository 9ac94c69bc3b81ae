//! Threat-driven AI action provider.

use async_trait::async_trait;
use tracing::debug;

use battle_core::{BattleAction, BattleView, CombatantId};

use crate::error::{Result, RuntimeError};
use crate::handle::BattleHandle;

use super::ActionProvider;

/// AI opponent decision-making: "who do I hit" comes from the aggro
/// engine's weighted sample, "with what" from the brave pool.
///
/// With a pool past the HP-attack threshold the actor cashes it in;
/// otherwise it chips with a BRV attack. Strategy stays deliberately
/// simple — the interesting part is the sampled targeting, which keeps
/// low-threat support targets reachable.
pub struct AggroAiProvider {
    handle: BattleHandle,
    hp_attack_min_brv: u32,
}

impl AggroAiProvider {
    pub fn new(handle: BattleHandle, hp_attack_min_brv: u32) -> Self {
        Self {
            handle,
            hp_attack_min_brv,
        }
    }

    fn fallback_target(&self, actor: CombatantId, view: &BattleView) -> Option<CombatantId> {
        let side = view.combatant(actor)?.side;
        view.combatants
            .iter()
            .find(|c| c.alive && c.side == side.opponent())
            .map(|c| c.id)
    }
}

#[async_trait]
impl ActionProvider for AggroAiProvider {
    async fn provide_action(&self, actor: CombatantId, view: &BattleView) -> Result<BattleAction> {
        let me = view
            .combatant(actor)
            .ok_or_else(|| RuntimeError::Provider(format!("unknown actor {actor}")))?;

        // Sampled threat target, falling back to any living opponent when
        // the table is gone (e.g. the enemy was just re-registered).
        let target = match self.handle.primary_target(actor).await? {
            Some(target) => target,
            None => self
                .fallback_target(actor, view)
                .ok_or_else(|| RuntimeError::Provider("no living opponents".into()))?,
        };

        let action = if me.brv.0 >= self.hp_attack_min_brv {
            debug!(target: "runtime::ai", %actor, %target, brv = me.brv.0, "cashing in the pool");
            BattleAction::hp_attack(actor, target)
        } else {
            debug!(target: "runtime::ai", %actor, %target, "chipping brave");
            BattleAction::brv_attack(actor, target)
        };
        Ok(action)
    }
}
