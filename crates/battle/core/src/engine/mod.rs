//! Battle engine: the single mutation path for [`BattleState`].
//!
//! Construction borrows the state exclusively, so nothing else can write
//! while an engine exists. The impl is split by concern:
//!
//! - [`atb`]: gauge ticking and the anti-deadlock valve
//! - [`turns`]: turn eligibility and selection
//! - [`cast`]: the casting state machine
//! - [`attack`]: Brave/HP resolution against state
//! - this module: action dispatch and turn upkeep

pub mod atb;
pub mod attack;
pub mod cast;
pub mod errors;
pub mod turns;

pub use atb::TickReport;
pub use errors::{CastError, ExecuteError};

use crate::action::{BattleAction, BattleActionKind};
use crate::combat::{ActionOutcome, ActionReport, HealReport};
use crate::config::BattleConfig;
use crate::effects::EffectRegistry;
use crate::env::{RngOracle, derive_seed};
use crate::skill::ItemProfile;
use crate::state::{BattleState, CombatantId};

/// Exclusive write handle over one battle's state.
pub struct BattleEngine<'a> {
    state: &'a mut BattleState,
    config: &'a BattleConfig,
}

impl<'a> BattleEngine<'a> {
    pub fn new(state: &'a mut BattleState, config: &'a BattleConfig) -> Self {
        Self { state, config }
    }

    pub fn state(&self) -> &BattleState {
        self.state
    }

    pub fn config(&self) -> &BattleConfig {
        self.config
    }

    /// Claims a fresh RNG seed tied to the current clock.
    pub(crate) fn draw_seed(&mut self) -> u64 {
        let nonce = self.state.turn.next_nonce();
        derive_seed(self.state.battle_seed, self.state.turn.clock.0, nonce)
    }

    /// Start-of-turn upkeep for the acting combatant: passive "INT BRV"
    /// regeneration, which is also what lifts BREAK.
    pub fn begin_turn(&mut self, actor: CombatantId) -> Result<(), ExecuteError> {
        let combatant = self
            .state
            .combatant_mut(actor)
            .ok_or(ExecuteError::UnknownCombatant(actor))?;
        if !combatant.is_alive() {
            return Err(ExecuteError::ActorDead(actor));
        }
        combatant.brv.gain(combatant.stats.int_brv);
        if combatant.broken && combatant.brv.current > 0 {
            combatant.broken = false;
        }
        self.state.turn.current_actor = Some(actor);
        Ok(())
    }

    /// Executes one chosen action and reports what it produced.
    ///
    /// Completed actions are charged the fixed action cost (a decrement,
    /// not a gauge reset); cancellations cost nothing beyond the re-offer
    /// clamp. Starting a cast consumes the turn but defers the cost to
    /// completion.
    pub fn execute(
        &mut self,
        action: &BattleAction,
        effects: &EffectRegistry,
        rng: &dyn RngOracle,
    ) -> Result<(ActionOutcome, ActionReport), ExecuteError> {
        let actor = action.actor;
        {
            let combatant = self
                .state
                .combatant(actor)
                .ok_or(ExecuteError::UnknownCombatant(actor))?;
            if !combatant.is_alive() {
                return Err(ExecuteError::ActorDead(actor));
            }
            if combatant.is_casting() {
                return Err(ExecuteError::ActorCasting(actor));
            }
        }

        let mut report = ActionReport::default();
        let outcome = match &action.kind {
            BattleActionKind::BrvAttack { target } => {
                if !self.is_valid_target(*target) {
                    tracing::debug!(target: "battle_core::engine", %actor, "BRV attack target invalid, action cancelled");
                    self.note_cancellation(actor);
                    return Ok((ActionOutcome::Cancelled, report));
                }
                let hit = self.brv_attack(actor, *target, BattleConfig::BASIC_ATTACK_POWER)?;
                report.brv_hits.push(hit);
                self.finish_action(actor);
                ActionOutcome::Completed
            }
            BattleActionKind::HpAttack { target } => {
                if !self.is_valid_target(*target) {
                    tracing::debug!(target: "battle_core::engine", %actor, "HP attack target invalid, action cancelled");
                    self.note_cancellation(actor);
                    return Ok((ActionOutcome::Cancelled, report));
                }
                self.require_hp_attack_brave(actor)?;
                let hit = self.hp_attack(actor, *target, BattleConfig::BASIC_ATTACK_POWER)?;
                report.hp_hits.push(hit);
                self.finish_action(actor);
                ActionOutcome::Completed
            }
            BattleActionKind::UseSkill { skill, targets } => {
                let live_targets: Vec<CombatantId> = targets
                    .iter()
                    .copied()
                    .filter(|&t| self.is_valid_target(t))
                    .collect();
                if live_targets.is_empty() && !skill.self_targeted {
                    tracing::debug!(target: "battle_core::engine", %actor, skill = %skill.name, "no valid targets, action cancelled");
                    self.note_cancellation(actor);
                    return Ok((ActionOutcome::Cancelled, report));
                }
                self.pay_mp(actor, skill.mp_cost)?;
                if skill.is_instant() {
                    report.merge(self.apply_skill(actor, skill, &live_targets, effects)?);
                    self.finish_action(actor);
                } else {
                    // Committing to the cast is the turn: MP and the action
                    // cost are charged now, so the gauge restarts under the
                    // ready line and the completion valve has meaning.
                    self.finish_action(actor);
                    self.start_cast(actor, skill.clone(), &live_targets);
                }
                ActionOutcome::Completed
            }
            BattleActionKind::UseItem { item, target } => {
                if !self.is_valid_target(*target) {
                    self.note_cancellation(actor);
                    return Ok((ActionOutcome::Cancelled, report));
                }
                report.heals.push(self.apply_item(actor, item, *target)?);
                report
                    .aggro_events
                    .extend(effects.dispatch(self.state, actor, Some(*target), &item_as_skill(item)));
                self.finish_action(actor);
                ActionOutcome::Completed
            }
            BattleActionKind::Flee => {
                let seed = self.draw_seed();
                if self.roll_flee(actor, rng, seed)? {
                    return Ok((ActionOutcome::FleeSuccess, report));
                }
                self.finish_action(actor);
                ActionOutcome::Completed
            }
            BattleActionKind::Cancel => {
                self.note_cancellation(actor);
                ActionOutcome::Cancelled
            }
        };

        if let Some(victor) = self.state.victor() {
            return Ok((ActionOutcome::BattleOver(victor), report));
        }
        Ok((outcome, report))
    }

    /// Target validity at resolution time: exists and is alive.
    fn is_valid_target(&self, target: CombatantId) -> bool {
        self.state.combatant(target).is_some_and(|c| c.is_alive())
    }

    fn pay_mp(&mut self, actor: CombatantId, cost: u32) -> Result<(), ExecuteError> {
        if cost == 0 {
            return Ok(());
        }
        let combatant = self
            .state
            .combatant_mut(actor)
            .ok_or(ExecuteError::UnknownCombatant(actor))?;
        if combatant.mp.current < cost {
            return Err(ExecuteError::InsufficientMp {
                actor,
                needed: cost,
                available: combatant.mp.current,
            });
        }
        combatant.mp.deplete(cost);
        Ok(())
    }

    fn apply_item(
        &mut self,
        actor: CombatantId,
        item: &ItemProfile,
        target: CombatantId,
    ) -> Result<HealReport, ExecuteError> {
        let combatant = self
            .state
            .combatant_mut(target)
            .ok_or(ExecuteError::UnknownCombatant(target))?;
        let hp_before = combatant.hp.current;
        combatant.hp.restore(item.hp_restore);
        combatant.mp.restore(item.mp_restore);
        combatant.brv.gain(item.brv_grant);
        if combatant.broken && combatant.brv.current > 0 {
            combatant.broken = false;
        }
        let hp_restored = combatant.hp.current - hp_before;
        let hp_ratio_restored = if combatant.hp.maximum > 0 {
            f64::from(hp_restored) / f64::from(combatant.hp.maximum)
        } else {
            0.0
        };
        Ok(HealReport {
            source: actor,
            target,
            hp_restored,
            mp_restored: item.mp_restore,
            brv_granted: item.brv_grant,
            hp_ratio_restored,
        })
    }

    /// Speed-weighted escape roll.
    fn roll_flee(
        &mut self,
        actor: CombatantId,
        rng: &dyn RngOracle,
        seed: u64,
    ) -> Result<bool, ExecuteError> {
        let combatant = self
            .state
            .combatant(actor)
            .ok_or(ExecuteError::UnknownCombatant(actor))?;
        let own_speed = f64::from(combatant.stats.speed);
        let opposing = combatant.side.opponent();
        let mut total = 0.0;
        let mut count = 0u32;
        for enemy in self.state.alive_on(opposing) {
            total += f64::from(enemy.stats.speed);
            count += 1;
        }
        let chance = if count == 0 {
            100.0
        } else {
            let advantage = own_speed - total / f64::from(count);
            (f64::from(self.config.flee_base_chance) + advantage / 2.0).clamp(5.0, 95.0)
        };
        Ok(f64::from(rng.roll_d100(seed)) <= chance)
    }

    /// Post-action bookkeeping for a completed (not cancelled) action.
    fn finish_action(&mut self, actor: CombatantId) {
        if let Some(combatant) = self.state.combatant_mut(actor) {
            combatant.atb = combatant.atb.saturating_sub(self.config.action_cost);
        }
        self.state.turn.turn_count += 1;
        self.state.turn.current_actor = None;
    }
}

/// Items share the effect-tag pipeline with skills.
fn item_as_skill(item: &ItemProfile) -> crate::skill::SkillProfile {
    crate::skill::SkillProfile {
        name: item.name.clone(),
        effect_tags: item.effect_tags.clone(),
        ..crate::skill::SkillProfile::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;
    use crate::skill::SkillProfile;
    use crate::state::{BattleState, CombatantStats, Role, Side};

    fn setup() -> (BattleState, BattleConfig, CombatantId, CombatantId) {
        let mut state = BattleState::with_seed(3);
        let ally = state.spawn(
            "Aria",
            Side::Ally,
            Role::Dps,
            CombatantStats::default(),
            400,
            100,
        );
        let enemy = state.spawn(
            "Ghoul",
            Side::Enemy,
            Role::Dps,
            CombatantStats::default(),
            400,
            100,
        );
        (state, BattleConfig::default(), ally, enemy)
    }

    #[test]
    fn turn_upkeep_regenerates_brave_and_lifts_break() {
        let (mut state, config, ally, _) = setup();
        {
            let c = state.combatant_mut(ally).unwrap();
            c.brv.current = 0;
            c.broken = true;
        }
        let mut engine = BattleEngine::new(&mut state, &config);
        engine.begin_turn(ally).unwrap();

        let c = state.combatant(ally).unwrap();
        assert_eq!(c.brv.current, c.stats.int_brv);
        assert!(!c.broken, "regeneration above zero lifts BREAK");
    }

    #[test]
    fn unaffordable_skill_is_rejected_not_applied() {
        let (mut state, config, ally, enemy) = setup();
        let skill = SkillProfile {
            name: "Ruin".into(),
            brv_power: 100,
            mp_cost: 999,
            ..SkillProfile::default()
        };
        let mut targets = arrayvec::ArrayVec::new();
        targets.push(enemy);
        let action = BattleAction::new(ally, BattleActionKind::UseSkill { skill, targets });

        let snapshot = state.clone();
        let mut engine = BattleEngine::new(&mut state, &config);
        let result = engine.execute(&action, &EffectRegistry::new(), &PcgRng);
        assert!(matches!(
            result,
            Err(ExecuteError::InsufficientMp { needed: 999, .. })
        ));
        assert_eq!(state, snapshot, "rejected actions must not mutate state");
    }

    #[test]
    fn completed_action_pays_the_action_cost_without_resetting() {
        let (mut state, config, ally, enemy) = setup();
        state.combatant_mut(ally).unwrap().atb = 1600;
        let mut engine = BattleEngine::new(&mut state, &config);

        let (outcome, _) = engine
            .execute(
                &BattleAction::brv_attack(ally, enemy),
                &EffectRegistry::new(),
                &PcgRng,
            )
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Completed);
        // 1600 - 1000: flows on, no hard reset to zero.
        assert_eq!(state.combatant(ally).unwrap().atb, 600);
        assert_eq!(state.turn.turn_count, 1);
    }

    #[test]
    fn cancellation_costs_nothing_but_the_clamp() {
        let (mut state, config, ally, _) = setup();
        state.combatant_mut(ally).unwrap().atb = 1600;
        let mut engine = BattleEngine::new(&mut state, &config);

        let (outcome, report) = engine
            .execute(&BattleAction::cancel(ally), &EffectRegistry::new(), &PcgRng)
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Cancelled);
        assert!(report.is_empty());
        assert_eq!(state.combatant(ally).unwrap().atb, config.ready_threshold - 1);
        assert_eq!(state.turn.turn_count, 0);
    }

    #[test]
    fn attack_on_a_dead_target_cancels_with_no_side_effects() {
        let (mut state, config, ally, enemy) = setup();
        state.combatant_mut(enemy).unwrap().mark_defeated();
        let mut engine = BattleEngine::new(&mut state, &config);

        let (outcome, report) = engine
            .execute(
                &BattleAction::brv_attack(ally, enemy),
                &EffectRegistry::new(),
                &PcgRng,
            )
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Cancelled);
        assert!(report.is_empty());
    }

    #[test]
    fn item_use_heals_and_reports_the_ratio() {
        let (mut state, config, ally, _) = setup();
        state.combatant_mut(ally).unwrap().hp.current = 200;
        let item = ItemProfile {
            name: "Potion".into(),
            hp_restore: 100,
            ..ItemProfile::default()
        };
        let mut engine = BattleEngine::new(&mut state, &config);

        let (outcome, report) = engine
            .execute(
                &BattleAction::new(ally, BattleActionKind::UseItem { item, target: ally }),
                &EffectRegistry::new(),
                &PcgRng,
            )
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Completed);
        assert_eq!(report.heals.len(), 1);
        assert_eq!(report.heals[0].hp_restored, 100);
        assert!((report.heals[0].hp_ratio_restored - 0.25).abs() < 1e-9);
        assert_eq!(state.combatant(ally).unwrap().hp.current, 300);
    }

    #[test]
    fn lethal_action_reports_battle_over() {
        let (mut state, config, ally, enemy) = setup();
        state.combatant_mut(ally).unwrap().brv.current = 2000;
        let mut engine = BattleEngine::new(&mut state, &config);

        let (outcome, _) = engine
            .execute(
                &BattleAction::hp_attack(ally, enemy),
                &EffectRegistry::new(),
                &PcgRng,
            )
            .unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::BattleOver(crate::combat::Victor::Allies)
        );
    }

    #[test]
    fn dead_actors_cannot_act() {
        let (mut state, config, ally, enemy) = setup();
        state.combatant_mut(ally).unwrap().mark_defeated();
        let mut engine = BattleEngine::new(&mut state, &config);

        let result = engine.execute(
            &BattleAction::brv_attack(ally, enemy),
            &EffectRegistry::new(),
            &PcgRng,
        );
        assert_eq!(result.unwrap_err(), ExecuteError::ActorDead(ally));
    }
}
