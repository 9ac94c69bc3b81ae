//! Casting state machine transitions.
//!
//! `NotCasting → Casting → {Completed, Interrupted}`. Creation happens in
//! [`BattleEngine::execute`] when a cast-time skill is chosen (MP is paid
//! there); this module owns advancement, completion, and interruption.

use arrayvec::ArrayVec;

use super::{BattleEngine, CastError};
use crate::casting::CastingState;
use crate::combat::{ActionReport, CastResolution};
use crate::config::BattleConfig;
use crate::effects::EffectRegistry;
use crate::skill::SkillProfile;
use crate::state::CombatantId;

impl BattleEngine<'_> {
    /// `NotCasting → Casting`. MP must already be paid by the caller.
    pub(crate) fn start_cast(
        &mut self,
        caster: CombatantId,
        skill: SkillProfile,
        targets: &[CombatantId],
    ) {
        let ready_threshold = self.config.ready_threshold;
        if let Some(combatant) = self.state.combatant_mut(caster) {
            let mut stored: ArrayVec<CombatantId, { BattleConfig::MAX_TARGETS }> =
                ArrayVec::new();
            for &target in targets.iter().take(BattleConfig::MAX_TARGETS) {
                stored.push(target);
            }
            combatant.casting = Some(CastingState::new(
                skill,
                stored,
                combatant.atb,
                ready_threshold,
            ));
            self.state.turn.current_actor = None;
        }
    }

    /// `Casting → {Completed, Cancelled}` for a cast the tick flagged as
    /// due.
    ///
    /// Stored targets are re-validated: the dead are dropped, and a cast
    /// left with zero targets (and not self-targeted) is silently
    /// cancelled instead of completing. The action cost was already
    /// charged when the cast started; completion charges nothing more.
    pub fn resolve_due_cast(
        &mut self,
        caster: CombatantId,
        effects: &EffectRegistry,
    ) -> Result<(CastResolution, ActionReport), CastError> {
        let combatant = self
            .state
            .combatant(caster)
            .ok_or(CastError::UnknownCombatant(caster))?;
        let casting = combatant.casting.clone().ok_or(CastError::NotCasting(caster))?;

        let live_targets: Vec<CombatantId> = casting
            .targets
            .iter()
            .copied()
            .filter(|&t| {
                self.state
                    .combatant(t)
                    .is_some_and(|c| c.is_alive())
            })
            .collect();

        if live_targets.is_empty() && !casting.skill.self_targeted {
            tracing::debug!(target: "battle_core::engine", %caster, skill = %casting.skill.name, "cast lost all targets, cancelled");
            if let Some(combatant) = self.state.combatant_mut(caster) {
                combatant.casting = None;
            }
            return Ok((
                CastResolution::Cancelled { caster },
                ActionReport::default(),
            ));
        }

        let applied_targets: Vec<CombatantId> = if live_targets.is_empty() {
            vec![caster]
        } else {
            live_targets
        };

        if let Some(combatant) = self.state.combatant_mut(caster) {
            combatant.casting = None;
        }
        let report = self
            .apply_skill(caster, &casting.skill, &applied_targets, effects)
            .map_err(|_| CastError::UnknownCombatant(caster))?;

        Ok((
            CastResolution::Completed {
                caster,
                brv_hits: report.brv_hits.clone(),
                hp_hits: report.hp_hits.clone(),
            },
            report,
        ))
    }

    /// `Casting → Interrupted`: the caster broke or died. All casting
    /// fields are cleared and no effect is applied. MP is not refunded.
    pub(crate) fn interrupt_cast(&mut self, caster: CombatantId) -> bool {
        match self.state.combatant_mut(caster) {
            Some(combatant) if combatant.casting.is_some() => {
                combatant.casting = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{BattleAction, BattleActionKind};
    use crate::config::BattleConfig;
    use crate::env::PcgRng;
    use crate::state::{BattleState, CombatantStats, Role, Side};

    fn setup() -> (BattleState, BattleConfig, CombatantId, CombatantId) {
        let mut state = BattleState::with_seed(1);
        let caster = state.spawn(
            "Mage",
            Side::Ally,
            Role::Dps,
            CombatantStats::default(),
            300,
            100,
        );
        let target = state.spawn(
            "Ghoul",
            Side::Enemy,
            Role::Dps,
            CombatantStats::default(),
            300,
            100,
        );
        (state, BattleConfig::default(), caster, target)
    }

    fn cast_skill() -> SkillProfile {
        SkillProfile {
            name: "Meteor".into(),
            brv_power: 150,
            cast_time_percent: 50,
            mp_cost: 20,
            ..SkillProfile::default()
        }
    }

    fn start(state: &mut BattleState, config: &BattleConfig, caster: CombatantId, target: CombatantId) {
        let mut targets = ArrayVec::<CombatantId, { BattleConfig::MAX_TARGETS }>::new();
        targets.push(target);
        let action = BattleAction {
            actor: caster,
            kind: BattleActionKind::UseSkill {
                skill: cast_skill(),
                targets,
            },
        };
        let mut engine = BattleEngine::new(state, config);
        engine
            .execute(&action, &EffectRegistry::new(), &PcgRng)
            .expect("cast should start");
    }

    #[test]
    fn starting_a_cast_pays_mp_and_stores_state() {
        let (mut state, config, caster, target) = setup();
        start(&mut state, &config, caster, target);

        let c = state.combatant(caster).unwrap();
        assert_eq!(c.mp.current, 80);
        let casting = c.casting.as_ref().unwrap();
        assert_eq!(casting.duration, 500);
        assert_eq!(casting.targets.as_slice(), &[target]);
    }

    #[test]
    fn cast_completes_when_gauge_covers_duration() {
        let (mut state, config, caster, target) = setup();
        start(&mut state, &config, caster, target);

        let mut engine = BattleEngine::new(&mut state, &config);
        let mut due = Vec::new();
        for _ in 0..100 {
            let report = engine.tick(1, 1.0);
            if !report.casts_due.is_empty() {
                due = report.casts_due;
                break;
            }
        }
        assert_eq!(due, vec![caster]);

        let (resolution, report) = engine
            .resolve_due_cast(caster, &EffectRegistry::new())
            .unwrap();
        assert!(matches!(resolution, CastResolution::Completed { .. }));
        assert_eq!(report.brv_hits.len(), 1);
        assert!(engine.state().combatant(caster).unwrap().casting.is_none());
        // Target's brave pool was chipped.
        assert!(
            engine.state().combatant(target).unwrap().brv.current
                < CombatantStats::default().int_brv
        );
    }

    #[test]
    fn cast_with_all_targets_dead_cancels_silently() {
        let (mut state, config, caster, target) = setup();
        start(&mut state, &config, caster, target);
        state.combatant_mut(target).unwrap().mark_defeated();
        let target_hp = state.combatant(target).unwrap().hp.current;

        let mut engine = BattleEngine::new(&mut state, &config);
        let (resolution, report) = engine
            .resolve_due_cast(caster, &EffectRegistry::new())
            .unwrap();
        assert_eq!(resolution, CastResolution::Cancelled { caster });
        assert!(report.is_empty());
        assert!(state.combatant(caster).unwrap().casting.is_none());
        assert_eq!(state.combatant(target).unwrap().hp.current, target_hp);
    }

    #[test]
    fn resolving_a_non_caster_is_an_error() {
        let (mut state, config, caster, _) = setup();
        let mut engine = BattleEngine::new(&mut state, &config);
        assert_eq!(
            engine
                .resolve_due_cast(caster, &EffectRegistry::new())
                .unwrap_err(),
            CastError::NotCasting(caster)
        );
    }
}
