//! Brave/HP attack application against state.

use super::{BattleEngine, ExecuteError};
use crate::combat::{ActionReport, BrvAttackReport, HpAttackReport, brv_gain, calculate_brv_damage, calculate_hp_damage};
use crate::effects::EffectRegistry;
use crate::skill::SkillProfile;
use crate::state::{CombatantId, Side};

impl BattleEngine<'_> {
    /// Selectability gate for HP attacks: a minimum pool to spend.
    pub(crate) fn require_hp_attack_brave(&self, actor: CombatantId) -> Result<(), ExecuteError> {
        let combatant = self
            .state
            .combatant(actor)
            .ok_or(ExecuteError::UnknownCombatant(actor))?;
        let needed = self.config.hp_attack_min_brv;
        if combatant.brv.current < needed {
            return Err(ExecuteError::InsufficientBrave {
                actor,
                needed,
                available: combatant.brv.current,
            });
        }
        Ok(())
    }

    /// One BRV hit.
    ///
    /// The BREAK rule is exact: the defender breaks only if its pool was
    /// already empty *before* this hit. A hit that merely drains the pool
    /// to zero does not break — the next one does. ("Kick a downed
    /// target", not "first hit that downs".)
    pub fn brv_attack(
        &mut self,
        attacker: CombatantId,
        defender: CombatantId,
        power: u32,
    ) -> Result<BrvAttackReport, ExecuteError> {
        let (attack_stat, attacker_side) = {
            let a = self
                .state
                .combatant(attacker)
                .ok_or(ExecuteError::UnknownCombatant(attacker))?;
            (a.stats.attack, a.side)
        };

        let config = self.config;
        let (damage, defender_broke, interrupted_cast) = {
            let d = self
                .state
                .combatant_mut(defender)
                .ok_or(ExecuteError::UnknownCombatant(defender))?;
            let damage =
                calculate_brv_damage(attack_stat, d.stats.defense, power, config.defense_divisor);
            let was_zero = d.brv.current == 0;
            d.brv.deplete(damage);

            let mut broke = false;
            let mut interrupted = false;
            if was_zero && !d.broken {
                d.broken = true;
                d.atb = 0;
                interrupted = d.casting.take().is_some();
                broke = true;
            }
            (damage, broke, interrupted)
        };

        let rate = match attacker_side {
            Side::Ally => config.brv_gain_rate_ally,
            Side::Enemy => config.brv_gain_rate_enemy,
        };
        let gained_brv = brv_gain(damage, rate);
        if let Some(a) = self.state.combatant_mut(attacker) {
            a.brv.gain(gained_brv);
        }

        Ok(BrvAttackReport {
            attacker,
            defender,
            damage,
            gained_brv,
            defender_broke,
            interrupted_cast,
        })
    }

    /// One HP hit: empties the attacker's pool and converts it.
    pub fn hp_attack(
        &mut self,
        attacker: CombatantId,
        defender: CombatantId,
        power: u32,
    ) -> Result<HpAttackReport, ExecuteError> {
        let spent = self
            .state
            .combatant_mut(attacker)
            .ok_or(ExecuteError::UnknownCombatant(attacker))?
            .brv
            .drain();
        self.hp_strike(attacker, defender, spent, power)
    }

    /// Applies an already-spent pool to one defender.
    fn hp_strike(
        &mut self,
        attacker: CombatantId,
        defender: CombatantId,
        spent_brv: u32,
        power: u32,
    ) -> Result<HpAttackReport, ExecuteError> {
        let config = self.config;
        let d = self
            .state
            .combatant_mut(defender)
            .ok_or(ExecuteError::UnknownCombatant(defender))?;

        let target_was_broken = d.broken;
        let damage =
            calculate_hp_damage(spent_brv, power, target_was_broken, config.break_hp_multiplier);
        let effective = damage.min(d.hp.current);
        let hp_ratio_lost = if d.hp.maximum > 0 {
            f64::from(effective) / f64::from(d.hp.maximum)
        } else {
            0.0
        };
        d.hp.deplete(damage);

        let defeated = d.hp.is_empty();
        if defeated {
            d.mark_defeated();
        }

        Ok(HpAttackReport {
            attacker,
            defender,
            spent_brv,
            damage,
            hp_ratio_lost,
            target_was_broken,
            defeated,
        })
    }

    /// Applies a skill's BRV and HP components to each surviving target,
    /// then dispatches its effect tags.
    ///
    /// The HP component spends the caster's pool once; every target is
    /// struck from the same spent amount.
    pub(crate) fn apply_skill(
        &mut self,
        actor: CombatantId,
        skill: &SkillProfile,
        targets: &[CombatantId],
        effects: &EffectRegistry,
    ) -> Result<ActionReport, ExecuteError> {
        let mut report = ActionReport::default();

        if skill.brv_power > 0 {
            for &target in targets {
                if target == actor {
                    continue;
                }
                report.brv_hits.push(self.brv_attack(actor, target, skill.brv_power)?);
            }
        }

        if skill.hp_power > 0 {
            let spent = self
                .state
                .combatant_mut(actor)
                .ok_or(ExecuteError::UnknownCombatant(actor))?
                .brv
                .drain();
            for &target in targets {
                if target == actor {
                    continue;
                }
                report
                    .hp_hits
                    .push(self.hp_strike(actor, target, spent, skill.hp_power)?);
            }
        }

        let primary = targets.first().copied();
        report
            .aggro_events
            .extend(effects.dispatch(self.state, actor, primary, skill));

        Ok(report)
    }
}
