//! ATB gauge scheduling.
//!
//! Every alive combatant's gauge advances each tick proportional to its
//! speed relative to the battle average, clamped so nobody runs away with
//! the clock or starves. The same tick drives in-flight casts; there is no
//! separate casting clock.

use super::BattleEngine;
use crate::state::CombatantId;

/// What one scheduler tick surfaced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Combatants that crossed the ready line this tick and are eligible
    /// for a turn offer.
    pub newly_ready: Vec<CombatantId>,
    /// Casters whose cast finishes on this gauge position; the caller
    /// resolves each via [`BattleEngine::resolve_due_cast`].
    pub casts_due: Vec<CombatantId>,
}

impl TickReport {
    pub fn is_quiet(&self) -> bool {
        self.newly_ready.is_empty() && self.casts_due.is_empty()
    }
}

impl BattleEngine<'_> {
    /// Advances every gauge by `dt` ticks.
    ///
    /// `multiplier` composes the external pacing factors: the global pause
    /// flag (0.0 freezes everything) and the symmetric player-deliberation
    /// throttle. It applies to all combatants equally; asymmetric pacing
    /// is deliberately impossible here.
    ///
    /// Pure numeric mutation: gauges saturate at `atb_max`, never go
    /// negative, and nothing else is touched.
    pub fn tick(&mut self, dt: u32, multiplier: f64) -> TickReport {
        let mut report = TickReport::default();
        let before = self.state.turn.clock;
        self.state.turn.advance_clock(u64::from(dt));

        let Some(average_speed) = self.state.average_alive_speed() else {
            return report;
        };
        let config = self.config;
        let base = f64::from(config.base_increase) * f64::from(dt) * multiplier.max(0.0);
        let now = self.state.turn.clock;

        for combatant in self.state.combatants.iter_mut() {
            if !combatant.is_alive() {
                continue;
            }
            let ratio = (f64::from(combatant.stats.speed) / average_speed)
                .clamp(config.speed_ratio_min, config.speed_ratio_max);
            let gain = (base * ratio).round() as u32;
            // Eligibility can also flip when the cancel-cooldown window
            // expires with the clock, so compare against both instants.
            let was_eligible = combatant.atb >= config.ready_threshold
                && !combatant.in_cancel_cooldown(before);
            combatant.atb = (combatant.atb + gain).min(config.atb_max);

            if let Some(casting) = &combatant.casting {
                if casting.is_complete(combatant.atb, config.ready_threshold) {
                    report.casts_due.push(combatant.id);
                }
            } else if !was_eligible
                && combatant.atb >= config.ready_threshold
                && !combatant.in_cancel_cooldown(now)
            {
                report.newly_ready.push(combatant.id);
            }
        }

        // Stall bookkeeping for the anti-deadlock valve: reset whenever
        // anyone is at the line, count quiet rounds otherwise.
        let anyone_ready = self
            .state
            .alive()
            .any(|c| c.atb >= config.ready_threshold);
        if anyone_ready {
            self.state.turn.stalled_rounds = 0;
        } else {
            self.state.turn.stalled_rounds += 1;
        }

        report
    }

    /// Whether the scheduler has gone quiet long enough to warrant the
    /// anti-deadlock valve.
    pub fn is_stalled(&self) -> bool {
        self.state.turn.stalled_rounds >= self.config.deadlock_tick_limit
    }

    /// Anti-deadlock valve: flat gauge increment for every living
    /// combatant, bypassing the speed ratio.
    pub fn force_advance(&mut self) -> TickReport {
        let mut report = TickReport::default();
        let config = self.config;
        let now = self.state.turn.clock;

        for combatant in self.state.combatants.iter_mut() {
            if !combatant.is_alive() {
                continue;
            }
            let was_ready = combatant.atb >= config.ready_threshold;
            combatant.atb = (combatant.atb + config.force_advance_amount).min(config.atb_max);
            if combatant.casting.is_none()
                && !was_ready
                && combatant.atb >= config.ready_threshold
                && !combatant.in_cancel_cooldown(now)
            {
                report.newly_ready.push(combatant.id);
            }
        }
        self.state.turn.stalled_rounds = 0;
        report
    }

    /// Cross-the-board gauge penalty against one side (the cost of having
    /// a pending decision interrupted).
    pub fn penalize_side(&mut self, side: crate::state::Side, amount: u32) {
        for combatant in self.state.combatants.iter_mut() {
            if combatant.is_alive() && combatant.side == side {
                combatant.atb = combatant.atb.saturating_sub(amount);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::state::{BattleState, CombatantStats, Role, Side};

    fn spawn_with_speed(state: &mut BattleState, name: &str, side: Side, speed: u32) -> CombatantId {
        let stats = CombatantStats {
            speed,
            ..CombatantStats::default()
        };
        state.spawn(name, side, Role::Dps, stats, 300, 100)
    }

    #[test]
    fn gauges_stay_in_bounds() {
        let config = BattleConfig::default();
        let mut state = BattleState::with_seed(1);
        spawn_with_speed(&mut state, "A", Side::Ally, 100);
        spawn_with_speed(&mut state, "B", Side::Enemy, 100);

        let mut engine = BattleEngine::new(&mut state, &config);
        for _ in 0..500 {
            engine.tick(1, 1.0);
            for c in engine.state().combatants.iter() {
                assert!(c.atb <= config.atb_max);
            }
        }
        // Saturated at the cap, not beyond.
        assert!(state.combatants.iter().all(|c| c.atb == config.atb_max));
    }

    #[test]
    fn faster_combatant_reaches_ready_in_about_half_the_ticks() {
        // Speeds 50 and 100: ratios 0.667 and 1.333 against average 75,
        // inside the clamp band.
        let config = BattleConfig::default();
        let mut state = BattleState::with_seed(1);
        let slow = spawn_with_speed(&mut state, "Slow", Side::Ally, 50);
        let fast = spawn_with_speed(&mut state, "Fast", Side::Enemy, 100);

        let mut engine = BattleEngine::new(&mut state, &config);
        let mut fast_ready_at = None;
        let mut slow_ready_at = None;
        for tick_number in 1..=200 {
            engine.tick(1, 1.0);
            let state = engine.state();
            if fast_ready_at.is_none()
                && state.combatant(fast).unwrap().atb >= config.ready_threshold
            {
                fast_ready_at = Some(tick_number);
            }
            if slow_ready_at.is_none()
                && state.combatant(slow).unwrap().atb >= config.ready_threshold
            {
                slow_ready_at = Some(tick_number);
            }
        }

        let fast_ready_at = fast_ready_at.expect("fast combatant never became ready");
        let slow_ready_at = slow_ready_at.expect("slow combatant never became ready");
        // gain/tick: fast = 30 * 1.333 = 40, slow = 30 * 0.667 = 20.
        assert_eq!(fast_ready_at, 25);
        assert_eq!(slow_ready_at, 50);
    }

    #[test]
    fn zero_multiplier_freezes_all_gauges() {
        let config = BattleConfig::default();
        let mut state = BattleState::with_seed(1);
        spawn_with_speed(&mut state, "A", Side::Ally, 100);
        spawn_with_speed(&mut state, "B", Side::Enemy, 120);

        let mut engine = BattleEngine::new(&mut state, &config);
        engine.tick(10, 0.0);
        assert!(state.combatants.iter().all(|c| c.atb == 0));
    }

    #[test]
    fn throttle_slows_every_side_symmetrically() {
        let config = BattleConfig::default();
        let mut full = BattleState::with_seed(1);
        spawn_with_speed(&mut full, "A", Side::Ally, 100);
        spawn_with_speed(&mut full, "B", Side::Enemy, 100);
        let mut throttled = full.clone();

        BattleEngine::new(&mut full, &config).tick(10, 1.0);
        BattleEngine::new(&mut throttled, &config).tick(10, 0.5);

        for (a, b) in full.combatants.iter().zip(throttled.combatants.iter()) {
            assert_eq!(b.atb * 2, a.atb);
        }
    }

    #[test]
    fn stall_counter_trips_the_valve() {
        let config = BattleConfig {
            deadlock_tick_limit: 3,
            ..BattleConfig::default()
        };
        let mut state = BattleState::with_seed(1);
        spawn_with_speed(&mut state, "A", Side::Ally, 100);
        spawn_with_speed(&mut state, "B", Side::Enemy, 100);

        let mut engine = BattleEngine::new(&mut state, &config);
        // Frozen ticks never make anyone ready.
        for _ in 0..3 {
            engine.tick(1, 0.0);
        }
        assert!(engine.is_stalled());

        engine.force_advance();
        assert!(!engine.is_stalled());
        assert!(state.combatants.iter().all(|c| c.atb == config.force_advance_amount));
    }

    #[test]
    fn penalty_hits_only_the_named_side() {
        let config = BattleConfig::default();
        let mut state = BattleState::with_seed(1);
        let ally = spawn_with_speed(&mut state, "A", Side::Ally, 100);
        let enemy = spawn_with_speed(&mut state, "B", Side::Enemy, 100);
        state.combatant_mut(ally).unwrap().atb = 500;
        state.combatant_mut(enemy).unwrap().atb = 500;

        let mut engine = BattleEngine::new(&mut state, &config);
        engine.penalize_side(Side::Ally, 200);
        assert_eq!(state.combatant(ally).unwrap().atb, 300);
        assert_eq!(state.combatant(enemy).unwrap().atb, 500);
    }
}
