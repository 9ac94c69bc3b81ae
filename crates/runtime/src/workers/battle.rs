//! Battle worker that owns the authoritative [`battle_core::BattleState`].
//!
//! Receives commands from [`crate::BattleHandle`], executes actions via
//! [`battle_core::BattleEngine`], feeds the threat engine from combat
//! reports, and publishes [`BattleEvent`] notifications.

use std::collections::HashSet;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, error};

use battle_core::{
    ActionOutcome, ActionReport, AggroEngine, AggroEvent, BattleAction, BattleConfig,
    BattleEngine, BattleState, BattleView, CastResolution, CombatantId, EffectRegistry, PcgRng,
    Side,
};

use crate::error::{Result, RuntimeError};
use crate::event::BattleEvent;

/// Commands the battle worker processes, one at a time.
pub enum Command {
    /// Advance every gauge (sent by the ticker).
    Tick { dt: u32 },
    /// Select the next eligible actor and run its turn-start upkeep.
    NextActor {
        reply: oneshot::Sender<Option<CombatantId>>,
    },
    /// Execute a chosen action (one sync tick closes the gap first).
    ExecuteAction {
        action: BattleAction,
        reply: oneshot::Sender<Result<(ActionOutcome, ActionReport)>>,
    },
    /// Sample an enemy's threat table for its next victim.
    PrimaryTarget {
        enemy: CombatantId,
        reply: oneshot::Sender<Option<CombatantId>>,
    },
    /// Capture a read-only presentation snapshot.
    Snapshot {
        reply: oneshot::Sender<BattleView>,
    },
    /// Freeze or thaw every gauge (status menu open, etc.).
    SetPaused { paused: bool },
    /// Engage or release the symmetric deliberation throttle.
    SetDeliberating { deliberating: bool },
    /// Cross-the-board ATB penalty against one side (interrupt cost).
    PenalizeSide { side: Side },
    /// Give back an offered turn without cancellation semantics: the
    /// interrupted actor keeps its gauge (the side penalty is separate).
    ReleaseTurn,
}

/// Background task that processes battle commands.
///
/// The sole mutator of combat and threat state; everything else reads
/// snapshots or goes through the queue.
pub struct BattleWorker {
    state: BattleState,
    config: BattleConfig,
    aggro: AggroEngine,
    effects: EffectRegistry,
    rng: PcgRng,
    paused: bool,
    deliberating: bool,
    deliberation_throttle: f64,
    /// Guards turn upkeep against re-offers: an interrupted menu offers
    /// the same actor again within the same game turn, which must not
    /// regenerate BRV twice.
    upkeep_done_for: Option<(CombatantId, u64)>,
    command_rx: mpsc::Receiver<Command>,
    event_tx: broadcast::Sender<BattleEvent>,
    /// Bumped whenever readiness may have changed; the loop waits on it
    /// instead of sleep-polling.
    ready_tx: watch::Sender<u64>,
}

impl BattleWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: BattleState,
        config: BattleConfig,
        effects: EffectRegistry,
        deliberation_throttle: f64,
        command_rx: mpsc::Receiver<Command>,
        event_tx: broadcast::Sender<BattleEvent>,
        ready_tx: watch::Sender<u64>,
    ) -> Self {
        // Seed one threat table per enemy over the ally party.
        let allies: Vec<(CombatantId, battle_core::Role)> = state
            .alive_on(Side::Ally)
            .map(|c| (c.id, c.role))
            .collect();
        let mut aggro = AggroEngine::new(config.aggro.clone());
        for enemy in state.alive_on(Side::Enemy) {
            aggro.register_enemy(enemy.id, &allies);
        }

        Self {
            state,
            config,
            aggro,
            effects,
            rng: PcgRng,
            paused: false,
            deliberating: false,
            deliberation_throttle,
            upkeep_done_for: None,
            command_rx,
            event_tx,
            ready_tx,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                else => break,
            }
        }
        debug!(target: "runtime::worker", "command channel closed, battle worker stopping");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Tick { dt } => self.handle_tick(dt),
            Command::NextActor { reply } => {
                let _ = reply.send(self.next_actor());
            }
            Command::ExecuteAction { action, reply } => {
                let result = self.execute_action(action);
                let _ = reply.send(result);
            }
            Command::PrimaryTarget { enemy, reply } => {
                let _ = reply.send(self.primary_target(enemy));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(BattleView::capture(&self.state));
            }
            Command::SetPaused { paused } => {
                self.paused = paused;
            }
            Command::SetDeliberating { deliberating } => {
                self.deliberating = deliberating;
            }
            Command::PenalizeSide { side } => {
                let penalty = self.config.interrupt_penalty;
                BattleEngine::new(&mut self.state, &self.config).penalize_side(side, penalty);
            }
            Command::ReleaseTurn => {
                self.state.turn.current_actor = None;
            }
        }
    }

    fn gauge_multiplier(&self) -> f64 {
        if self.paused {
            0.0
        } else if self.deliberating {
            self.deliberation_throttle
        } else {
            1.0
        }
    }

    fn handle_tick(&mut self, dt: u32) {
        let multiplier = self.gauge_multiplier();
        let mut report = {
            let mut engine = BattleEngine::new(&mut self.state, &self.config);
            let mut report = engine.tick(dt, multiplier);
            // A paused battle is frozen, not deadlocked: the valve only
            // applies while gauges are supposed to be moving.
            if !self.paused && engine.is_stalled() {
                debug!(target: "runtime::worker", "scheduler stalled, forcing gauges forward");
                let forced = engine.force_advance();
                report.newly_ready.extend(forced.newly_ready);
            }
            report
        };

        for &combatant in &report.newly_ready {
            let _ = self.event_tx.send(BattleEvent::TurnReady { combatant });
        }

        let casters: Vec<CombatantId> = std::mem::take(&mut report.casts_due);
        let had_casts = !casters.is_empty();
        for caster in casters {
            self.resolve_cast(caster);
        }

        // Wake the loop on any readiness change, including casts resolving
        // (a lethal cast can end the battle with nobody "ready").
        if !report.newly_ready.is_empty() || had_casts {
            self.ready_tx.send_modify(|v| *v += 1);
        }
    }

    fn next_actor(&mut self) -> Option<CombatantId> {
        let turn_count = self.state.turn.turn_count;
        let mut engine = BattleEngine::new(&mut self.state, &self.config);
        let actor = engine.next_actor(&self.rng)?;
        if self.upkeep_done_for != Some((actor, turn_count)) {
            if let Err(e) = engine.begin_turn(actor) {
                error!(target: "runtime::worker", %actor, error = %e, "turn upkeep failed");
                return None;
            }
            self.upkeep_done_for = Some((actor, turn_count));
        }
        Some(actor)
    }

    fn execute_action(&mut self, action: BattleAction) -> Result<(ActionOutcome, ActionReport)> {
        if let Some(expected) = self.state.turn.current_actor {
            if expected != action.actor {
                return Err(RuntimeError::StaleActor {
                    expected,
                    provided: action.actor,
                });
            }
        }

        let gauge_multiplier = self.gauge_multiplier();
        let (outcome, report, sync_report) = {
            let mut engine = BattleEngine::new(&mut self.state, &self.config);
            // Close the gap between the decision and the gauges, then
            // resolve atomically.
            let sync_report = engine.tick(1, gauge_multiplier);
            let (outcome, report) = engine.execute(&action, &self.effects, &self.rng)?;
            (outcome, report, sync_report)
        };

        // Readiness surfaced by the sync tick still gets announced.
        for &combatant in &sync_report.newly_ready {
            let _ = self.event_tx.send(BattleEvent::TurnReady { combatant });
        }
        if !sync_report.newly_ready.is_empty() {
            self.ready_tx.send_modify(|v| *v += 1);
        }

        self.absorb_report(&report);
        let _ = self.event_tx.send(BattleEvent::ActionResolved {
            actor: action.actor,
            outcome: outcome.clone(),
            report: report.clone(),
        });

        match &outcome {
            ActionOutcome::Completed | ActionOutcome::BattleOver(_) => {
                if self
                    .state
                    .combatant(action.actor)
                    .is_some_and(|c| c.is_casting())
                {
                    let _ = self.event_tx.send(BattleEvent::CastStarted {
                        caster: action.actor,
                    });
                }
                // One completed action = one game turn: threat cools off.
                self.aggro.decay_all();
            }
            ActionOutcome::Cancelled
            | ActionOutcome::Interrupted { .. }
            | ActionOutcome::FleeSuccess => {}
        }

        match &outcome {
            ActionOutcome::BattleOver(victor) => {
                debug!(
                    target: "runtime::worker",
                    victor = ?victor,
                    final_state = %serde_json::to_string(&BattleView::capture(&self.state)).unwrap_or_default(),
                    "battle ended"
                );
                let _ = self.event_tx.send(BattleEvent::BattleEnded {
                    victor: Some(*victor),
                });
            }
            ActionOutcome::FleeSuccess => {
                let _ = self.event_tx.send(BattleEvent::BattleEnded { victor: None });
            }
            _ => {}
        }

        Ok((outcome, report))
    }

    fn resolve_cast(&mut self, caster: CombatantId) {
        let resolved = {
            let mut engine = BattleEngine::new(&mut self.state, &self.config);
            engine.resolve_due_cast(caster, &self.effects)
        };
        match resolved {
            Ok((CastResolution::Completed { caster, .. }, report)) => {
                // The game turn (and its threat decay) was counted when the
                // cast started; completion only lands the effects.
                let _ = self.event_tx.send(BattleEvent::CastCompleted { caster });
                self.absorb_report(&report);
            }
            Ok((CastResolution::Cancelled { caster }, _))
            | Ok((CastResolution::Interrupted { caster }, _)) => {
                let _ = self.event_tx.send(BattleEvent::CastInterrupted { caster });
            }
            Err(e) => {
                error!(target: "runtime::worker", %caster, error = %e, "cast resolution failed");
            }
        }
    }

    fn primary_target(&mut self, enemy: CombatantId) -> Option<CombatantId> {
        let alive_allies: Vec<CombatantId> =
            self.state.alive_on(Side::Ally).map(|c| c.id).collect();
        let nonce = self.state.turn.next_nonce();
        let seed = battle_core::derive_seed(self.state.battle_seed, self.state.turn.clock.0, nonce);
        self.aggro
            .primary_target(enemy, &alive_allies, &self.rng, seed)
    }

    /// Converts a combat report into threat updates and follow-up events.
    fn absorb_report(&mut self, report: &ActionReport) {
        let mut touched: HashSet<CombatantId> = HashSet::new();

        for hit in &report.brv_hits {
            if hit.defender_broke {
                let _ = self.event_tx.send(BattleEvent::Break {
                    combatant: hit.defender,
                });
            }
            if hit.interrupted_cast {
                let _ = self.event_tx.send(BattleEvent::CastInterrupted {
                    caster: hit.defender,
                });
            }
            // Chipping an enemy's pool reads as threat from its table.
            if self.side_of(hit.attacker) == Some(Side::Ally)
                && self.side_of(hit.defender) == Some(Side::Enemy)
            {
                let ratio = self
                    .state
                    .combatant(hit.defender)
                    .filter(|d| d.brv.maximum > 0)
                    .map(|d| f64::from(hit.damage) / f64::from(d.brv.maximum))
                    .unwrap_or(0.0)
                    .min(1.0);
                let event = AggroEvent::new(
                    hit.attacker,
                    battle_core::AggroEventKind::Threat,
                    ratio,
                );
                self.aggro.add_event(hit.defender, &event);
                touched.insert(hit.defender);
            }
        }

        for hit in &report.hp_hits {
            if hit.defeated {
                let _ = self.event_tx.send(BattleEvent::Defeated {
                    combatant: hit.defender,
                });
                if self.side_of(hit.defender) == Some(Side::Enemy) {
                    self.aggro.remove_enemy(hit.defender);
                    touched.remove(&hit.defender);
                }
            }
            match (self.side_of(hit.attacker), self.side_of(hit.defender)) {
                (Some(Side::Ally), Some(Side::Enemy)) => {
                    if !hit.defeated {
                        let event = AggroEvent::damage(hit.attacker, hit.hp_ratio_lost);
                        self.aggro.add_event(hit.defender, &event);
                        touched.insert(hit.defender);
                    }
                }
                (Some(Side::Enemy), Some(Side::Ally)) => {
                    // Being hit makes the victim look less threatening to
                    // the enemy that hit it.
                    self.aggro
                        .add_damage_taken(hit.attacker, hit.defender, hit.hp_ratio_lost);
                    touched.insert(hit.attacker);
                }
                _ => {}
            }
        }

        for heal in &report.heals {
            if self.side_of(heal.source) == Some(Side::Ally) && heal.hp_ratio_restored > 0.0 {
                // Every enemy notices a healer at work.
                let event = AggroEvent::healing(heal.source, heal.hp_ratio_restored);
                let enemies: Vec<CombatantId> = self.aggro.tracked_enemies().collect();
                for enemy in enemies {
                    self.aggro.add_event(enemy, &event);
                    touched.insert(enemy);
                }
            }
        }

        for event in &report.aggro_events {
            match event.target {
                Some(enemy) => {
                    self.aggro.add_event(enemy, event);
                    touched.insert(enemy);
                }
                None => {
                    let enemies: Vec<CombatantId> = self.aggro.tracked_enemies().collect();
                    for enemy in enemies {
                        self.aggro.add_event(enemy, event);
                        touched.insert(enemy);
                    }
                }
            }
        }

        for enemy in touched {
            let _ = self.event_tx.send(BattleEvent::AggroShifted { enemy });
        }
    }

    fn side_of(&self, id: CombatantId) -> Option<Side> {
        self.state.combatant(id).map(|c| c.side)
    }
}
