//! High-level battle orchestrator.
//!
//! Owns the background workers, wires up channels, and drives the turn
//! cycle: tick → resolve order → act → apply consequences → end check.
//! Waiting for a ready combatant is event-driven (a `watch` wake from the
//! worker), never a sleep-poll.

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use battle_core::{
    ActionOutcome, BattleState, BattleView, CombatantId, EffectRegistry, Side, Tick, Victor,
};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::event::BattleEvent;
use crate::handle::BattleHandle;
use crate::providers::{ActionProvider, AggroAiProvider, ScriptedProvider};
use crate::workers::{BattleWorker, TickerWorker};

/// How one finished battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleSummary {
    /// `None` means the party fled.
    pub victor: Option<Victor>,
    /// Scheduler clock at battle end.
    pub clock: Tick,
}

enum StepOutcome {
    Continue,
    Finished(BattleSummary),
}

enum Decision {
    Action(battle_core::BattleAction),
    Interrupted { by: CombatantId },
}

/// Builder wiring state, providers, and config into a running loop.
pub struct BattleLoopBuilder {
    config: RuntimeConfig,
    state: Option<BattleState>,
    effects: EffectRegistry,
    ally_provider: Option<Box<dyn ActionProvider>>,
    enemy_provider: Option<Box<dyn ActionProvider>>,
    ai_allies: bool,
}

impl BattleLoopBuilder {
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            state: None,
            effects: EffectRegistry::new(),
            ally_provider: None,
            enemy_provider: None,
            ai_allies: false,
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(mut self, state: BattleState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn effects(mut self, effects: EffectRegistry) -> Self {
        self.effects = effects;
        self
    }

    pub fn ally_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.ally_provider = Some(Box::new(provider));
        self
    }

    pub fn enemy_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.enemy_provider = Some(Box::new(provider));
        self
    }

    /// Drives the ally side with the threat-aware AI as well (auto-battle
    /// and AI-vs-AI simulations).
    pub fn ai_allies(mut self) -> Self {
        self.ai_allies = true;
        self
    }

    /// Spawns the workers and returns the running loop.
    pub fn start(self) -> Result<BattleLoop> {
        let mut state = self.state.ok_or(RuntimeError::MissingBattleState)?;
        if state.battle_seed == 0 {
            state.battle_seed = rand::random();
        }

        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);
        let (event_tx, _) = broadcast::channel(self.config.event_buffer_size);
        let (ready_tx, ready_rx) = watch::channel(0u64);

        let handle = BattleHandle::new(command_tx.clone(), event_tx.clone(), ready_rx);

        let worker = BattleWorker::new(
            state,
            self.config.battle_config.clone(),
            self.effects,
            self.config.deliberation_throttle,
            command_rx,
            event_tx,
            ready_tx,
        );
        let worker_handle = tokio::spawn(worker.run());

        let ticker = TickerWorker::new(
            command_tx,
            self.config.tick_hz,
            self.config.ticks_per_advance,
        );
        let ticker_handle = tokio::spawn(ticker.run());

        let ally_provider: Box<dyn ActionProvider> = match self.ally_provider {
            Some(provider) => provider,
            None if self.ai_allies => Box::new(AggroAiProvider::new(
                handle.clone(),
                self.config.battle_config.hp_attack_min_brv,
            )),
            None => Box::new(ScriptedProvider::empty()),
        };
        let enemy_provider: Box<dyn ActionProvider> = match self.enemy_provider {
            Some(provider) => provider,
            None => Box::new(AggroAiProvider::new(
                handle.clone(),
                self.config.battle_config.hp_attack_min_brv,
            )),
        };

        Ok(BattleLoop {
            handle,
            ally_provider,
            enemy_provider,
            worker_handle,
            ticker_handle,
        })
    }
}

impl Default for BattleLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main battle driver.
///
/// Design: the loop owns the workers and providers; [`BattleHandle`]
/// provides a cloneable façade for observers.
pub struct BattleLoop {
    handle: BattleHandle,
    ally_provider: Box<dyn ActionProvider>,
    enemy_provider: Box<dyn ActionProvider>,
    worker_handle: JoinHandle<()>,
    ticker_handle: JoinHandle<()>,
}

impl BattleLoop {
    pub fn builder() -> BattleLoopBuilder {
        BattleLoopBuilder::new()
    }

    /// A cloneable handle for observers and front-ends.
    pub fn handle(&self) -> BattleHandle {
        self.handle.clone()
    }

    /// Runs the turn cycle until the battle ends.
    pub async fn run(&mut self) -> Result<BattleSummary> {
        loop {
            match self.step().await? {
                StepOutcome::Continue => {}
                StepOutcome::Finished(summary) => return Ok(summary),
            }
        }
    }

    /// One turn of the cycle.
    async fn step(&mut self) -> Result<StepOutcome> {
        let actor = match self.wait_for_actor().await? {
            Ok(actor) => actor,
            Err(summary) => return Ok(StepOutcome::Finished(summary)),
        };

        let view = self.handle.snapshot().await?;
        let side = view
            .combatant(actor)
            .map(|c| c.side)
            .ok_or_else(|| RuntimeError::Provider(format!("actor {actor} vanished")))?;

        let decision = match side {
            // The human side deliberates under the symmetric throttle and
            // can be interrupted by an opposing ready-up.
            Side::Ally => {
                self.handle.set_deliberating(true).await?;
                let mut events = self.handle.subscribe_events();
                let decision = tokio::select! {
                    action = self.ally_provider.provide_action(actor, &view) => {
                        Decision::Action(action?)
                    }
                    by = opposing_ready(&mut events, &view, side) => {
                        Decision::Interrupted { by }
                    }
                };
                self.handle.set_deliberating(false).await?;
                decision
            }
            Side::Enemy => Decision::Action(
                self.enemy_provider.provide_action(actor, &view).await?,
            ),
        };

        match decision {
            Decision::Action(action) => {
                let (outcome, _report) = self.handle.execute(action).await?;
                match outcome {
                    ActionOutcome::BattleOver(victor) => {
                        let view = self.handle.snapshot().await?;
                        Ok(StepOutcome::Finished(BattleSummary {
                            victor: Some(victor),
                            clock: view.clock,
                        }))
                    }
                    ActionOutcome::FleeSuccess => {
                        let view = self.handle.snapshot().await?;
                        Ok(StepOutcome::Finished(BattleSummary {
                            victor: None,
                            clock: view.clock,
                        }))
                    }
                    ActionOutcome::Completed
                    | ActionOutcome::Cancelled
                    | ActionOutcome::Interrupted { .. } => Ok(StepOutcome::Continue),
                }
            }
            Decision::Interrupted { by } => {
                debug!(target: "runtime::loop", %actor, %by, "menu interrupted by opposing ready-up");
                // Not a cancellation: the actor keeps its gauge, and the
                // whole side pays the cross-the-board interrupt penalty.
                self.handle.release_turn().await?;
                self.handle.penalize_side(side).await?;
                self.handle
                    .publish(BattleEvent::DecisionInterrupted { actor, by });
                Ok(StepOutcome::Continue)
            }
        }
    }

    /// Waits (event-driven) until an actor is eligible or the battle is
    /// decided without one (e.g. a lethal cast resolution).
    async fn wait_for_actor(&mut self) -> Result<std::result::Result<CombatantId, BattleSummary>> {
        loop {
            let view = self.handle.snapshot().await?;
            if let Some(victor) = victor_of(&view) {
                return Ok(Err(BattleSummary {
                    victor: Some(victor),
                    clock: view.clock,
                }));
            }
            if let Some(actor) = self.handle.next_actor().await? {
                return Ok(Ok(actor));
            }
            self.handle.ready_changed().await?;
        }
    }

    /// Stops the workers and waits for them to wind down.
    pub async fn shutdown(self) -> Result<()> {
        let BattleLoop {
            handle,
            ally_provider,
            enemy_provider,
            worker_handle,
            ticker_handle,
        } = self;

        // The ticker holds a sender clone; stop it first so dropping the
        // remaining handles closes the worker's queue.
        ticker_handle.abort();
        drop(ally_provider);
        drop(enemy_provider);
        drop(handle);

        worker_handle.await.map_err(RuntimeError::WorkerJoin)?;
        Ok(())
    }
}

/// Side-wipe check on a snapshot.
fn victor_of(view: &BattleView) -> Option<Victor> {
    let enemies_alive = view.combatants.iter().any(|c| c.alive && c.side == Side::Enemy);
    let allies_alive = view.combatants.iter().any(|c| c.alive && c.side == Side::Ally);
    match (allies_alive, enemies_alive) {
        (true, false) => Some(Victor::Allies),
        (false, true) => Some(Victor::Enemies),
        (false, false) => Some(Victor::Enemies),
        (true, true) => None,
    }
}

/// Resolves when an opposing combatant crosses the ready line.
async fn opposing_ready(
    events: &mut broadcast::Receiver<BattleEvent>,
    view: &BattleView,
    side: Side,
) -> CombatantId {
    loop {
        match events.recv().await {
            Ok(BattleEvent::TurnReady { combatant }) => {
                let is_opponent = view
                    .combatant(combatant)
                    .is_some_and(|c| c.side == side.opponent());
                if is_opponent {
                    return combatant;
                }
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(target: "runtime::loop", skipped, "event bus lagged while watching for interrupts");
            }
            Err(broadcast::error::RecvError::Closed) => {
                // Worker gone; nothing will ever interrupt. Stay pending so
                // the provider branch decides the select.
                std::future::pending::<()>().await;
            }
        }
    }
}
