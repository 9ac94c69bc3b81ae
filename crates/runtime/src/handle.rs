//! Client-facing handle to interact with the battle worker.

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use battle_core::{ActionOutcome, ActionReport, BattleAction, BattleView, CombatantId, Side};

use crate::error::{Result, RuntimeError};
use crate::event::BattleEvent;
use crate::workers::Command;

/// Cloneable façade over the battle worker's channels.
///
/// Every method hands a command to the single-mutator worker and awaits
/// its reply; no state is touched from the caller's task.
#[derive(Clone)]
pub struct BattleHandle {
    command_tx: mpsc::Sender<Command>,
    event_tx: broadcast::Sender<BattleEvent>,
    ready_rx: watch::Receiver<u64>,
}

impl BattleHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_tx: broadcast::Sender<BattleEvent>,
        ready_rx: watch::Receiver<u64>,
    ) -> Self {
        Self {
            command_tx,
            event_tx,
            ready_rx,
        }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Selects the next eligible actor, if any, running its turn upkeep.
    pub async fn next_actor(&self) -> Result<Option<CombatantId>> {
        self.request(|reply| Command::NextActor { reply }).await
    }

    /// Executes a chosen action.
    pub async fn execute(&self, action: BattleAction) -> Result<(ActionOutcome, ActionReport)> {
        self.request(|reply| Command::ExecuteAction { action, reply })
            .await?
    }

    /// Samples an enemy's threat table for its next victim.
    pub async fn primary_target(&self, enemy: CombatantId) -> Result<Option<CombatantId>> {
        self.request(|reply| Command::PrimaryTarget { enemy, reply })
            .await
    }

    /// Captures a read-only presentation snapshot.
    pub async fn snapshot(&self) -> Result<BattleView> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Freezes or thaws every gauge (e.g. a status menu opened).
    pub async fn set_paused(&self, paused: bool) -> Result<()> {
        self.command_tx
            .send(Command::SetPaused { paused })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Engages or releases the symmetric deliberation throttle.
    pub async fn set_deliberating(&self, deliberating: bool) -> Result<()> {
        self.command_tx
            .send(Command::SetDeliberating { deliberating })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Applies the cross-the-board interrupt penalty to one side.
    pub async fn penalize_side(&self, side: Side) -> Result<()> {
        self.command_tx
            .send(Command::PenalizeSide { side })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Gives back an offered turn after an interrupt; unlike a cancel, the
    /// actor's gauge is left untouched.
    pub async fn release_turn(&self) -> Result<()> {
        self.command_tx
            .send(Command::ReleaseTurn)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Subscribes to the battle event bus.
    pub fn subscribe_events(&self) -> broadcast::Receiver<BattleEvent> {
        self.event_tx.subscribe()
    }

    /// Publishes an orchestration-level event (best-effort).
    pub(crate) fn publish(&self, event: BattleEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Waits until readiness may have changed (event-driven, no polling).
    pub async fn ready_changed(&mut self) -> Result<()> {
        self.ready_rx
            .changed()
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
