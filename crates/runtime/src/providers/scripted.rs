//! Deterministic and channel-fed providers.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use battle_core::{BattleAction, BattleView, CombatantId};

use crate::error::{Result, RuntimeError};

use super::ActionProvider;

/// Plays back a fixed queue of actions, then falls back to basic BRV
/// attacks. Deterministic; meant for tests and demos.
pub struct ScriptedProvider {
    queue: Mutex<VecDeque<BattleAction>>,
}

impl ScriptedProvider {
    pub fn new(actions: impl IntoIterator<Item = BattleAction>) -> Self {
        Self {
            queue: Mutex::new(actions.into_iter().collect()),
        }
    }

    pub fn empty() -> Self {
        Self::new([])
    }
}

#[async_trait]
impl ActionProvider for ScriptedProvider {
    async fn provide_action(&self, actor: CombatantId, view: &BattleView) -> Result<BattleAction> {
        if let Some(action) = self.queue.lock().expect("scripted queue poisoned").pop_front() {
            return Ok(action);
        }
        let side = view
            .combatant(actor)
            .ok_or_else(|| RuntimeError::Provider(format!("unknown actor {actor}")))?
            .side;
        let target = view
            .combatants
            .iter()
            .find(|c| c.alive && c.side == side.opponent())
            .map(|c| c.id)
            .ok_or_else(|| RuntimeError::Provider("no living opponents".into()))?;
        Ok(BattleAction::brv_attack(actor, target))
    }
}

/// Forwards decisions from an input channel: the human boundary.
///
/// The front-end pushes a [`BattleAction`] when the player confirms a
/// menu choice; until then the future simply stays pending, which is what
/// lets an opposing ready-up interrupt it.
pub struct ChannelProvider {
    rx: tokio::sync::Mutex<mpsc::Receiver<BattleAction>>,
}

impl ChannelProvider {
    /// Returns the provider plus the sender the front-end keeps.
    pub fn new(buffer: usize) -> (Self, mpsc::Sender<BattleAction>) {
        let (tx, rx) = mpsc::channel(buffer);
        (
            Self {
                rx: tokio::sync::Mutex::new(rx),
            },
            tx,
        )
    }
}

#[async_trait]
impl ActionProvider for ChannelProvider {
    async fn provide_action(&self, _actor: CombatantId, _view: &BattleView) -> Result<BattleAction> {
        self.rx
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| RuntimeError::Provider("decision channel closed".into()))
    }
}
