//! Action providers: the decision boundary.
//!
//! The loop asks a provider what an actor does with its turn. The bundled
//! AI provider composes threat sampling with a simple skill pick; a human
//! front-end supplies a [`ChannelProvider`] fed from its input loop.

pub mod ai;
pub mod scripted;

pub use ai::AggroAiProvider;
pub use scripted::{ChannelProvider, ScriptedProvider};

use async_trait::async_trait;

use battle_core::{BattleAction, BattleView, CombatantId};

use crate::error::Result;

/// Decides what `actor` does with an offered turn.
///
/// Implementations see a detached snapshot, never live state. A provider
/// future may be dropped at any time (the decision was interrupted), so
/// it must not hold side effects across awaits.
#[async_trait]
pub trait ActionProvider: Send + Sync {
    async fn provide_action(&self, actor: CombatantId, view: &BattleView) -> Result<BattleAction>;
}
