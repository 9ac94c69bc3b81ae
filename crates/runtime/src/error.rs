//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and action providers so
//! clients can bubble them up with consistent context.

use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("battle worker command channel closed")]
    CommandChannelClosed,

    #[error("battle worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("battle worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("no action provider configured for {side:?}")]
    ProviderNotSet { side: battle_core::Side },

    #[error("battle loop requires a battle state before starting")]
    MissingBattleState,

    #[error("action provider failed: {0}")]
    Provider(String),

    #[error("action actor {provided} does not match current actor {expected}")]
    StaleActor {
        expected: battle_core::CombatantId,
        provided: battle_core::CombatantId,
    },

    #[error(transparent)]
    Execute(#[from] battle_core::ExecuteError),

    #[error(transparent)]
    Cast(#[from] battle_core::CastError),
}
