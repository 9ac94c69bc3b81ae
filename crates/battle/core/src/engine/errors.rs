//! Errors surfaced by engine operations.

use crate::state::CombatantId;

/// Failures while executing a chosen action.
///
/// Note what is *not* here: a dead or vanished target is not an error
/// (targets are silently dropped, and an action left with zero targets is
/// cancelled with no side effects).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExecuteError {
    #[error("combatant {0} does not exist in this battle")]
    UnknownCombatant(CombatantId),

    #[error("combatant {0} is dead and cannot act")]
    ActorDead(CombatantId),

    #[error("combatant {0} is mid-cast and cannot take a manual action")]
    ActorCasting(CombatantId),

    #[error("skill needs {needed} MP but {actor} has {available}")]
    InsufficientMp {
        actor: CombatantId,
        needed: u32,
        available: u32,
    },

    #[error("HP attack needs {needed} BRV but {actor} has {available}")]
    InsufficientBrave {
        actor: CombatantId,
        needed: u32,
        available: u32,
    },
}

/// Failures in the casting state machine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CastError {
    #[error("combatant {0} does not exist in this battle")]
    UnknownCombatant(CombatantId),

    #[error("combatant {0} has no cast in flight")]
    NotCasting(CombatantId),
}
