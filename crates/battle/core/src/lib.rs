//! Deterministic Brave/ATB combat logic shared across clients.
//!
//! `battle-core` defines the canonical rules (combatants, ATB scheduling,
//! casting, Brave/HP resolution, aggro) and exposes pure APIs that can be
//! reused by both the runtime and offline tools. All state mutation flows
//! through [`engine::BattleEngine`], and supporting crates depend on the
//! types re-exported here.
pub mod action;
pub mod aggro;
pub mod casting;
pub mod combat;
pub mod config;
pub mod effects;
pub mod engine;
pub mod env;
pub mod skill;
pub mod snapshot;
pub mod state;

pub use action::{BattleAction, BattleActionKind};
pub use aggro::{AggroEngine, AggroEvent, AggroEventKind, AggroTable};
pub use casting::CastingState;
pub use combat::{
    ActionOutcome, ActionReport, BrvAttackReport, CastResolution, HealReport, HpAttackReport,
    Victor,
};
pub use config::{AggroConfig, BattleConfig};
pub use effects::{EffectContext, EffectRegistry};
pub use engine::{BattleEngine, CastError, ExecuteError, TickReport};
pub use env::{PcgRng, RngOracle, derive_seed};
pub use skill::{EffectTag, ItemProfile, SkillProfile};
pub use snapshot::{BattleView, CombatantView};
pub use state::{
    BattleState, BraveMeter, CombatantId, CombatantState, CombatantStats, ResourceMeter, Role,
    Side, Tick, TurnState,
};
