//! Tokio orchestration for one battle.
//!
//! The runtime owns background workers (the battle worker holding the
//! authoritative state and the ATB ticker), wires up command/event
//! channels, and exposes a cloneable [`BattleHandle`] plus the
//! [`BattleLoop`] driver that runs the turn cycle.
//!
//! Concurrency discipline: exactly one task (the battle worker) mutates
//! combat and threat state. The ticker and every reader hand requests over
//! the command queue; the decision layer reads snapshots only.

pub mod battle_loop;
pub mod config;
pub mod error;
pub mod event;
pub mod handle;
pub mod providers;
pub mod workers;

pub use battle_loop::{BattleLoop, BattleLoopBuilder, BattleSummary};
pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use event::BattleEvent;
pub use handle::BattleHandle;
pub use providers::{ActionProvider, AggroAiProvider, ChannelProvider, ScriptedProvider};
pub use workers::{BattleWorker, Command, TickerWorker};
