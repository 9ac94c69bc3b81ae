//! Dynamic threat tracking.
//!
//! Each enemy owns an [`AggroTable`] over the allies it has noticed.
//! Combat feeds [`AggroEvent`]s in; target selection samples a
//! probability-weighted draw out. Two invariants hold after every
//! mutation:
//!
//! - no tracked ally ever falls below 10% of the table total (a low-threat
//!   healer still draws attacks), and
//! - rebalancing redistributes threat rather than creating it.

pub mod engine;
pub mod event;
pub mod table;

pub use engine::AggroEngine;
pub use event::{AggroEvent, AggroEventKind};
pub use table::AggroTable;
