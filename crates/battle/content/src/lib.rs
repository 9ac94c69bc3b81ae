//! Battle content: skill and item data, role classification, and the
//! stock special-effect handlers.
//!
//! Data ships as RON files embedded at compile time and loaded into
//! registries once at startup; the engine consumes the records opaquely.

pub mod effects;
pub mod party;
pub mod roles;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use effects::register_default_effects;
pub use party::{CombatantSpec, assemble_battle};
pub use roles::role_for_class;

#[cfg(feature = "loaders")]
pub use loaders::{ItemRegistry, SkillRegistry};
