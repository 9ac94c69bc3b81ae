//! Tagged special-effect registry.
//!
//! Skills carry opaque effect tags; a `tag → handler` map resolved once at
//! startup replaces per-class branching with open registration and keeps
//! the combat resolver class-agnostic. Unknown tags are ignored with a
//! debug log, never an error.

use std::collections::HashMap;

use crate::aggro::AggroEvent;
use crate::skill::SkillProfile;
use crate::state::{BattleState, CombatantId};

/// Mutable view handed to an effect handler.
///
/// Handlers mutate combat state directly and queue aggro events for the
/// battle loop to feed into the threat engine; they never touch the
/// threat tables themselves.
pub struct EffectContext<'a> {
    pub state: &'a mut BattleState,
    pub caster: CombatantId,
    pub target: Option<CombatantId>,
    /// Aggro events emitted by handlers, drained by the caller.
    pub queued_aggro: Vec<AggroEvent>,
}

/// Handler invoked for one effect tag occurrence.
pub type EffectHandler = Box<dyn Fn(&mut EffectContext<'_>, &SkillProfile) + Send + Sync>;

/// Registry mapping effect tags to handlers.
///
/// Populated once at startup (the content crate registers the stock
/// handlers); the resolver dispatches through it without knowing what any
/// tag means.
#[derive(Default)]
pub struct EffectRegistry {
    handlers: HashMap<String, EffectHandler>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `tag`, replacing any previous one.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        handler: impl Fn(&mut EffectContext<'_>, &SkillProfile) + Send + Sync + 'static,
    ) {
        self.handlers.insert(tag.into(), Box::new(handler));
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.handlers.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs every tag of `skill` against the registry.
    ///
    /// Returns the aggro events queued by handlers. Unknown tags are
    /// skipped with a debug log.
    pub fn dispatch(
        &self,
        state: &mut BattleState,
        caster: CombatantId,
        target: Option<CombatantId>,
        skill: &SkillProfile,
    ) -> Vec<AggroEvent> {
        let mut ctx = EffectContext {
            state,
            caster,
            target,
            queued_aggro: Vec::new(),
        };
        for tag in &skill.effect_tags {
            match self.handlers.get(tag.as_str()) {
                Some(handler) => handler(&mut ctx, skill),
                None => {
                    tracing::debug!(target: "battle_core::effects", %tag, skill = %skill.name, "unknown effect tag ignored");
                }
            }
        }
        ctx.queued_aggro
    }
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("tags", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
