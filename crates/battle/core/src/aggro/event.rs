//! Threat-relevant combat events.

use crate::state::CombatantId;

/// Classification of a threat event; each kind carries its own weight in
/// [`crate::config::AggroConfig::kind_weights`], in this declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AggroEventKind {
    Damage,
    Healing,
    Threat,
    Taunt,
    Protection,
    Debuff,
}

impl AggroEventKind {
    /// Index into [`crate::config::AggroConfig::kind_weights`].
    pub fn weight_index(self) -> usize {
        match self {
            AggroEventKind::Damage => 0,
            AggroEventKind::Healing => 1,
            AggroEventKind::Threat => 2,
            AggroEventKind::Taunt => 3,
            AggroEventKind::Protection => 4,
            AggroEventKind::Debuff => 5,
        }
    }
}

/// One threat-relevant occurrence, attributed to `source`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggroEvent {
    /// The ally whose threat this event adjusts.
    pub source: CombatantId,
    /// Affected combatant, when the event has a direction (heal target,
    /// taunted enemy).
    pub target: Option<CombatantId>,
    pub kind: AggroEventKind,
    /// Magnitude as an HP-ratio in `0..1`.
    pub base_value: f64,
    pub multiplier: f64,
    /// Advisory duration in turns; carried for handlers, not enforced by
    /// decay.
    pub duration_turns: u32,
}

impl AggroEvent {
    pub fn new(source: CombatantId, kind: AggroEventKind, base_value: f64) -> Self {
        Self {
            source,
            target: None,
            kind,
            base_value,
            multiplier: 1.0,
            duration_turns: 0,
        }
    }

    pub fn with_target(mut self, target: CombatantId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_duration(mut self, turns: u32) -> Self {
        self.duration_turns = turns;
        self
    }

    /// Damage dealt by `source`, expressed as the victim's HP-ratio lost.
    pub fn damage(source: CombatantId, hp_ratio: f64) -> Self {
        Self::new(source, AggroEventKind::Damage, hp_ratio)
    }

    /// Healing performed by `source`, as the target's HP-ratio restored.
    pub fn healing(source: CombatantId, hp_ratio: f64) -> Self {
        Self::new(source, AggroEventKind::Healing, hp_ratio)
    }

    /// Deliberate provocation by `source`.
    pub fn taunt(source: CombatantId, strength: f64) -> Self {
        Self::new(source, AggroEventKind::Taunt, strength)
    }
}
