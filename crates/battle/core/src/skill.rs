//! Opaque skill and item records consumed by the resolvers.
//!
//! The combat resolver reads the numeric fields and dispatches
//! `effect_tags` blindly through [`crate::effects::EffectRegistry`]; it
//! never interprets what a tag means. Missing fields in data files default
//! to a safe zero-effect instead of aborting the battle.

use arrayvec::ArrayVec;
use std::fmt;

use crate::config::BattleConfig;

/// Special-effect tag carried by skills and items.
///
/// Tags are looked up in the effect registry at resolution time; unknown
/// tags are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EffectTag(pub String);

impl EffectTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EffectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EffectTag {
    fn from(tag: &str) -> Self {
        Self(tag.to_owned())
    }
}

/// Skill record at the data boundary.
///
/// All fields are defaulted so a malformed data row degrades to a
/// zero-effect skill rather than a startup failure.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkillProfile {
    pub name: String,
    /// BRV damage power percentage (0 = no BRV component).
    pub brv_power: u32,
    /// HP conversion power percentage (0 = no HP component).
    pub hp_power: u32,
    /// Cast time as a percentage of the ready threshold (0 = instant).
    pub cast_time_percent: u32,
    pub mp_cost: u32,
    /// Dispatched through the effect registry; unknown tags are ignored.
    pub effect_tags: ArrayVec<EffectTag, { BattleConfig::MAX_EFFECT_TAGS }>,
    /// Self-targeted skills survive their targets dying mid-cast.
    pub self_targeted: bool,
}

impl SkillProfile {
    /// Whether the skill resolves immediately when chosen.
    pub fn is_instant(&self) -> bool {
        self.cast_time_percent == 0
    }

    /// ATB units this cast needs, measured against the ready threshold.
    pub fn cast_duration(&self, ready_threshold: u32) -> u32 {
        self.cast_time_percent * ready_threshold / 100
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.effect_tags.iter().any(|t| t.as_str() == tag)
    }

    /// Named zero-effect skill; what malformed data degrades to.
    pub fn inert(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Item record at the data boundary. Items pay no MP and cast instantly.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ItemProfile {
    pub name: String,
    pub hp_restore: u32,
    pub mp_restore: u32,
    pub brv_grant: u32,
    pub effect_tags: ArrayVec<EffectTag, { BattleConfig::MAX_EFFECT_TAGS }>,
}
