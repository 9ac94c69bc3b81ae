//! In-flight skill cast state.
//!
//! A cast is a function of its owner's ATB progress, not a separate clock:
//! the same scheduler tick that advances gauges advances casts. Lifecycle:
//! created when a cast-time skill is chosen, destroyed on completion,
//! BREAK, death, or when every stored target becomes invalid.

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::skill::SkillProfile;
use crate::state::CombatantId;

/// An in-flight cast, exclusively owned by its combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastingState {
    pub skill: SkillProfile,
    /// Targets chosen at cast start; re-validated at completion.
    pub targets: ArrayVec<CombatantId, { BattleConfig::MAX_TARGETS }>,
    /// Gauge position when the cast began.
    pub start_atb: u32,
    /// ATB units required to finish.
    pub duration: u32,
}

impl CastingState {
    pub fn new(
        skill: SkillProfile,
        targets: ArrayVec<CombatantId, { BattleConfig::MAX_TARGETS }>,
        start_atb: u32,
        ready_threshold: u32,
    ) -> Self {
        let duration = skill.cast_duration(ready_threshold);
        Self {
            skill,
            targets,
            start_atb,
            duration,
        }
    }

    /// Cast progress in `[0, 1]` as a function of the current gauge.
    ///
    /// A gauge reset (BREAK) can leave `start_atb` above `atb_now`; the
    /// cast then restarts from zero progress rather than going negative.
    pub fn progress(&self, atb_now: u32) -> f32 {
        if self.duration == 0 {
            return 1.0;
        }
        let elapsed = atb_now.saturating_sub(self.start_atb);
        (elapsed as f32 / self.duration as f32).clamp(0.0, 1.0)
    }

    /// Whether the cast finishes on this gauge position.
    ///
    /// Completion also fires once the gauge crosses the ready line, a
    /// safety valve so casts started above it cannot stall forever.
    pub fn is_complete(&self, atb_now: u32, ready_threshold: u32) -> bool {
        self.progress(atb_now) >= 1.0 || atb_now >= ready_threshold
    }
}
