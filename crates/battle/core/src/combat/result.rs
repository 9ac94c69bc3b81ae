//! Outcome types reported by the engine.
//!
//! Every call site switches on [`ActionOutcome`] instead of sentinel
//! values; cancellation and interruption are ordinary variants, not
//! exceptions or `None`s.

use crate::aggro::AggroEvent;
use crate::state::CombatantId;

/// Which side won a finished battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Victor {
    Allies,
    Enemies,
}

/// How an offered turn resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionOutcome {
    /// The action fully resolved and the action cost was charged.
    Completed,
    /// The actor chose no action; no side effects, no cost.
    Cancelled,
    /// A pending decision was cancelled because an opposing combatant
    /// became ready.
    Interrupted { by: CombatantId },
    /// The actor escaped; the battle ends with no victor.
    FleeSuccess,
    /// The action resolved and ended the battle.
    BattleOver(Victor),
}

/// One BRV hit, already applied to state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrvAttackReport {
    pub attacker: CombatantId,
    pub defender: CombatantId,
    pub damage: u32,
    /// BRV the attacker gained back from the hit.
    pub gained_brv: u32,
    /// The hit drove the defender into BREAK.
    pub defender_broke: bool,
    /// A cast on the defender was interrupted by the BREAK.
    pub interrupted_cast: bool,
}

/// One HP hit, already applied to state.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HpAttackReport {
    pub attacker: CombatantId,
    pub defender: CombatantId,
    /// Brave pool the attacker emptied into the hit.
    pub spent_brv: u32,
    pub damage: u32,
    /// Fraction of the defender's max HP this hit removed (0..1).
    pub hp_ratio_lost: f64,
    /// The defender was broken when the hit landed.
    pub target_was_broken: bool,
    /// The hit killed the defender.
    pub defeated: bool,
}

/// One restorative application (item or healing skill).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealReport {
    pub source: CombatantId,
    pub target: CombatantId,
    pub hp_restored: u32,
    pub mp_restored: u32,
    pub brv_granted: u32,
    /// Fraction of the target's max HP restored (0..1), for threat.
    pub hp_ratio_restored: f64,
}

/// How an in-flight cast left the `Casting` state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastResolution {
    /// The stored skill was applied against its surviving targets.
    Completed {
        caster: CombatantId,
        brv_hits: Vec<BrvAttackReport>,
        hp_hits: Vec<HpAttackReport>,
    },
    /// Every stored target became invalid; no effect was applied.
    Cancelled { caster: CombatantId },
    /// The caster broke or died before completion; no effect was applied.
    Interrupted { caster: CombatantId },
}

impl CastResolution {
    pub fn caster(&self) -> CombatantId {
        match *self {
            CastResolution::Completed { caster, .. }
            | CastResolution::Cancelled { caster }
            | CastResolution::Interrupted { caster } => caster,
        }
    }
}

/// Everything a resolved action produced, for the loop and the event bus.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionReport {
    pub brv_hits: Vec<BrvAttackReport>,
    pub hp_hits: Vec<HpAttackReport>,
    pub heals: Vec<HealReport>,
    /// Aggro events queued by effect handlers during resolution.
    pub aggro_events: Vec<AggroEvent>,
}

impl ActionReport {
    pub fn is_empty(&self) -> bool {
        self.brv_hits.is_empty()
            && self.hp_hits.is_empty()
            && self.heals.is_empty()
            && self.aggro_events.is_empty()
    }

    pub fn merge(&mut self, other: ActionReport) {
        self.brv_hits.extend(other.brv_hits);
        self.hp_hits.extend(other.hp_hits);
        self.heals.extend(other.heals);
        self.aggro_events.extend(other.aggro_events);
    }
}
