//! Per-combatant mutable state.

use super::{BraveMeter, CombatantId, ResourceMeter, Role, Side, Tick};
use crate::casting::CastingState;

/// Stored stats that drive the resolvers.
///
/// `max_brv` is the base from which [`BraveMeter::maximum`] is derived;
/// the meter is recomputed whenever stats change so the maximum stays
/// dynamic rather than baked in at spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantStats {
    /// Offensive stat feeding BRV damage.
    pub attack: u32,
    /// Defensive stat reducing incoming BRV damage.
    pub defense: u32,
    /// Relative ATB gauge speed. Must be positive.
    pub speed: u32,
    /// Passive BRV regenerated at the start of each own turn ("INT BRV").
    pub int_brv: u32,
    /// Base maximum of the brave pool.
    pub max_brv: u32,
}

impl CombatantStats {
    pub fn new(attack: u32, defense: u32, speed: u32, int_brv: u32, max_brv: u32) -> Self {
        Self {
            attack,
            defense,
            speed,
            int_brv,
            max_brv,
        }
    }
}

impl Default for CombatantStats {
    fn default() -> Self {
        Self::new(100, 50, 100, 100, 1000)
    }
}

/// Complete mutable state of one combatant.
///
/// # Invariants
///
/// - `0 <= atb <= BattleConfig::atb_max`
/// - `broken` is true only while `brv.current == 0`, and only ever set by
///   an incoming BRV attack against an already-empty pool
/// - `casting` is exclusively owned here; it never outlives its combatant
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantState {
    pub id: CombatantId,
    /// Display name; unique within a battle.
    pub name: String,
    pub side: Side,
    pub role: Role,
    pub stats: CombatantStats,

    // === Resource pools ===
    pub hp: ResourceMeter,
    pub mp: ResourceMeter,
    pub brv: BraveMeter,

    // === Scheduling ===
    /// ATB gauge position.
    pub atb: u32,
    /// End of the post-cancel exclusion window, if one is active.
    pub cooldown_until: Option<Tick>,

    // === Status ===
    pub alive: bool,
    pub broken: bool,
    pub casting: Option<CastingState>,
}

impl CombatantState {
    pub fn new(
        id: CombatantId,
        name: impl Into<String>,
        side: Side,
        role: Role,
        stats: CombatantStats,
        hp_max: u32,
        mp_max: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            side,
            role,
            stats,
            hp: ResourceMeter::full(hp_max),
            mp: ResourceMeter::full(mp_max),
            brv: BraveMeter::new(stats.int_brv, stats.max_brv),
            atb: 0,
            cooldown_until: None,
            alive: true,
            broken: false,
            casting: None,
        }
    }

    /// Quick liveness check.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    pub fn is_casting(&self) -> bool {
        self.casting.is_some()
    }

    /// Whether the post-cancel exclusion window covers `now`.
    pub fn in_cancel_cooldown(&self, now: Tick) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Recomputes the brave maximum from stats, clamping the current pool.
    pub fn refresh_brv_maximum(&mut self) {
        self.brv.maximum = self.stats.max_brv;
        self.brv.current = self.brv.current.min(self.brv.maximum);
    }

    /// Marks the combatant dead: clears gauge, cast, and break state.
    pub fn mark_defeated(&mut self) {
        self.alive = false;
        self.atb = 0;
        self.casting = None;
        self.broken = false;
        self.cooldown_until = None;
    }

    pub fn with_atb(mut self, atb: u32) -> Self {
        self.atb = atb;
        self
    }

    pub fn with_brv(mut self, brv: u32) -> Self {
        self.brv.current = brv.min(self.brv.maximum);
        self
    }
}
