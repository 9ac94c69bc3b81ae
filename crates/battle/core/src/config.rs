use crate::state::Role;

/// Battle configuration constants and tunable parameters.
///
/// Every balance-relevant constant lives here rather than inline in the
/// resolvers, so a battle can be tuned (or a test pinned) without touching
/// rule code. `Default` carries the canonical values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    // ===== ATB scheduling =====
    /// Upper bound of every ATB gauge.
    pub atb_max: u32,
    /// Gauge value at which a combatant becomes eligible to act.
    pub ready_threshold: u32,
    /// Base gauge gain per tick before the speed ratio is applied.
    pub base_increase: u32,
    /// Lower clamp of `speed / average_speed` to prevent starvation.
    pub speed_ratio_min: f64,
    /// Upper clamp of `speed / average_speed` to prevent runaway.
    pub speed_ratio_max: f64,
    /// Gauge decrement applied after any completed action (not a reset).
    pub action_cost: u32,
    /// Gauge clamp and exclusion window applied after a cancelled turn.
    pub cancel_cooldown_ticks: u64,
    /// Tick rounds without a ready combatant before the anti-deadlock
    /// valve force-advances every gauge.
    pub deadlock_tick_limit: u32,
    /// Flat gauge increment used by the anti-deadlock valve.
    pub force_advance_amount: u32,
    /// Cross-the-board ATB penalty applied to a side whose pending
    /// decision was interrupted by an opposing combatant becoming ready.
    pub interrupt_penalty: u32,

    // ===== Brave/HP resolution =====
    /// Minimum BRV required for an HP attack to be selectable.
    pub hp_attack_min_brv: u32,
    /// Incoming HP damage multiplier while the target is broken.
    pub break_hp_multiplier: f64,
    /// Fraction of dealt BRV damage gained back by an ally attacker.
    pub brv_gain_rate_ally: f64,
    /// Fraction of dealt BRV damage gained back by an enemy attacker.
    ///
    /// Deliberately asymmetric with the ally rate; this is a balance
    /// lever, not an oversight.
    pub brv_gain_rate_enemy: f64,
    /// Defense divisor in the BRV damage formula.
    pub defense_divisor: u32,

    // ===== Flee =====
    /// Base flee chance in percent before the speed comparison adjusts it.
    pub flee_base_chance: u32,

    // ===== Threat =====
    pub aggro: AggroConfig,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum targets a single skill cast can hold.
    pub const MAX_TARGETS: usize = 8;
    /// Maximum special-effect tags carried by one skill or item.
    pub const MAX_EFFECT_TAGS: usize = 4;
    /// Power percentage of the untyped basic BRV/HP attacks.
    pub const BASIC_ATTACK_POWER: u32 = 100;

    pub fn new() -> Self {
        Self {
            atb_max: 2000,
            ready_threshold: 1000,
            base_increase: 30,
            speed_ratio_min: 0.5,
            speed_ratio_max: 2.0,
            action_cost: 1000,
            cancel_cooldown_ticks: 15,
            deadlock_tick_limit: 200,
            force_advance_amount: 50,
            interrupt_penalty: 200,
            hp_attack_min_brv: 300,
            break_hp_multiplier: 1.5,
            brv_gain_rate_ally: 1.0,
            brv_gain_rate_enemy: 0.33,
            defense_divisor: 2,
            flee_base_chance: 50,
            aggro: AggroConfig::new(),
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Tunables for the per-enemy threat tables.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggroConfig {
    /// Hard lower bound of any table entry.
    pub min_aggro: f64,
    /// Share of the table total below which no entry may fall.
    pub floor_share: f64,
    /// Per-turn multiplicative decay applied to every entry.
    pub decay_rate: f64,
    /// Guaranteed selection probability for every valid target.
    pub min_probability: f64,
    /// Scale factor converting an HP-ratio event value into threat units.
    pub hp_ratio_scale: f64,
    /// Event-kind weights, in [`AggroEventKind`] order:
    /// damage, healing, threat, taunt, protection, debuff.
    pub kind_weights: [f64; 6],
}

impl AggroConfig {
    pub fn new() -> Self {
        Self {
            min_aggro: 1.0,
            floor_share: 0.10,
            decay_rate: 0.03,
            min_probability: 0.10,
            hp_ratio_scale: 100.0,
            kind_weights: [1.0, 1.2, 1.0, 3.0, 1.5, 0.8],
        }
    }

    /// Baseline threat seeded for an ally when an enemy's table is created.
    ///
    /// Proportional to how much attention the role draws before anyone
    /// has done anything.
    pub fn role_baseline(&self, role: Role) -> f64 {
        match role {
            Role::Tank => 40.0,
            Role::Dps => 25.0,
            Role::Support => 20.0,
            Role::Healer => 15.0,
        }
    }
}

impl Default for AggroConfig {
    fn default() -> Self {
        Self::new()
    }
}
