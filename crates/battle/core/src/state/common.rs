use std::fmt;

/// Unique identifier for a combatant within one battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which side of the battle a combatant fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Ally,
    Enemy,
}

impl Side {
    /// The opposing side.
    pub fn opponent(self) -> Side {
        match self {
            Side::Ally => Side::Enemy,
            Side::Enemy => Side::Ally,
        }
    }
}

/// Coarse role classification used to seed threat baselines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    Tank,
    Healer,
    Dps,
    Support,
}

/// Discrete time unit counted by the ATB scheduler.
///
/// One `Tick` is one scheduler advance; at the runtime's fixed cadence it is
/// proportional to wall-clock time, which is why the cancellation cooldown
/// window is expressed in ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer resource meter (health, magic) tracked per combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    pub fn new(current: u32, maximum: u32) -> Self {
        Self { current, maximum }
    }

    pub fn full(maximum: u32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Subtracts `amount`, clamping at zero.
    pub fn deplete(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    /// Adds `amount`, clamping at the maximum.
    pub fn restore(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.maximum);
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }
}

/// Brave meter: a spendable pool that converts to HP damage.
///
/// Unlike [`ResourceMeter`], sitting at zero is an ordinary (if dangerous)
/// state, and the maximum is recomputed from stats rather than fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BraveMeter {
    pub current: u32,
    pub maximum: u32,
}

impl BraveMeter {
    pub fn new(current: u32, maximum: u32) -> Self {
        Self { current, maximum }
    }

    /// Subtracts `amount`, clamping at zero.
    pub fn deplete(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    /// Adds `amount`, clamping at the maximum.
    pub fn gain(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.maximum);
    }

    /// Empties the pool and returns what was in it.
    pub fn drain(&mut self) -> u32 {
        std::mem::take(&mut self.current)
    }
}
