//! Per-enemy threat table with constrained redistribution.

use std::collections::HashMap;

use crate::config::AggroConfig;
use crate::state::CombatantId;

/// Tolerance for floating comparisons in the constraint pass.
const EPSILON: f64 = 1e-9;

/// Cap on constraint-pass iterations. The proportional deduction converges
/// in a handful of rounds; past this the all-at-floor fallback applies.
const MAX_FLOOR_PASSES: usize = 32;

/// Threat weights one enemy holds over the allies it tracks.
///
/// # Invariants
///
/// - every entry `>= min_aggro`
/// - after every mutation, every entry `>= floor_share × sum(entries)`
/// - rebalancing conserves the sum (within floating error)
#[derive(Clone, Debug, Default)]
pub struct AggroTable {
    entries: HashMap<CombatantId, f64>,
}

impl AggroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an entry at `baseline` threat, replacing any existing value.
    pub fn seed(&mut self, ally: CombatantId, baseline: f64) {
        self.entries.insert(ally, baseline.max(0.0));
    }

    pub fn remove(&mut self, ally: CombatantId) {
        self.entries.remove(&ally);
    }

    pub fn contains(&self, ally: CombatantId) -> bool {
        self.entries.contains_key(&ally)
    }

    pub fn get(&self, ally: CombatantId) -> Option<f64> {
        self.entries.get(&ally).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }

    /// Iterates over `(ally, threat)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (CombatantId, f64)> + '_ {
        self.entries.iter().map(|(&id, &value)| (id, value))
    }

    /// Applies `delta` to `source` and redistributes the negation across
    /// every other entry, conserving the total, then re-enforces the
    /// minimum-share floor.
    ///
    /// The caller must have created the source entry first (the engine
    /// seeds it at the role baseline when absent).
    pub fn apply_delta(&mut self, source: CombatantId, delta: f64, config: &AggroConfig) {
        let n = self.entries.len();
        let Some(entry) = self.entries.get_mut(&source) else {
            return;
        };
        *entry = (*entry + delta).max(config.min_aggro);

        if n > 1 {
            let absorbed = delta / (n - 1) as f64;
            for (&id, value) in self.entries.iter_mut() {
                if id != source {
                    *value = (*value - absorbed).max(config.min_aggro);
                }
            }
        }

        self.enforce_floor(config);
    }

    /// Raises every entry to at least `floor_share × total`, paying for the
    /// raise proportionally out of the entries above the floor.
    ///
    /// Iterative constraint satisfaction: proportional deduction can leave
    /// a new entry under the floor, so the pass repeats until stable. If
    /// every entry sits at or under the floor simultaneously, the table
    /// falls back to an equal split of the total.
    pub fn enforce_floor(&mut self, config: &AggroConfig) {
        if self.entries.len() < 2 {
            return;
        }
        let total = self.total();
        if total <= EPSILON {
            return;
        }
        let floor = config.floor_share * total;

        for _ in 0..MAX_FLOOR_PASSES {
            // Raise the deficient entries and tally what that cost.
            let mut shortfall = 0.0;
            for value in self.entries.values_mut() {
                if *value < floor {
                    shortfall += floor - *value;
                    *value = floor;
                }
            }
            if shortfall <= EPSILON {
                return;
            }

            // Pay the shortfall proportionally from above-floor entries,
            // never pushing any of them below the floor.
            let headroom: f64 = self
                .entries
                .values()
                .map(|v| (v - floor).max(0.0))
                .sum();
            if headroom <= shortfall + EPSILON {
                // Everyone is effectively at the floor: equal split.
                let share = total / self.entries.len() as f64;
                for value in self.entries.values_mut() {
                    *value = share;
                }
                return;
            }
            for value in self.entries.values_mut() {
                let room = (*value - floor).max(0.0);
                if room > 0.0 {
                    *value -= shortfall * room / headroom;
                }
            }
        }
    }

    /// Multiplies every entry by `1 - decay_rate`, clamped to `min_aggro`.
    pub fn decay(&mut self, config: &AggroConfig) {
        for value in self.entries.values_mut() {
            *value = (*value * (1.0 - config.decay_rate)).max(config.min_aggro);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AggroConfig {
        AggroConfig::new()
    }

    fn table_of(values: &[(u32, f64)]) -> AggroTable {
        let mut table = AggroTable::new();
        for &(id, value) in values {
            table.seed(CombatantId(id), value);
        }
        table
    }

    fn assert_floor_holds(table: &AggroTable, cfg: &AggroConfig) {
        let total = table.total();
        for (id, value) in table.iter() {
            assert!(
                value >= cfg.floor_share * total - 1e-6,
                "{id} at {value} under floor of total {total}"
            );
        }
    }

    #[test]
    fn apply_delta_conserves_total() {
        let cfg = config();
        let mut table = table_of(&[(0, 40.0), (1, 30.0), (2, 30.0)]);
        let before = table.total();

        table.apply_delta(CombatantId(0), 20.0, &cfg);
        assert!((table.total() - before).abs() < 1e-6);
        assert!(table.get(CombatantId(0)).unwrap() > 40.0);
        assert!(table.get(CombatantId(1)).unwrap() < 30.0);
    }

    #[test]
    fn negative_delta_redistributes_to_others() {
        let cfg = config();
        let mut table = table_of(&[(0, 40.0), (1, 40.0), (2, 40.0)]);
        let before = table.total();

        table.apply_delta(CombatantId(1), -15.0, &cfg);
        assert!((table.total() - before).abs() < 1e-6);
        assert!(table.get(CombatantId(1)).unwrap() < 40.0);
        assert!(table.get(CombatantId(0)).unwrap() > 40.0);
        assert_floor_holds(&table, &cfg);
    }

    #[test]
    fn floor_raises_starved_entries() {
        let cfg = config();
        let mut table = table_of(&[(0, 96.0), (1, 2.0), (2, 2.0)]);
        let before = table.total();

        table.enforce_floor(&cfg);

        assert!((table.total() - before).abs() < 1e-6);
        assert_floor_holds(&table, &cfg);
        // The dominant entry paid for the raise.
        assert!(table.get(CombatantId(0)).unwrap() < 96.0);
    }

    #[test]
    fn all_at_floor_falls_back_to_equal_split() {
        let cfg = AggroConfig {
            // Floor of 40% across 3 entries is unsatisfiable without a split.
            floor_share: 0.4,
            ..AggroConfig::new()
        };
        let mut table = table_of(&[(0, 10.0), (1, 10.0), (2, 10.0)]);
        table.enforce_floor(&cfg);
        for (_, value) in table.iter() {
            assert!((value - 10.0).abs() < 1e-6);
        }
    }

    #[test]
    fn floor_holds_after_repeated_lopsided_events() {
        let cfg = config();
        let mut table = table_of(&[(0, 10.0), (1, 10.0), (2, 10.0), (3, 10.0)]);
        for _ in 0..50 {
            table.apply_delta(CombatantId(0), 25.0, &cfg);
            assert_floor_holds(&table, &cfg);
        }
    }

    #[test]
    fn decay_shrinks_toward_min_aggro() {
        let cfg = config();
        let mut table = table_of(&[(0, 100.0), (1, 1.0)]);
        table.decay(&cfg);
        assert!((table.get(CombatantId(0)).unwrap() - 97.0).abs() < 1e-9);
        // Already at the minimum: clamped, not shrunk.
        assert_eq!(table.get(CombatantId(1)).unwrap(), 1.0);
    }
}
