//! Per-battle threat engine: one table per living enemy.

use std::collections::HashMap;

use super::event::AggroEvent;
use super::table::AggroTable;
use crate::config::AggroConfig;
use crate::env::RngOracle;
use crate::state::{CombatantId, Role};

/// Owns every enemy's [`AggroTable`] for the duration of one battle.
///
/// Loosely coupled to the resolvers: combat hands events in, AI asks for a
/// sampled target out. Any operation naming an unknown enemy is a no-op
/// (the enemy may have died mid-turn), logged at debug level only.
#[derive(Clone, Debug, Default)]
pub struct AggroEngine {
    config: AggroConfig,
    tables: HashMap<CombatantId, AggroTable>,
    /// Role lookup for seeding baselines when an unseen ally first
    /// generates threat.
    roles: HashMap<CombatantId, Role>,
}

impl AggroEngine {
    pub fn new(config: AggroConfig) -> Self {
        Self {
            config,
            tables: HashMap::new(),
            roles: HashMap::new(),
        }
    }

    pub fn config(&self) -> &AggroConfig {
        &self.config
    }

    /// Creates the enemy's table, seeded with a per-ally baseline
    /// proportional to role.
    pub fn register_enemy(&mut self, enemy: CombatantId, allies: &[(CombatantId, Role)]) {
        let mut table = AggroTable::new();
        for &(ally, role) in allies {
            self.roles.insert(ally, role);
            table.seed(ally, self.config.role_baseline(role));
        }
        self.tables.insert(enemy, table);
    }

    /// Drops the enemy's table (death or battle end).
    pub fn remove_enemy(&mut self, enemy: CombatantId) {
        self.tables.remove(&enemy);
    }

    pub fn table(&self, enemy: CombatantId) -> Option<&AggroTable> {
        self.tables.get(&enemy)
    }

    pub fn tracked_enemies(&self) -> impl Iterator<Item = CombatantId> + '_ {
        self.tables.keys().copied()
    }

    /// Feeds one event into `enemy`'s table.
    pub fn add_event(&mut self, enemy: CombatantId, event: &AggroEvent) {
        let baseline = self.baseline_for(event.source);
        let weight = self.config.kind_weights[event.kind.weight_index()];
        let delta = event.base_value * self.config.hp_ratio_scale * event.multiplier * weight;
        let Some(table) = self.tables.get_mut(&enemy) else {
            tracing::debug!(target: "battle_core::aggro", %enemy, "event for untracked enemy dropped");
            return;
        };
        if !table.contains(event.source) {
            table.seed(event.source, baseline);
        }
        table.apply_delta(event.source, delta, &self.config);
    }

    /// Being hit makes the victim look like less of a threat: a negative
    /// delta on the damaged ally, redistributed to the rest.
    pub fn add_damage_taken(&mut self, enemy: CombatantId, ally: CombatantId, hp_ratio_lost: f64) {
        let baseline = self.baseline_for(ally);
        let delta = -(hp_ratio_lost * self.config.hp_ratio_scale);
        let Some(table) = self.tables.get_mut(&enemy) else {
            tracing::debug!(target: "battle_core::aggro", %enemy, "damage-taken for untracked enemy dropped");
            return;
        };
        if !table.contains(ally) {
            table.seed(ally, baseline);
        }
        table.apply_delta(ally, delta, &self.config);
    }

    /// Per-turn decay for one enemy. Unknown enemies are a no-op.
    pub fn decay(&mut self, enemy: CombatantId) {
        match self.tables.get_mut(&enemy) {
            Some(table) => table.decay(&self.config),
            None => {
                tracing::debug!(target: "battle_core::aggro", %enemy, "decay for untracked enemy dropped");
            }
        }
    }

    /// Per-turn decay across every tracked enemy.
    pub fn decay_all(&mut self) {
        for table in self.tables.values_mut() {
            table.decay(&self.config);
        }
    }

    /// Samples `enemy`'s next victim from the living allies it tracks.
    ///
    /// Every valid candidate keeps at least `min_probability` regardless
    /// of how lopsided the raw threat is, so a low-threat healer is never
    /// structurally safe.
    pub fn primary_target(
        &self,
        enemy: CombatantId,
        alive_allies: &[CombatantId],
        rng: &dyn RngOracle,
        seed: u64,
    ) -> Option<CombatantId> {
        let table = self.tables.get(&enemy)?;

        let mut candidates: Vec<(CombatantId, f64)> = alive_allies
            .iter()
            .filter_map(|&ally| {
                table
                    .get(ally)
                    .filter(|&aggro| aggro >= self.config.min_aggro)
                    .map(|aggro| (ally, aggro))
            })
            .collect();
        if candidates.is_empty() {
            return None;
        }
        // Deterministic candidate order regardless of table iteration.
        candidates.sort_by_key(|&(id, _)| id);

        let n = candidates.len() as f64;
        let guaranteed_total = self.config.min_probability * n;
        let raw_sum: f64 = candidates.iter().map(|&(_, aggro)| aggro).sum();

        let probabilities: Vec<f64> = if raw_sum <= 0.0 {
            vec![1.0 / n; candidates.len()]
        } else {
            candidates
                .iter()
                .map(|&(_, aggro)| {
                    self.config.min_probability + (aggro / raw_sum) * (1.0 - guaranteed_total)
                })
                .collect()
        };

        let index = rng.weighted_pick(seed, &probabilities)?;
        Some(candidates[index].0)
    }

    fn baseline_for(&self, ally: CombatantId) -> f64 {
        let role = self.roles.get(&ally).copied().unwrap_or(Role::Dps);
        self.config.role_baseline(role)
    }
}
