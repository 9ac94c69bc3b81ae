//! HP damage calculation.

/// Convert a spent brave pool into HP damage.
///
/// # Formula
///
/// ```text
/// base_damage = spent_brv × hp_power_percent / 100
/// final_damage = base_damage × break_multiplier   (if target is broken)
/// ```
///
/// Monotonic in the spent pool: a bigger pool always converts to at least
/// as much damage. A zero pool converts to zero (selectability is gated
/// separately by the minimum-BRV threshold).
pub fn calculate_hp_damage(
    spent_brv: u32,
    hp_power_percent: u32,
    target_broken: bool,
    break_multiplier: f64,
) -> u32 {
    let base_damage = spent_brv as u64 * hp_power_percent as u64 / 100;
    if target_broken {
        (base_damage as f64 * break_multiplier).round() as u32
    } else {
        base_damage.min(u32::MAX as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_is_monotonic_in_spent_brv() {
        let small = calculate_hp_damage(200, 100, false, 1.5);
        let large = calculate_hp_damage(500, 100, false, 1.5);
        assert!(large > small);
    }

    #[test]
    fn break_amplifies_damage() {
        let normal = calculate_hp_damage(400, 100, false, 1.5);
        let on_broken = calculate_hp_damage(400, 100, true, 1.5);
        assert_eq!(normal, 400);
        assert_eq!(on_broken, 600);
    }

    #[test]
    fn zero_pool_converts_to_zero() {
        assert_eq!(calculate_hp_damage(0, 150, true, 1.5), 0);
    }
}
