//! BRV damage calculation.

/// Calculate BRV damage from an attack.
///
/// # Formula
///
/// ```text
/// base_damage = attack × power_percent / 100
/// reduced_damage = base_damage - (defense / defense_divisor)
/// final_damage = max(reduced_damage, 1)
/// ```
///
/// Any monotonic function of attack, defense, and power would satisfy the
/// model; what is load-bearing is the floor at 1, so a hit always chips
/// the pool.
pub fn calculate_brv_damage(
    attack: u32,
    defense: u32,
    power_percent: u32,
    defense_divisor: u32,
) -> u32 {
    let base_damage = attack * power_percent / 100;
    let reduction = defense / defense_divisor.max(1);
    base_damage.saturating_sub(reduction).max(1)
}

/// BRV gained back by the attacker from dealing `damage`.
///
/// The rate differs by attacker side (an explicit config knob, not a
/// hidden constant).
pub fn brv_gain(damage: u32, rate: f64) -> u32 {
    (damage as f64 * rate).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_floors_at_one() {
        // Defense towers over the attack: still chips for 1.
        assert_eq!(calculate_brv_damage(10, 10_000, 100, 2), 1);
        assert_eq!(calculate_brv_damage(0, 0, 0, 2), 1);
    }

    #[test]
    fn damage_is_monotonic_in_attack_and_power() {
        let low = calculate_brv_damage(100, 50, 100, 2);
        let stronger = calculate_brv_damage(200, 50, 100, 2);
        let harder = calculate_brv_damage(100, 50, 150, 2);
        assert!(stronger > low);
        assert!(harder > low);
    }

    #[test]
    fn defense_reduces_damage() {
        let soft = calculate_brv_damage(200, 0, 100, 2);
        let armored = calculate_brv_damage(200, 100, 100, 2);
        assert!(armored < soft);
        assert_eq!(soft - armored, 50);
    }

    #[test]
    fn gain_rounds_at_the_configured_rate() {
        assert_eq!(brv_gain(100, 1.0), 100);
        assert_eq!(brv_gain(100, 0.33), 33);
        assert_eq!(brv_gain(3, 0.5), 2); // rounds half up
        assert_eq!(brv_gain(0, 1.0), 0);
    }
}
