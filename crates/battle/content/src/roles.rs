//! Class-name → role classification.
//!
//! Drives the aggro baseline an enemy seeds for each ally. Unknown classes
//! default to damage-dealer, the least surprising assumption.

use battle_core::Role;

/// Classifies a character class name into a coarse battle role.
pub fn role_for_class(class: &str) -> Role {
    match class.to_ascii_lowercase().as_str() {
        "knight" | "paladin" | "guardian" | "warden" => Role::Tank,
        "cleric" | "priest" | "white mage" | "medic" => Role::Healer,
        "bard" | "dancer" | "scholar" | "tactician" => Role::Support,
        _ => Role::Dps,
    }
}
