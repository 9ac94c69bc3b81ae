// Skill profile loader
//!
//! Loads skill profiles from RON data files.

use battle_core::SkillProfile;
use std::collections::HashMap;

/// Registry for skill profiles.
///
/// Loads [`SkillProfile`] data from RON files and provides lookup by name.
#[derive(Debug, Clone)]
pub struct SkillRegistry {
    skills: HashMap<String, SkillProfile>,
}

impl SkillRegistry {
    /// Loads all skill profiles from embedded RON data files.
    pub fn load() -> Result<Self, String> {
        let mut skills = HashMap::new();

        // Attack skills (BRV chip, HP converters, hybrids)
        let attack_ron = include_str!("../../data/skills/attack.ron");
        let attack_skills: Vec<SkillProfile> =
            ron::from_str(attack_ron).map_err(|e| format!("Failed to parse attack.ron: {}", e))?;
        for skill in attack_skills {
            skills.insert(skill.name.clone(), skill);
        }

        // Cast-time skills (delayed over ATB progress)
        let cast_ron = include_str!("../../data/skills/cast.ron");
        let cast_skills: Vec<SkillProfile> =
            ron::from_str(cast_ron).map_err(|e| format!("Failed to parse cast.ron: {}", e))?;
        for skill in cast_skills {
            skills.insert(skill.name.clone(), skill);
        }

        // Utility skills (taunts, drains, debuffs)
        let utility_ron = include_str!("../../data/skills/utility.ron");
        let utility_skills: Vec<SkillProfile> = ron::from_str(utility_ron)
            .map_err(|e| format!("Failed to parse utility.ron: {}", e))?;
        for skill in utility_skills {
            skills.insert(skill.name.clone(), skill);
        }

        Ok(Self { skills })
    }

    /// Gets a skill profile by name.
    ///
    /// # Panics
    ///
    /// Panics if the skill is not registered.
    pub fn get(&self, name: &str) -> &SkillProfile {
        self.skills
            .get(name)
            .unwrap_or_else(|| panic!("SkillProfile not found for {:?}", name))
    }

    /// Looks up a skill profile by name without panicking.
    pub fn lookup(&self, name: &str) -> Option<&SkillProfile> {
        self.skills.get(name)
    }

    /// Returns an iterator over all registered skill names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.skills.keys().map(String::as_str)
    }

    /// Returns the number of registered skill profiles.
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Returns true if no skill profiles are registered.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_skill_profiles() {
        let registry = SkillRegistry::load().expect("Failed to load skill profiles");

        assert!(registry.len() >= 6, "Should have at least 6 skill profiles");

        // Verify a basic chip skill
        let firebolt = registry.get("Firebolt");
        assert!(firebolt.brv_power > 0);
        assert_eq!(firebolt.hp_power, 0);
        assert!(firebolt.is_instant());

        // Verify a cast-time skill
        let meteor = registry.get("Meteor");
        assert!(meteor.cast_time_percent > 0);
        assert!(!meteor.is_instant());

        // Verify a tagged utility skill
        let provoke = registry.get("Provoke");
        assert!(provoke.has_tag("provoke"));
    }

    #[test]
    fn lookup_returns_none_for_unknown_names() {
        let registry = SkillRegistry::load().unwrap();
        assert!(registry.lookup("Not A Skill").is_none());
    }
}
