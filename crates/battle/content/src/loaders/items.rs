// Item profile loader
//!
//! Loads item profiles from RON data files.

use battle_core::ItemProfile;
use std::collections::HashMap;

/// Registry for item profiles, loaded from RON and keyed by name.
#[derive(Debug, Clone)]
pub struct ItemRegistry {
    items: HashMap<String, ItemProfile>,
}

impl ItemRegistry {
    /// Loads all item profiles from embedded RON data files.
    pub fn load() -> Result<Self, String> {
        let mut items = HashMap::new();

        let basic_ron = include_str!("../../data/items/basic.ron");
        let basic_items: Vec<ItemProfile> =
            ron::from_str(basic_ron).map_err(|e| format!("Failed to parse basic.ron: {}", e))?;
        for item in basic_items {
            items.insert(item.name.clone(), item);
        }

        Ok(Self { items })
    }

    /// Gets an item profile by name.
    ///
    /// # Panics
    ///
    /// Panics if the item is not registered.
    pub fn get(&self, name: &str) -> &ItemProfile {
        self.items
            .get(name)
            .unwrap_or_else(|| panic!("ItemProfile not found for {:?}", name))
    }

    /// Looks up an item profile by name without panicking.
    pub fn lookup(&self, name: &str) -> Option<&ItemProfile> {
        self.items.get(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_item_profiles() {
        let registry = ItemRegistry::load().expect("Failed to load item profiles");
        assert!(registry.len() >= 2);

        let potion = registry.get("Potion");
        assert!(potion.hp_restore > 0);
    }
}
