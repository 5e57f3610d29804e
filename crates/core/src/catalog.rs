//! In-memory menu catalog.

use crate::types::MenuItem;
use std::collections::HashMap;

/// The selectable menu items, in source order, indexed by identifier.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<MenuItem>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from items. Later duplicates of an id are ignored.
    pub fn from_items(items: impl IntoIterator<Item = MenuItem>) -> Self {
        let mut catalog = Self::new();
        for item in items {
            catalog.insert(item);
        }
        catalog
    }

    /// Add an item. Returns `false` (and keeps the existing entry) if the
    /// id is already present.
    pub fn insert(&mut self, item: MenuItem) -> bool {
        if self.index.contains_key(&item.id) {
            log::warn!("Duplicate menu item id '{}', keeping first entry", item.id);
            return false;
        }
        self.index.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        true
    }

    /// Look up an item by identifier.
    pub fn lookup(&self, id: &str) -> Option<&MenuItem> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    /// All items in source order.
    pub fn items(&self) -> &[MenuItem] {
        &self.items
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
    fn test_lookup() {
        let catalog = Catalog::from_items(vec![
            MenuItem::new("B1", "Oatmeal", "300", "Free / no allergic ingredients."),
            MenuItem::new("B2", "Granola", "350", "Contains nuts."),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup("B2").map(|i| i.name.as_str()), Some("Granola"));
        assert!(catalog.lookup("B3").is_none());
        assert!(catalog.lookup("").is_none());
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let catalog = Catalog::from_items(vec![
            MenuItem::new("L1", "Soup", "120", "Contains celery."),
            MenuItem::new("L1", "Salad", "90", "Free / no allergic ingredients."),
        ]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup("L1").map(|i| i.name.as_str()), Some("Soup"));
        assert_eq!(catalog.items()[0].name, "Soup");
    }
}
