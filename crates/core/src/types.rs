//! Domain types for menu items, meal selections and their resolved values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Allergen text that marks an item as safe; any other value is flagged.
pub const ALLERGEN_FREE: &str = "Free / no allergic ingredients.";

/// A selectable menu item with its nutrition and allergen metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Unique identifier (the `index` column).
    pub id: String,

    /// Display text (the `items` column).
    pub name: String,

    /// Calorie value, kept as text.
    pub calories: String,

    /// Allergen description.
    pub allergens: String,
}

impl MenuItem {
    /// Create a new menu item.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        calories: impl Into<String>,
        allergens: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            calories: calories.into(),
            allergens: allergens.into(),
        }
    }
}

/// A meal and its fixed number of selection slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealSlots {
    /// Meal name, used in form fields and tokens (e.g. `breakfast`).
    pub name: String,

    /// Number of slots offered for this meal.
    pub slots: usize,
}

impl MealSlots {
    /// Create a new meal slot definition.
    pub fn new(name: impl Into<String>, slots: usize) -> Self {
        Self {
            name: name.into(),
            slots,
        }
    }

    /// Human-readable label: the meal name with its first letter uppercased.
    pub fn label(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// The ordered set of meals a deck is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuLayout {
    pub meals: Vec<MealSlots>,
}

impl Default for MenuLayout {
    fn default() -> Self {
        Self {
            meals: vec![
                MealSlots::new("breakfast", 7),
                MealSlots::new("lunch", 9),
                MealSlots::new("dinner", 9),
            ],
        }
    }
}

impl MenuLayout {
    /// Create a layout from explicit meal definitions.
    pub fn new(meals: Vec<MealSlots>) -> Self {
        Self { meals }
    }

    /// Build one selection per meal from form-style fields named
    /// `<meal>_<n>` with `n` 1-based. Missing fields become empty slots.
    pub fn selections_from_fields(&self, fields: &HashMap<String, String>) -> Vec<MealSelection> {
        self.meals
            .iter()
            .map(|meal| {
                let ids = (1..=meal.slots).map(|n| fields.get(&format!("{}_{}", meal.name, n)).cloned());
                MealSelection::from_ids(&meal.name, meal.slots, ids)
            })
            .collect()
    }
}

/// The chosen item identifiers for one meal, one entry per slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealSelection {
    /// Meal name (e.g. `lunch`).
    pub meal: String,

    /// Chosen identifier per slot; `None` is an empty slot.
    pub slots: Vec<Option<String>>,
}

impl MealSelection {
    /// Create a selection with `slot_count` empty slots.
    pub fn empty(meal: impl Into<String>, slot_count: usize) -> Self {
        Self {
            meal: meal.into(),
            slots: vec![None; slot_count],
        }
    }

    /// Create a selection of exactly `slot_count` slots from the given ids.
    ///
    /// Blank ids are treated as empty slots, extra ids are dropped and
    /// missing trailing slots are left empty.
    pub fn from_ids<I, S>(meal: impl Into<String>, slot_count: usize, ids: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let mut slots: Vec<Option<String>> = ids
            .into_iter()
            .take(slot_count)
            .map(|id| {
                id.map(Into::into)
                    .map(|s: String| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .collect();
        slots.resize(slot_count, None);

        Self {
            meal: meal.into(),
            slots,
        }
    }

    /// Number of non-empty slots.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// The resolved values for one slot. Empty slots hold empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSlot {
    pub item: String,
    pub calories: String,
    pub allergens: String,
}

impl ResolvedSlot {
    /// Whether the allergen text should be flagged. Anything other than the
    /// exact allergen-free sentinel counts, including an empty slot.
    pub fn has_allergen_risk(&self) -> bool {
        self.allergens != ALLERGEN_FREE
    }
}

impl From<&MenuItem> for ResolvedSlot {
    fn from(item: &MenuItem) -> Self {
        Self {
            item: item.name.clone(),
            calories: item.calories.clone(),
            allergens: item.allergens.clone(),
        }
    }
}

/// Concrete values for one meal's slots, index-aligned with its selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMeal {
    /// Meal name (e.g. `dinner`).
    pub meal: String,

    /// One entry per slot, in slot order.
    pub slots: Vec<ResolvedSlot>,
}
