//! Selection resolution: turns chosen identifiers into concrete slot values.

use crate::catalog::Catalog;
use crate::types::{MealSelection, ResolvedMeal, ResolvedSlot};

/// Resolve one meal's selection against the catalog.
///
/// Empty slots and unknown identifiers resolve to empty strings; this is a
/// silent miss, not an error. Slot order is preserved.
pub fn resolve(catalog: &Catalog, selection: &MealSelection) -> ResolvedMeal {
    let slots = selection
        .slots
        .iter()
        .enumerate()
        .map(|(i, slot)| match slot.as_deref() {
            Some(id) => match catalog.lookup(id) {
                Some(item) => ResolvedSlot::from(item),
                None => {
                    log::debug!("{} slot {}: unknown item id '{}'", selection.meal, i + 1, id);
                    ResolvedSlot::default()
                }
            },
            None => ResolvedSlot::default(),
        })
        .collect();

    ResolvedMeal {
        meal: selection.meal.clone(),
        slots,
    }
}

/// Resolve every selection, keeping meal order.
pub fn resolve_all(catalog: &Catalog, selections: &[MealSelection]) -> Vec<ResolvedMeal> {
    selections.iter().map(|s| resolve(catalog, s)).collect()
}
