//! Core domain types, catalog lookup, selection resolution and placeholder
//! scanning for generating menu slide decks.

pub mod catalog;
pub mod date;
pub mod error;
pub mod resolve;
pub mod token;
pub mod types;

pub use catalog::Catalog;
pub use date::DeckDate;
pub use error::{Error, Result};
pub use resolve::{resolve, resolve_all};
pub use token::{PlaceholderToken, Scanned, SlotField, Substitution, TokenTable};
pub use types::{
    MealSelection, MealSlots, MenuItem, MenuLayout, ResolvedMeal, ResolvedSlot, ALLERGEN_FREE,
};
