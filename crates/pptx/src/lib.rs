//! PPTX (OOXML) backend for menu decks.
//!
//! Opens a template .pptx (a ZIP archive of XML parts), replaces placeholder
//! tokens in slide text and writes the result as a new deck.

pub mod deck;
pub mod paragraph;
pub mod substitute;
pub mod template;

pub use deck::{render, save, substitute, RenderedDeck};
pub use substitute::{StylePolicy, Substituter, SubstitutionStats, WARNING_COLOR};
pub use template::TemplateDeck;
