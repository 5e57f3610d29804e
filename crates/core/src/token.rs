//! Placeholder tokens and the single-pass scanner that substitutes them.
//!
//! Tokens look like `{{date}}`, `{{day}}`, `{{lunch_03}}` (item),
//! `{{lunch_c_03}}` (calories) and `{{lunch_a_03}}` (allergens). Slot
//! numbers are 1-based and zero-padded to two digits so that `_01` can
//! never be confused with `_10`.

use crate::date::DeckDate;
use crate::types::ResolvedMeal;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

/// Matches any `{{name}}` candidate; the name is looked up afterwards.
static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").unwrap());

/// Which value of a slot a token stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotField {
    Item,
    Calories,
    Allergens,
}

/// A recognised placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaceholderToken {
    Date,
    Day,
    Slot {
        meal: String,
        field: SlotField,
        /// 1-based slot number.
        slot: usize,
    },
}

impl PlaceholderToken {
    pub fn item(meal: impl Into<String>, slot: usize) -> Self {
        Self::Slot {
            meal: meal.into(),
            field: SlotField::Item,
            slot,
        }
    }

    pub fn calories(meal: impl Into<String>, slot: usize) -> Self {
        Self::Slot {
            meal: meal.into(),
            field: SlotField::Calories,
            slot,
        }
    }

    pub fn allergens(meal: impl Into<String>, slot: usize) -> Self {
        Self::Slot {
            meal: meal.into(),
            field: SlotField::Allergens,
            slot,
        }
    }

    /// The text between the braces, e.g. `breakfast_c_01`.
    pub fn name(&self) -> String {
        match self {
            Self::Date => "date".to_string(),
            Self::Day => "day".to_string(),
            Self::Slot { meal, field, slot } => match field {
                SlotField::Item => format!("{}_{:02}", meal, slot),
                SlotField::Calories => format!("{}_c_{:02}", meal, slot),
                SlotField::Allergens => format!("{}_a_{:02}", meal, slot),
            },
        }
    }
}

impl fmt::Display for PlaceholderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{{{}}}}}", self.name())
    }
}

/// The text a token is replaced with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub value: String,
    /// Set for allergen values that differ from the allergen-free sentinel.
    pub warning: bool,
}

/// One substitution performed by [`TokenTable::scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// The full token as it appeared, braces included.
    pub token: String,
    /// Byte range of the token in the scanned text.
    pub source: Range<usize>,
    /// Byte range of the replacement in the output text.
    pub output: Range<usize>,
    pub warning: bool,
}

/// Result of scanning a string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scanned {
    pub text: String,
    pub substitutions: Vec<Substitution>,
}

impl Scanned {
    pub fn is_changed(&self) -> bool {
        !self.substitutions.is_empty()
    }

    /// Substitutions whose value must be styled as an allergen warning.
    pub fn warnings(&self) -> impl Iterator<Item = &Substitution> {
        self.substitutions.iter().filter(|s| s.warning)
    }
}

/// Lookup table from token name to replacement, built once per deck.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    entries: HashMap<String, Replacement>,
}

impl TokenTable {
    /// Build the table for a date and a set of resolved meals.
    pub fn new(date: &DeckDate, meals: &[ResolvedMeal]) -> Self {
        let mut table = Self::default();
        table.insert(&PlaceholderToken::Date, date.long(), false);
        table.insert(&PlaceholderToken::Day, date.weekday(), false);

        for meal in meals {
            for (i, slot) in meal.slots.iter().enumerate() {
                let n = i + 1;
                table.insert(&PlaceholderToken::item(&meal.meal, n), slot.item.clone(), false);
                table.insert(&PlaceholderToken::calories(&meal.meal, n), slot.calories.clone(), false);
                table.insert(
                    &PlaceholderToken::allergens(&meal.meal, n),
                    slot.allergens.clone(),
                    slot.has_allergen_risk(),
                );
            }
        }

        table
    }

    fn insert(&mut self, token: &PlaceholderToken, value: String, warning: bool) {
        self.entries.insert(token.name(), Replacement { value, warning });
    }

    /// Look up a token by its name (without braces).
    pub fn get(&self, name: &str) -> Option<&Replacement> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every known token in `text` in a single left-to-right pass.
    ///
    /// Unknown `{{...}}` sequences are kept verbatim and replacement values
    /// are never rescanned.
    pub fn scan(&self, text: &str) -> Scanned {
        let mut out = String::with_capacity(text.len());
        let mut substitutions = Vec::new();
        let mut last = 0;

        for caps in TOKEN_REGEX.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(replacement) = self.get(name.as_str()) else {
                continue;
            };

            out.push_str(&text[last..whole.start()]);
            let start = out.len();
            out.push_str(&replacement.value);
            log::debug!("Replacing {} with {}", whole.as_str(), replacement.value);

            substitutions.push(Substitution {
                token: whole.as_str().to_string(),
                source: whole.range(),
                output: start..out.len(),
                warning: replacement.warning,
            });
            last = whole.end();
        }
        out.push_str(&text[last..]);

        Scanned {
            text: out,
            substitutions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResolvedSlot, ALLERGEN_FREE};

    fn slot(item: &str, calories: &str, allergens: &str) -> ResolvedSlot {
        ResolvedSlot {
            item: item.to_string(),
            calories: calories.to_string(),
            allergens: allergens.to_string(),
        }
    }

    fn table() -> TokenTable {
        let date = DeckDate::parse("2026-10-18").unwrap();
        let breakfast = ResolvedMeal {
            meal: "breakfast".to_string(),
            slots: vec![
                slot("Oatmeal", "300", ALLERGEN_FREE),
                slot("Granola", "350", "Contains nuts."),
                ResolvedSlot::default(),
            ],
        };
        TokenTable::new(&date, &[breakfast])
    }

    #[test]
    fn test_token_names() {
        assert_eq!(PlaceholderToken::item("lunch", 3).to_string(), "{{lunch_03}}");
        assert_eq!(PlaceholderToken::calories("lunch", 10).to_string(), "{{lunch_c_10}}");
        assert_eq!(PlaceholderToken::allergens("dinner", 1).to_string(), "{{dinner_a_01}}");
        assert_eq!(PlaceholderToken::Date.to_string(), "{{date}}");
    }

    #[test]
    fn test_table_size() {
        // date + day + 3 slots * 3 fields
        assert_eq!(table().len(), 11);
    }

    #[test]
    fn test_scan_oatmeal_scenario() {
        let scanned = table().scan("{{breakfast_01}} ({{breakfast_c_01}} cal) {{breakfast_a_01}}");
        assert_eq!(scanned.text, "Oatmeal (300 cal) Free / no allergic ingredients.");
        assert_eq!(scanned.substitutions.len(), 3);
        assert_eq!(scanned.warnings().count(), 0);
    }

    #[test]
    fn test_scan_flags_allergen() {
        let scanned = table().scan("{{breakfast_02}}: {{breakfast_a_02}}");
        assert_eq!(scanned.text, "Granola: Contains nuts.");
        let warnings: Vec<_> = scanned.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].token, "{{breakfast_a_02}}");
        assert_eq!(&scanned.text[warnings[0].output.clone()], "Contains nuts.");
    }

    #[test]
    fn test_scan_empty_slot() {
        let scanned = table().scan("{{breakfast_03}} ({{breakfast_c_03}} cal)");
        assert_eq!(scanned.text, " ( cal)");
        assert_eq!(scanned.substitutions.len(), 2);
    }

    #[test]
    fn test_scan_date_replaces_all_occurrences() {
        let scanned = table().scan("{{day}} / {{date}} / {{day}}");
        assert_eq!(scanned.text, "Sunday / Sunday, October 18, 2026 / Sunday");
    }

    #[test]
    fn test_unknown_tokens_left_verbatim() {
        let scanned = table().scan("{{breakfast_04}} {{lunch_01}} {{ date }} {{breakfast_01}}");
        assert_eq!(scanned.text, "{{breakfast_04}} {{lunch_01}} {{ date }} Oatmeal");
        assert_eq!(scanned.substitutions.len(), 1);
    }

    #[test]
    fn test_no_prefix_collision() {
        let date = DeckDate::parse("2026-10-18").unwrap();
        let mut slots = vec![ResolvedSlot::default(); 10];
        slots[0] = slot("First", "1", ALLERGEN_FREE);
        slots[9] = slot("Tenth", "10", ALLERGEN_FREE);
        let meal = ResolvedMeal {
            meal: "lunch".to_string(),
            slots,
        };
        let table = TokenTable::new(&date, &[meal]);

        let scanned = table.scan("{{lunch_10}}|{{lunch_01}}|{{lunch_1}}");
        assert_eq!(scanned.text, "Tenth|First|{{lunch_1}}");
    }

    #[test]
    fn test_replacement_not_rescanned() {
        let date = DeckDate::parse("2026-10-18").unwrap();
        let meal = ResolvedMeal {
            meal: "dinner".to_string(),
            slots: vec![slot("{{date}}", "0", ALLERGEN_FREE)],
        };
        let scanned = TokenTable::new(&date, &[meal]).scan("{{dinner_01}}");
        assert_eq!(scanned.text, "{{date}}");
    }

    #[test]
    fn test_empty_allergen_is_warning() {
        let scanned = table().scan("{{breakfast_a_03}}");
        assert_eq!(scanned.text, "");
        assert_eq!(scanned.warnings().count(), 1);
    }

    #[test]
    fn test_substitution_ranges() {
        let scanned = table().scan("x {{breakfast_01}} y");
        let sub = &scanned.substitutions[0];
        assert_eq!(sub.source, 2..18);
        assert_eq!(sub.output, 2..9);
        assert_eq!(scanned.text, "x Oatmeal y");
    }
}
