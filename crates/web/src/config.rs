use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use menu_core::{MealSlots, MenuLayout};
use menu_pptx::StylePolicy;
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub deck: DeckConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Workbook holding the menu items.
    pub catalog: PathBuf,
    /// Sheet of the workbook to read.
    pub sheet: String,
    /// PPTX template with placeholder tokens.
    pub template: PathBuf,
    /// Directory generated decks are written to.
    pub output_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeckConfig {
    #[serde(default)]
    pub styling: StylePolicy,
    #[serde(default = "default_meals")]
    pub meals: Vec<MealSlots>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            styling: StylePolicy::default(),
            meals: default_meals(),
        }
    }
}

impl DeckConfig {
    pub fn layout(&self) -> MenuLayout {
        MenuLayout::new(self.meals.clone())
    }
}

fn default_meals() -> Vec<MealSlots> {
    MenuLayout::default().meals
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (MENU_DECK__SERVER__PORT, etc.)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("data.catalog", "menu_items.xlsx")?
            .set_default("data.sheet", "data")?
            .set_default("data.template", "menu_template.pptx")?
            .set_default("data.output_dir", ".")?;

        let config_file_path = config_path
            .or_else(|| env::var("MENU_DECK_CONFIG").ok())
            .unwrap_or_else(|| "menu_deck.toml".to_string());

        // The config file is optional
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("MENU_DECK")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.data.sheet.trim().is_empty() {
            return Err("Sheet name must not be empty".to_string());
        }
        if self.deck.meals.is_empty() {
            return Err("At least one meal must be configured".to_string());
        }

        let mut seen = HashSet::new();
        for meal in &self.deck.meals {
            if meal.name.is_empty()
                || !meal.name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return Err(format!(
                    "Meal name '{}' must be non-empty and contain only letters, digits or '_'",
                    meal.name
                ));
            }
            if meal.slots == 0 {
                return Err(format!("Meal '{}' must have at least one slot", meal.name));
            }
            // Two-digit tokens cap the slot count
            if meal.slots > 99 {
                return Err(format!("Meal '{}' has more than 99 slots", meal.name));
            }
            if !seen.insert(meal.name.as_str()) {
                return Err(format!("Meal '{}' is configured twice", meal.name));
            }
        }
        Ok(())
    }
}
