//! CLI tool for generating menu decks from a catalog workbook.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use menu_core::{resolve_all, Catalog, DeckDate, MealSelection, MenuLayout};
use menu_pptx::{StylePolicy, TemplateDeck};
use std::path::PathBuf;

/// Fill a PowerPoint menu template with items picked from the catalog.
#[derive(Parser, Debug)]
#[command(name = "menu-deck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Menu items workbook (.xlsx)
    #[arg(short, long, default_value = "menu_items.xlsx")]
    catalog: PathBuf,

    /// Sheet holding the menu items
    #[arg(short, long, default_value = menu_catalog::DEFAULT_SHEET)]
    sheet: String,

    /// Template deck with placeholder tokens
    #[arg(short, long, default_value = "menu_template.pptx")]
    template: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Breakfast item ids, comma separated (empty entries skip a slot)
    #[arg(long, default_value = "")]
    breakfast: String,

    /// Lunch item ids, comma separated
    #[arg(long, default_value = "")]
    lunch: String,

    /// Dinner item ids, comma separated
    #[arg(long, default_value = "")]
    dinner: String,

    /// Date to print on the deck, YYYY-MM-DD (default: today)
    #[arg(short, long)]
    date: Option<String>,

    /// Keep each run's formatting instead of merging paragraph text
    #[arg(long)]
    preserve_runs: bool,

    /// Print the catalog as JSON and exit
    #[arg(long)]
    list: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let catalog = menu_catalog::load(&args.catalog, &args.sheet)
        .with_context(|| format!("Failed to load menu items from {}", args.catalog.display()))?;

    if args.list {
        println!("{}", serde_json::to_string_pretty(catalog.items())?);
        return Ok(());
    }

    let date = match &args.date {
        Some(s) => DeckDate::parse(s).ok_or_else(|| anyhow!("Invalid date '{}', expected YYYY-MM-DD", s))?,
        None => DeckDate::today(),
    };

    let output_path = generate(&args, &catalog, &date)?;
    println!("{}", output_path.display());

    Ok(())
}

/// Resolve the selections from the arguments, render and save the deck.
fn generate(args: &Args, catalog: &Catalog, date: &DeckDate) -> Result<PathBuf> {
    let selections = selections(args);
    let meals = resolve_all(catalog, &selections);

    let template = TemplateDeck::open(&args.template)
        .with_context(|| format!("Failed to open template {}", args.template.display()))?;
    let policy = if args.preserve_runs {
        StylePolicy::Preserve
    } else {
        StylePolicy::Flatten
    };

    let deck = menu_pptx::substitute(&template, &meals, date, policy)?;
    if args.verbose {
        eprintln!(
            "  Replaced {} tokens in {} slides ({} allergen warnings)",
            deck.stats.tokens, deck.stats.slides, deck.stats.warnings
        );
    }

    let path = menu_pptx::save(&deck.bytes, &args.output, date)?;
    Ok(path)
}

fn selections(args: &Args) -> Vec<MealSelection> {
    MenuLayout::default()
        .meals
        .iter()
        .map(|meal| {
            let list = match meal.name.as_str() {
                "breakfast" => args.breakfast.as_str(),
                "lunch" => args.lunch.as_str(),
                "dinner" => args.dinner.as_str(),
                _ => "",
            };
            let ids = parse_ids(list);
            if ids.len() > meal.slots {
                log::warn!(
                    "{} ids given for {} but only {} slots; extra ids ignored",
                    ids.len(),
                    meal.name,
                    meal.slots
                );
            }
            MealSelection::from_ids(meal.name.as_str(), meal.slots, ids.into_iter().map(Some))
        })
        .collect()
}

/// Split a comma separated id list. An empty list has no entries.
fn parse_ids(list: &str) -> Vec<&str> {
    if list.trim().is_empty() {
        return Vec::new();
    }
    list.split(',').map(str::trim).collect()
}
