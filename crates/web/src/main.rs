//! HTTP server for the menu deck form.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use menu_pptx::TemplateDeck;
use menu_web::{router, AppState, Config};

/// Serve the menu selection form and generate decks on submit.
#[derive(Parser, Debug)]
#[command(name = "menu-web")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file (default: menu_deck.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.clone()).context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().map_err(|e| anyhow!(e))?;

    let level = if args.verbose { "debug" } else { config.log_level.as_str() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let catalog = menu_catalog::load(&config.data.catalog, &config.data.sheet)
        .with_context(|| format!("Failed to load menu items from {}", config.data.catalog.display()))?;
    TemplateDeck::open(&config.data.template)
        .with_context(|| format!("Failed to open template {}", config.data.template.display()))?;

    let state = AppState::new(
        catalog,
        config.deck.layout(),
        config.data.template.clone(),
        config.data.output_dir.clone(),
        config.deck.styling,
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
