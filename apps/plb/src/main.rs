use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use layout_store::{JsonFileProvider, LayoutStore, StoreConfig, StoreOverrides};
use serde_json::{json, Value};
use shared::{protocol::DEFAULT_BASE_URL, InsertPosition};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Inspect and edit page-builder layouts.
#[derive(Parser, Debug)]
struct Cli {
    /// Server hosting the `/layout` and `/components` documents.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Read the layout from this JSON file; disables the server for both documents.
    #[arg(long)]
    layout_file: Option<PathBuf>,
    /// Read the component palette from this JSON file; disables the server for both documents.
    #[arg(long)]
    components_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the layout and the component palette.
    Show,
    /// Insert a row of empty columns and print the resulting layout.
    AddRow {
        /// `after` places the row behind the reference row; anything else in front.
        #[arg(long, default_value = "after")]
        pos: String,
        #[arg(long)]
        index: usize,
        #[arg(long, default_value_t = 1)]
        cols: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = run(cli).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<Value> {
    let store = open_store(&cli)?;

    match cli.command {
        Command::Show => {
            let layout = store.fetch_layout().await?;
            let components = store.fetch_components().await?;
            Ok(json!({ "layout": layout, "components": components }))
        }
        Command::AddRow { pos, index, cols } => {
            let pos: InsertPosition = pos.parse()?;
            store.fetch_layout().await?;
            let position = store.add_row(pos, index, cols)?;
            debug!(position, "row added");
            Ok(serde_json::to_value(store.layout())?)
        }
    }
}

fn open_store(cli: &Cli) -> Result<Arc<LayoutStore>> {
    let config = StoreConfig::new(&cli.base_url)
        .with_context(|| format!("invalid base url '{}'", cli.base_url))?;

    if cli.layout_file.is_none() && cli.components_file.is_none() {
        return Ok(LayoutStore::new(config));
    }

    // Any file flag switches both documents off the server.
    let mut overrides = StoreOverrides::default();
    if let Some(path) = &cli.layout_file {
        overrides = overrides.with_layout(JsonFileProvider::new(path));
    }
    if let Some(path) = &cli.components_file {
        overrides = overrides.with_components(JsonFileProvider::new(path));
    }

    Ok(LayoutStore::new_with_overrides(config, overrides))
}
