use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use asset_model::Record;
use asset_store::{AssetService, RecordRepository, Response, StoreConfig};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "asset-cli")]
#[command(about = "Manage asset records stored as per-category spreadsheets. Prints JSON envelopes.")]
struct Cli {
    /// Store directory. Overrides `root` from `--config`.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// JSON store configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every record in the store.
    List,
    /// Show one record.
    Get { key: String },
    /// Create a record.
    Create {
        /// Record JSON. Read from stdin when omitted.
        #[arg(long)]
        record: Option<String>,
    },
    /// Replace the record stored under `key`.
    Update {
        key: String,
        /// Record JSON. Read from stdin when omitted.
        #[arg(long)]
        record: Option<String>,
    },
    /// Import every record on one sheet of a workbook.
    Import { source: PathBuf, sheet: String },
    /// List the sheets of a workbook that could be imported.
    Sheets { source: PathBuf },
    /// Known regions.
    Regions {
        #[command(subcommand)]
        action: NameAction,
    },
    /// Known categories.
    Categories {
        #[command(subcommand)]
        action: NameAction,
    },
    /// Category × region display colors.
    Color {
        #[command(subcommand)]
        action: ColorAction,
    },
}

#[derive(Debug, Subcommand)]
enum NameAction {
    List,
    Add { name: String },
}

#[derive(Debug, Subcommand)]
enum ColorAction {
    Get {
        category: String,
        region: String,
    },
    Set {
        category: String,
        region: String,
        color: String,
    },
}

fn load_config(cli: &Cli) -> Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))?
        }
        None => StoreConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    Ok(config)
}

fn read_record(inline: Option<String>) -> Result<Record> {
    let text = match inline {
        Some(text) => text,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("read record JSON from stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("parse record JSON")
}

/// Print `response` as one JSON line and return whether it reports success.
fn emit<T: Serialize>(response: &Response<T>) -> Result<bool> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer(&mut handle, response)?;
    handle.write_all(b"\n")?;
    Ok(response.success)
}

async fn run(service: &AssetService, command: Command) -> Result<bool> {
    match command {
        Command::List => emit(&service.get_all_records().await),
        Command::Get { key } => emit(&service.get_record(&key).await),
        Command::Create { record } => match read_record(record) {
            Ok(record) => emit(&service.create_record(record).await),
            Err(err) => emit(&Response::<Record>::failure(format!("{err:#}"))),
        },
        Command::Update { key, record } => match read_record(record) {
            Ok(record) => emit(&service.update_record(&key, record).await),
            Err(err) => emit(&Response::<Record>::failure(format!("{err:#}"))),
        },
        Command::Import { source, sheet } => emit(&service.import_sheet(&source, &sheet).await),
        Command::Sheets { source } => emit(&service.list_import_sheets(&source).await),
        Command::Regions { action } => match action {
            NameAction::List => emit(&service.list_regions()),
            NameAction::Add { name } => emit(&service.add_region(&name)),
        },
        Command::Categories { action } => match action {
            NameAction::List => emit(&service.list_categories()),
            NameAction::Add { name } => emit(&service.add_category(&name)),
        },
        Command::Color { action } => match action {
            ColorAction::Get { category, region } => emit(&service.get_color(&category, &region)),
            ColorAction::Set {
                category,
                region,
                color,
            } => emit(&service.set_color(&category, &region, &color)),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    log::debug!("using store root {}", config.root.display());
    let repository = RecordRepository::open(config)
        .await
        .context("open asset store")?;
    let service = AssetService::new(repository);

    if !run(&service, cli.command).await? {
        std::process::exit(1);
    }
    Ok(())
}
