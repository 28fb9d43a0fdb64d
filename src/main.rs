use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;
use sports_api::client::SportsApi;
use sportseo::store::records::{MemoryRecords, RecordSource};
use sportseo::{ConfigProvider, EntitySource, MetadataResolver, NoEntities, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Resolve page metadata and print it as JSON.
#[derive(Parser, Debug)]
#[command(name = "sportseo")]
#[command(about = "Layered SEO metadata for a sports live-score site")]
#[command(version)]
struct Cli {
    /// JSON file of database records: {"records": [...], "pages": {...}}
    #[arg(long, env = "SPORTSEO_RECORDS_FILE")]
    records: Option<PathBuf>,

    /// Never call the sports-data provider
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// The home page
    Home,
    /// A static page such as privacy or terms
    Page {
        key: String,
        /// Route path; defaults to /<key>/
        path: Option<String>,
    },
    /// A sport listing tab
    Sport { sport: String, tab: String },
    League {
        sport: String,
        tab: String,
        id: String,
    },
    Match {
        sport: String,
        id: String,
        tab: Option<String>,
    },
    Player { sport: String, id: String },
    /// Print the merged configuration store
    Snapshot,
}

#[tokio::main]
async fn main() -> Result<()> {
    better_panic::install();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    let mut provider = ConfigProvider::new(settings.clone());
    if let Some(records) = record_source(&cli, &settings).await? {
        provider = provider.with_records(records);
    }
    info!("configuration directory: {}", provider.config_dir().display());
    let provider = Arc::new(provider);

    let entities: Arc<dyn EntitySource> = if cli.offline {
        Arc::new(NoEntities)
    } else {
        Arc::new(SportsApi::new(settings.api.clone()))
    };
    let resolver = MetadataResolver::new(provider.clone(), entities);

    match cli.command {
        Command::Home => print_json(&resolver.resolve_home().await),
        Command::Page { key, path } => {
            let path = path.unwrap_or_else(|| format!("/{key}/"));
            print_json(&resolver.resolve_static_page(&key, &path).await)
        }
        Command::Sport { sport, tab } => print_json(&resolver.resolve_sport_tab(&sport, &tab).await),
        Command::League { sport, tab, id } => {
            print_json(&resolver.resolve_league(&sport, &tab, &id).await)
        }
        Command::Match { sport, id, tab } => {
            print_json(&resolver.resolve_match(&sport, &id, tab.as_deref()).await)
        }
        Command::Player { sport, id } => print_json(&resolver.resolve_player(&sport, &id).await),
        Command::Snapshot => print_json(&*provider.snapshot().await),
    }
}

/// A records file wins over the database URL. An unreachable database is
/// logged and skipped; a bad records file is an error.
async fn record_source(cli: &Cli, settings: &Settings) -> Result<Option<Arc<dyn RecordSource>>> {
    if let Some(path) = &cli.records {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading records file {}", path.display()))?;
        let records = MemoryRecords::from_json(&raw)
            .with_context(|| format!("parsing records file {}", path.display()))?;
        return Ok(Some(Arc::new(records)));
    }
    if settings.edge {
        return Ok(None);
    }
    let Some(url) = settings.database_url.as_deref() else {
        return Ok(None);
    };
    database_source(url).await
}

#[cfg(feature = "sqlite")]
async fn database_source(url: &str) -> Result<Option<Arc<dyn RecordSource>>> {
    use sportseo::store::sqlite::SqliteRecords;

    match SqliteRecords::connect(url).await {
        Ok(records) => Ok(Some(Arc::new(records))),
        Err(e) => {
            warn!("database unavailable, continuing without it: {e}");
            Ok(None)
        }
    }
}

#[cfg(not(feature = "sqlite"))]
async fn database_source(url: &str) -> Result<Option<Arc<dyn RecordSource>>> {
    warn!("SPORTSEO_DATABASE_URL={url} ignored: built without the sqlite feature");
    Ok(None)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
