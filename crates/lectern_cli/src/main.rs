//! `lectern` command-line entry point.
//!
//! # Responsibility
//! - Map subcommands onto core services over one SQLite file.
//! - Print results as pretty JSON; report failures with their status class.

mod seed;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use lectern_core::service::{
    BulkLeaves, CollectionService, LeafService, LeafSpec, PageRequest, SubunitService, UnitService,
};
use lectern_core::{
    init_logging, open_db, CoreConfig, EntityKind, ServiceContext, ServiceError, SqliteStore,
    SystemClock,
};
use log::error;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

/// Lectern CLI
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(about = "Manage an ordered collection/unit/subunit/leaf text hierarchy")]
#[command(version = lectern_core::core_version())]
struct Args {
    /// SQLite database file (overrides LECTERN_DATABASE_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error (overrides LECTERN_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the KJV / Genesis 1:1-10 sample if missing
    Seed,

    /// List collections ordered by name
    Collections {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// List units of one collection
    Units {
        #[arg(long)]
        collection: Uuid,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show one leaf with its ancestry
    ShowLeaf { id: Uuid },

    /// Bulk-create leaves from a JSON array of {ordinal, text}
    ImportLeaves {
        #[arg(long)]
        subunit: Uuid,
        #[arg(long)]
        file: PathBuf,
    },

    /// Delete a record under the configured delete policy
    Delete {
        #[arg(value_parser = parse_kind)]
        kind: EntityKind,
        id: Uuid,
    },
}

#[derive(Serialize)]
struct Deleted {
    kind: EntityKind,
    id: Uuid,
    removed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = CoreConfig::from_env().context("reading configuration")?;
    if let Some(db) = args.db {
        config.database_path = db;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    init_logging(&config.log_level, config.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    let conn = open_db(&config.database_path)
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    let store = SqliteStore::try_new(&conn)?;
    let clock = SystemClock;
    let ctx = ServiceContext::new(&store, &clock, &config);

    match args.command {
        Commands::Seed => print_json(&seed::run(ctx)?),
        Commands::Collections { page, limit } => {
            let page = service(CollectionService::new(ctx).list(PageRequest { page, limit }))?;
            print_json(&page)
        }
        Commands::Units {
            collection,
            page,
            limit,
        } => {
            let page = service(
                UnitService::new(ctx).list(Some(collection), PageRequest { page, limit }),
            )?;
            print_json(&page)
        }
        Commands::ShowLeaf { id } => print_json(&service(LeafService::new(ctx).get(id))?),
        Commands::ImportLeaves { subunit, file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let leaves: Vec<LeafSpec> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", file.display()))?;
            let created = service(LeafService::new(ctx).bulk_create(&BulkLeaves {
                subunit_id: subunit,
                leaves,
            }))?;
            print_json(&created)
        }
        Commands::Delete { kind, id } => {
            let removed = service(match kind {
                EntityKind::Collection => CollectionService::new(ctx).delete(id),
                EntityKind::Unit => UnitService::new(ctx).delete(id),
                EntityKind::Subunit => SubunitService::new(ctx).delete(id),
                EntityKind::Leaf => LeafService::new(ctx).delete(id),
            })?;
            print_json(&Deleted { kind, id, removed })
        }
    }
}

fn parse_kind(value: &str) -> Result<EntityKind, String> {
    EntityKind::parse(value)
        .ok_or_else(|| format!("unknown kind `{value}`; expected collection|unit|subunit|leaf"))
}

/// Prefixes service failures with their HTTP-equivalent status.
fn service<T>(result: Result<T, ServiceError>) -> Result<T> {
    result.map_err(|err| {
        if !err.is_client_error() {
            error!("event=command module=cli status=error error={err}");
        }
        anyhow!("[{}] {err}", err.category().status_code())
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
