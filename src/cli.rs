use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{entity::Entity, warehouse::LoadMode};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Clean raw store snapshots and load them into a SQLite star schema",
    long_about = None
)]
pub struct Cli {
    /// YAML file overriding the default data layout
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Data directory holding raw/, prepared/ and the database
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
    /// Warehouse database file (overrides the data directory default)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clean raw CSV snapshots and write prepared snapshots
    Prepare(PrepareArgs),
    /// Load prepared snapshots into the warehouse tables
    Load(LoadArgs),
    /// Run semicolon-separated SQL statements from a file against the warehouse
    Query(QueryArgs),
    /// Report row counts for raw files, prepared files and warehouse tables
    Counts,
    /// Preview the first rows of each warehouse table
    Explore(ExploreArgs),
    /// Drop the warehouse tables
    Reset,
}

#[derive(Debug, Args)]
pub struct PrepareArgs {
    /// Entities to prepare (defaults to all)
    #[arg(short = 'e', long = "entity", value_enum, action = clap::ArgAction::Append)]
    pub entities: Vec<Entity>,
    /// Character encoding of the raw files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// create drops and rebuilds each table; append inserts into existing tables
    #[arg(long, value_enum, default_value = "create")]
    pub mode: LoadMode,
    /// Delete existing rows before appending (append mode only)
    #[arg(long)]
    pub truncate: bool,
    /// Entities to load (defaults to all)
    #[arg(short = 'e', long = "entity", value_enum, action = clap::ArgAction::Append)]
    pub entities: Vec<Entity>,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// SQL file with one or more statements separated by ';'
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,
    /// Maximum rows shown per statement
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct ExploreArgs {
    /// Rows shown per table
    #[arg(long, default_value_t = 5)]
    pub rows: usize,
}

/// Requested entities, or all of them when none were named.
pub fn selected_entities(requested: &[Entity]) -> Vec<Entity> {
    if requested.is_empty() {
        Entity::ALL.to_vec()
    } else {
        let mut selected = Vec::with_capacity(requested.len());
        for entity in requested {
            if !selected.contains(entity) {
                selected.push(*entity);
            }
        }
        selected
    }
}
