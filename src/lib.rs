pub mod audit;
pub mod clean;
pub mod cli;
pub mod columns;
pub mod config;
pub mod data;
pub mod entity;
pub mod error;
pub mod io_utils;
pub mod pipeline;
pub mod query;
pub mod render;
pub mod snapshot;
pub mod source;
pub mod table;
pub mod transform;
pub mod warehouse;

use std::{env, fs, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};

use crate::{
    cli::{Cli, Commands},
    columns::ColumnNormalizer,
    config::EtlConfig,
    pipeline::PhaseReport,
    warehouse::{LoadOptions, LoadMode, Warehouse},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("smart_store_etl", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    execute(Cli::parse())
}

pub fn execute(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    debug!("Resolved configuration: {config:?}");
    match cli.command {
        Commands::Prepare(args) => handle_prepare(config, &args),
        Commands::Load(args) => handle_load(&config, &args),
        Commands::Query(args) => handle_query(&config, &args),
        Commands::Counts => handle_counts(&config),
        Commands::Explore(args) => handle_explore(&config, &args),
        Commands::Reset => handle_reset(&config),
    }
}

/// Layers the config file, `--data-dir` and `--database` over the defaults.
pub fn resolve_config(cli: &Cli) -> Result<EtlConfig> {
    let mut config = match &cli.config {
        Some(path) => EtlConfig::load(path)
            .with_context(|| format!("Loading configuration from {path:?}"))?,
        None => EtlConfig::default(),
    };
    if let Some(data_dir) = &cli.data_dir {
        let encoding = config.input_encoding.take();
        config = EtlConfig::rooted_at(data_dir);
        config.input_encoding = encoding;
    }
    if let Some(database) = &cli.database {
        config.database = database.clone();
    }
    Ok(config)
}

fn handle_prepare(mut config: EtlConfig, args: &cli::PrepareArgs) -> Result<()> {
    if args.input_encoding.is_some() {
        config.input_encoding = args.input_encoding.clone();
    }
    let entities = cli::selected_entities(&args.entities);
    let normalizer = ColumnNormalizer::default();
    info!(
        "Preparing {} entit(ies) from {:?} into {:?}",
        entities.len(),
        config.raw_dir,
        config.prepared_dir
    );
    let report = pipeline::prepare(&config, &entities, &normalizer);

    let rows = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(summary) => vec![
                outcome.entity.to_string(),
                "ok".to_string(),
                summary.clean.rows_in.to_string(),
                summary.clean.duplicates_removed.to_string(),
                summary.clean.values_imputed.to_string(),
                summary.clean.rows_filtered.to_string(),
                summary.clean.rows_out.to_string(),
                String::new(),
            ],
            Err(err) => failure_row(outcome.entity, err, 5),
        })
        .collect::<Vec<_>>();
    render::print_table(
        &[
            "entity",
            "status",
            "rows_in",
            "duplicates",
            "imputed",
            "filtered",
            "rows_out",
            "detail",
        ],
        &rows,
    );
    finish_phase("prepare", &report)
}

fn handle_load(config: &EtlConfig, args: &cli::LoadArgs) -> Result<()> {
    if args.truncate && args.mode == LoadMode::Create {
        warn!("--truncate has no effect in create mode; tables are rebuilt");
    }
    let options = LoadOptions {
        mode: args.mode,
        truncate: args.truncate,
    };
    let entities = cli::selected_entities(&args.entities);
    let normalizer = ColumnNormalizer::default();

    let mut warehouse = Warehouse::open(&config.database)
        .with_context(|| format!("Opening warehouse {:?}", config.database))?;
    let report = pipeline::load(&mut warehouse, config, &entities, &normalizer, options);
    if let Err(err) = warehouse.close() {
        error!("Closing warehouse failed: {err}");
    }

    let rows = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(load) => vec![
                outcome.entity.to_string(),
                "ok".to_string(),
                load.table.clone(),
                load.rows_deleted.to_string(),
                load.rows_inserted.to_string(),
                load.rows_after.to_string(),
                String::new(),
            ],
            Err(err) => failure_row(outcome.entity, err, 4),
        })
        .collect::<Vec<_>>();
    render::print_table(
        &["entity", "status", "table", "deleted", "inserted", "total", "detail"],
        &rows,
    );
    finish_phase("load", &report)
}

fn failure_row(entity: entity::Entity, err: &error::EtlError, blanks: usize) -> Vec<String> {
    let mut row = vec![entity.to_string(), err.kind().to_string()];
    row.extend(std::iter::repeat_n(String::new(), blanks));
    row.push(err.to_string());
    row
}

fn finish_phase<T>(phase: &str, report: &PhaseReport<T>) -> Result<()> {
    if report.all_failed() {
        bail!("Every entity failed during {phase}");
    }
    if report.failed() > 0 {
        warn!(
            "{phase} finished with {} of {} entit(ies) failing",
            report.failed(),
            report.outcomes.len()
        );
    } else {
        info!("{phase} finished for {} entit(ies)", report.succeeded());
    }
    Ok(())
}

fn open_existing_warehouse(config: &EtlConfig) -> Result<Warehouse> {
    if !config.database.exists() {
        bail!("Warehouse database {:?} does not exist", config.database);
    }
    Warehouse::open(&config.database)
        .with_context(|| format!("Opening warehouse {:?}", config.database))
}

fn handle_query(config: &EtlConfig, args: &cli::QueryArgs) -> Result<()> {
    let script = fs::read_to_string(&args.file)
        .with_context(|| format!("Reading queries from {:?}", args.file))?;
    let warehouse = open_existing_warehouse(config)?;
    let outcomes = query::run_script(warehouse.connection(), &script, args.limit);
    let mut failures = 0;
    for outcome in &outcomes {
        println!("--- Query {} ---", outcome.index);
        println!("{}", outcome.sql);
        match &outcome.result {
            Ok(result) if result.columns.is_empty() => {
                println!("{} row(s) affected", result.rows_affected);
            }
            Ok(result) => {
                render::print_table(&result.columns, &result.rows);
                if result.total_rows > result.rows.len() {
                    println!("... {} more row(s)", result.total_rows - result.rows.len());
                }
            }
            Err(err) => {
                failures += 1;
                println!("Error: {err}");
            }
        }
        println!();
    }
    info!(
        "Executed {} statement(s), {failures} failed",
        outcomes.len()
    );
    Ok(())
}

fn handle_counts(config: &EtlConfig) -> Result<()> {
    for (stage, dir) in [("raw", &config.raw_dir), ("prepared", &config.prepared_dir)] {
        if !dir.exists() {
            warn!("{stage} directory {:?} does not exist", dir);
            continue;
        }
        let counts = audit::count_csv_rows(dir)
            .with_context(|| format!("Counting records in {:?}", dir))?;
        let rows = counts
            .iter()
            .map(|count| {
                vec![
                    stage.to_string(),
                    count.file.clone(),
                    match &count.rows {
                        Ok(rows) => rows.to_string(),
                        Err(err) => format!("error: {err}"),
                    },
                ]
            })
            .collect::<Vec<_>>();
        render::print_table(&["stage", "file", "records"], &rows);
        println!();
    }
    if config.database.exists() {
        let warehouse = open_existing_warehouse(config)?;
        let rows = audit::warehouse_counts(&warehouse)?
            .into_iter()
            .map(|(table, count)| vec!["warehouse".to_string(), table, count.to_string()])
            .collect::<Vec<_>>();
        render::print_table(&["stage", "table", "records"], &rows);
    }
    Ok(())
}

fn handle_explore(config: &EtlConfig, args: &cli::ExploreArgs) -> Result<()> {
    let warehouse = open_existing_warehouse(config)?;
    for entity in entity::Entity::ALL {
        let table = entity.warehouse_table();
        if !warehouse.table_exists(table)? {
            warn!("Table {table} does not exist");
            continue;
        }
        let preview = query::preview_table(warehouse.connection(), table, args.rows)
            .with_context(|| format!("Previewing {table}"))?;
        println!("Table: {table}");
        render::print_table(&preview.columns, &preview.rows);
        println!();
    }
    Ok(())
}

fn handle_reset(config: &EtlConfig) -> Result<()> {
    let warehouse = open_existing_warehouse(config)?;
    for entity in entity::Entity::ALL {
        warehouse
            .drop_table(entity.warehouse_table())
            .with_context(|| format!("Dropping {}", entity.warehouse_table()))?;
    }
    warehouse.close()?;
    info!("All warehouse tables dropped from {:?}", config.database);
    Ok(())
}
