use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};
use log::{error, info};

use crate::{
    clean::CleanReport,
    columns::ColumnNormalizer,
    config::EtlConfig,
    entity::Entity,
    error::Result,
    io_utils, snapshot,
    source::{self, CellSyntax},
    table::Table,
    warehouse::{LoadOptions, LoadReport, Warehouse},
};

#[derive(Debug)]
pub struct EntityOutcome<T> {
    pub entity: Entity,
    pub result: Result<T>,
}

#[derive(Debug)]
pub struct PhaseReport<T> {
    pub outcomes: Vec<EntityOutcome<T>>,
}

impl<T> PhaseReport<T> {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.succeeded() == 0
    }

    pub fn outcome(&self, entity: Entity) -> Option<&EntityOutcome<T>> {
        self.outcomes.iter().find(|o| o.entity == entity)
    }
}

#[derive(Debug, Clone)]
pub struct PrepareSummary {
    pub output: PathBuf,
    pub fields: Vec<String>,
    pub clean: CleanReport,
}

// Canonical names map to themselves, so prepared snapshots keep theirs.
pub fn read_normalized(
    path: &Path,
    encoding: &'static Encoding,
    cells: CellSyntax,
    normalizer: &ColumnNormalizer,
) -> Result<Table> {
    let mut table = source::read_table(path, encoding, cells)?;
    let canonical = normalizer.normalize_unique(table.headers())?;
    table.rename_columns(canonical)?;
    Ok(table)
}

pub fn prepare_entity(
    entity: Entity,
    config: &EtlConfig,
    normalizer: &ColumnNormalizer,
) -> Result<PrepareSummary> {
    let input = config.raw_path(entity);
    info!("Preparing {entity} from {:?}", input);
    let encoding = io_utils::resolve_encoding(config.input_encoding.as_deref())?;
    let table = read_normalized(&input, encoding, CellSyntax::Raw, normalizer)?;
    info!(
        "Loaded {} row(s) and {} field(s) for {entity}",
        table.len(),
        table.headers().len()
    );

    let (cleaned, clean) = entity.plan().apply(table)?;
    info!(
        "{entity}: removed {} duplicate(s), imputed {} value(s), filtered {} invalid row(s)",
        clean.duplicates_removed, clean.values_imputed, clean.rows_filtered
    );

    let output = config.prepared_path(entity);
    snapshot::write_snapshot(&cleaned, &output)?;
    info!("Saved {} cleaned row(s) to {:?}", cleaned.len(), output);
    Ok(PrepareSummary {
        output,
        fields: cleaned.headers().to_vec(),
        clean,
    })
}

pub fn prepare(
    config: &EtlConfig,
    entities: &[Entity],
    normalizer: &ColumnNormalizer,
) -> PhaseReport<PrepareSummary> {
    run_each(entities, |entity| prepare_entity(entity, config, normalizer))
}

pub fn load_entity(
    warehouse: &mut Warehouse,
    entity: Entity,
    config: &EtlConfig,
    normalizer: &ColumnNormalizer,
    options: LoadOptions,
) -> Result<LoadReport> {
    let input = config.prepared_path(entity);
    info!(
        "Loading {entity} from {:?} into {:?} table {}",
        input,
        entity.table_kind(),
        entity.warehouse_table()
    );
    let table = read_normalized(&input, UTF_8, CellSyntax::Prepared, normalizer)?;
    warehouse.load_table(entity.warehouse_table(), &table, options)
}

pub fn load(
    warehouse: &mut Warehouse,
    config: &EtlConfig,
    entities: &[Entity],
    normalizer: &ColumnNormalizer,
    options: LoadOptions,
) -> PhaseReport<LoadReport> {
    run_each(entities, |entity| {
        load_entity(warehouse, entity, config, normalizer, options)
    })
}

fn run_each<T, F>(entities: &[Entity], mut step: F) -> PhaseReport<T>
where
    F: FnMut(Entity) -> Result<T>,
{
    let outcomes = entities
        .iter()
        .map(|&entity| {
            let result = step(entity);
            if let Err(err) = &result {
                error!("{entity} failed with {}: {err}", err.kind());
            }
            EntityOutcome { entity, result }
        })
        .collect();
    PhaseReport { outcomes }
}
