use std::{fs, path::Path};

use crate::{
    entity::Entity,
    error::Result,
    io_utils,
    warehouse::Warehouse,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCount {
    pub file: String,
    pub rows: std::result::Result<usize, String>,
}

/// Counts data rows of every `.csv` file directly inside `dir`, sorted by name.
pub fn count_csv_rows(dir: &Path) -> Result<Vec<FileCount>> {
    let mut files = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect::<Vec<_>>();
    files.sort();

    Ok(files
        .iter()
        .map(|path| FileCount {
            file: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            rows: count_rows(path).map_err(|err| err.to_string()),
        })
        .collect())
}

fn count_rows(path: &Path) -> Result<usize> {
    let mut reader = io_utils::open_csv_reader_from_path(path, io_utils::DEFAULT_DELIMITER)?;
    let mut record = csv::ByteRecord::new();
    let mut rows = 0;
    while reader
        .read_byte_record(&mut record)
        .map_err(|err| io_utils::csv_error(path, err))?
    {
        rows += 1;
    }
    Ok(rows)
}

pub fn warehouse_counts(warehouse: &Warehouse) -> Result<Vec<(String, usize)>> {
    let mut counts = Vec::new();
    for entity in Entity::ALL {
        let table = entity.warehouse_table();
        if warehouse.table_exists(table)? {
            counts.push((table.to_string(), warehouse.row_count(table)?));
        }
    }
    Ok(counts)
}
