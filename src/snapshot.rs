use std::{fs, io::Write, path::Path};

use log::debug;
use tempfile::NamedTempFile;

use crate::{
    data::Value,
    error::{EtlError, Result},
    io_utils,
    table::Table,
};

// Staged beside the destination, then renamed over it.
pub fn write_snapshot(table: &Table, path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut staged = NamedTempFile::new_in(parent)?;
    {
        let mut writer = io_utils::open_csv_writer(staged.as_file_mut(), io_utils::DEFAULT_DELIMITER);
        writer
            .write_record(table.headers())
            .map_err(|err| io_utils::csv_error(path, err))?;
        for row in table.rows() {
            writer
                .write_record(row.iter().map(Value::as_display))
                .map_err(|err| io_utils::csv_error(path, err))?;
        }
        writer.flush()?;
    }
    staged.as_file_mut().flush()?;
    staged
        .persist(path)
        .map_err(|err| EtlError::Io(err.error))?;

    debug!("Wrote {} row(s) to {:?}", table.len(), path);
    Ok(())
}
