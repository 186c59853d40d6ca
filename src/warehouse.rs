//! Schema loader for the SQLite star schema. Each [`Warehouse::load_table`]
//! call is its own transaction.

use std::{fs, path::Path};

use clap::ValueEnum;
use log::{debug, info, warn};
use rusqlite::{
    Connection, OptionalExtension, params_from_iter,
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
};

use crate::{
    data::Value,
    error::{EtlError, Result},
    table::Table,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum LoadMode {
    /// Drop and recreate each destination table from the snapshot.
    Create,
    /// Insert snapshot rows into existing destination tables.
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub mode: LoadMode,
    // deletes existing rows before an append, same transaction
    pub truncate: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            mode: LoadMode::Create,
            truncate: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub table: String,
    pub mode: LoadMode,
    pub rows_deleted: usize,
    pub rows_inserted: usize,
    pub rows_after: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Real,
    Text,
    Any,
}

impl SqlType {
    pub fn as_sql(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
            SqlType::Any => "ANY",
        }
    }

    fn widen(self, value: &Value) -> SqlType {
        match (self, value) {
            (current, Value::Null) => current,
            (SqlType::Text, _) | (_, Value::Text(_)) => SqlType::Text,
            (SqlType::Real, _) | (_, Value::Float(_)) => SqlType::Real,
            (SqlType::Any | SqlType::Integer, Value::Integer(_)) => SqlType::Integer,
        }
    }
}

pub fn infer_column_types(table: &Table) -> Vec<SqlType> {
    (0..table.headers().len())
        .map(|idx| table.column(idx).fold(SqlType::Any, SqlType::widen))
        .collect()
}

/// Double-quotes an identifier after rejecting names SQLite cannot hold.
pub fn quote_identifier(name: &str) -> Result<String> {
    if name.is_empty() || name.contains('\0') {
        return Err(EtlError::Config(format!("Invalid SQL identifier {name:?}")));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|err| EtlError::load(path.display().to_string(), err))?;
        debug!("Opened warehouse at {:?}", path);
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|err| EtlError::load(":memory:", err))?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, err)| EtlError::load("<connection>", err))
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(|err| EtlError::load(table, err))
    }

    pub fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let sql = format!("PRAGMA table_info({})", quote_identifier(table)?);
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| EtlError::load(table, err))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|err| EtlError::load(table, err))?;
        Ok(columns)
    }

    pub fn row_count(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table)?);
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|err| EtlError::load(table, err))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn drop_table(&self, table: &str) -> Result<()> {
        let sql = format!("DROP TABLE IF EXISTS {}", quote_identifier(table)?);
        self.conn
            .execute(&sql, [])
            .map_err(|err| EtlError::load(table, err))?;
        info!("Dropped {table}");
        Ok(())
    }

    pub fn load_table(&mut self, name: &str, table: &Table, options: LoadOptions) -> Result<LoadReport> {
        if table.headers().is_empty() {
            return Err(EtlError::load_rejected(name, "Snapshot has no columns"));
        }
        let quoted_table = quote_identifier(name)?;
        let quoted_columns = table
            .headers()
            .iter()
            .map(|h| quote_identifier(h))
            .collect::<Result<Vec<_>>>()?;

        let mut rows_deleted = 0;
        match options.mode {
            LoadMode::Create => {}
            LoadMode::Append => {
                self.check_append_target(name, table)?;
                let existing = self.row_count(name)?;
                if existing > 0 && !options.truncate {
                    warn!(
                        "Appending to {name} which already holds {existing} row(s); rows are not deduplicated"
                    );
                }
            }
        }

        let tx = self
            .conn
            .transaction()
            .map_err(|err| EtlError::load(name, err))?;
        match options.mode {
            LoadMode::Create => {
                let definitions = quoted_columns
                    .iter()
                    .zip(infer_column_types(table))
                    .map(|(column, ty)| format!("{column} {}", ty.as_sql()))
                    .collect::<Vec<_>>()
                    .join(", ");
                tx.execute_batch(&format!(
                    "DROP TABLE IF EXISTS {quoted_table}; CREATE TABLE {quoted_table} ({definitions}) STRICT;"
                ))
                .map_err(|err| EtlError::load(name, err))?;
            }
            LoadMode::Append if options.truncate => {
                rows_deleted = tx
                    .execute(&format!("DELETE FROM {quoted_table}"), [])
                    .map_err(|err| EtlError::load(name, err))?;
            }
            LoadMode::Append => {}
        }

        let placeholders = (1..=quoted_columns.len())
            .map(|idx| format!("?{idx}"))
            .collect::<Vec<_>>()
            .join(", ");
        let insert = format!(
            "INSERT INTO {quoted_table} ({}) VALUES ({placeholders})",
            quoted_columns.join(", ")
        );
        let mut rows_inserted = 0;
        {
            let mut stmt = tx
                .prepare(&insert)
                .map_err(|err| EtlError::load(name, err))?;
            for row in table.rows() {
                stmt.execute(params_from_iter(row.iter()))
                    .map_err(|err| EtlError::load(name, err))?;
                rows_inserted += 1;
            }
        }
        tx.commit().map_err(|err| EtlError::load(name, err))?;

        let rows_after = self.row_count(name)?;
        info!(
            "{} {name}: {rows_inserted} row(s) inserted, {rows_after} row(s) total",
            match options.mode {
                LoadMode::Create => "Created",
                LoadMode::Append => "Appended",
            }
        );
        Ok(LoadReport {
            table: name.to_string(),
            mode: options.mode,
            rows_deleted,
            rows_inserted,
            rows_after,
        })
    }

    fn check_append_target(&self, name: &str, table: &Table) -> Result<()> {
        if !self.table_exists(name)? {
            return Err(EtlError::load_rejected(
                name,
                "Destination table does not exist; run a create-mode load first",
            ));
        }
        let existing = self.table_columns(name)?;
        if existing.len() != table.headers().len() {
            return Err(EtlError::load_rejected(
                name,
                format!(
                    "Column count mismatch: snapshot has {} column(s), table has {}",
                    table.headers().len(),
                    existing.len()
                ),
            ));
        }
        let missing = table
            .headers()
            .iter()
            .filter(|h| !existing.iter().any(|e| e.eq_ignore_ascii_case(h)))
            .cloned()
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(EtlError::load_rejected(
                name,
                format!("Snapshot columns not present in table: {}", missing.join(", ")),
            ));
        }
        Ok(())
    }
}
