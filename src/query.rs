use rusqlite::{Connection, types::ValueRef};

use crate::{
    error::{EtlError, Result},
    warehouse::quote_identifier,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    // includes rows past the limit
    pub total_rows: usize,
    pub rows_affected: usize,
}

#[derive(Debug)]
pub struct QueryOutcome {
    // 1-based
    pub index: usize,
    pub sql: String,
    pub result: Result<QueryResult>,
}

/// Splits a script on `;`, skipping semicolons inside quotes and comments.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = script.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => {
                quote = Some(ch);
                current.push(ch);
            }
            '-' if chars.peek() == Some(&'-') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                current.push(' ');
            }
            ';' => push_statement(&mut statements, &mut current),
            other => current.push(other),
        }
    }
    push_statement(&mut statements, &mut current);
    statements
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}

fn render_cell(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => format!("<blob {} bytes>", bytes.len()),
    }
}

pub fn run_query(conn: &Connection, sql: &str, limit: usize) -> Result<QueryResult> {
    let mut stmt = conn.prepare(sql).map_err(EtlError::Query)?;
    let columns = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    if columns.is_empty() {
        let rows_affected = stmt.execute([]).map_err(EtlError::Query)?;
        return Ok(QueryResult {
            columns,
            rows: Vec::new(),
            total_rows: 0,
            rows_affected,
        });
    }

    let mut rows = Vec::new();
    let mut total_rows = 0;
    let mut cursor = stmt.query([]).map_err(EtlError::Query)?;
    while let Some(row) = cursor.next().map_err(EtlError::Query)? {
        total_rows += 1;
        if rows.len() < limit {
            let rendered = (0..columns.len())
                .map(|idx| row.get_ref(idx).map(render_cell))
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(EtlError::Query)?;
            rows.push(rendered);
        }
    }
    Ok(QueryResult {
        columns,
        rows,
        total_rows,
        rows_affected: 0,
    })
}

pub fn run_script(conn: &Connection, script: &str, limit: usize) -> Vec<QueryOutcome> {
    split_statements(script)
        .into_iter()
        .enumerate()
        .map(|(idx, sql)| {
            let result = run_query(conn, &sql, limit);
            QueryOutcome {
                index: idx + 1,
                sql,
                result,
            }
        })
        .collect()
}

pub fn preview_table(conn: &Connection, table: &str, rows: usize) -> Result<QueryResult> {
    let sql = format!("SELECT * FROM {} LIMIT {rows}", quote_identifier(table)?);
    run_query(conn, &sql, rows)
}
