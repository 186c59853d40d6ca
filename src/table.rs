use crate::{
    data::Value,
    error::{EtlError, Result},
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Builds a table from raw string rows, inferring each cell's value.
    pub fn from_raw<S: AsRef<str>>(headers: &[S], rows: &[Vec<S>]) -> Result<Self> {
        let mut table = Table::new(headers.iter().map(|h| h.as_ref().to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|cell| Value::parse(cell.as_ref())).collect())?;
        }
        Ok(table)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(EtlError::schema(format!(
                "Row {} has {} field(s) but the table declares {}",
                self.rows.len() + 1,
                row.len(),
                self.headers.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, field: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == field)
    }

    pub fn require_column(&self, field: &str) -> Result<usize> {
        self.column_index(field).ok_or_else(|| {
            EtlError::schema(format!(
                "Required field '{field}' is missing (available: {})",
                self.headers.join(", ")
            ))
        })
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(move |row| row.get(idx))
    }

    pub fn column_mut(&mut self, idx: usize) -> impl Iterator<Item = &mut Value> {
        self.rows.iter_mut().filter_map(move |row| row.get_mut(idx))
    }

    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[Value]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    pub(crate) fn replace_rows(&mut self, rows: Vec<Vec<Value>>) {
        self.rows = rows;
    }

    pub(crate) fn take_rows(&mut self) -> Vec<Vec<Value>> {
        std::mem::take(&mut self.rows)
    }

    pub fn rename_columns(&mut self, headers: Vec<String>) -> Result<()> {
        if headers.len() != self.headers.len() {
            return Err(EtlError::schema(format!(
                "Cannot rename {} column(s) with {} name(s)",
                self.headers.len(),
                headers.len()
            )));
        }
        self.headers = headers;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_index_finds_fields_by_name() {
        let table = Table::from_raw(&["id", "name"], &[vec!["1", "Ana"]]).unwrap();
        assert_eq!(table.column_index("name"), Some(1));
        assert_eq!(table.column_index("missing"), None);
        assert_eq!(
            table.column(1).collect::<Vec<_>>(),
            vec![&Value::Text("Ana".to_string())]
        );
    }

    #[test]
    fn push_row_rejects_ragged_rows() {
        let mut table = Table::new(vec!["a".to_string(), "b".to_string()]);
        assert!(table.push_row(vec![Value::Integer(1)]).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn require_column_reports_schema_error() {
        let table = Table::new(vec!["a".to_string()]);
        let err = table.require_column("saleamount").unwrap_err();
        assert_eq!(err.kind(), "SchemaError");
    }
}
