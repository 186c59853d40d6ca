//! Field-name canonicalization.
//!
//! Raw headers arrive with mixed case, padding, embedded spaces and stray
//! quotes. [`ColumnNormalizer`] maps each one to a lowercase, trimmed,
//! `_`-separated identifier and suffixes anything that collides with a
//! reserved word of the warehouse's SQL grammar.

use std::collections::{BTreeSet, HashSet};

use crate::error::{EtlError, Result};

pub const RESERVED_SUFFIX: &str = "_col";

// Bump when the list changes.
pub const SQLITE_KEYWORDS_VERSION: &str = "sqlite-3-core-1";

const SQLITE_KEYWORDS: &[&str] = &[
    "ABORT", "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ANALYZE", "AND", "AS", "ASC", "ATTACH",
    "AUTOINCREMENT", "BEFORE", "BEGIN", "BETWEEN", "BY", "CASCADE", "CASE", "CAST", "CHECK",
    "COLLATE", "COLUMN", "COMMIT", "CONFLICT", "CONSTRAINT", "CREATE", "CROSS", "CURRENT_DATE",
    "CURRENT_TIME", "CURRENT_TIMESTAMP", "DATABASE", "DEFAULT", "DEFERRABLE", "DEFERRED",
    "DELETE", "DESC", "DETACH", "DISTINCT", "DROP", "EACH", "ELSE", "END", "ESCAPE", "EXCEPT",
    "EXCLUSIVE", "EXISTS", "EXPLAIN", "FAIL", "FOR", "FOREIGN", "FROM", "FULL", "GLOB", "GROUP",
    "HAVING", "IF", "IGNORE", "IMMEDIATE", "IN", "INDEX", "INDEXED", "INITIALLY", "INNER",
    "INSERT", "INSTEAD", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN", "KEY", "LEFT", "LIKE",
    "LIMIT", "MATCH", "NATURAL", "NO", "NOT", "NOTNULL", "NULL", "OF", "OFFSET", "ON", "OR",
    "ORDER", "OUTER", "PLAN", "PRAGMA", "PRIMARY", "QUERY", "RAISE", "RECURSIVE", "REFERENCES",
    "REGEXP", "REINDEX", "RELEASE", "RENAME", "REPLACE", "RESTRICT", "RIGHT", "ROLLBACK", "ROW",
    "SAVEPOINT", "SELECT", "SET", "TABLE", "TEMP", "TEMPORARY", "THEN", "TO", "TRANSACTION",
    "TRIGGER", "UNION", "UNIQUE", "UPDATE", "USING", "VACUUM", "VALUES", "VIEW", "VIRTUAL",
    "WHEN", "WHERE", "WITH", "WITHOUT",
];

/// Immutable, versioned set of reserved tokens (stored uppercase).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedWords {
    version: String,
    words: BTreeSet<String>,
}

impl ReservedWords {
    pub fn new<I, S>(version: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            version: version.into(),
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_ascii_uppercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn sqlite() -> Self {
        Self::new(SQLITE_KEYWORDS_VERSION, SQLITE_KEYWORDS.iter().copied())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.words.contains(&name.to_ascii_uppercase())
    }
}

impl Default for ReservedWords {
    fn default() -> Self {
        Self::sqlite()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColumnNormalizer {
    reserved: ReservedWords,
}

impl ColumnNormalizer {
    pub fn new(reserved: ReservedWords) -> Self {
        Self { reserved }
    }

    pub fn reserved(&self) -> &ReservedWords {
        &self.reserved
    }

    /// Quotes are dropped, the name is trimmed and lowercased, and every run
    /// of whitespace or `.` becomes a single `_`. Idempotent.
    pub fn canonical(&self, raw: &str) -> String {
        let mut canonical = String::with_capacity(raw.len());
        let mut pending_separator = false;
        for ch in raw.trim().chars() {
            match ch {
                '"' | '\'' => {}
                c if c.is_whitespace() || c == '.' => pending_separator = true,
                c => {
                    if pending_separator && !canonical.is_empty() {
                        canonical.push('_');
                    }
                    pending_separator = false;
                    canonical.extend(c.to_lowercase());
                }
            }
        }
        if self.reserved.is_reserved(&canonical) {
            canonical.push_str(RESERVED_SUFFIX);
        }
        canonical
    }

    pub fn normalize_headers<S: AsRef<str>>(&self, raw: &[S]) -> Vec<String> {
        raw.iter().map(|name| self.canonical(name.as_ref())).collect()
    }

    // Rejects collisions and names that canonicalize to nothing.
    pub fn normalize_unique<S: AsRef<str>>(&self, raw: &[S]) -> Result<Vec<String>> {
        let canonical = self.normalize_headers(raw);
        let mut seen = HashSet::with_capacity(canonical.len());
        for (name, original) in canonical.iter().zip(raw) {
            if name.is_empty() {
                return Err(EtlError::schema(format!(
                    "Field name {:?} is empty after normalization",
                    original.as_ref()
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(EtlError::schema(format!(
                    "Field {:?} collides with another field as '{name}'",
                    original.as_ref()
                )));
            }
        }
        Ok(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_lowercases_trims_and_joins_words() {
        let normalizer = ColumnNormalizer::default();
        assert_eq!(normalizer.canonical("  Customer ID "), "customer_id");
        assert_eq!(normalizer.canonical("Loyalty   Points"), "loyalty_points");
        assert_eq!(normalizer.canonical("\"Region\""), "region");
        assert_eq!(normalizer.canonical("unit.price"), "unit_price");
    }

    #[test]
    fn reserved_names_receive_suffix() {
        let normalizer = ColumnNormalizer::default();
        assert_eq!(normalizer.canonical("Order"), "order_col");
        assert_eq!(normalizer.canonical("order_total"), "order_total");
        assert_eq!(normalizer.canonical("GROUP"), "group_col");
    }

    #[test]
    fn substitute_keyword_set_is_honoured() {
        let normalizer = ColumnNormalizer::new(ReservedWords::new("test", ["region"]));
        assert_eq!(normalizer.canonical("Region"), "region_col");
        assert_eq!(normalizer.canonical("Order"), "order");
        assert_eq!(normalizer.reserved().version(), "test");
    }

    #[test]
    fn normalize_unique_rejects_collisions() {
        let normalizer = ColumnNormalizer::default();
        assert!(normalizer.normalize_unique(&["Name", " name "]).is_err());
        assert!(normalizer.normalize_unique(&["\"\""]).is_err());
        assert_eq!(
            normalizer.normalize_unique(&["A", "B"]).unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
