//! Rule engine shared by the entity cleaners. Rules run in a fixed order:
//! deduplicate, impute numeric, impute categorical, normalize text, filter.

use itertools::Itertools;
use log::debug;

use crate::{
    data::{Value, median},
    error::{EtlError, Result},
    table::Table,
    transform::string_ops,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Casing {
    Title,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericFill {
    /// Median of the non-null values present after deduplication.
    Median,
    Constant(i64),
}

#[derive(Debug, Clone, Copy)]
pub struct NumericField {
    pub name: &'static str,
    pub fill: NumericFill,
    /// Drop rows whose value is below zero.
    pub non_negative: bool,
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CategoricalField {
    pub name: &'static str,
    pub sentinel: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TextField {
    pub name: &'static str,
    pub casing: Casing,
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CleaningPlan {
    pub numeric: &'static [NumericField],
    pub categorical: &'static [CategoricalField],
    pub text: &'static [TextField],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub rows_in: usize,
    pub duplicates_removed: usize,
    pub values_imputed: usize,
    pub values_normalized: usize,
    pub rows_filtered: usize,
    pub rows_out: usize,
}

impl CleaningPlan {
    pub fn apply(&self, mut table: Table) -> Result<(Table, CleanReport)> {
        self.check_required(&table)?;
        let mut report = CleanReport {
            rows_in: table.len(),
            ..CleanReport::default()
        };

        report.duplicates_removed = dedupe(&mut table);
        for field in self.numeric {
            report.values_imputed += impute_numeric(&mut table, field.name, field.fill)?;
        }
        for field in self.categorical {
            report.values_imputed += impute_categorical(&mut table, field.name, field.sentinel);
        }
        for field in self.text {
            report.values_normalized += normalize_text(&mut table, field.name, field.casing);
        }
        for field in self.numeric.iter().filter(|f| f.non_negative) {
            report.rows_filtered += filter_negative(&mut table, field.name)?;
        }

        report.rows_out = table.len();
        debug!("Cleaning finished: {report:?}");
        Ok((table, report))
    }

    fn check_required(&self, table: &Table) -> Result<()> {
        let required = self
            .numeric
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .chain(self.categorical.iter().filter(|f| f.required).map(|f| f.name))
            .chain(self.text.iter().filter(|f| f.required).map(|f| f.name));
        for name in required {
            table.require_column(name)?;
        }
        Ok(())
    }
}

pub fn dedupe(table: &mut Table) -> usize {
    let rows = table.take_rows();
    let before = rows.len();
    let unique = rows
        .into_iter()
        .unique_by(|row| row.iter().map(Value::dedup_key).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    let removed = before - unique.len();
    table.replace_rows(unique);
    removed
}

fn numeric_values(table: &Table, idx: usize, field: &str) -> Result<Vec<f64>> {
    table
        .column(idx)
        .enumerate()
        .filter(|(_, value)| !value.is_null())
        .map(|(row, value)| {
            value.as_f64().ok_or_else(|| {
                EtlError::schema(format!(
                    "Field '{field}' holds non-numeric value '{value}' in row {}",
                    row + 1
                ))
            })
        })
        .collect()
}

// A median over no values leaves the nulls in place.
pub fn impute_numeric(table: &mut Table, field: &str, fill: NumericFill) -> Result<usize> {
    let Some(idx) = table.column_index(field) else {
        return Ok(0);
    };
    let present = numeric_values(table, idx, field)?;
    let replacement = match fill {
        NumericFill::Constant(value) => Value::Integer(value),
        NumericFill::Median => match median(&present) {
            Some(m) => Value::Float(m),
            None => {
                debug!("Field '{field}' has no values to take a median from");
                return Ok(0);
            }
        },
    };
    Ok(fill_nulls(table, idx, &replacement))
}

pub fn impute_categorical(table: &mut Table, field: &str, sentinel: &str) -> usize {
    match table.column_index(field) {
        Some(idx) => fill_nulls(table, idx, &Value::Text(sentinel.to_string())),
        None => 0,
    }
}

fn fill_nulls(table: &mut Table, idx: usize, replacement: &Value) -> usize {
    let mut filled = 0;
    for value in table.column_mut(idx).filter(|v| v.is_null()) {
        *value = replacement.clone();
        filled += 1;
    }
    filled
}

pub fn normalize_text(table: &mut Table, field: &str, casing: Casing) -> usize {
    let Some(idx) = table.column_index(field) else {
        return 0;
    };
    let mut changed = 0;
    for value in table.column_mut(idx) {
        let Value::Text(text) = value else {
            continue;
        };
        let trimmed = string_ops::trim(text);
        let cased = match casing {
            Casing::Title => string_ops::title_case(&trimmed).into_owned(),
            Casing::Lower => string_ops::lowercase(&trimmed).into_owned(),
        };
        if cased != *text {
            *text = cased;
            changed += 1;
        }
    }
    changed
}

// Nulls are kept.
pub fn filter_negative(table: &mut Table, field: &str) -> Result<usize> {
    let Some(idx) = table.column_index(field) else {
        return Ok(0);
    };
    numeric_values(table, idx, field)?;
    Ok(table.retain_rows(|row| {
        row.get(idx)
            .and_then(Value::as_f64)
            .is_none_or(|value| value >= 0.0)
    }))
}
