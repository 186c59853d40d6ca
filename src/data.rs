use std::fmt;

// Missing-value markers recognised in raw input only.
const NULL_TOKENS: &[&str] = &["NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "#N/A"];

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Infers the variant of a raw cell. Blank cells and the common
    /// missing-value markers are null; numbers may carry surrounding
    /// whitespace; anything else is kept verbatim as text.
    pub fn parse(raw: &str) -> Value {
        if raw.trim().is_empty() || NULL_TOKENS.contains(&raw) {
            return Value::Null;
        }
        Value::parse_non_null(raw)
    }

    /// Parses a cell written by the snapshot writer, where only the empty
    /// cell is null. Text such as `None` or `n/a` produced by cleaning stays text.
    pub fn parse_prepared(raw: &str) -> Value {
        if raw.is_empty() {
            return Value::Null;
        }
        Value::parse_non_null(raw)
    }

    fn parse_non_null(raw: &str) -> Value {
        let trimmed = raw.trim();
        if let Ok(parsed) = trimmed.parse::<i64>() {
            return Value::Integer(parsed);
        }
        match trimmed.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Value::Float(parsed),
            _ => Value::Text(raw.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Text(s) => s.clone(),
        }
    }

    // Numbers compare by rendered form so `10` and `10.0` collapse.
    pub fn dedup_key(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.as_display()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for Value {
    fn from(raw: &str) -> Self {
        Value::parse(raw)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_infers_numbers_text_and_nulls() {
        assert_eq!(Value::parse(""), Value::Null);
        assert_eq!(Value::parse("NaN"), Value::Null);
        assert_eq!(Value::parse("42"), Value::Integer(42));
        assert_eq!(Value::parse(" -7 "), Value::Integer(-7));
        assert_eq!(Value::parse("19.99"), Value::Float(19.99));
        assert_eq!(Value::parse(" EMAIL "), Value::Text(" EMAIL ".to_string()));
        assert_eq!(Value::parse("inf"), Value::Text("inf".to_string()));
        assert_eq!(Value::parse("   "), Value::Null);
    }

    #[test]
    fn parse_prepared_keeps_marker_text() {
        assert_eq!(Value::parse_prepared(""), Value::Null);
        assert_eq!(Value::parse_prepared("None"), Value::Text("None".to_string()));
        assert_eq!(Value::parse_prepared("n/a"), Value::Text("n/a".to_string()));
        assert_eq!(Value::parse_prepared("nan"), Value::Text("nan".to_string()));
        assert_eq!(Value::parse_prepared("15"), Value::Integer(15));
    }

    #[test]
    fn whole_floats_render_without_fraction() {
        assert_eq!(Value::Float(20.0).as_display(), "20");
        assert_eq!(Value::Float(15.5).as_display(), "15.5");
        assert_eq!(Value::Null.as_display(), "");
    }

    #[test]
    fn dedup_key_collapses_equal_numbers() {
        assert_eq!(Value::Integer(10).dedup_key(), Value::Float(10.0).dedup_key());
        assert_eq!(Value::Null.dedup_key(), None);
    }

    #[test]
    fn median_handles_odd_even_and_empty() {
        assert_eq!(median(&[30.0, 10.0, 20.0]), Some(20.0));
        assert_eq!(median(&[1.0, 4.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }
}
