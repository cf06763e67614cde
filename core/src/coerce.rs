//! Per-field value conversion.
//!
//! # Design
//! Every conversion has two read paths. `coerce` is strict and returns a
//! `TypeConversionError` when the raw value does not fit the target type.
//! `coerce_or_raw` is tolerant: on failure it hands back the raw value
//! wrapped in `FieldValue::Raw`, so a record is always fully resolved even
//! when the service sends something unexpected.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::error::TypeConversionError;

/// Target type a record field is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Date,
    Symbol,
    List,
    Boolean,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Date => "date",
            FieldType::Symbol => "symbol",
            FieldType::List => "list",
            FieldType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// A canonical token: lower-case, whitespace runs collapsed to `_`.
///
/// Construction is idempotent, so a token that is already canonical passes
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(text: &str) -> Self {
        let token = text
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_");
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A resolved record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Absent from the source with no declared default.
    Nil,
    String(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Symbol(Symbol),
    List(Vec<Value>),
    Boolean(bool),
    /// Tolerant fallback: the raw value that failed conversion.
    Raw(Value),
}

impl FieldValue {
    pub fn is_nil(&self) -> bool {
        matches!(self, FieldValue::Nil)
    }

    /// Returns `true` when the field holds a raw value that failed conversion.
    pub fn is_fallback(&self) -> bool {
        matches!(self, FieldValue::Raw(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(n) => Some(*n),
            FieldValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            FieldValue::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Textual form, used for derived identifiers. Dates render as `YYYY-MM-DD`
/// and raw strings render without JSON quoting.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Nil => Ok(()),
            FieldValue::String(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{n}"),
            FieldValue::Float(n) => write!(f, "{n}"),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Symbol(s) => f.write_str(s.as_str()),
            FieldValue::List(items) => write!(f, "{}", Value::Array(items.clone())),
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::Raw(Value::String(s)) => f.write_str(s),
            FieldValue::Raw(other) => write!(f, "{other}"),
        }
    }
}

/// Strict conversion of `raw` to `target`.
pub fn coerce(raw: &Value, target: FieldType) -> Result<FieldValue, TypeConversionError> {
    let converted = match target {
        FieldType::String => Some(FieldValue::String(text_of(raw))),
        FieldType::Integer => integer_of(raw).map(FieldValue::Integer),
        FieldType::Float => float_of(raw).map(FieldValue::Float),
        FieldType::Date => date_of(raw).map(FieldValue::Date),
        FieldType::Symbol => symbol_of(raw).map(FieldValue::Symbol),
        FieldType::List => Some(FieldValue::List(list_of(raw))),
        FieldType::Boolean => boolean_of(raw).map(FieldValue::Boolean),
    };
    converted.ok_or_else(|| TypeConversionError::new(target, raw))
}

/// Tolerant conversion: falls back to the raw value instead of failing.
pub fn coerce_or_raw(raw: &Value, target: FieldType) -> FieldValue {
    match coerce(raw, target) {
        Ok(value) => value,
        Err(err) => {
            trace!(%err, "keeping raw value");
            FieldValue::Raw(raw.clone())
        }
    }
}

fn text_of(raw: &Value) -> String {
    match raw {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn integer_of(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn float_of(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn date_of(raw: &Value) -> Option<NaiveDate> {
    match raw {
        Value::String(s) => parse_date(s.trim()),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 date-times, naive date-times, and xsd
/// dates carrying a zone suffix (`2011-03-01-08:00`, `2011-03-01Z`).
fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(datetime.date());
    }
    let (head, zone) = text.split_at_checked(10)?;
    if zone.starts_with(['Z', '+', '-']) {
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    } else {
        None
    }
}

fn symbol_of(raw: &Value) -> Option<Symbol> {
    let text = match raw {
        Value::String(s) => s.clone(),
        Value::Number(_) | Value::Bool(_) => raw.to_string(),
        _ => return None,
    };
    let symbol = Symbol::new(&text);
    (!symbol.as_str().is_empty()).then_some(symbol)
}

fn list_of(raw: &Value) -> Vec<Value> {
    match raw {
        Value::Null => Vec::new(),
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

fn boolean_of(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn string_accepts_anything() {
        assert_eq!(coerce(&json!("abc"), FieldType::String).unwrap(), FieldValue::String("abc".into()));
        assert_eq!(coerce(&json!(42), FieldType::String).unwrap(), FieldValue::String("42".into()));
        assert_eq!(coerce(&json!(true), FieldType::String).unwrap(), FieldValue::String("true".into()));
        assert_eq!(coerce(&json!(null), FieldType::String).unwrap(), FieldValue::String(String::new()));
    }

    #[test]
    fn integer_parses_numeric_text() {
        assert_eq!(coerce(&json!(" 950 "), FieldType::Integer).unwrap(), FieldValue::Integer(950));
        assert_eq!(coerce(&json!(12), FieldType::Integer).unwrap(), FieldValue::Integer(12));
        assert_eq!(coerce(&json!(3.0), FieldType::Integer).unwrap(), FieldValue::Integer(3));
        assert!(coerce(&json!("12.5"), FieldType::Integer).is_err());
        assert!(coerce(&json!("twelve"), FieldType::Integer).is_err());
    }

    #[test]
    fn float_parses_numeric_text() {
        assert_eq!(coerce(&json!("1.5"), FieldType::Float).unwrap(), FieldValue::Float(1.5));
        assert_eq!(coerce(&json!(2), FieldType::Float).unwrap(), FieldValue::Float(2.0));
        assert!(coerce(&json!("NaN"), FieldType::Float).is_err());
        assert!(coerce(&json!("abc"), FieldType::Float).is_err());
    }

    #[test]
    fn tolerant_date_parses_calendar_date() {
        assert_eq!(coerce_or_raw(&json!("2014-01-02"), FieldType::Date), FieldValue::Date(date(2014, 1, 2)));
    }

    #[test]
    fn tolerant_date_keeps_unparsable_text() {
        assert_eq!(
            coerce_or_raw(&json!("not-a-date"), FieldType::Date),
            FieldValue::Raw(json!("not-a-date"))
        );
    }

    #[test]
    fn strict_date_rejects_unparsable_text() {
        let err = coerce(&json!("not-a-date"), FieldType::Date).unwrap_err();
        assert_eq!(err.target, FieldType::Date);
        assert_eq!(err.value, json!("not-a-date"));
    }

    #[test]
    fn date_accepts_timestamps_and_zoned_dates() {
        let expected = FieldValue::Date(date(2011, 3, 1));
        assert_eq!(coerce(&json!("2011-03-01T10:30:00-08:00"), FieldType::Date).unwrap(), expected);
        assert_eq!(coerce(&json!("2011-03-01T10:30:00"), FieldType::Date).unwrap(), expected);
        assert_eq!(coerce(&json!("2011-03-01-08:00"), FieldType::Date).unwrap(), expected);
        assert_eq!(coerce(&json!("2011-03-01Z"), FieldType::Date).unwrap(), expected);
        assert!(coerce(&json!("2011-03-01 junk"), FieldType::Date).is_err());
        assert!(coerce(&json!(20110301), FieldType::Date).is_err());
    }

    #[test]
    fn symbol_collapses_whitespace_and_lowercases() {
        let symbol = coerce(&json!("tESTing   A Sentence"), FieldType::Symbol).unwrap();
        assert_eq!(symbol, FieldValue::Symbol(Symbol::new("testing_a_sentence")));
        assert_eq!(symbol.as_symbol().unwrap().as_str(), "testing_a_sentence");
    }

    #[test]
    fn symbol_is_idempotent() {
        let once = Symbol::new("Vacant Not  Leased");
        let twice = Symbol::new(once.as_str());
        assert_eq!(once, twice);
        assert_eq!(
            coerce(&json!(once.as_str()), FieldType::Symbol).unwrap(),
            FieldValue::Symbol(once)
        );
    }

    #[test]
    fn symbol_rejects_blank_and_structured_input() {
        assert!(coerce(&json!("   "), FieldType::Symbol).is_err());
        assert!(coerce(&json!({"a": 1}), FieldType::Symbol).is_err());
    }

    #[test]
    fn list_wraps_singletons_and_empties_nil() {
        assert_eq!(coerce(&json!("a"), FieldType::List).unwrap(), FieldValue::List(vec![json!("a")]));
        assert_eq!(
            coerce(&json!(["a", "b"]), FieldType::List).unwrap(),
            FieldValue::List(vec![json!("a"), json!("b")])
        );
        assert_eq!(coerce(&json!(null), FieldType::List).unwrap(), FieldValue::List(Vec::new()));
    }

    #[test]
    fn boolean_accepts_text() {
        assert_eq!(coerce(&json!("false"), FieldType::Boolean).unwrap(), FieldValue::Boolean(false));
        assert_eq!(coerce(&json!(" TRUE "), FieldType::Boolean).unwrap(), FieldValue::Boolean(true));
        assert_eq!(coerce(&json!(1), FieldType::Boolean).unwrap(), FieldValue::Boolean(true));
        assert!(coerce(&json!("maybe"), FieldType::Boolean).is_err());
    }

    #[test]
    fn display_renders_plain_text() {
        assert_eq!(FieldValue::Date(date(2014, 1, 2)).to_string(), "2014-01-02");
        assert_eq!(FieldValue::Raw(json!("x")).to_string(), "x");
        assert_eq!(FieldValue::Nil.to_string(), "");
    }
}
