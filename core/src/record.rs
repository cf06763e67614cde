//! Declarative record models built from flat source mappings.
//!
//! # Design
//! A record type is a static table of `FieldSpec`s (`RecordModel`). The one
//! generic constructor, `build_record`, walks that table: for each field it
//! looks up the source alias, applies the declared default when the key is
//! absent, and otherwise coerces in tolerant mode. The resulting `Record` is
//! immutable and always fully resolved.
//!
//! Typed records (`Unit`, `FloorPlan`, ...) are thin newtypes over `Record`
//! declared with `record_type!`, which emits the static table and one typed
//! accessor per field.

use std::fmt;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::coerce::{coerce, coerce_or_raw, FieldType, FieldValue};
use crate::error::TypeConversionError;

/// Flat key/value mapping, as produced by extraction.
pub type Mapping = Map<String, Value>;

/// Value a field takes when its source key is absent or nil.
///
/// `Nil` on a list field resolves to an empty list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Nil,
    Boolean(bool),
    Text(&'static str),
}

impl FieldDefault {
    fn resolve(self, target: FieldType) -> FieldValue {
        match (self, target) {
            (FieldDefault::Nil, FieldType::List) => FieldValue::List(Vec::new()),
            (FieldDefault::Nil, _) => FieldValue::Nil,
            (FieldDefault::Boolean(b), _) => FieldValue::Boolean(b),
            (FieldDefault::Text(s), _) => FieldValue::String(s.to_string()),
        }
    }
}

/// One declared field of a record type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Record-side field name.
    pub name: &'static str,
    /// Response-side key the value is read from.
    pub source: &'static str,
    pub target: FieldType,
    pub default: FieldDefault,
}

/// Ordered set of fields describing one record type.
#[derive(Debug, PartialEq)]
pub struct RecordModel {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl RecordModel {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// An immutable snapshot built from one source mapping.
#[derive(Clone, PartialEq)]
pub struct Record {
    model: &'static RecordModel,
    values: Vec<FieldValue>,
    source: Mapping,
}

impl Record {
    pub fn model(&self) -> &'static RecordModel {
        self.model
    }

    /// Tolerant view of a field. Unknown names read as `Nil`.
    pub fn value(&self, name: &str) -> &FieldValue {
        const NIL: &FieldValue = &FieldValue::Nil;
        self.model
            .position(name)
            .and_then(|i| self.values.get(i))
            .unwrap_or(NIL)
    }

    /// Strict view of a field: re-reads the source value and fails if it
    /// does not convert to the declared type. Absent fields yield their
    /// default, and unknown names read as `Nil`.
    pub fn strict(&self, name: &str) -> Result<FieldValue, TypeConversionError> {
        let Some(spec) = self.model.field(name) else {
            return Ok(FieldValue::Nil);
        };
        match present(&self.source, spec.source) {
            Some(raw) => coerce(raw, spec.target),
            None => Ok(spec.default.resolve(spec.target)),
        }
    }

    /// Field name / value pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.model.fields.iter().map(|f| f.name).zip(self.values.iter())
    }

    /// Stable SHA-256 hex digest over the textual form of `names`.
    pub fn digest(&self, names: &[&str]) -> String {
        let mut hasher = Sha256::new();
        for name in names {
            hasher.update(self.value(name).to_string().as_bytes());
            hasher.update([0x1f]);
        }
        format!("{:x}", hasher.finalize())
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.model.name);
        for (name, value) in self.fields() {
            out.field(name, value);
        }
        out.finish()
    }
}

/// JSON null is treated the same as an absent key.
fn present<'a>(source: &'a Mapping, key: &str) -> Option<&'a Value> {
    source.get(key).filter(|v| !v.is_null())
}

/// Build a record of `model` from a flat source mapping.
pub fn build_record(source: &Mapping, model: &'static RecordModel) -> Record {
    let values = model
        .fields
        .iter()
        .map(|spec| match present(source, spec.source) {
            Some(raw) => coerce_or_raw(raw, spec.target),
            None => spec.default.resolve(spec.target),
        })
        .collect();
    Record {
        model,
        values,
        source: source.clone(),
    }
}

/// A typed record backed by a static `RecordModel`.
pub trait Model: Sized {
    fn model() -> &'static RecordModel;
    fn from_record(record: Record) -> Self;
    fn record(&self) -> &Record;

    fn build(source: &Mapping) -> Self {
        Self::from_record(build_record(source, Self::model()))
    }
}

macro_rules! field_or {
    ($fallback:expr) => {
        $fallback
    };
    ($fallback:expr, $value:expr) => {
        $value
    };
}
pub(crate) use field_or;

/// Declares a typed record: its static `RecordModel` plus a newtype with one
/// accessor per field.
///
/// ```ignore
/// record_type! {
///     /// A unit.
///     Unit, UNIT_MODEL, "unit" {
///         name: String,
///         square_feet: Integer as "square_footage",
///         best: Boolean = FieldDefault::Boolean(true),
///     }
/// }
/// ```
macro_rules! record_type {
    (
        $(#[$attr:meta])*
        $name:ident, $model:ident, $label:literal {
            $( $field:ident : $ty:ident $(as $alias:literal)? $(= $default:expr)? ),* $(,)?
        }
    ) => {
        pub static $model: $crate::record::RecordModel = $crate::record::RecordModel {
            name: $label,
            fields: &[
                $(
                    $crate::record::FieldSpec {
                        name: stringify!($field),
                        source: $crate::record::field_or!(stringify!($field) $(, $alias)?),
                        target: $crate::coerce::FieldType::$ty,
                        default: $crate::record::field_or!(
                            $crate::record::FieldDefault::Nil $(, $default)?
                        ),
                    },
                )*
            ],
        };

        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name($crate::record::Record);

        impl $crate::record::Model for $name {
            fn model() -> &'static $crate::record::RecordModel {
                &$model
            }

            fn from_record(record: $crate::record::Record) -> Self {
                Self(record)
            }

            fn record(&self) -> &$crate::record::Record {
                &self.0
            }
        }

        impl $name {
            $(
                pub fn $field(&self) -> $crate::record::record_type!(@ret $ty) {
                    $crate::record::record_type!(@get $ty, self.0.value(stringify!($field)))
                }
            )*
        }
    };

    (@ret String) => { Option<&str> };
    (@ret Integer) => { Option<i64> };
    (@ret Float) => { Option<f64> };
    (@ret Date) => { Option<chrono::NaiveDate> };
    (@ret Symbol) => { Option<&$crate::coerce::Symbol> };
    (@ret List) => { Option<&[serde_json::Value]> };
    (@ret Boolean) => { Option<bool> };

    (@get String, $v:expr) => { $v.as_str() };
    (@get Integer, $v:expr) => { $v.as_i64() };
    (@get Float, $v:expr) => { $v.as_f64() };
    (@get Date, $v:expr) => { $v.as_date() };
    (@get Symbol, $v:expr) => { $v.as_symbol() };
    (@get List, $v:expr) => { $v.as_list() };
    (@get Boolean, $v:expr) => { $v.as_bool() };
}
pub(crate) use record_type;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    record_type! {
        Sample, SAMPLE_MODEL, "sample" {
            label: String,
            size: Integer as "square_footage",
            opened: Date,
            status: Symbol,
            tags: List as "tag",
            best: Boolean = FieldDefault::Boolean(true),
            kind: String = FieldDefault::Text("standard"),
        }
    }

    fn mapping(value: Value) -> Mapping {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn reads_through_aliases() {
        let sample = Sample::build(&mapping(json!({"square_footage": "950", "size": "1"})));
        assert_eq!(sample.size(), Some(950));
    }

    #[test]
    fn absent_fields_take_defaults() {
        let sample = Sample::build(&Mapping::new());
        assert_eq!(sample.best(), Some(true));
        assert_eq!(sample.kind(), Some("standard"));
        assert_eq!(sample.label(), None);
        assert!(sample.record().value("label").is_nil());
    }

    #[test]
    fn boolean_default_is_overridden_by_text() {
        let sample = Sample::build(&mapping(json!({"best": "false"})));
        assert_eq!(sample.best(), Some(false));
    }

    #[test]
    fn null_counts_as_absent() {
        let sample = Sample::build(&mapping(json!({"best": null, "tag": null})));
        assert_eq!(sample.best(), Some(true));
        assert_eq!(sample.tags(), Some(&[][..]));
    }

    #[test]
    fn absent_list_is_empty_list() {
        let sample = Sample::build(&Mapping::new());
        assert_eq!(sample.tags(), Some(&[][..]));
        assert_eq!(sample.record().strict("tags").unwrap(), FieldValue::List(Vec::new()));
    }

    #[test]
    fn failed_conversion_keeps_raw_value() {
        let sample = Sample::build(&mapping(json!({"opened": "not-a-date"})));
        assert_eq!(sample.opened(), None);
        assert_eq!(sample.record().value("opened"), &FieldValue::Raw(json!("not-a-date")));
    }

    #[test]
    fn strict_read_reports_failure() {
        let sample = Sample::build(&mapping(json!({"opened": "not-a-date", "status": "Vacant Unrented"})));
        let err = sample.record().strict("opened").unwrap_err();
        assert_eq!(err.target, FieldType::Date);
        assert_eq!(
            sample.record().strict("status").unwrap(),
            FieldValue::Symbol(crate::coerce::Symbol::new("vacant_unrented"))
        );
        assert_eq!(sample.record().strict("best").unwrap(), FieldValue::Boolean(true));
    }

    #[test]
    fn typed_accessors_return_converted_values() {
        let sample = Sample::build(&mapping(json!({
            "label": 7,
            "opened": "2014-01-02",
            "status": "On Notice",
            "tag": "pool",
        })));
        assert_eq!(sample.label(), Some("7"));
        assert_eq!(sample.opened(), NaiveDate::from_ymd_opt(2014, 1, 2));
        assert_eq!(sample.status().unwrap().as_str(), "on_notice");
        assert_eq!(sample.tags(), Some(&[json!("pool")][..]));
    }

    #[test]
    fn fields_follow_declaration_order() {
        let sample = Sample::build(&Mapping::new());
        let names: Vec<_> = sample.record().fields().map(|(n, _)| n).collect();
        assert_eq!(names, ["label", "size", "opened", "status", "tags", "best", "kind"]);
    }

    #[test]
    fn digest_is_stable_and_field_sensitive() {
        let a = Sample::build(&mapping(json!({"label": "a", "square_footage": 1})));
        let b = Sample::build(&mapping(json!({"label": "a", "square_footage": 1})));
        let c = Sample::build(&mapping(json!({"label": "a", "square_footage": 2})));
        let names = ["label", "size"];
        assert_eq!(a.record().digest(&names), a.record().digest(&names));
        assert_eq!(a.record().digest(&names), b.record().digest(&names));
        assert_ne!(a.record().digest(&names), c.record().digest(&names));
        assert_eq!(a.record().digest(&names).len(), 64);
    }
}
