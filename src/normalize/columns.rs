//! Applies the normalizer to whole documents.
//!
//! A [`ColumnSchema`] names the composite, list and numeric columns of one kind of document.
//! Ingestion cleaning and the read-path adapter both call [`ColumnSchema::apply`], so a column
//! is always reshaped with the same table.

use log::debug;
use serde_json::{Map, Number, Value};

use super::decode;
use super::field::{normalize_domain, RawField};
use super::tables::FieldDomain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSchema {
    pub domain_columns: &'static [(&'static str, FieldDomain)],
    pub list_columns: &'static [&'static str],
    pub numeric_columns: &'static [&'static str],
}

impl ColumnSchema {
    /// A schema with no special columns.
    pub const PLAIN: ColumnSchema = ColumnSchema {
        domain_columns: &[],
        list_columns: &[],
        numeric_columns: &[],
    };

    pub fn domain_of(&self, column: &str) -> Option<FieldDomain> {
        self.domain_columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, domain)| *domain)
    }

    /// Normalizes every known column present in `doc`, in place.
    pub fn apply(&self, doc: &mut Map<String, Value>) {
        for (column, domain) in self.domain_columns {
            if let Some(raw) = doc.get_mut(*column) {
                *raw = normalize_domain(*domain, raw).into_value();
            }
        }
        for column in self.list_columns {
            if let Some(raw) = doc.get_mut(*column) {
                *raw = normalize_list(raw);
            }
        }
        for column in self.numeric_columns {
            if let Some(raw) = doc.get_mut(*column) {
                *raw = normalize_number(column, raw);
            }
        }
    }
}

/// Decodes a list column into an array of strings; unusable input becomes `null`.
pub fn normalize_list(raw: &Value) -> Value {
    let items = match RawField::classify(raw) {
        RawField::NameValueList(items) => items.to_vec(),
        RawField::EncodedString(s) => match decode::decode(s) {
            Some(Value::Array(items)) => items,
            _ => vec![Value::String(s.trim().to_string())],
        },
        _ => return Value::Null,
    };

    Value::Array(
        items
            .into_iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => {
                    let s = s.trim();
                    (!s.is_empty()).then(|| Value::String(s.to_string()))
                }
                other => Some(Value::String(other.to_string())),
            })
            .collect(),
    )
}

/// Coerces a scalar column to a number; blank or missing markers become `null`.
pub fn normalize_number(column: &str, raw: &Value) -> Value {
    match RawField::classify(raw) {
        RawField::Null | RawField::EmptyString | RawField::Missing => Value::Null,
        RawField::PrimitiveScalar(Value::Number(n)) => n
            .as_f64()
            .and_then(Number::from_f64)
            .map_or_else(|| raw.clone(), Value::Number),
        RawField::EncodedString(s) => match s.trim().parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Value::Number(n),
            None => {
                debug!("keeping non-numeric {} value {:?}", column, s);
                raw.clone()
            }
        },
        _ => raw.clone(),
    }
}
