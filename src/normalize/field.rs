//! The field normalizer.
//!
//! [`normalize`] reshapes one raw field value into a [`CanonicalMap`] holding every canonical
//! key of the table's domain. It never fails: anything it cannot interpret leaves keys `null`.

use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Number, Value};

use super::decode;
use super::tables::{FieldDomain, NameTable, ValueKind};

/// Strings that mark a missing cell in exported data.
const MISSING_SENTINELS: &[&str] = &["nan", "NaN", "None"];

/// Classification of a raw field value before normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawField<'a> {
    Null,
    EmptyString,
    Missing,
    PrimitiveScalar(&'a Value),
    EncodedString(&'a str),
    NameValueList(&'a [Value]),
    RawMapping(&'a Map<String, Value>),
}

impl<'a> RawField<'a> {
    pub fn classify(raw: &'a Value) -> Self {
        match raw {
            Value::Null => RawField::Null,
            Value::Bool(_) | Value::Number(_) => RawField::PrimitiveScalar(raw),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    RawField::EmptyString
                } else if trimmed == "null" {
                    RawField::Null
                } else if MISSING_SENTINELS.contains(&trimmed) {
                    RawField::Missing
                } else {
                    RawField::EncodedString(s)
                }
            }
            Value::Array(entries) => RawField::NameValueList(entries),
            Value::Object(map) => RawField::RawMapping(map),
        }
    }
}

/// A fully keyed canonical field, in the table's key order.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalMap {
    domain: FieldDomain,
    entries: Vec<(&'static str, Value)>,
}

impl CanonicalMap {
    /// Every canonical key of `table` set to `null`.
    pub fn empty(table: &NameTable) -> Self {
        Self {
            domain: table.domain,
            entries: table.key_names().map(|key| (key, Value::Null)).collect(),
        }
    }

    pub fn domain(&self) -> FieldDomain {
        self.domain
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }

    /// Sets `key` if it is canonical for this map's domain; other keys are ignored.
    pub fn set(&mut self, key: &str, value: Value) {
        if let Some(slot) = self.entries.iter_mut().find(|(name, _)| *name == key) {
            slot.1 = value;
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.entries.iter().map(|(name, value)| (*name, value))
    }

    pub fn is_all_null(&self) -> bool {
        self.entries.iter().all(|(_, value)| value.is_null())
    }

    pub fn into_value(self) -> Value {
        Value::Object(
            self.entries
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }
}

impl Serialize for CanonicalMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Normalizes `raw` against `table`.
pub fn normalize(raw: &Value, table: &NameTable) -> CanonicalMap {
    let mut result = CanonicalMap::empty(table);

    match RawField::classify(raw) {
        RawField::Null
        | RawField::EmptyString
        | RawField::Missing
        | RawField::PrimitiveScalar(_) => return result,
        RawField::EncodedString(s) => match decode::decode_structure(s) {
            Some(decoded) => reshape(&decoded, table, &mut result),
            None => {
                debug!("no structure in {:?} field value {:?}", table.domain, s);
                return result;
            }
        },
        RawField::NameValueList(_) | RawField::RawMapping(_) => reshape(raw, table, &mut result),
    }

    coerce_values(table, &mut result);
    result
}

/// Normalizes `raw` with the table registered for `domain`.
pub fn normalize_domain(domain: FieldDomain, raw: &Value) -> CanonicalMap {
    normalize(raw, domain.table())
}

fn reshape(structured: &Value, table: &NameTable, result: &mut CanonicalMap) {
    match structured {
        Value::Array(entries) => apply_name_value_list(entries, table, result),
        Value::Object(map) => apply_mapping(map, table, result),
        _ => {}
    }
}

fn apply_name_value_list(entries: &[Value], table: &NameTable, result: &mut CanonicalMap) {
    for entry in entries {
        let Some(entry) = entry.as_object() else {
            continue;
        };
        let Some(name) = entry.get("name").and_then(Value::as_str) else {
            continue;
        };

        let name = name.trim();
        let mapped = match table.lookup(name) {
            Some(canonical) => canonical.to_string(),
            None => name.to_lowercase(),
        };
        if !table.has_key(&mapped) {
            continue;
        }

        let value = table
            .value_keys
            .iter()
            .find_map(|key| entry.get(*key))
            .cloned()
            .unwrap_or(Value::Null);
        result.set(&mapped, value);
    }
}

fn apply_mapping(map: &Map<String, Value>, table: &NameTable, result: &mut CanonicalMap) {
    for (alias, canonical) in table.aliases {
        if let Some(value) = map.get(*alias) {
            result.set(canonical, value.clone());
        }
    }
    for key in table.key_names() {
        if let Some(value) = map.get(key) {
            result.set(key, value.clone());
        }
    }
}

fn coerce_values(table: &NameTable, result: &mut CanonicalMap) {
    for (key, value) in result.entries.iter_mut() {
        let coerced = match table.kind_of(key) {
            Some(ValueKind::Number) => {
                let number = coerce_number(value);
                if number.is_none() && !value.is_null() {
                    debug!("keeping non-numeric {:?}.{} value {}", table.domain, key, value);
                }
                number
            }
            Some(ValueKind::Grade) => coerce_grade(value),
            Some(ValueKind::Nested) => coerce_nested(value),
            None => None,
        };
        if let Some(new_value) = coerced {
            *value = new_value;
        }
    }
}

fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => n.as_f64().and_then(Number::from_f64).map(Value::Number),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

fn coerce_grade(value: &Value) -> Option<Value> {
    value
        .as_str()
        .map(|grade| Value::String(grade.trim().to_uppercase()))
}

fn coerce_nested(value: &Value) -> Option<Value> {
    value.as_str().and_then(decode::decode_structure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::tables::{
        ARMOR_DEFENSE_TABLE, ATTACK_TABLE, CHARACTER_STATS_TABLE, REQUIREMENT_TABLE, SCALING_TABLE,
    };
    use serde_json::json;

    fn all_null(map: &CanonicalMap) -> bool {
        map.is_all_null()
    }

    #[test]
    fn attack_name_value_list_literal() {
        let raw = json!("[{'name': 'Phy', 'amount': 120}, {'name': 'Crit', 'amount': 100}]");
        let result = normalize(&raw, &ATTACK_TABLE);

        assert_eq!(result.get("physical"), Some(&json!(120.0)));
        assert_eq!(result.get("critical"), Some(&json!(100.0)));
        for key in ["magic", "fire", "lightning", "holy", "status_effects"] {
            assert_eq!(result.get(key), Some(&Value::Null), "{key}");
        }
        assert_eq!(result.keys().count(), 7);
    }

    #[test]
    fn empty_armor_defense_is_all_null() {
        let result = normalize(&json!(""), &ARMOR_DEFENSE_TABLE);
        assert!(all_null(&result));
        assert_eq!(
            result.keys().collect::<Vec<_>>(),
            vec!["physical", "strike", "slash", "pierce", "magic", "fire", "lightning", "holy"]
        );
    }

    #[test]
    fn scaling_mapping_literal() {
        let result = normalize(&json!("{'Str': 'A', 'Dex': 'B'}"), &SCALING_TABLE);
        assert_eq!(result.get("strength"), Some(&json!("A")));
        assert_eq!(result.get("dexterity"), Some(&json!("B")));
        assert_eq!(result.get("intelligence"), Some(&Value::Null));
        assert_eq!(result.get("faith"), Some(&Value::Null));
        assert_eq!(result.get("arcane"), Some(&Value::Null));
    }

    #[test]
    fn null_like_inputs_are_all_null() {
        for raw in [
            Value::Null,
            json!(""),
            json!("   "),
            json!("null"),
            json!("nan"),
            json!("NaN"),
            json!("None"),
            json!(12),
            json!(true),
            json!("not a structure"),
            json!("{'a': }"),
            json!("42"),
        ] {
            assert!(all_null(&normalize(&raw, &ATTACK_TABLE)), "{raw}");
        }
    }

    #[test]
    fn value_key_priority() {
        let raw = json!([{"name": "Str", "amount": 10, "scaling": "C"}]);
        assert_eq!(
            normalize(&raw, &SCALING_TABLE).get("strength"),
            Some(&json!("C"))
        );
        let both = json!([{"name": "Phy", "amount": 10, "scaling": 12}, {"name": "Str", "amount": 10, "scaling": 12}]);
        assert_eq!(normalize(&both, &ATTACK_TABLE).get("physical"), Some(&json!(10.0)));
        assert_eq!(normalize(&both, &REQUIREMENT_TABLE).get("strength"), Some(&json!(12.0)));

        let amount_only = json!([{"name": "Dex", "amount": "b"}]);
        assert_eq!(
            normalize(&amount_only, &SCALING_TABLE).get("dexterity"),
            Some(&json!("B"))
        );

        let null_amount = json!([{"name": "Phy", "amount": null, "scaling": 7}]);
        assert_eq!(
            normalize(&null_amount, &ATTACK_TABLE).get("physical"),
            Some(&Value::Null)
        );

        let literal = json!("[{'name': 'Phy', 'amount': None, 'scaling': 7}]");
        assert_eq!(
            normalize_domain(FieldDomain::Attack, &literal).get("physical"),
            Some(&Value::Null)
        );
    }

    #[test]
    fn list_falls_back_to_lowercased_name() {
        let raw = json!([{"name": "Fire", "amount": 5}, {"name": "HOLY", "amount": 3}]);
        let result = normalize(&raw, &ATTACK_TABLE);
        assert_eq!(result.get("fire"), Some(&json!(5.0)));
        assert_eq!(result.get("holy"), Some(&json!(3.0)));
    }

    #[test]
    fn list_ignores_unknown_and_malformed_entries() {
        let raw = json!([
            "Phy",
            42,
            {"amount": 1},
            {"name": "Sleep", "amount": 9},
            {"name": "Mag"}
        ]);
        let result = normalize(&raw, &ATTACK_TABLE);
        assert_eq!(result.get("magic"), Some(&Value::Null));
        assert!(all_null(&result));
        assert!(result.get("sleep").is_none());
    }

    #[test]
    fn direct_keys_overwrite_abbreviations() {
        let raw = json!({"Phy": 10, "physical": 20, "Bogus": 1});
        let result = normalize(&raw, &ATTACK_TABLE);
        assert_eq!(result.get("physical"), Some(&json!(20.0)));
        assert!(result.get("Bogus").is_none());
    }

    #[test]
    fn alias_round_trip() {
        for domain in FieldDomain::ALL {
            let table = domain.table();
            for (alias, canonical) in table.aliases {
                let mut raw = Map::new();
                raw.insert(alias.to_string(), json!("7"));
                let raw = Value::Object(raw);
                let result = normalize(&raw, table);
                for key in table.key_names() {
                    let value = result.get(key).unwrap();
                    if key == *canonical {
                        assert!(!value.is_null(), "{:?}: {} lost", domain, alias);
                    } else {
                        assert!(value.is_null(), "{:?}: {} leaked into {}", domain, alias, key);
                    }
                }
            }
        }
    }

    #[test]
    fn normalizing_canonical_output_is_a_fixed_point() {
        let inputs = [
            (json!("[{'name': 'Phy', 'amount': 120}, {'name': 'Crit', 'amount': '100'}]"), &ATTACK_TABLE),
            (json!({"Str": " a ", "Arc": "s"}), &SCALING_TABLE),
            (json!({"Lvl": 9, "Vig": "15", "Min": "x"}), &CHARACTER_STATS_TABLE),
            (json!(""), &ARMOR_DEFENSE_TABLE),
        ];
        for (raw, table) in inputs {
            let once = normalize(&raw, table);
            let twice = normalize(&once.clone().into_value(), table);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn numeric_coercion() {
        let raw = json!({"Lvl": "9", "Vig": " 15 ", "Min": "x", "End": 11});
        let result = normalize(&raw, &CHARACTER_STATS_TABLE);
        assert_eq!(result.get("level"), Some(&json!(9.0)));
        assert_eq!(result.get("vigor"), Some(&json!(15.0)));
        assert_eq!(result.get("mind"), Some(&json!("x")));
        assert_eq!(result.get("endurance"), Some(&json!(11.0)));
    }

    #[test]
    fn status_effects_are_decoded() {
        let raw = json!({"Phy": 100, "status_effects": "{'bleed': 55}"});
        let result = normalize(&raw, &ATTACK_TABLE);
        assert_eq!(result.get("status_effects"), Some(&json!({"bleed": 55})));
    }

    #[test]
    fn serializes_in_key_order() {
        let result = normalize(&json!({"Holy": 1}), &ATTACK_TABLE);
        let text = serde_json::to_string(&result).unwrap();
        assert!(text.starts_with(r#"{"physical":null,"magic":null"#));
    }

    #[test]
    fn classify_shapes() {
        assert_eq!(RawField::classify(&json!(null)), RawField::Null);
        assert_eq!(RawField::classify(&json!("")), RawField::EmptyString);
        assert_eq!(RawField::classify(&json!("nan")), RawField::Missing);
        assert!(matches!(RawField::classify(&json!(3)), RawField::PrimitiveScalar(_)));
        assert!(matches!(RawField::classify(&json!("[1]")), RawField::EncodedString(_)));
        assert!(matches!(RawField::classify(&json!([])), RawField::NameValueList(_)));
        assert!(matches!(RawField::classify(&json!({})), RawField::RawMapping(_)));
    }
}
