//! Turns stored documents into validated entities.

use serde_json::Value;

use crate::error::{EldenDataError, EldenDataResult};
use crate::models::Entity;
use crate::normalize::CanonicalField;
use crate::store::{Document, ID_FIELD};

/// Adapts a stored document into `E`.
///
/// The store identifier becomes `id`, a source-data `id` column is kept as `source_id`, every
/// schema column is normalized, derived values are computed and the result is validated.
pub fn adapt_document<E: Entity>(mut doc: Document) -> EldenDataResult<E> {
    let store_id = doc.remove(ID_FIELD).map(stringify_identifier);
    if let Some(source_id) = doc.remove("id") {
        if !source_id.is_null() {
            doc.insert("source_id".to_string(), stringify_identifier(source_id));
        }
    }
    if let Some(id) = store_id.clone() {
        doc.insert("id".to_string(), id);
    }
    for value in doc.values_mut() {
        stringify_nested_identifiers(value);
    }

    E::column_schema().apply(&mut doc);
    check_domain_columns::<E>(&doc)?;

    let label = describe::<E>(store_id.as_ref());
    let mut entity: E = serde_json::from_value(Value::Object(doc))
        .map_err(|e| EldenDataError::validation(format!("{}: {}", label, e)))?;
    entity.finalize();
    entity
        .validate()
        .map_err(|e| EldenDataError::validation(format!("{}: {}", label, e)))?;
    Ok(entity)
}

/// Normalizes a client payload for storage and checks that it would adapt cleanly.
pub fn prepare_payload<E: Entity>(mut payload: Document) -> EldenDataResult<Document> {
    payload.remove(ID_FIELD);
    payload.remove("id");
    E::column_schema().apply(&mut payload);
    adapt_document::<E>(payload.clone())?;
    Ok(payload)
}

/// Typed per-column checks so errors name the offending field.
fn check_domain_columns<E: Entity>(doc: &Document) -> EldenDataResult<()> {
    for (column, domain) in E::DOMAIN_COLUMNS {
        let Some(value) = doc.get(*column) else {
            continue;
        };
        let field = CanonicalField::from_domain(*domain, value).map_err(|e| {
            EldenDataError::validation(format!("{} field '{}': {}", E::LABEL, column, e))
        })?;
        field.validate().map_err(|e| {
            EldenDataError::validation(format!("{} field '{}': {}", E::LABEL, column, e))
        })?;
    }
    Ok(())
}

fn describe<E: Entity>(id: Option<&Value>) -> String {
    match id.and_then(Value::as_str) {
        Some(id) => format!("{} {}", E::LABEL, id),
        None => E::LABEL.to_string(),
    }
}

/// Identifier shapes (`{"$oid": ...}`, numbers) become plain strings.
fn stringify_identifier(value: Value) -> Value {
    match value {
        Value::String(_) | Value::Null => value,
        Value::Object(mut map) if map.len() == 1 && map.contains_key("$oid") => {
            stringify_identifier(map.remove("$oid").unwrap_or(Value::Null))
        }
        other => Value::String(other.to_string()),
    }
}

fn stringify_nested_identifiers(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.len() == 1 && map.contains_key("$oid") {
                *value = stringify_identifier(value.take());
                return;
            }
            if let Some(id) = map.get_mut(ID_FIELD) {
                *id = stringify_identifier(id.take());
            }
            for child in map.values_mut() {
                stringify_nested_identifiers(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(stringify_nested_identifiers),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Boss, Weapon};
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn adapts_encoded_weapon() {
        let stored = doc(json!({
            "_id": "6f1c1c1e-8c8f-4a53-9d0c-2f0f5b6e7a10",
            "id": "17f69d71826l0i32gkm3mq9ddm9ggm",
            "name": "Uchigatana",
            "category": "Katana",
            "weight": "5.5",
            "attack": "[{'name': 'Phy', 'amount': 115}, {'name': 'Crit', 'amount': 100}]",
            "scalesWith": "[{'name': 'Str', 'scaling': 'D'}, {'name': 'Dex', 'scaling': 'C'}]",
            "requiredAttributes": "{'Str': 11, 'Dex': 15}",
            "defence": "nan",
        }));
        let weapon: Weapon = adapt_document(stored).unwrap();

        assert_eq!(weapon.id.as_deref(), Some("6f1c1c1e-8c8f-4a53-9d0c-2f0f5b6e7a10"));
        assert_eq!(weapon.source_id.as_deref(), Some("17f69d71826l0i32gkm3mq9ddm9ggm"));
        assert_eq!(weapon.weight, Some(5.5));
        let attack = weapon.attack.as_ref().unwrap();
        assert_eq!(attack.physical, Some(115.0));
        assert_eq!(attack.critical, Some(100.0));
        assert_eq!(weapon.scales_with.as_ref().unwrap().dexterity.as_deref(), Some("C"));
        assert_eq!(weapon.required_attributes.as_ref().unwrap().strength, Some(11.0));
        assert_eq!(weapon.defence, Some(Default::default()));
        assert_eq!(weapon.total_attack_power, 115.0);
    }

    #[test]
    fn invalid_documents_name_the_field() {
        let stored = doc(json!({
            "_id": "6f1c1c1e-8c8f-4a53-9d0c-2f0f5b6e7a10",
            "name": "Broken",
            "scalesWith": {"Str": "Z"},
        }));
        let err = adapt_document::<Weapon>(stored).unwrap_err();
        match err {
            EldenDataError::Validation(msg) => assert!(msg.contains("scalesWith"), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_name_fails_validation() {
        let err = adapt_document::<Boss>(doc(json!({"region": "Caelid"}))).unwrap_err();
        assert!(matches!(err, EldenDataError::Validation(_)));
    }

    #[test]
    fn nested_identifiers_become_strings() {
        let stored = doc(json!({
            "_id": {"$oid": "507f1f77bcf86cd799439011"},
            "name": "Malenia",
            "drops": "['Remembrance of the Rot Goddess', \"Malenia's Great Rune\"]",
            "extra": {"_id": {"$oid": "abc"}, "items": [{"$oid": "def"}]},
        }));
        let boss: Boss = adapt_document(stored).unwrap();
        assert_eq!(boss.id.as_deref(), Some("507f1f77bcf86cd799439011"));
        assert_eq!(boss.drop_count, 2);
        assert!(boss.has_great_rune);

        let mut nested = json!({"a": {"_id": {"$oid": "x"}}, "b": [{"$oid": "y"}]});
        stringify_nested_identifiers(&mut nested);
        assert_eq!(nested, json!({"a": {"_id": "x"}, "b": ["y"]}));
    }

    #[test]
    fn payloads_are_normalized_before_storage() {
        let payload = doc(json!({
            "_id": "ignored",
            "name": "Club",
            "attack": {"Phy": 103},
        }));
        let prepared = prepare_payload::<Weapon>(payload).unwrap();
        assert!(prepared.get("_id").is_none());
        assert_eq!(prepared["attack"]["physical"], json!(103.0));
        assert_eq!(prepared["attack"]["holy"], Value::Null);
    }
}
