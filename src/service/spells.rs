//! Sorcery and incantation filters.

use serde::Deserialize;

use super::{check_bounds, non_blank, Repository};
use crate::error::EldenDataResult;
use crate::models::Spell;
use crate::store::filter::{contains_ci, exact_ci};
use crate::store::{Condition, DocumentStore, Filter};

pub const SORCERIES: &str = "sorceries";
pub const INCANTATIONS: &str = "incantations";

pub fn sorceries(store: &DocumentStore) -> EldenDataResult<Repository<Spell>> {
    Repository::for_collection(store, SORCERIES)
}

pub fn incantations(store: &DocumentStore) -> EldenDataResult<Repository<Spell>> {
    Repository::for_collection(store, INCANTATIONS)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpellFilter {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub spell_type: Option<String>,
    pub min_cost: Option<f64>,
    pub max_cost: Option<f64>,
    pub max_slots: Option<f64>,
    pub min_intelligence: Option<f64>,
    pub min_faith: Option<f64>,
}

impl SpellFilter {
    pub fn to_filter(&self) -> EldenDataResult<Filter> {
        check_bounds("cost", self.min_cost, self.max_cost)?;
        check_bounds("slots", None, self.max_slots)?;
        let mut filter = Filter::new();
        if let Some(name) = non_blank(&self.name) {
            filter.add("name", Condition::Regex(contains_ci(name)?));
        }
        if let Some(spell_type) = non_blank(&self.spell_type) {
            filter.add("type", Condition::Regex(exact_ci(spell_type)?));
        }
        Ok(filter
            .range("cost", self.min_cost, self.max_cost)
            .range("slots", None, self.max_slots)
            .range("requires.intelligence", self.min_intelligence, None)
            .range("requires.faith", self.min_faith, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Document;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn one_type_two_collections() {
        let store = DocumentStore::open_temporary().unwrap();
        let sorceries = sorceries(&store).unwrap();
        let incantations = incantations(&store).unwrap();
        sorceries
            .bulk_create(vec![
                doc(json!({"name": "Glintstone Pebble", "type": "Sorcery", "cost": "7", "slots": 1,
                           "requires": "[{'name': 'Int', 'amount': 10}]"})),
                doc(json!({"name": "Comet Azur", "type": "Sorcery", "cost": 40, "slots": 3,
                           "requires": {"Int": 60}})),
            ])
            .unwrap();
        incantations
            .create(doc(json!({"name": "Heal", "type": "incantation", "cost": 32, "slots": 1,
                               "requires": {"Fai": 12}})))
            .unwrap();

        assert_eq!(sorceries.count(&Filter::new()).unwrap(), 2);
        assert_eq!(incantations.count(&Filter::new()).unwrap(), 1);

        let filter = SpellFilter {
            max_slots: Some(2.0),
            min_intelligence: Some(5.0),
            ..Default::default()
        };
        let found = sorceries.find_all(&filter.to_filter().unwrap()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Glintstone Pebble");
        assert_eq!(found[0].cost, Some(7.0));

        let filter = SpellFilter {
            spell_type: Some("Incantation".to_string()),
            min_faith: Some(10.0),
            ..Default::default()
        };
        let heal = incantations.find_all(&filter.to_filter().unwrap()).unwrap();
        assert_eq!(heal[0].spell_type.as_deref(), Some("Incantation"));
        assert_eq!(heal[0].efficiency_rating, Some(32.0));
    }

    #[test]
    fn cost_range_is_checked() {
        let filter = SpellFilter {
            min_cost: Some(50.0),
            max_cost: Some(10.0),
            ..Default::default()
        };
        assert!(filter.to_filter().is_err());
    }
}
