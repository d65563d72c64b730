use eldendata::models::{Boss, Weapon};
use eldendata::service::{Pagination, Repository};
use eldendata::store::{Document, DocumentStore, Filter};
use eldendata::EldenDataError;
use serde_json::{json, Value};

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

#[test]
fn corrupt_documents_are_skipped_in_lists_but_raised_on_fetch() {
    let store = DocumentStore::open_temporary().unwrap();
    let weapons: Repository<Weapon> = Repository::new(&store).unwrap();
    weapons.create(doc(json!({"name": "Dagger", "weight": 1.5}))).unwrap();
    let corrupt = store
        .collection("weapons")
        .unwrap()
        .insert_one(doc(json!({"name": "Cursed", "weight": -4})))
        .unwrap();
    weapons.create(doc(json!({"name": "Zweihander", "weight": 15.5}))).unwrap();

    let page = weapons.list(&Filter::new(), &Pagination::default()).unwrap();
    let names: Vec<&str> = page.items.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["Dagger", "Zweihander"]);
    assert_eq!(page.total, 3);

    match weapons.get_by_id(&corrupt.to_string()) {
        Err(EldenDataError::Validation(message)) => assert!(message.contains("weight")),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn identifiers_are_checked_before_the_store() {
    let store = DocumentStore::open_temporary().unwrap();
    let weapons: Repository<Weapon> = Repository::new(&store).unwrap();
    assert!(matches!(weapons.get_by_id("not-an-id"), Err(EldenDataError::InvalidIdentifier(_))));
    assert!(matches!(weapons.delete("123"), Err(EldenDataError::InvalidIdentifier(_))));

    let created = weapons.create(doc(json!({"name": "Club"}))).unwrap();
    let id = created.id.clone().unwrap();
    weapons.delete(&id).unwrap();
    assert!(matches!(weapons.get_by_id(&id), Err(EldenDataError::NotFound(_))));
    assert!(!weapons.exists(&id).unwrap());
}

#[test]
fn patching_a_composite_field_stores_it_canonical() {
    let store = DocumentStore::open_temporary().unwrap();
    let weapons: Repository<Weapon> = Repository::new(&store).unwrap();
    let created = weapons
        .create(doc(json!({"name": "Longsword", "weight": 3.5, "attack": {"physical": 110}})))
        .unwrap();
    let id = created.id.unwrap();

    let updated = weapons
        .update(&id, doc(json!({"attack": "[{'name': 'Phy', 'amount': 120}, {'name': 'Fire', 'amount': 10}]", "passive": null})))
        .unwrap();
    assert_eq!(updated.total_attack_power, 130.0);
    assert_eq!(updated.weight, Some(3.5));

    let stored = store
        .collection("weapons")
        .unwrap()
        .find_by_id(&id.parse().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(stored["attack"]["physical"], json!(120.0));
    assert_eq!(stored["attack"]["fire"], json!(10.0));
    assert_eq!(stored["attack"]["magic"], Value::Null);
    assert!(!stored.contains_key("passive"));
}

#[test]
fn empty_and_invalid_patches_change_nothing() {
    let store = DocumentStore::open_temporary().unwrap();
    let bosses: Repository<Boss> = Repository::new(&store).unwrap();
    let id = bosses
        .create(doc(json!({"name": "Margit, the Fell Omen", "region": "Limgrave"})))
        .unwrap()
        .id
        .unwrap();

    assert!(matches!(
        bosses.update(&id, doc(json!({"region": null}))),
        Err(EldenDataError::BadRequest(_))
    ));
    assert!(matches!(
        bosses.update(&id, doc(json!({"name": ""}))),
        Err(EldenDataError::Validation(_))
    ));
    assert_eq!(bosses.get_by_id(&id).unwrap().name, "Margit, the Fell Omen");
}
