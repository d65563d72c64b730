use std::fs;
use std::path::Path;

use eldendata::ingest::{self, FileStatus, INGESTION_PLAN};
use eldendata::models::{Armor, Weapon};
use eldendata::service::Repository;
use eldendata::store::{DocumentStore, Filter};
use serde_json::{json, Value};
use tempfile::tempdir;

const WEAPONS_CSV: &str = "\
Unnamed: 0,id,name,image,description,attack,defence,scalesWith,requiredAttributes,category,weight
0,17f69d71826l0i32gkm3ndn3kywxqj,Uchigatana,,A katana,\"[{'name': 'Phy', 'amount': 115}, {'name': 'Mag', 'amount': 0}, {'name': 'Crit', 'amount': 100}]\",\"[{'name': 'Phy', 'amount': 45}]\",\"{'Str': 'D', 'Dex': 'C'}\",\"[{'name': 'Str', 'amount': 11}, {'name': 'Dex', 'amount': 15}]\",Katana,5.5
1,17f69d71826l0i32gkm3ndn3kywxqk,Broken Staff,,,nan,,,,Glintstone Staff,
";

const ARMORS_CSV: &str = "\
Unnamed: 0,id,name,category,weight,dmgNegation,resistance
0,a1,Veteran's Helm,Helm,7.3,,\"[{'name': 'Immunity', 'amount': 19}, {'name': 'Poise', 'amount': 9}]\"
1,a2,Veteran's Armor,Chest Armor,18.0,\"[{'name': 'Phy', 'amount': 16.5}, {'name': 'Fire', 'amount': 14.1}]\",
";

/// Writes every planned file except `skip`; plain collections get two named rows.
fn write_exports(dir: &Path, skip: &str) {
    for step in INGESTION_PLAN.iter() {
        let content = match step.file {
            f if f == skip => continue,
            "weapons.csv" => WEAPONS_CSV.to_string(),
            "armors.csv" => ARMORS_CSV.to_string(),
            _ => format!("Unnamed: 0,name,description\n0,{0} one,nan\n1,{0} two,\n", step.collection),
        };
        fs::write(dir.join(step.file), content).unwrap();
    }
}

#[test]
fn fourteen_of_fifteen_files_load() {
    let dir = tempdir().unwrap();
    write_exports(dir.path(), "bosses.csv");
    let store = DocumentStore::open_temporary().unwrap();

    let report = ingest::run(&store, dir.path(), Some("armors"));

    assert_eq!(report.files.len(), 15);
    assert_eq!(report.succeeded(), 14);
    assert_eq!(report.status_of("bosses.csv"), Some(FileStatus::Error));
    let bosses = report.files.iter().find(|f| f.file == "bosses.csv").unwrap();
    assert!(bosses.message.as_deref().unwrap().contains("bosses.csv"));
    assert!(report.to_string().contains("bosses.csv: ERROR\n"));
    assert!(report.to_string().contains("weapons.csv: OK\n"));
    assert!(!store.list_collections().unwrap().contains(&"bosses".to_string()));
    assert_eq!(store.collection("talismans").unwrap().len(), 2);
}

#[test]
fn weapon_columns_are_stored_canonical() {
    let dir = tempdir().unwrap();
    write_exports(dir.path(), "");
    let store = DocumentStore::open_temporary().unwrap();
    ingest::run(&store, dir.path(), None);

    let raw = store
        .collection("weapons")
        .unwrap()
        .find_by_index("id", &json!("17f69d71826l0i32gkm3ndn3kywxqj"))
        .unwrap();
    assert_eq!(raw.len(), 1);
    let doc = &raw[0];
    assert!(!doc.contains_key("Unnamed: 0"));
    assert_eq!(doc["attack"]["physical"], json!(115.0));
    assert_eq!(doc["attack"]["magic"], json!(0.0));
    assert_eq!(doc["attack"]["critical"], json!(100.0));
    assert_eq!(doc["attack"]["fire"], Value::Null);
    assert_eq!(doc["scalesWith"]["strength"], json!("D"));
    assert_eq!(doc["scalesWith"]["dexterity"], json!("C"));
    assert_eq!(doc["scalesWith"]["arcane"], Value::Null);
    assert_eq!(doc["weight"], json!(5.5));

    let weapons: Repository<Weapon> = Repository::new(&store).unwrap();
    let all = weapons.find_all(&Filter::new()).unwrap();
    assert_eq!(all.len(), 2);
    let uchigatana = all.iter().find(|w| w.name == "Uchigatana").unwrap();
    assert_eq!(uchigatana.total_attack_power, 115.0);
    assert_eq!(uchigatana.damage_to_weight_ratio, Some(20.91));
    let staff = all.iter().find(|w| w.name == "Broken Staff").unwrap();
    assert_eq!(staff.weight, None);
    assert_eq!(staff.damage_to_weight_ratio, None);
}

#[test]
fn empty_armor_negation_becomes_an_all_null_map() {
    let dir = tempdir().unwrap();
    write_exports(dir.path(), "");
    let store = DocumentStore::open_temporary().unwrap();
    ingest::run(&store, dir.path(), Some("armors"));

    let helm = store
        .collection("armors")
        .unwrap()
        .find_by_index("id", &json!("a1"))
        .unwrap()
        .remove(0);
    let negation = helm["dmgNegation"].as_object().unwrap();
    assert!(!negation.is_empty());
    assert!(negation.values().all(Value::is_null));
    assert_eq!(helm["resistance"]["immunity"], json!(19.0));

    let armors: Repository<Armor> = Repository::new(&store).unwrap();
    let chest = armors
        .find_all(&Filter::new())
        .unwrap()
        .into_iter()
        .find(|a| a.name == "Veteran's Armor")
        .unwrap();
    assert_eq!(chest.average_physical_defense, Some(16.5));
    assert_eq!(chest.average_elemental_defense, Some(14.1));
}

#[test]
fn clean_reingest_collection_is_dropped_first() {
    let dir = tempdir().unwrap();
    write_exports(dir.path(), "armors.csv");
    let store = DocumentStore::open_temporary().unwrap();
    let armors = store.collection("armors").unwrap();
    armors.insert_one(json!({"name": "Stale"}).as_object().unwrap().clone()).unwrap();
    store.collection("weapons").unwrap().insert_one(json!({"name": "Old"}).as_object().unwrap().clone()).unwrap();

    let report = ingest::run(&store, dir.path(), Some("armors"));

    assert_eq!(report.status_of("armors.csv"), Some(FileStatus::Error));
    assert!(!store.list_collections().unwrap().contains(&"armors".to_string()));
    // Replaced, not appended.
    assert_eq!(store.collection("weapons").unwrap().len(), 2);
}
