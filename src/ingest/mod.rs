//! Batch ingestion of the CSV exports.
//!
//! Each run walks a fixed plan of source files. Every file present is read, cleaned with its
//! collection's column schema and loaded as a full replacement of that collection. A file that
//! is missing or fails to load is reported as `ERROR` and the run moves on.

pub mod reader;
pub mod report;

use std::path::Path;

use chrono::Utc;
use log::{error, info, warn};

use crate::error::{EldenDataError, EldenDataResult};
use crate::models::{Armor, Boss, CharacterClass, Entity, Spell, Weapon};
use crate::normalize::ColumnSchema;
use crate::store::{Document, DocumentStore};

pub use reader::{read_rows, read_rows_from};
pub use report::{FileReport, FileStatus, IngestionReport};

/// One source file and where it goes.
#[derive(Debug, Clone, Copy)]
pub struct IngestionStep {
    pub file: &'static str,
    pub collection: &'static str,
    pub schema: fn() -> ColumnSchema,
}

fn plain() -> ColumnSchema {
    ColumnSchema::PLAIN
}

/// The files loaded by every run, in load order.
pub const INGESTION_PLAN: [IngestionStep; 15] = [
    IngestionStep { file: "ammos.csv", collection: "ammos", schema: plain },
    IngestionStep { file: "armors.csv", collection: "armors", schema: Armor::column_schema },
    IngestionStep { file: "ashes.csv", collection: "ashes", schema: plain },
    IngestionStep { file: "bosses.csv", collection: "bosses", schema: Boss::column_schema },
    IngestionStep { file: "classes.csv", collection: "classes", schema: CharacterClass::column_schema },
    IngestionStep { file: "creatures.csv", collection: "creatures", schema: plain },
    IngestionStep { file: "incantations.csv", collection: "incantations", schema: Spell::column_schema },
    IngestionStep { file: "items.csv", collection: "items", schema: plain },
    IngestionStep { file: "locations.csv", collection: "locations", schema: plain },
    IngestionStep { file: "npcs.csv", collection: "npcs", schema: plain },
    IngestionStep { file: "shields.csv", collection: "shields", schema: Weapon::column_schema },
    IngestionStep { file: "sorceries.csv", collection: "sorceries", schema: Spell::column_schema },
    IngestionStep { file: "spirits.csv", collection: "spirits", schema: plain },
    IngestionStep { file: "talismans.csv", collection: "talismans", schema: plain },
    IngestionStep { file: "weapons.csv", collection: "weapons", schema: Weapon::column_schema },
];

/// Applies the collection schema to hygiene-cleaned rows.
pub fn clean_rows(rows: &mut [Document], schema: &ColumnSchema) {
    for row in rows.iter_mut() {
        schema.apply(row);
    }
}

/// Runs every step of [`INGESTION_PLAN`] against `data_dir`.
pub fn run(
    store: &DocumentStore,
    data_dir: &Path,
    clean_reingest_collection: Option<&str>,
) -> IngestionReport {
    run_plan(store, data_dir, clean_reingest_collection, &INGESTION_PLAN)
}

pub fn run_plan(
    store: &DocumentStore,
    data_dir: &Path,
    clean_reingest_collection: Option<&str>,
    plan: &[IngestionStep],
) -> IngestionReport {
    let started_at = Utc::now();
    info!("Starting ingestion from {}", data_dir.display());

    if let Some(name) = clean_reingest_collection {
        match store.drop_collection(name) {
            Ok(true) => info!("Dropped collection '{}' for a clean reingest", name),
            Ok(false) => {}
            Err(e) => warn!("Could not drop collection '{}': {}", name, e),
        }
    }

    let files = plan
        .iter()
        .map(|step| match load_step(store, data_dir, step) {
            Ok(rows) => {
                info!("Loaded {} rows from {} into '{}'", rows, step.file, step.collection);
                FileReport::ok(step.file, step.collection, rows)
            }
            Err(e) => {
                error!("Failed to load {} into '{}': {}", step.file, step.collection, e);
                FileReport::error(step.file, step.collection, e.to_string())
            }
        })
        .collect();

    let report = IngestionReport {
        started_at,
        finished_at: Utc::now(),
        files,
    };
    info!(
        "Ingestion finished: {} ok, {} failed, {} rows",
        report.succeeded(),
        report.failed(),
        report.total_rows()
    );
    report
}

fn load_step(store: &DocumentStore, data_dir: &Path, step: &IngestionStep) -> EldenDataResult<usize> {
    let path = data_dir.join(step.file);
    if !path.is_file() {
        return Err(EldenDataError::IngestionFileMissing(path));
    }

    let mut rows = read_rows(&path)?;
    clean_rows(&mut rows, &(step.schema)());
    let has_ids = rows
        .iter()
        .any(|row| row.get("id").map_or(false, |v| !v.is_null()));

    let collection = store.collection(step.collection)?;
    let removed = collection.delete_all()?;
    if removed > 0 {
        info!("Replaced {} documents in '{}'", removed, step.collection);
    }
    let inserted = collection.insert_many(rows)?.len();
    if has_ids {
        collection.create_index("id")?;
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn plan_covers_fifteen_collections() {
        assert_eq!(INGESTION_PLAN.len(), 15);
        for step in INGESTION_PLAN.iter() {
            assert_eq!(step.file, format!("{}.csv", step.collection));
        }
        let shields = INGESTION_PLAN.iter().find(|s| s.collection == "shields").unwrap();
        assert_eq!((shields.schema)(), Weapon::column_schema());
    }

    #[test]
    fn missing_files_do_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("weapons.csv"),
            "Unnamed: 0,id,name,weight,attack\n\
             0,w1,Dagger,1.5,\"[{'name': 'Phy', 'amount': 75}]\"\n",
        )
        .unwrap();
        let store = DocumentStore::open_temporary().unwrap();
        let plan = [
            INGESTION_PLAN[3],  // bosses
            INGESTION_PLAN[14], // weapons
        ];

        let report = run_plan(&store, dir.path(), None, &plan);
        assert_eq!(report.status_of("bosses.csv"), Some(FileStatus::Error));
        assert_eq!(report.status_of("weapons.csv"), Some(FileStatus::Ok));

        let weapons = store.collection("weapons").unwrap();
        let docs = weapons.find_by_index("id", &json!("w1")).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["attack"]["physical"], json!(75.0));
        assert_eq!(docs[0]["weight"], json!(1.5));
    }

    #[test]
    fn reruns_replace_the_collection() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("items.csv"), "name\nRune Arc\nGolden Seed\n").unwrap();
        let store = DocumentStore::open_temporary().unwrap();
        let plan = [INGESTION_PLAN[7]];

        run_plan(&store, dir.path(), None, &plan);
        let report = run_plan(&store, dir.path(), None, &plan);
        assert_eq!(report.files[0].rows, 2);
        assert_eq!(store.collection("items").unwrap().len(), 2);
    }
}
