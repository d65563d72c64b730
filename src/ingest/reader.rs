//! CSV loading and base row hygiene.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::error::EldenDataResult;
use crate::store::Document;

/// Cell spellings that mean "no value".
const MISSING_MARKERS: [&str; 3] = ["nan", "NaN", "NAN"];

/// Reads a CSV file into hygiene-cleaned rows.
pub fn read_rows(path: &Path) -> EldenDataResult<Vec<Document>> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;
    collect_rows(reader)
}

/// Reads CSV text from any reader. Used by [`read_rows`] and tests.
pub fn read_rows_from<R: Read>(input: R) -> EldenDataResult<Vec<Document>> {
    let reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    collect_rows(reader)
}

fn collect_rows<R: Read>(mut reader: csv::Reader<R>) -> EldenDataResult<Vec<Document>> {
    // `None` marks a column dropped by hygiene.
    let headers: Vec<Option<String>> = reader
        .headers()?
        .iter()
        .map(|h| {
            let h = h.trim();
            (!h.is_empty() && !is_index_column(h)).then(|| h.to_string())
        })
        .collect();

    let mut rows = Vec::new();
    let mut seen = HashSet::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Document::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if let Some(header) = header {
                row.insert(header.clone(), clean_cell(cell));
            }
        }
        if row.values().all(Value::is_null) {
            continue;
        }
        let key = serde_json::to_string(&row)?;
        if seen.insert(key) {
            rows.push(row);
        } else {
            debug!("dropping duplicate row {:?}", row.get("name"));
        }
    }
    Ok(rows)
}

/// `Unnamed: 0` style columns left behind by dataframe exports.
fn is_index_column(header: &str) -> bool {
    header
        .strip_prefix("Unnamed:")
        .map(|rest| rest.trim().chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

fn clean_cell(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
        Value::Null
    } else {
        Value::String(cell.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hygiene() {
        let csv = "Unnamed: 0, name ,weight,description\n\
                   0,Dagger,1.5,nan\n\
                   1,Claymore,,\"A sword, large\"\n\
                   2,Dagger,1.5,nan\n";
        let rows = read_rows_from(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert!(!rows[0].contains_key("Unnamed: 0"));
        assert_eq!(rows[0]["name"], json!("Dagger"));
        assert_eq!(rows[0]["description"], Value::Null);
        assert_eq!(rows[1]["weight"], Value::Null);
        assert_eq!(rows[1]["description"], json!("A sword, large"));
    }

    #[test]
    fn keeps_encoded_cells_verbatim() {
        let csv = "name,attack\nGlintstone Staff,\"[{'name': 'Phy', 'amount': 25}]\"\n";
        let rows = read_rows_from(csv.as_bytes()).unwrap();
        assert_eq!(rows[0]["attack"], json!("[{'name': 'Phy', 'amount': 25}]"));
    }

    #[test]
    fn index_columns() {
        assert!(is_index_column("Unnamed: 0"));
        assert!(is_index_column("Unnamed: 12"));
        assert!(!is_index_column("Unnamed"));
        assert!(!is_index_column("Unnamed: x"));
    }
}
