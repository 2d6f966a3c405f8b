//! Building tables from loosely-typed records and CSV files.
//!
//! Column types are inferred from the values present: a column is only
//! given a non-string type when every non-null value fits it.

use std::io::Read;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::table::{
    parse_bool, parse_datetime, parse_finite, Cell, Column, ColumnType, Table, TableError,
};

impl Table {
    /// Build a table from JSON records (typically API results).
    ///
    /// Columns appear in first-seen key order across all records. Nested
    /// objects are flattened one level with `_`-joined keys; anything deeper
    /// and all arrays are kept as JSON text. Non-object records are skipped.
    pub fn from_records(records: &[Value]) -> Result<Table, TableError> {
        let flat: Vec<Map<String, Value>> = records
            .iter()
            .filter_map(Value::as_object)
            .map(flatten_record)
            .collect();

        let mut names: Vec<String> = Vec::new();
        for record in &flat {
            for key in record.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let values: Vec<&Value> = flat
                    .iter()
                    .map(|r| r.get(&name).unwrap_or(&Value::Null))
                    .collect();
                json_column(name, &values)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Table::new(columns)
    }

    /// Read a CSV file with a header row.
    pub fn from_csv_path(path: &Path) -> Result<Table, TableError> {
        let file = std::fs::File::open(path)
            .map_err(|e| TableError::Read(format!("{}: {e}", path.display())))?;
        let table = Table::from_csv_reader(file)?;
        debug!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "loaded CSV"
        );
        Ok(table)
    }

    /// Read CSV data with a header row from any reader.
    pub fn from_csv_reader(reader: impl Read) -> Result<Table, TableError> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers: Vec<String> = csv
            .headers()
            .map_err(|e| TableError::Read(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        for record in csv.records() {
            let record = record.map_err(|e| TableError::Read(e.to_string()))?;
            for (i, field) in record.iter().enumerate() {
                let field = field.trim();
                raw[i].push((!field.is_empty()).then(|| field.to_string()));
            }
        }

        let columns = headers
            .into_iter()
            .zip(raw)
            .map(|(name, values)| text_column(name, &values))
            .collect::<Result<Vec<_>, _>>()?;

        Table::new(columns)
    }
}

fn flatten_record(record: &Map<String, Value>) -> Map<String, Value> {
    let mut flat = Map::new();
    for (key, value) in record {
        match value {
            Value::Object(inner) => {
                for (inner_key, inner_value) in inner {
                    let joined = format!("{key}_{inner_key}");
                    if record.contains_key(&joined) {
                        continue;
                    }
                    let inner_value = match inner_value {
                        Value::Object(_) => Value::String(inner_value.to_string()),
                        other => other.clone(),
                    };
                    flat.insert(joined, inner_value);
                }
            }
            other => {
                flat.insert(key.clone(), other.clone());
            }
        }
    }
    flat
}

fn json_column(name: String, values: &[&Value]) -> Result<Column, TableError> {
    let present: Vec<&Value> = values.iter().copied().filter(|v| !v.is_null()).collect();

    let kind = if present.is_empty() {
        ColumnType::String
    } else if present.iter().all(|v| v.is_boolean()) {
        ColumnType::Boolean
    } else if present.iter().all(|v| v.is_i64()) {
        ColumnType::Integer
    } else if present.iter().all(|v| v.is_number()) {
        ColumnType::Number
    } else if present
        .iter()
        .all(|v| v.as_str().is_some_and(|s| parse_datetime(s).is_some()))
    {
        ColumnType::DateTime
    } else {
        ColumnType::String
    };

    let cells = values
        .iter()
        .map(|v| match (kind, v) {
            (_, Value::Null) => Cell::Null,
            (ColumnType::Boolean, Value::Bool(b)) => Cell::Boolean(*b),
            (ColumnType::Integer, v) => v.as_i64().map(Cell::Integer).unwrap_or(Cell::Null),
            (ColumnType::Number, v) => v.as_f64().map(Cell::Number).unwrap_or(Cell::Null),
            (ColumnType::DateTime, Value::String(s)) => {
                parse_datetime(s).map(Cell::DateTime).unwrap_or(Cell::Null)
            }
            (_, Value::String(s)) => Cell::Text(s.clone()),
            (_, other) => Cell::Text(other.to_string()),
        })
        .collect();

    Column::new(name, kind, cells)
}

fn text_column(name: String, values: &[Option<String>]) -> Result<Column, TableError> {
    let present: Vec<&str> = values.iter().flatten().map(String::as_str).collect();

    let kind = if present.is_empty() {
        ColumnType::String
    } else if present.iter().all(|s| s.parse::<i64>().is_ok()) {
        ColumnType::Integer
    } else if present.iter().all(|s| s.parse::<f64>().is_ok()) {
        ColumnType::Number
    } else if present
        .iter()
        .all(|s| matches!(s.to_ascii_lowercase().as_str(), "true" | "false"))
    {
        ColumnType::Boolean
    } else if present.iter().all(|s| parse_datetime(s).is_some()) {
        ColumnType::DateTime
    } else {
        ColumnType::String
    };

    let cells = values
        .iter()
        .map(|v| {
            let Some(s) = v.as_deref() else {
                return Cell::Null;
            };
            let cell = match kind {
                ColumnType::Integer => s.parse().ok().map(Cell::Integer),
                ColumnType::Number => parse_finite(s).map(Cell::Number),
                ColumnType::Boolean => parse_bool(s).map(Cell::Boolean),
                ColumnType::DateTime => parse_datetime(s).map(Cell::DateTime),
                ColumnType::String => Some(Cell::Text(s.to_string())),
            };
            cell.unwrap_or(Cell::Null)
        })
        .collect();

    Column::new(name, kind, cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_infer_column_types() {
        let records = vec![
            json!({"id": 1, "name": "Gila Monster", "score": 0.5, "active": true, "seen": "2024-05-01"}),
            json!({"id": 2, "name": "Coachwhip", "score": 2, "active": false, "seen": null}),
        ];
        let table = Table::from_records(&records).unwrap();

        assert_eq!(table.column_names(), vec!["id", "name", "score", "active", "seen"]);
        assert_eq!(table.column("id").unwrap().kind(), ColumnType::Integer);
        assert_eq!(table.column("name").unwrap().kind(), ColumnType::String);
        assert_eq!(table.column("score").unwrap().kind(), ColumnType::Number);
        assert_eq!(table.column("active").unwrap().kind(), ColumnType::Boolean);
        assert_eq!(table.column("seen").unwrap().kind(), ColumnType::DateTime);
        assert_eq!(table.column("seen").unwrap().cells()[1], Cell::Null);
    }

    #[test]
    fn records_flatten_one_level() {
        let records = vec![json!({
            "id": 7,
            "taxon": {"id": 20979, "name": "Heloderma suspectum", "ancestry": {"a": 1}},
            "photos": [1, 2]
        })];
        let table = Table::from_records(&records).unwrap();

        assert_eq!(
            table.column_names(),
            vec!["id", "taxon_id", "taxon_name", "taxon_ancestry", "photos"]
        );
        assert_eq!(
            table.column("taxon_ancestry").unwrap().cells()[0],
            Cell::Text("{\"a\":1}".into())
        );
        assert_eq!(table.column("photos").unwrap().cells()[0], Cell::Text("[1,2]".into()));
    }

    #[test]
    fn records_with_missing_keys_get_nulls() {
        let records = vec![json!({"a": 1}), json!({"b": "x"})];
        let table = Table::from_records(&records).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("a").unwrap().cells()[1], Cell::Null);
        assert_eq!(table.column("b").unwrap().cells()[0], Cell::Null);
    }

    #[test]
    fn csv_infers_types_and_empty_fields() {
        let data = "name,count,ratio,endemic,first_seen\n\
                    toad,3,0.5,True,2023-01-02\n\
                    lizard,,1,False,\n";
        let table = Table::from_csv_reader(data.as_bytes()).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("count").unwrap().kind(), ColumnType::Integer);
        assert_eq!(table.column("count").unwrap().cells()[1], Cell::Null);
        assert_eq!(table.column("ratio").unwrap().kind(), ColumnType::Number);
        assert_eq!(table.column("endemic").unwrap().kind(), ColumnType::Boolean);
        assert_eq!(table.column("first_seen").unwrap().kind(), ColumnType::DateTime);
    }

    #[test]
    fn csv_non_finite_numbers_load_as_null() {
        let table = Table::from_csv_reader("v\n3\nNaN\n1.5\ninf\n".as_bytes()).unwrap();
        let column = table.column("v").unwrap();
        assert_eq!(column.kind(), ColumnType::Number);
        assert_eq!(
            column.cells(),
            &[Cell::Number(3.0), Cell::Null, Cell::Number(1.5), Cell::Null]
        );
    }

    #[test]
    fn csv_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.csv");
        std::fs::write(&path, "status\nvulnerable\nstable\n").unwrap();

        let table = Table::from_csv_path(&path).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("status").unwrap().kind(), ColumnType::String);
    }

    #[test]
    fn csv_missing_file_is_read_error() {
        let err = Table::from_csv_path(Path::new("/tmp/nate_missing_seed.csv")).unwrap_err();
        assert!(matches!(err, TableError::Read(_)));
    }
}
