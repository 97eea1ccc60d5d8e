use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::debug;

use super::annotated_csv::read_annotated_csv;
use super::influxdb::{InfluxClient, InfluxConfig};
use super::json::read_json;
use super::plain_csv::read_csv;
use crate::error::{ErrorKind, Result};
use crate::model::Record;

/// Columns InfluxDB adds to every table that are not tags.
const TABLE_COLUMNS: [&str; 2] = ["result", "table"];

/// Where the records of a data set came from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Origin {
    Json,
    Csv,
    /// Annotated CSV from an InfluxDB query, live or saved.
    InfluxTable,
}

#[derive(Debug)]
pub struct Dataset {
    records: Vec<Record>,
    origin: Origin,
}

impl Dataset {
    pub fn new(records: Vec<Record>, origin: Origin) -> Self {
        Self { records, origin }
    }

    #[inline]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[inline]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Tag columns of an InfluxDB table: everything that is not a `_`-prefixed
    /// system column nor `result`/`table`, sorted.
    pub fn tag_columns(&self) -> Vec<String> {
        let tags: BTreeSet<&String> = self
            .records
            .iter()
            .flat_map(|r| r.columns())
            .filter(|c| !c.starts_with('_') && !TABLE_COLUMNS.contains(&c.as_str()))
            .collect();
        tags.into_iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Inline JSON text.
    Json(String),
    JsonFile(PathBuf),
    Csv(PathBuf),
    AnnotatedCsv(PathBuf),
    Live { config: InfluxConfig, query: String },
}

impl Source {
    /// `@path` refers to a JSON file, anything else is inline JSON.
    pub fn from_data_arg(data: &str) -> Self {
        match data.strip_prefix('@') {
            Some(path) => Source::JsonFile(PathBuf::from(path)),
            None => Source::Json(data.to_owned()),
        }
    }

    pub fn read(&self) -> Result<Dataset> {
        let dataset = match self {
            Source::Json(text) => read_json(text)?,
            Source::JsonFile(path) => read_json(&read_text(path)?)?,
            Source::Csv(path) => Dataset::new(read_csv(&read_text(path)?)?, Origin::Csv),
            Source::AnnotatedCsv(path) => {
                Dataset::new(read_annotated_csv(&read_text(path)?)?, Origin::InfluxTable)
            }
            Source::Live { config, query } => {
                let text = InfluxClient::new(config.clone()).query(query)?;
                Dataset::new(read_annotated_csv(&text)?, Origin::InfluxTable)
            }
        };

        debug!(
            "read {} records ({:?})",
            dataset.records.len(),
            dataset.origin
        );
        Ok(dataset)
    }
}

/// Reads a whole file, or stdin for `-`.
pub fn read_text(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| (ErrorKind::Io, "couldn't read stdin", e))?;
        return Ok(text);
    }

    fs::read_to_string(path).map_err(|e| {
        (
            ErrorKind::Io,
            format!("couldn't read {}", path.display()),
            e,
        )
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data_arg() {
        assert_eq!(
            Source::JsonFile(PathBuf::from("data/cpu.json")),
            Source::from_data_arg("@data/cpu.json")
        );
        assert_eq!(
            Source::Json("[]".to_owned()),
            Source::from_data_arg("[]")
        );
    }

    #[test]
    fn test_tag_columns() {
        let dataset = Dataset::new(
            vec![
                Record::new(1)
                    .with("result", "_result")
                    .with("table", "0")
                    .with("_time", "2023-05-08T12:00:00Z")
                    .with("_value", "1")
                    .with("host", "a"),
                Record::new(2).with("region", "eu").with("host", "b"),
            ],
            Origin::InfluxTable,
        );
        assert_eq!(vec!["host", "region"], dataset.tag_columns());
    }

    #[test]
    fn test_missing_file() {
        let err = Source::Csv(PathBuf::from("/nonexistent/data.csv"))
            .read()
            .unwrap_err();
        assert_eq!(ErrorKind::Io, err.kind());
        assert!(err.message().contains("/nonexistent/data.csv"));
    }
}
