use log::debug;

use crate::error::{Error, ErrorKind, Result};
use crate::model::Record;

// InfluxDB reports query failures in-band as a table with these columns.
const ERROR_COLUMNS: [&str; 2] = ["error", "reference"];

/// Reads annotated CSV as returned by the InfluxDB v2 query API.
///
/// The response is a sequence of tables separated by blank lines. Each table
/// may open with `#datatype`, `#group` and `#default` annotation rows, followed
/// by a header row whose first field is empty (the annotation column), then
/// data rows. Rows starting with `#` are skipped; `#default` values are used
/// for empty cells. The `result` and `table` columns are kept as ordinary
/// fields.
pub fn read_annotated_csv(text: &str) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut row = 0;

    for (n, table) in split_tables(text).iter().enumerate() {
        let before = records.len();
        read_table(table, &mut records, &mut row)?;
        debug!("annotated CSV table {}: {} rows", n, records.len() - before);
    }

    Ok(records)
}

fn split_tables(text: &str) -> Vec<String> {
    let mut tables = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                tables.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.is_empty() {
        tables.push(current);
    }

    tables
}

fn read_table(table: &str, records: &mut Vec<Record>, row: &mut usize) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(table.as_bytes());

    let mut header: Option<Vec<String>> = None;
    let mut defaults: Vec<String> = Vec::new();

    for result in reader.records() {
        let fields = result.map_err(|e| (ErrorKind::Format, "malformed annotated CSV", e))?;
        let first = fields.get(0).unwrap_or("");

        if first.starts_with('#') {
            if first == "#default" {
                defaults = fields.iter().map(String::from).collect();
            }
            continue;
        }

        if header.is_none() {
            header = Some(fields.iter().map(|f| f.trim().to_owned()).collect());
            continue;
        }
        let columns = match &header {
            Some(columns) => columns,
            None => continue,
        };

        if is_error_table(columns) {
            return Err(in_band_error(columns, &fields));
        }

        *row += 1;
        if fields.len() != columns.len() {
            return Err(Error::format(format!(
                "annotated CSV row {}: expected {} columns, found {}",
                row,
                columns.len(),
                fields.len()
            )));
        }

        let mut record = Record::new(*row);
        for (i, (column, value)) in columns.iter().zip(fields.iter()).enumerate() {
            if column.is_empty() {
                continue;
            }
            let value = match defaults.get(i) {
                Some(default) if value.is_empty() && !default.is_empty() => default.as_str(),
                _ => value,
            };
            record.insert(column.as_str(), value);
        }
        records.push(record);
    }

    Ok(())
}

fn is_error_table(columns: &[String]) -> bool {
    let named: Vec<&str> = columns
        .iter()
        .map(String::as_str)
        .filter(|c| !c.is_empty())
        .collect();
    named == ERROR_COLUMNS
}

fn in_band_error(columns: &[String], fields: &csv::StringRecord) -> Error {
    let cell = |name: &str| {
        columns
            .iter()
            .position(|c| c == name)
            .and_then(|i| fields.get(i))
            .unwrap_or("")
    };

    match cell("reference") {
        "" => Error::external_query(format!("InfluxDB query failed: {}", cell("error"))),
        reference => Error::external_query(format!(
            "InfluxDB query failed: {} (reference {})",
            cell("error"),
            reference
        )),
    }
}
