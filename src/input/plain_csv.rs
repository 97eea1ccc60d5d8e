use crate::error::{ErrorKind, Result};
use crate::model::Record;

/// Reads CSV with a header row. Every row must have as many fields as the header.
/// Lines holding only whitespace are skipped, so the header is the first non-blank line.
pub fn read_csv(text: &str) -> Result<Vec<Record>> {
    let content: String = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .flat_map(|line| line.chars().chain(std::iter::once('\n')))
        .collect();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| (ErrorKind::Format, "couldn't read CSV header", e))?
        .clone();

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let fields =
            result.map_err(|e| (ErrorKind::Format, format!("malformed CSV row {}", row), e))?;

        let mut record = Record::new(row);
        for (column, value) in headers.iter().zip(fields.iter()) {
            record.insert(column, value);
        }
        records.push(record);
    }

    Ok(records)
}
