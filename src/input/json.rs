use log::debug;
use serde_json::{self, Map, Value};

use super::annotated_csv::read_annotated_csv;
use super::source::{Dataset, Origin};
use crate::error::{Error, ErrorKind, Result};
use crate::model::{Record, Scalar};

/// Member of a JSON object carrying a raw InfluxDB CSV response.
const CSV_DATA_MEMBER: &str = "csv_data";

/// Reads a JSON array of flat objects, or an object wrapping annotated CSV
/// in a `csv_data` string member.
pub fn read_json(text: &str) -> Result<Dataset> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| (ErrorKind::Format, "JSON decoding failed", e))?;

    match value {
        Value::Array(items) => {
            let records = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| decode_item(i + 1, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(Dataset::new(records, Origin::Json))
        }
        Value::Object(mut obj) => match obj.remove(CSV_DATA_MEMBER) {
            Some(Value::String(csv)) => Ok(Dataset::new(
                read_annotated_csv(&csv)?,
                Origin::InfluxTable,
            )),
            _ => Err(Error::format(
                "data must be a JSON array of objects or an object with a 'csv_data' string",
            )),
        },
        _ => Err(Error::format("data must be a JSON array of objects")),
    }
}

fn decode_item(row: usize, item: Value) -> Result<Record> {
    match item {
        Value::Object(obj) => Ok(decode_dict(row, obj)),
        other => Err(Error::format(format!(
            "data must be a JSON array of objects, element {} is {}",
            row,
            kind_of(&other)
        ))),
    }
}

fn decode_dict(row: usize, dict: Map<String, Value>) -> Record {
    let mut record = Record::new(row);
    for (column, value) in dict {
        let scalar = match value {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Scalar::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Scalar::Unsigned(u)
                } else {
                    match n.as_f64() {
                        Some(f) => Scalar::Number(f),
                        None => Scalar::String(n.to_string()),
                    }
                }
            }
            Value::String(s) => Scalar::String(s),
            nested => {
                debug!(
                    "row {}: dropping nested {} in column '{}'",
                    row,
                    kind_of(&nested),
                    column
                );
                continue;
            }
        };
        record.insert(column, scalar);
    }
    record
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_of_objects() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let data = read_json(
            r#"[
                {"time": "2023-05-08T12:00:00Z", "host": "server1", "usage": 45.2, "up": true},
                {"time": 1683547260, "host": "server2", "usage": "12", "extra": null, "tags": {"a": 1}}
            ]"#,
        )?;

        assert_eq!(Origin::Json, data.origin());
        let records = data.records();
        assert_eq!(2, records.len());
        assert_eq!(1, records[0].row());
        assert_eq!(Some(&Scalar::Number(45.2)), records[0].get("usage"));
        assert_eq!(Some(&Scalar::Bool(true)), records[0].get("up"));
        assert_eq!(Some(&Scalar::Integer(1683547260)), records[1].get("time"));
        assert_eq!(Some(&Scalar::Null), records[1].get("extra"));
        assert_eq!(None, records[1].get("tags"));
        Ok(())
    }

    #[test]
    fn test_integers_keep_every_digit() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let data = read_json(
            r#"[{"id": 12345678901234567891, "seq": 9007199254740993, "delta": -42, "ratio": 0.5}]"#,
        )?;

        let record = &data.records()[0];
        assert_eq!(Some(&Scalar::Unsigned(12345678901234567891)), record.get("id"));
        assert_eq!(Some(&Scalar::Integer(9007199254740993)), record.get("seq"));
        assert_eq!(Some(&Scalar::Integer(-42)), record.get("delta"));
        assert_eq!(Some(&Scalar::Number(0.5)), record.get("ratio"));
        assert_eq!(
            Some("12345678901234567891".to_owned()),
            record.get("id").map(|v| v.to_string())
        );
        Ok(())
    }

    #[test]
    fn test_csv_data_envelope() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let data = read_json(
            r#"{"csv_data": ",result,table,_time,_value,_field,_measurement,host\n,_result,0,2023-05-08T12:00:00Z,45.2,usage_user,cpu,server1\n"}"#,
        )?;

        assert_eq!(Origin::InfluxTable, data.origin());
        assert_eq!(1, data.records().len());
        assert_eq!(Some(&Scalar::from("cpu")), data.records()[0].get("_measurement"));
        Ok(())
    }

    #[test]
    fn test_invalid_shapes() {
        #[rustfmt::skip]
        let tests = [
            "not json",
            r#"{"a": 1}"#,
            r#"{"csv_data": 42}"#,
            r#""text""#,
            r#"[{"a": 1}, 2]"#,
            r#"[[1, 2]]"#,
        ];

        for input in &tests {
            let err = read_json(input).unwrap_err();
            assert_eq!(ErrorKind::Format, err.kind(), "while reading {}", input);
        }
    }
}
