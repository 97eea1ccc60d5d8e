use std::collections::HashSet;

use log::warn;

use crate::model::{escape_label_value, sanitize_label_name, LabelName, Labels, Record, NAME_LABEL};

/// Builds sample label sets from an explicit allow-list of columns.
#[derive(Debug, Clone)]
pub struct LabelFormatter {
    // (column, label name)
    columns: Vec<(String, LabelName)>,
}

impl LabelFormatter {
    /// `consumed` holds columns already used for the metric name, value or
    /// timestamp; those never become labels.
    pub fn new(label_columns: &[String], consumed: &[&str]) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();

        for column in label_columns {
            let column = column.trim();
            if column.is_empty() {
                continue;
            }
            if consumed.contains(&column) {
                warn!(
                    "column '{}' is already used for the metric name, value or timestamp; not using it as a label",
                    column
                );
                continue;
            }

            let name = sanitize_label_name(column);
            if name == NAME_LABEL {
                warn!("column '{}' would override the metric name; skipping", column);
                continue;
            }
            if !seen.insert(name.clone()) {
                warn!(
                    "label column '{}' maps to already used label name '{}'; skipping",
                    column, name
                );
                continue;
            }
            columns.push((column.to_owned(), name));
        }

        Self { columns }
    }

    /// Raw (unescaped) labels of the record. A listed column missing from the
    /// record yields an empty value.
    pub fn labels(&self, record: &Record) -> Labels {
        self.columns
            .iter()
            .map(|(column, name)| {
                let value = record.get(column).map(|v| v.to_string()).unwrap_or_default();
                (name.clone(), value)
            })
            .collect()
    }
}

/// `(name, escaped value)` pairs in name order.
pub fn escaped_pairs(labels: &Labels) -> Vec<(&str, String)> {
    labels
        .iter()
        .map(|(name, value)| (name.as_str(), escape_label_value(value)))
        .collect()
}

/// Renders `{a="1",b="2"}`, or nothing for an empty label set.
pub fn format_label_set(labels: &Labels) -> String {
    if labels.is_empty() {
        return String::new();
    }

    let pairs: Vec<String> = escaped_pairs(labels)
        .into_iter()
        .map(|(name, value)| format!("{}=\"{}\"", name, value))
        .collect();
    format!("{{{}}}", pairs.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Scalar;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // Inverse of escape_label_value, used to check the round-trip.
    fn unescape(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some(other) => out.push(other),
                    None => out.push('\\'),
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_allow_list_only() {
        let fmt = LabelFormatter::new(&columns(&["region", "host"]), &[]);
        let record = Record::new(1)
            .with("host", "server1")
            .with("region", "eu")
            .with("rack", "r12");

        assert_eq!(
            "{host=\"server1\",region=\"eu\"}",
            format_label_set(&fmt.labels(&record))
        );
    }

    #[test]
    fn test_missing_column_is_empty() {
        let fmt = LabelFormatter::new(&columns(&["host", "dc"]), &[]);
        let record = Record::new(1).with("host", "server1").with("dc", Scalar::Null);

        let labels = fmt.labels(&record);
        assert_eq!(Some(&"".to_owned()), labels.get("dc"));

        let labels = fmt.labels(&Record::new(2));
        assert_eq!("{dc=\"\",host=\"\"}", format_label_set(&labels));
    }

    #[test]
    fn test_consumed_and_duplicate_columns() {
        let fmt = LabelFormatter::new(
            &columns(&["usage", "host-name", "host_name", "__name__", " ", "time"]),
            &["usage", "time"],
        );
        let record = Record::new(1)
            .with("usage", 45.2)
            .with("host-name", "server1")
            .with("host_name", "server2")
            .with("__name__", "cpu")
            .with("time", "2023-05-08T12:00:00Z");

        let labels = fmt.labels(&record);
        let names: Vec<&str> = labels.keys().map(String::as_str).collect();
        assert_eq!(vec!["host_name"], names);
        assert_eq!(Some(&"server1".to_owned()), labels.get("host_name"));
    }

    #[test]
    fn test_number_labels() {
        let fmt = LabelFormatter::new(&columns(&["cpu", "table"]), &[]);
        let record = Record::new(1).with("cpu", 3.0).with("table", "0");
        assert_eq!(
            "{cpu=\"3\",table=\"0\"}",
            format_label_set(&fmt.labels(&record))
        );
    }

    #[test]
    fn test_escaping_round_trips() {
        let fmt = LabelFormatter::new(&columns(&["path"]), &[]);

        for raw in &["C:\\temp\\", "say \"hi\"", "line1\nline2", "\\\"\n", "plain"] {
            let record = Record::new(1).with("path", *raw);
            let labels = fmt.labels(&record);
            let pairs = escaped_pairs(&labels);
            let (_, escaped) = &pairs[0];

            assert!(!escaped.contains('\n'));
            assert_eq!(*raw, unescape(escaped));
            assert_eq!(format!("{{path=\"{}\"}}", escaped), format_label_set(&labels));
        }
    }
}
