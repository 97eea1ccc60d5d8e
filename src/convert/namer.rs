use crate::error::{Error, Result};
use crate::model::{sanitize_metric_name, MetricName, MetricSpec, Record};

pub const MEASUREMENT_COLUMN: &str = "_measurement";
pub const FIELD_COLUMN: &str = "_field";

/// Columns the metric name is derived from, if any.
pub fn name_columns(spec: &MetricSpec) -> &'static [&'static str] {
    match spec.name {
        Some(_) => &[],
        None => &[MEASUREMENT_COLUMN, FIELD_COLUMN],
    }
}

/// `measurement_field`, each part sanitized on its own.
pub fn join_name(measurement: &str, field: &str) -> MetricName {
    format!(
        "{}_{}",
        sanitize_metric_name(measurement),
        sanitize_metric_name(field)
    )
}

pub fn metric_name(record: &Record, spec: &MetricSpec) -> Result<MetricName> {
    if let Some(name) = &spec.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::config("metric name must not be empty"));
        }
        return Ok(sanitize_metric_name(name));
    }

    match (
        record.get_present(MEASUREMENT_COLUMN),
        record.get_present(FIELD_COLUMN),
    ) {
        (Some(measurement), Some(field)) => {
            Ok(join_name(&measurement.to_string(), &field.to_string()))
        }
        _ => Err(Error::config(format!(
            "row {}: no metric name given and it cannot be derived from '{}' and '{}' columns",
            record.row(),
            MEASUREMENT_COLUMN,
            FIELD_COLUMN
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::MetricType;

    #[test]
    fn test_explicit_name() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let spec = MetricSpec::new(MetricType::Gauge, "_value").with_name("http.requests-total");
        let record = Record::new(1)
            .with("_measurement", "cpu")
            .with("_field", "usage");

        assert_eq!("http_requests_total", metric_name(&record, &spec)?);
        assert!(name_columns(&spec).is_empty());
        Ok(())
    }

    #[test]
    fn test_derived_name() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let spec = MetricSpec::new(MetricType::Gauge, "_value");

        #[rustfmt::skip]
        let tests = [
            ("cpu", "usage_user", "cpu_usage_user"),
            ("disk io", "read-bytes", "disk_io_read_bytes"),
            ("5xx", "count", "_5xx_count"),
            ("net", "2g", "net__2g"),
        ];

        for (measurement, field, expected) in &tests {
            let record = Record::new(1)
                .with("_measurement", *measurement)
                .with("_field", *field);
            assert_eq!(*expected, metric_name(&record, &spec)?);
            assert_eq!(join_name(measurement, field), metric_name(&record, &spec)?);
        }
        assert_eq!(&["_measurement", "_field"], name_columns(&spec));
        Ok(())
    }

    #[test]
    fn test_underivable_name() {
        let spec = MetricSpec::new(MetricType::Gauge, "_value");

        let records = [
            Record::new(3).with("_measurement", "cpu"),
            Record::new(4).with("_field", "usage"),
            Record::new(5).with("_measurement", "cpu").with("_field", ""),
        ];
        for record in &records {
            let err = metric_name(record, &spec).unwrap_err();
            assert_eq!(ErrorKind::Config, err.kind());
        }

        let spec = spec.with_name("  ");
        let err = metric_name(&Record::new(1), &spec).unwrap_err();
        assert_eq!(ErrorKind::Config, err.kind());
    }
}
