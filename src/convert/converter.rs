use std::collections::HashMap;

use log::debug;

use super::labels::LabelFormatter;
use super::namer;
use crate::error::{Error, Result};
use crate::model::{
    normalize_timestamp, MetricFamily, MetricSpec, Record, Sample, SampleValue, Timestamp,
};

/// Turns records into samples grouped by metric name.
pub struct Converter<'a> {
    spec: &'a MetricSpec,
    labels: LabelFormatter,
    now: Timestamp,
}

impl<'a> Converter<'a> {
    /// `now` stamps samples that have no timestamp of their own.
    pub fn new(spec: &'a MetricSpec, now: Timestamp) -> Self {
        let mut consumed: Vec<&str> = namer::name_columns(spec).to_vec();
        consumed.push(&spec.value_column);
        if let Some(column) = &spec.timestamp_column {
            consumed.push(column);
        }

        Self {
            spec,
            labels: LabelFormatter::new(&spec.label_columns, &consumed),
            now,
        }
    }

    /// Families come out in order of first appearance; samples keep input order.
    pub fn convert(&self, records: &[Record]) -> Result<Vec<MetricFamily>> {
        let mut families: Vec<MetricFamily> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in records {
            let sample = self.sample(record)?;
            let pos = match index.get(sample.name()) {
                Some(pos) => *pos,
                None => {
                    index.insert(sample.name().clone(), families.len());
                    families.push(MetricFamily::new(
                        sample.name().clone(),
                        self.spec.metric_type,
                        self.spec.help.clone(),
                    ));
                    families.len() - 1
                }
            };
            families[pos].push(sample);
        }

        debug!(
            "converted {} records into {} metric families",
            records.len(),
            families.len()
        );
        Ok(families)
    }

    pub fn sample(&self, record: &Record) -> Result<Sample> {
        let name = namer::metric_name(record, self.spec)?;
        let value = self.value(record)?;
        let timestamp = self.timestamp(record)?;
        Ok(Sample::new(name, self.labels.labels(record), value, timestamp))
    }

    fn value(&self, record: &Record) -> Result<SampleValue> {
        let column = &self.spec.value_column;
        let raw = record.get_present(column).ok_or_else(|| {
            Error::format(format!(
                "row {}: value column '{}' not found",
                record.row(),
                column
            ))
        })?;

        raw.as_f64().ok_or_else(|| {
            Error::format(format!(
                "row {}: invalid value in column '{}': {}",
                record.row(),
                column,
                raw
            ))
        })
    }

    fn timestamp(&self, record: &Record) -> Result<Timestamp> {
        let column = match &self.spec.timestamp_column {
            Some(column) => column,
            None => return Ok(self.now),
        };

        match record.get_present(column) {
            Some(raw) => normalize_timestamp(raw).map_err(|e| {
                Error::format(format!("row {}: {}", record.row(), e.message()))
            }),
            None => {
                debug!(
                    "row {}: no timestamp in column '{}', using conversion time",
                    record.row(),
                    column
                );
                Ok(self.now)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{MetricType, Scalar};

    const NOW: Timestamp = 1_700_000_000_000;

    fn cpu_record(row: usize, host: &str, value: f64) -> Record {
        Record::new(row)
            .with("timestamp", "2023-05-08T12:00:00Z")
            .with("host", host)
            .with("usage", value)
    }

    #[test]
    fn test_explicit_name() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let spec = MetricSpec::new(MetricType::Gauge, "usage")
            .with_name("cpu")
            .with_labels(vec!["host"])
            .with_timestamp("timestamp");

        let records = vec![cpu_record(1, "server1", 45.2), cpu_record(2, "server2", 12.0)];
        let families = Converter::new(&spec, NOW).convert(&records)?;

        assert_eq!(1, families.len());
        let samples = families[0].samples();
        assert_eq!(2, samples.len());
        assert_eq!("cpu", samples[0].name());
        assert_eq!(Some(&"server1".to_owned()), samples[0].label("host"));
        assert_eq!(45.2, samples[0].value());
        assert_eq!(1683547200000, samples[0].timestamp());
        assert_eq!(Some(&"server2".to_owned()), samples[1].label("host"));
        Ok(())
    }

    #[test]
    fn test_derived_names_group_by_first_appearance(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let spec = MetricSpec::new(MetricType::Gauge, "_value")
            .with_labels(vec!["host", "_measurement"])
            .with_timestamp("_time");

        let row = |n: usize, m: &str, f: &str, v: &str| {
            Record::new(n)
                .with("_time", "2023-05-08T12:00:00Z")
                .with("_measurement", m)
                .with("_field", f)
                .with("_value", v)
                .with("host", "a")
        };
        let records = vec![
            row(1, "mem", "used", "10"),
            row(2, "cpu", "usage", "0.5"),
            row(3, "mem", "used", "11"),
        ];

        let families = Converter::new(&spec, NOW).convert(&records)?;
        let names: Vec<&String> = families.iter().map(|f| f.name()).collect();
        assert_eq!(vec!["mem_used", "cpu_usage"], names);
        assert_eq!(2, families[0].samples().len());
        assert_eq!(11.0, families[0].samples()[1].value());

        // _measurement feeds the name, so it is not a label.
        assert_eq!(1, families[1].samples()[0].labels().len());
        Ok(())
    }

    #[test]
    fn test_missing_timestamp_uses_now() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let spec = MetricSpec::new(MetricType::Counter, "v").with_name("hits");
        let sample = Converter::new(&spec, NOW).sample(&Record::new(1).with("v", 3.0))?;
        assert_eq!(NOW, sample.timestamp());

        let spec = spec.with_timestamp("ts");
        let converter = Converter::new(&spec, NOW);
        let sample = converter.sample(&Record::new(1).with("v", 3.0).with("ts", ""))?;
        assert_eq!(NOW, sample.timestamp());

        let sample = converter.sample(&Record::new(1).with("v", 3.0).with("ts", 1683547200.0))?;
        assert_eq!(1683547200000, sample.timestamp());
        Ok(())
    }

    #[test]
    fn test_value_errors() {
        let spec = MetricSpec::new(MetricType::Gauge, "v").with_name("m");
        let converter = Converter::new(&spec, NOW);

        let records = [
            Record::new(1),
            Record::new(2).with("v", Scalar::Null),
            Record::new(3).with("v", "n/a"),
        ];
        for record in &records {
            let err = converter.sample(record).unwrap_err();
            assert_eq!(ErrorKind::Format, err.kind());
            assert!(err.message().starts_with(&format!("row {}", record.row())));
        }

        let sample = converter.sample(&Record::new(4).with("v", Scalar::Bool(true)));
        assert_eq!(1.0, sample.map(|s| s.value()).unwrap_or_default());
    }

    #[test]
    fn test_bad_timestamp() {
        let spec = MetricSpec::new(MetricType::Gauge, "v")
            .with_name("m")
            .with_timestamp("ts");
        let record = Record::new(7).with("v", 1.0).with("ts", "last tuesday");

        let err = Converter::new(&spec, NOW).sample(&record).unwrap_err();
        assert_eq!(ErrorKind::Format, err.kind());
        assert!(err.message().starts_with("row 7:"));
    }
}
