use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::encoder::{Encoder, Report};
use crate::error::{ErrorKind, Result};
use crate::model::{format_value, Labels, NAME_LABEL};

// Range query result, the shape Prometheus' HTTP API returns:
// {
//   "resultType": "matrix",
//   "result": [
//     {
//       "metric": {"__name__": "cpu", "host": "server1"},
//       "values": [[1683547200, "45.2"], [1683547260, "46.1"]]
//     }
//   ]
// }
#[derive(Serialize)]
struct MatrixItem {
    metric: BTreeMap<String, String>,
    values: Vec<(f64, String)>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Matrix {
    result_type: &'static str,
    result: Vec<MatrixItem>,
}

impl Matrix {
    fn new(report: &Report) -> Self {
        let mut result: Vec<MatrixItem> = Vec::new();
        let mut index: HashMap<Labels, usize> = HashMap::new();

        for sample in report.families.iter().flat_map(|f| f.samples()) {
            let mut metric = sample.labels().clone();
            metric.insert(NAME_LABEL.to_owned(), sample.name().clone());

            let value = (
                sample.timestamp() as f64 / 1000.0,
                format_value(sample.value()),
            );

            match index.get(&metric) {
                Some(&i) => result[i].values.push(value),
                None => {
                    index.insert(metric.clone(), result.len());
                    result.push(MatrixItem {
                        metric,
                        values: vec![value],
                    });
                }
            }
        }

        Self {
            result_type: "matrix",
            result,
        }
    }
}

/// Prometheus HTTP API JSON, for tools that consume query responses.
pub struct PromApiEncoder {}

impl PromApiEncoder {
    pub fn new() -> Self {
        Self {}
    }
}

impl Encoder for PromApiEncoder {
    fn encode(&self, report: &Report) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&Matrix::new(report))
            .map_err(|e| (ErrorKind::Format, "JSON serialization failed", e))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetricFamily, MetricType, Sample};

    #[test]
    fn test_encode() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let host = |h: &str| -> Labels {
            vec![("host".to_owned(), h.to_owned())].into_iter().collect()
        };

        let mut cpu = MetricFamily::new("cpu".to_owned(), MetricType::Gauge, None);
        cpu.push(Sample::new("cpu".to_owned(), host("a"), 45.2, 1683547200000));
        cpu.push(Sample::new("cpu".to_owned(), host("b"), 12.0, 1683547200000));
        cpu.push(Sample::new("cpu".to_owned(), host("a"), 46.1, 1683547260500));

        let buf = PromApiEncoder::new().encode(&Report {
            query: Some("ignored"),
            families: &[cpu],
        })?;

        assert_eq!(
            concat!(
                r#"{"resultType":"matrix","result":["#,
                r#"{"metric":{"__name__":"cpu","host":"a"},"values":[[1683547200.0,"45.2"],[1683547260.5,"46.1"]]},"#,
                r#"{"metric":{"__name__":"cpu","host":"b"},"values":[[1683547200.0,"12"]]}"#,
                r#"]}"#
            ),
            String::from_utf8(buf)?
        );
        Ok(())
    }
}
