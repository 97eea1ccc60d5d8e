use super::encoder::{Encoder, Report};
use crate::convert::format_label_set;
use crate::error::Result;
use crate::model::{format_value, MetricFamily};

/// Prometheus text exposition format, one HELP/TYPE block per family.
pub struct ExpositionEncoder {}

impl ExpositionEncoder {
    pub fn new() -> Self {
        Self {}
    }

    fn encode_family(&self, family: &MetricFamily, lines: &mut Vec<String>) {
        let name = family.name();

        if let Some(help) = family.help() {
            lines.push(format!("# HELP {} {}", name, escape_help(help)));
        }
        lines.push(format!("# TYPE {} {}", name, family.metric_type()));

        for sample in family.samples() {
            lines.push(format!(
                "{}{} {} {}",
                sample.name(),
                format_label_set(sample.labels()),
                format_value(sample.value()),
                sample.timestamp()
            ));
        }
    }
}

impl Encoder for ExpositionEncoder {
    fn encode(&self, report: &Report) -> Result<Vec<u8>> {
        let mut lines = Vec::new();

        if let Some(query) = report.query.filter(|q| !q.trim().is_empty()) {
            for (i, line) in query.trim().lines().enumerate() {
                match i {
                    0 => lines.push(format!("# Query: {}", line)),
                    _ => lines.push(format!("# {}", line).trim_end().to_owned()),
                }
            }
            lines.push(String::new());
        }

        for (i, family) in report.families.iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            self.encode_family(family, &mut lines);
        }

        Ok(String::into_bytes(lines.join("\n")))
    }
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}
