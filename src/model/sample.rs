use super::labels::Labels;
use super::timestamp::Timestamp;
use super::{MetricName, SampleValue};

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    name: MetricName,
    labels: Labels,
    value: SampleValue,
    timestamp: Timestamp,
}

impl Sample {
    pub fn new(name: MetricName, labels: Labels, value: SampleValue, timestamp: Timestamp) -> Self {
        Self {
            name,
            labels,
            value,
            timestamp,
        }
    }

    #[inline]
    pub fn name(&self) -> &MetricName {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> SampleValue {
        self.value
    }

    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[inline]
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn label(&self, name: &str) -> Option<&String> {
        self.labels.get(name)
    }
}

/// Formats a sample value the way Prometheus parses it back.
pub fn format_value(value: SampleValue) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value == f64::INFINITY {
        "+Inf".to_owned()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_owned()
    } else {
        value.to_string()
    }
}
