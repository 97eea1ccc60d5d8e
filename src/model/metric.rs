use std::fmt;
use std::str::FromStr;

use super::sample::Sample;
use super::MetricName;
use crate::error::{Error, Result};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
    Summary,
}

impl FromStr for MetricType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "counter" => Ok(MetricType::Counter),
            "gauge" => Ok(MetricType::Gauge),
            "histogram" => Ok(MetricType::Histogram),
            "summary" => Ok(MetricType::Summary),
            _ => Err(Error::config(format!(
                "invalid metric type '{}', must be one of: counter, gauge, histogram, summary",
                s
            ))),
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Histogram => "histogram",
            MetricType::Summary => "summary",
        };
        write!(f, "{}", s)
    }
}

/// How to turn a set of records into one or more metric families.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    /// Explicit metric name. When absent the name is derived from
    /// `_measurement` and `_field`.
    pub name: Option<MetricName>,
    pub metric_type: MetricType,
    pub help: Option<String>,
    pub value_column: String,
    pub label_columns: Vec<String>,
    /// Without a timestamp column every sample is stamped with the conversion time.
    pub timestamp_column: Option<String>,
}

impl MetricSpec {
    pub fn new<V: Into<String>>(metric_type: MetricType, value_column: V) -> Self {
        Self {
            name: None,
            metric_type,
            help: None,
            value_column: value_column.into(),
            label_columns: vec![],
            timestamp_column: None,
        }
    }

    pub fn with_name<N: Into<MetricName>>(mut self, name: N) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_help<H: Into<String>>(mut self, help: H) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_labels<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.label_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timestamp<T: Into<String>>(mut self, column: T) -> Self {
        self.timestamp_column = Some(column.into());
        self
    }
}

/// Samples sharing one metric name, rendered under a single HELP/TYPE block.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    name: MetricName,
    metric_type: MetricType,
    help: Option<String>,
    samples: Vec<Sample>,
}

impl MetricFamily {
    pub fn new(name: MetricName, metric_type: MetricType, help: Option<String>) -> Self {
        Self {
            name,
            metric_type,
            help,
            samples: vec![],
        }
    }

    pub fn push(&mut self, sample: Sample) {
        debug_assert_eq!(self.name, *sample.name());
        self.samples.push(sample);
    }

    #[inline]
    pub fn name(&self) -> &MetricName {
        &self.name
    }

    #[inline]
    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    #[inline]
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}
