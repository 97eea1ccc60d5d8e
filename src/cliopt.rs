use std::path::{Path, PathBuf};

use structopt::StructOpt;

use crate::output::encoder::Encoding;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "influx2prom",
    about = "Convert InfluxDB data to Prometheus exposition format and translate Flux/InfluxQL to PromQL"
)]
pub struct CliOpt {
    /// Raise log verbosity, repeat for more (info, debug, trace)
    #[structopt(long = "verbose", parse(from_occurrences))]
    pub verbose: u8,

    #[structopt(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Convert JSON, CSV or InfluxDB query results to Prometheus metrics
    Convert(ConvertOpt),

    /// Translate a Flux or InfluxQL query to PromQL
    Translate(TranslateOpt),
}

impl Command {
    pub fn output(&self) -> Option<&Path> {
        match self {
            Command::Convert(opt) => opt.output.output.as_deref(),
            Command::Translate(opt) => opt.output.output.as_deref(),
        }
    }
}

#[derive(Debug, StructOpt)]
pub struct OutputOpt {
    /// Output file (default: stdout)
    #[structopt(long = "output", short = "o", parse(from_os_str))]
    pub output: Option<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct QueryOpt {
    /// Query text
    #[structopt(long = "query", short = "q")]
    pub query: Option<String>,

    /// File containing the query text
    #[structopt(long = "query-file", parse(from_os_str))]
    pub query_file: Option<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct ConvertOpt {
    /// Inline JSON data, or @path to a JSON file
    #[structopt(long = "data", short = "d")]
    pub data: Option<String>,

    /// CSV file with a header row ("-" for stdin)
    #[structopt(long = "file", short = "f", parse(from_os_str))]
    pub file: Option<PathBuf>,

    /// Annotated CSV saved from an InfluxDB query
    #[structopt(long = "influx-csv", parse(from_os_str))]
    pub influx_csv: Option<PathBuf>,

    /// InfluxDB URL for a live query, e.g. http://localhost:8086
    #[structopt(long = "url")]
    pub url: Option<String>,

    #[structopt(long = "token", env = "INFLUX_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[structopt(long = "org", env = "INFLUX_ORG")]
    pub org: Option<String>,

    #[structopt(flatten)]
    pub query: QueryOpt,

    /// Metric name (default: <_measurement>_<_field> of each record)
    #[structopt(long = "name", short = "n")]
    pub name: Option<String>,

    /// Metric type: counter, gauge, histogram or summary
    #[structopt(long = "type", short = "t", default_value = "gauge")]
    pub metric_type: String,

    /// Column holding the sample value
    #[structopt(long = "value-column", short = "v", default_value = "_value")]
    pub value_column: String,

    #[structopt(long = "help-text")]
    pub help_text: Option<String>,

    /// Comma separated columns to use as labels
    #[structopt(long = "label-columns", short = "l", use_delimiter = true)]
    pub label_columns: Option<Vec<String>>,

    /// Column holding the sample timestamp (default: conversion time)
    #[structopt(long = "timestamp-column")]
    pub timestamp_column: Option<String>,

    /// Output encoding: exposition or promapi
    #[structopt(long = "encode", short = "e", default_value = "exposition")]
    pub encode: Encoding,

    #[structopt(flatten)]
    pub output: OutputOpt,
}

#[derive(Debug, StructOpt)]
pub struct TranslateOpt {
    #[structopt(flatten)]
    pub query: QueryOpt,

    /// Query language: flux or influxql (default: detected)
    #[structopt(long = "type", short = "t")]
    pub language: Option<String>,

    #[structopt(flatten)]
    pub output: OutputOpt,
}
