use log::info;

use crate::cliopt::{Command, ConvertOpt, QueryOpt, TranslateOpt};
use crate::convert::Converter;
use crate::error::{Error, ErrorKind, Result};
use crate::input::{read_text, Dataset, InfluxConfig, Origin, Source};
use crate::model::{MetricSpec, MetricType, Timestamp};
use crate::output::encoder::Report;
use crate::output::writer::Writer;
use crate::output::Output;
use crate::translate::{detect, translate, QueryLanguage};

/// InfluxDB tables carry the sample time here.
const INFLUX_TIME_COLUMN: &str = "_time";

// convert:   Source -> Dataset(Records) -> Converter -> MetricFamilies -> Encoder -> Writer
// translate: query text -> rules -> PromQuery -> Writer
pub struct Runner {
    now: Timestamp,
}

impl Runner {
    /// `now` stamps every sample without a timestamp of its own in this run.
    pub fn new(now: Timestamp) -> Self {
        Self { now }
    }

    pub fn run(&self, cmd: &Command, writer: Box<dyn Writer>) -> Result<()> {
        match cmd {
            Command::Convert(opt) => self.convert(opt, writer),
            Command::Translate(opt) => self.translate(opt, writer),
        }
    }

    fn convert(&self, opt: &ConvertOpt, writer: Box<dyn Writer>) -> Result<()> {
        let query = read_query(&opt.query)?.filter(|q| !q.trim().is_empty());
        let dataset = source(opt, query.as_deref())?.read()?;
        let spec = metric_spec(opt, &dataset)?;

        let families = Converter::new(&spec, self.now).convert(dataset.records())?;
        info!(
            "converted {} records into {} metric families",
            dataset.records().len(),
            families.len()
        );

        Output::new(writer, opt.encode.encoder()).write(&Report {
            query: query.as_deref(),
            families: &families,
        })
    }

    fn translate(&self, opt: &TranslateOpt, writer: Box<dyn Writer>) -> Result<()> {
        let query = read_query(&opt.query)?
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| Error::config("a query is required, use --query or --query-file"))?;

        let forced = match &opt.language {
            Some(language) => Some(language.parse::<QueryLanguage>()?),
            None => None,
        };

        let promql = translate(&query, forced)?;
        let mut writer = writer;
        writer
            .write(promql.as_bytes())
            .map_err(|e| (ErrorKind::Io, "writer failed", e))?;
        Ok(())
    }
}

fn read_query(opt: &QueryOpt) -> Result<Option<String>> {
    match (&opt.query, &opt.query_file) {
        (Some(_), Some(_)) => Err(Error::config(
            "use either --query or --query-file, not both",
        )),
        (Some(query), None) => Ok(Some(query.clone())),
        (None, Some(path)) => Ok(Some(read_text(path)?)),
        (None, None) => Ok(None),
    }
}

fn source(opt: &ConvertOpt, query: Option<&str>) -> Result<Source> {
    let mut sources = Vec::new();
    if let Some(data) = &opt.data {
        sources.push(Source::from_data_arg(data));
    }
    if let Some(path) = &opt.file {
        sources.push(Source::Csv(path.clone()));
    }
    if let Some(path) = &opt.influx_csv {
        sources.push(Source::AnnotatedCsv(path.clone()));
    }
    if let Some(url) = &opt.url {
        sources.push(live_source(url, opt, query)?);
    }

    match sources.len() {
        0 => Err(Error::config(
            "no data source, use one of --data, --file, --influx-csv or --url",
        )),
        1 => Ok(sources.remove(0)),
        _ => Err(Error::config(
            "only one of --data, --file, --influx-csv or --url may be given",
        )),
    }
}

fn live_source(url: &str, opt: &ConvertOpt, query: Option<&str>) -> Result<Source> {
    let query = query.ok_or_else(|| Error::config("--url requires --query or --query-file"))?;
    if detect(query) == Some(QueryLanguage::InfluxQL) {
        return Err(Error::unsupported_query(
            "live queries must be written in Flux, InfluxQL is not supported",
        ));
    }

    let token = opt
        .token
        .clone()
        .ok_or_else(|| Error::config("--url requires --token or INFLUX_TOKEN"))?;
    let org = opt
        .org
        .clone()
        .ok_or_else(|| Error::config("--url requires --org or INFLUX_ORG"))?;

    Ok(Source::Live {
        config: InfluxConfig {
            url: url.to_owned(),
            token,
            org,
        },
        query: query.to_owned(),
    })
}

fn metric_spec(opt: &ConvertOpt, dataset: &Dataset) -> Result<MetricSpec> {
    let metric_type: MetricType = opt.metric_type.trim().parse()?;
    let influx_table = dataset.origin() == Origin::InfluxTable;

    let mut spec = MetricSpec::new(metric_type, opt.value_column.clone());
    if let Some(name) = &opt.name {
        spec = spec.with_name(name.clone());
    }
    if let Some(help) = &opt.help_text {
        spec = spec.with_help(help.clone());
    }

    spec = match &opt.label_columns {
        Some(columns) => spec.with_labels(columns.clone()),
        None if influx_table => spec.with_labels(dataset.tag_columns()),
        None => spec,
    };

    spec = match &opt.timestamp_column {
        Some(column) => spec.with_timestamp(column.clone()),
        None if influx_table => spec.with_timestamp(INFLUX_TIME_COLUMN),
        None => spec,
    };

    Ok(spec)
}
