use crate::error::Result;
use crate::model::MetricFamily;

/// Everything one `convert` run emits.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    /// Source query, echoed as a comment by text encoders.
    pub query: Option<&'a str>,
    pub families: &'a [MetricFamily],
}

pub trait Encoder {
    fn encode(&self, report: &Report) -> Result<Vec<u8>>;
}
