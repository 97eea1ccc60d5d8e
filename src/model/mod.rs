mod labels;
mod metric;
mod record;
mod sample;
mod timestamp;

pub use labels::*;
pub use metric::*;
pub use record::*;
pub use sample::*;
pub use timestamp::*;

pub type MetricName = String;

pub type SampleValue = f64;
