mod annotated_csv;
mod influxdb;
mod json;
mod plain_csv;
mod source;

pub use annotated_csv::read_annotated_csv;
pub use influxdb::{InfluxClient, InfluxConfig};
pub use json::read_json;
pub use plain_csv::read_csv;
pub use source::{read_text, Dataset, Origin, Source};
