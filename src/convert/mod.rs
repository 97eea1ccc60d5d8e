mod converter;
mod labels;
pub mod namer;

pub use converter::Converter;
pub use labels::{escaped_pairs, format_label_set, LabelFormatter};
