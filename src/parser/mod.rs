mod duration;
mod result;

pub use duration::{format_duration, parse_duration};
pub use result::{IResult, ParseError, Span};
