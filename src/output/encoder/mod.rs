mod encoder;
mod exposition;
mod promapi;

use std::str::FromStr;

pub use encoder::{Encoder, Report};
pub use exposition::ExpositionEncoder;
pub use promapi::PromApiEncoder;

use crate::error::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Encoding {
    Exposition,
    PromApi,
}

impl Encoding {
    pub fn encoder(&self) -> Box<dyn Encoder> {
        match self {
            Encoding::Exposition => Box::new(ExpositionEncoder::new()),
            Encoding::PromApi => Box::new(PromApiEncoder::new()),
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exposition" | "text" => Ok(Encoding::Exposition),
            "promapi" | "json" => Ok(Encoding::PromApi),
            _ => Err(Error::config(format!(
                "unknown encoding '{}', expected exposition or promapi",
                s
            ))),
        }
    }
}
