pub mod cliopt;
pub mod convert;
pub mod error;
pub mod input;
pub mod model;
pub mod output;
pub mod parser;
pub mod runner;
pub mod translate;
