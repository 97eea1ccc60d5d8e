use std::process;

use log::LevelFilter;
use structopt::StructOpt;

use influx2prom::cliopt::CliOpt;
use influx2prom::error::Result;
use influx2prom::model::now;
use influx2prom::output::writer;
use influx2prom::runner::Runner;

fn main() {
    let opt = CliOpt::from_args();
    init_logger(opt.verbose);

    if let Err(err) = run(&opt) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

fn run(opt: &CliOpt) -> Result<()> {
    let writer = writer::open(opt.cmd.output())?;
    Runner::new(now()).run(&opt.cmd, writer)
}

// RUST_LOG takes precedence over --verbose.
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
