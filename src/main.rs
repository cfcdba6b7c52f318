use kml2gpx::cli::Cli;
use kml2gpx::config::Config;
use simplelog::{Config as LogConfig, TermLogger, TerminalMode};
use std::process;
use structopt::StructOpt;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let opt = Cli::from_args();

    // load the configuration before the logger so it can set the default level
    let config = Config::discover()?;
    let level_filter = opt.verbosity(config.log_level());
    TermLogger::init(level_filter, LogConfig::default(), TerminalMode::Mixed)?;

    opt.execute_subcommand(config)
}
