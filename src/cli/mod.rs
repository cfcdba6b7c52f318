//! Define the application's command line interface
use crate::config::Config;
use simplelog::LevelFilter;
use std::path::PathBuf;
use structopt::StructOpt;

mod kml;
use kml::{kml_command, KmlOpts};
mod private_radar;
use private_radar::{private_radar_command, PrivateRadarOpts};

/// Convert KML tracks and Private Radar flights into GPX files
#[derive(Debug, StructOpt)]
pub struct Cli {
    /// Set logging level to debug, use a second time (e.g. -vv) to set logging to trace
    #[structopt(short, long, parse(from_occurrences))]
    verbose: i32,
    /// Suppress info logging messages use a second time (e.g. -qq) to hide warnings
    #[structopt(short, long, parse(from_occurrences))]
    quiet: i32,
    /// Output GPX file
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
    /// Where the track data comes from
    #[structopt(subcommand)]
    cmd: Command,
}

impl Cli {
    /// Return the verbose flag counts as a log level filter
    pub fn verbosity(&self, default: LevelFilter) -> LevelFilter {
        if self.quiet == 1 {
            LevelFilter::Warn
        } else if self.quiet > 1 {
            LevelFilter::Error
        } else if self.verbose == 1 {
            LevelFilter::Debug
        } else if self.verbose >= 2 {
            LevelFilter::Trace
        } else {
            default
        }
    }

    /// Consume options struct and return the result of subcommand execution
    pub fn execute_subcommand(self, config: Config) -> Result<(), Box<dyn std::error::Error>> {
        self.cmd.execute(config, self.output)
    }
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Convert placemark layers of local KML files
    #[structopt(name = "kml")]
    Kml(KmlOpts),
    /// Load flights from a Private Radar server
    #[structopt(name = "private-radar")]
    PrivateRadar(PrivateRadarOpts),
}

impl Command {
    /// Consume enum variant and return the result of the command's execution
    fn execute(
        self,
        config: Config,
        output: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Command::Kml(opts) => kml_command(opts, output),
            Command::PrivateRadar(opts) => private_radar_command(config, opts, output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_mapping() {
        let cli = Cli::from_iter(vec!["kml2gpx", "-v", "kml", "-i", "track.kml"]);
        assert_eq!(cli.verbosity(LevelFilter::Info), LevelFilter::Debug);

        let cli = Cli::from_iter(vec!["kml2gpx", "-q", "kml", "-i", "track.kml"]);
        assert_eq!(cli.verbosity(LevelFilter::Info), LevelFilter::Warn);

        let cli = Cli::from_iter(vec!["kml2gpx", "kml", "-i", "track.kml"]);
        assert_eq!(cli.verbosity(LevelFilter::Info), LevelFilter::Info);
    }

    #[test]
    fn test_global_output_flag() {
        let cli = Cli::from_iter(vec!["kml2gpx", "-o", "out.gpx", "kml", "-i", "track.kml"]);
        assert_eq!(cli.output, Some(PathBuf::from("out.gpx")));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::from_iter_safe(vec!["kml2gpx"]).is_err());
    }
}
