//! Define the Private Radar conversion subcommand
use crate::config::Config;
use crate::handlers::{run_conversion, PrivateRadarHandler};
use std::path::PathBuf;
use structopt::StructOpt;

/// Load flights from a Private Radar server
#[derive(Debug, StructOpt)]
pub struct PrivateRadarOpts {
    /// Path to a configuration file holding the server URL and token
    #[structopt(short = "c", long = "conf", parse(from_os_str))]
    conf: Option<PathBuf>,
    /// Base URL of the Private Radar server
    #[structopt(long)]
    url: Option<String>,
    /// Authentication token
    #[structopt(long)]
    auth: Option<String>,
    /// List available flights and exit
    #[structopt(short, long)]
    list: bool,
    /// Number of available flights to list
    #[structopt(short = "n", long = "nb", default_value = "50")]
    nb_flights: usize,
    /// ID of the flight to extract (or -1 for the latest flight, ...)
    #[structopt(short, long, allow_hyphen_values = true)]
    flight: Option<i64>,
}

/// Implementation of the `private-radar` subcommand
pub fn private_radar_command(
    config: Config,
    opts: PrivateRadarOpts,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut handler = PrivateRadarHandler::new(
        opts.conf,
        opts.url,
        opts.auth,
        opts.list,
        opts.nb_flights,
        opts.flight,
        config,
    );
    Ok(run_conversion(&mut handler, output)?)
}
