//! Define the KML file conversion subcommand
use crate::handlers::{run_conversion, KmlHandler};
use crate::parse_iso_time;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use structopt::StructOpt;

/// Convert placemark layers of local KML files
#[derive(Debug, StructOpt)]
pub struct KmlOpts {
    /// Input KML file(s)
    #[structopt(short, long = "input", required = true, parse(from_os_str))]
    inputs: Vec<PathBuf>,
    /// Start time of each input file (ISO-8601)
    #[structopt(long, parse(try_from_str = parse_iso_time))]
    start: Vec<DateTime<Utc>>,
    /// End time of each input file (ISO-8601)
    #[structopt(long, parse(try_from_str = parse_iso_time))]
    end: Vec<DateTime<Utc>>,
    /// KML layer to extract
    #[structopt(long, default_value = "Altitude")]
    layer: String,
}

/// Implementation of the `kml` subcommand
pub fn kml_command(
    opts: KmlOpts,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut handler = KmlHandler::new(opts.inputs, opts.layer, opts.start, opts.end);
    Ok(run_conversion(&mut handler, output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_inputs_and_times() {
        let opts = KmlOpts::from_iter(vec![
            "kml",
            "-i",
            "a.kml",
            "-i",
            "b.kml",
            "--start",
            "2024-01-01T00:00:00",
            "--start",
            "2024-01-01T02:00:00",
            "--end",
            "2024-01-01T01:00:00",
            "--end",
            "2024-01-01T03:00:00",
        ]);

        assert_eq!(opts.inputs.len(), 2);
        assert_eq!(opts.layer, "Altitude");
        assert_eq!(opts.start[0], Utc.ymd(2024, 1, 1).and_hms(0, 0, 0));
        assert_eq!(opts.end[1], Utc.ymd(2024, 1, 1).and_hms(3, 0, 0));
    }

    #[test]
    fn test_input_is_required() {
        assert!(KmlOpts::from_iter_safe(vec!["kml"]).is_err());
    }

    #[test]
    fn test_invalid_time_is_rejected() {
        assert!(
            KmlOpts::from_iter_safe(vec!["kml", "-i", "a.kml", "--start", "yesterday"]).is_err()
        );
    }
}
