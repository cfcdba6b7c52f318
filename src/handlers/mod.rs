//! Input handlers that turn a track source into a unified GPX file
use crate::export::write_gpx;
use crate::track::Track;
use crate::Error;
use log::debug;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;

mod kml;
pub use kml::KmlHandler;
mod private_radar;
pub use private_radar::PrivateRadarHandler;

/// Outcome of the argument validation step
#[derive(Debug)]
pub enum ArgCheck {
    /// Arguments are valid, continue with track production
    Proceed,
    /// The handler already completed its work, exit with the given code
    EarlyExit(i32),
}

/// Capability surface shared by all input handlers
pub trait InputHandler {
    /// Stable short name, used to route the matching CLI subcommand
    fn id(&self) -> &'static str;

    /// One-line description of the handler
    fn description(&self) -> &'static str;

    /// Validate the externally supplied options before any data is read
    fn check_arguments(&mut self) -> Result<ArgCheck, Error>;

    /// Output path used when the caller does not provide one
    fn default_output_path(&self) -> Option<PathBuf>;

    /// Produce the fully assembled track
    fn build_track(&self) -> Result<Track, Error>;
}

/// Run a full conversion with the given handler and write the GPX output
pub fn run_conversion(
    handler: &mut dyn InputHandler,
    output: Option<PathBuf>,
) -> Result<(), Error> {
    debug!(
        "Using input handler: {} ({})",
        handler.id(),
        handler.description()
    );
    match handler.check_arguments()? {
        ArgCheck::EarlyExit(code) if code == 0 => return Ok(()),
        ArgCheck::EarlyExit(code) => process::exit(code),
        ArgCheck::Proceed => (),
    }

    let track = handler.build_track()?;
    let output = output
        .or_else(|| handler.default_output_path())
        .unwrap_or_else(|| PathBuf::from("output.gpx"));

    debug!(
        "Writing {} segment(s) to {:?}",
        track.segments.len(),
        output
    );
    let sink = BufWriter::new(File::create(&output)?);
    write_gpx(&track, sink)?;

    println!("{} written successfully.", output.display());
    Ok(())
}
