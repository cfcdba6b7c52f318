//! Input handler converting local KML files
use super::{ArgCheck, InputHandler};
use crate::kml::KmlDocument;
use crate::track::{interpolate_times, Track, TrackSegment};
use crate::Error;
use chrono::{DateTime, Utc};
use log::debug;
use std::path::PathBuf;

/// Converts placemark layers of one or more KML files into a multi-segment
/// track, one segment per file, in input order
pub struct KmlHandler {
    inputs: Vec<PathBuf>,
    layer: String,
    start_times: Vec<DateTime<Utc>>,
    end_times: Vec<DateTime<Utc>>,
    /// per-file time bounds, filled by the argument check
    time_ranges: Vec<Option<(DateTime<Utc>, DateTime<Utc>)>>,
}

impl KmlHandler {
    pub fn new(
        inputs: Vec<PathBuf>,
        layer: String,
        start_times: Vec<DateTime<Utc>>,
        end_times: Vec<DateTime<Utc>>,
    ) -> Self {
        KmlHandler {
            inputs,
            layer,
            start_times,
            end_times,
            time_ranges: Vec::new(),
        }
    }
}

impl InputHandler for KmlHandler {
    fn id(&self) -> &'static str {
        "kml"
    }

    fn description(&self) -> &'static str {
        "Convert placemark layers of local KML files"
    }

    fn check_arguments(&mut self) -> Result<ArgCheck, Error> {
        if self.layer.is_empty() {
            return Err(Error::Validation("no KML layer given".to_string()));
        }
        if self.inputs.is_empty() {
            return Err(Error::Validation("no input file given".to_string()));
        }

        // count checks come first so that a bad invocation never touches the
        // file system
        if self.start_times.len() != self.end_times.len() {
            return Err(Error::Validation(
                "there must be the same number of start and end times".to_string(),
            ));
        }
        if !self.start_times.is_empty() && self.start_times.len() != self.inputs.len() {
            return Err(Error::Validation(
                "there must be as many start times as input files".to_string(),
            ));
        }

        for file in &self.inputs {
            if !file.exists() {
                return Err(Error::Validation(format!(
                    "file not found: {}",
                    file.display()
                )));
            }
        }

        self.time_ranges = if self.start_times.is_empty() {
            vec![None; self.inputs.len()]
        } else {
            self.start_times
                .iter()
                .zip(&self.end_times)
                .map(|(start, end)| Some((*start, *end)))
                .collect()
        };
        Ok(ArgCheck::Proceed)
    }

    fn default_output_path(&self) -> Option<PathBuf> {
        self.inputs.first().map(|path| path.with_extension("gpx"))
    }

    fn build_track(&self) -> Result<Track, Error> {
        let mut segments = Vec::new();
        for (index, file) in self.inputs.iter().enumerate() {
            debug!("Extracting layer {:?} from {:?}", self.layer, file);
            let document = KmlDocument::load(file)?;
            let mut points = document.track_points(&self.layer)?;

            // interpolation never spans across files
            if let Some((start, end)) = self.time_ranges.get(index).copied().flatten() {
                interpolate_times(&mut points, start, end);
            }
            segments.push(TrackSegment { points });
        }

        Ok(Track { segments })
    }
}
