//! Serialize assembled tracks into GPX documents
use crate::track::{Track, TrackPoint};
use crate::Error;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Time, Track as GpxTrack, TrackSegment as GpxTrackSegment, Waypoint};
use std::io::Write;
use time::{Duration, OffsetDateTime};

/// Convert an assembled track into a single-track GPX 1.1 document
pub fn track_to_gpx(track: &Track) -> Result<Gpx, Error> {
    let mut gpx_track = GpxTrack::default();
    for segment in &track.segments {
        let mut gpx_segment = GpxTrackSegment::default();
        for point in &segment.points {
            gpx_segment.points.push(waypoint(point)?);
        }
        gpx_track.segments.push(gpx_segment);
    }

    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        ..Default::default()
    };
    gpx.creator = Some("kml2gpx".to_string());
    gpx.tracks.push(gpx_track);
    Ok(gpx)
}

/// Write the track as a GPX document to the given sink
pub fn write_gpx<W: Write>(track: &Track, sink: W) -> Result<(), Error> {
    gpx::write(&track_to_gpx(track)?, sink)?;
    Ok(())
}

fn waypoint(point: &TrackPoint) -> Result<Waypoint, Error> {
    let mut waypoint = Waypoint::new(Point::new(point.longitude(), point.latitude()));
    waypoint.elevation = Some(point.altitude());
    if let Some(time) = point.time() {
        // the gpx crate stores timestamps as time::OffsetDateTime
        let timestamp = OffsetDateTime::from_unix_timestamp(time.timestamp())
            .map_err(|e| Error::Format(format!("timestamp out of range: {}", e)))?
            + Duration::nanoseconds(i64::from(time.timestamp_subsec_nanos()));
        waypoint.time = Some(Time::from(timestamp));
    }
    Ok(waypoint)
}
