//! Track data structures shared by all input handlers
use chrono::{DateTime, Utc};

/// Stores a single point of a recorded track
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackPoint {
    /// longitude coordinate in degrees
    longitude: f64,
    /// latitude coordinate in degrees
    latitude: f64,
    /// altitude in meters
    altitude: f64,
    /// absolute point in time, if known
    time: Option<DateTime<Utc>>,
}

impl TrackPoint {
    /// Create a track point without timing information
    pub fn new(longitude: f64, latitude: f64, altitude: f64) -> Self {
        TrackPoint {
            longitude,
            latitude,
            altitude,
            time: None,
        }
    }

    /// Return longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Return latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Return altitude in meters
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Return the point in time this point was recorded (if defined)
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    /// Set the point in time this point was recorded
    pub fn set_time(&mut self, time: DateTime<Utc>) {
        self.time = Some(time);
    }
}

/// Ordered sequence of points extracted from a single input source
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackSegment {
    pub points: Vec<TrackPoint>,
}

/// A track made of one segment per input source, in input order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Track {
    pub segments: Vec<TrackSegment>,
}

/// Spread timestamps evenly between `start` and `end` across the points.
///
/// With `n` points and `delta = (end - start) / n`, point `i` is stamped
/// `start + i * delta`: the first point receives exactly `start` while the
/// last one stays a full `delta` short of `end`, which is therefore never
/// assigned to any point. The end bound behaves as an open interval here and
/// that is the intended policy, not an off-by-one.
///
/// A reversed or zero-length interval is accepted as-is and produces
/// decreasing or identical timestamps.
pub fn interpolate_times(points: &mut [TrackPoint], start: DateTime<Utc>, end: DateTime<Utc>) {
    if points.is_empty() {
        return;
    }

    let delta = (end - start) / points.len() as i32;
    for (index, point) in points.iter_mut().enumerate() {
        point.set_time(start + delta * index as i32);
    }
}
