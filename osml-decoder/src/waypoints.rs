//! Track extraction from corrected lines
//!
//! Every valid position fix opens a new waypoint. Sentences that follow it
//! fill in what the fix itself does not carry, each value first-found-wins:
//! altitude from GGA, depth from DBT (feet) and then DPT (metres), and the
//! logger's own accelerometer, gyroscope and supply readings.

use crate::logline::LogLine;
use crate::sentences::{Axes, Sentence};
use crate::types::Timestamp;
use serde::Serialize;

const METERS_PER_FOOT: f64 = 0.3048;

/// Label of the first waypoint of a track
pub const START_NAME: &str = "Start";

/// Label of the last waypoint of a track
pub const END_NAME: &str = "End";

/// A point on the track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "latitude")]
    pub lat: f64,
    #[serde(rename = "longitude")]
    pub lon: f64,
    pub time: Timestamp,
    /// Knots
    pub speed: f64,
    /// Metres above sea level
    pub elevation: f64,
    /// Metres below transducer
    pub depth: f64,
    #[serde(rename = "acc", skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<Axes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gyro: Option<Axes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply: Option<i64>,
}

impl Waypoint {
    fn at(lat: f64, lon: f64, time: Timestamp, speed: f64) -> Self {
        Self {
            name: None,
            lat,
            lon,
            time,
            speed,
            elevation: 0.0,
            depth: 0.0,
            acceleration: None,
            gyro: None,
            supply: None,
        }
    }
}

/// Ordered waypoints with start and end markers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Track {
    pub name: String,
    pub waypoints: Vec<Waypoint>,
    /// Index of the first valid-fix waypoint
    pub start: Option<usize>,
    /// Index of the most recent valid-fix waypoint
    pub end: Option<usize>,
}

impl Track {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn start(&self) -> Option<&Waypoint> {
        self.start.and_then(|i| self.waypoints.get(i))
    }

    pub fn end(&self) -> Option<&Waypoint> {
        self.end.and_then(|i| self.waypoints.get(i))
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    fn push(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
        let index = self.waypoints.len() - 1;
        self.end = Some(index);
        if self.start.is_none() {
            self.start = Some(index);
        }
    }

    fn end_mut(&mut self) -> Option<&mut Waypoint> {
        match self.end {
            Some(index) => self.waypoints.get_mut(index),
            None => None,
        }
    }

    fn label(&mut self) {
        if let Some(index) = self.start {
            self.waypoints[index].name = Some(START_NAME.to_string());
        }
        if let Some(end) = self.end_mut() {
            end.name = Some(END_NAME.to_string());
        }
    }
}

/// Fold corrected lines into a track
///
/// Lines are expected in time order, as produced by the timestamp
/// reconstructor or [`merge_lines`].
pub fn extract_track(name: impl Into<String>, lines: &[LogLine]) -> Track {
    let mut track = Track::new(name);

    for line in lines {
        if let Some((rmc, fix_time)) = line.valid_fix() {
            let time = line.corrected.unwrap_or(fix_time);
            track.push(Waypoint::at(rmc.latitude, rmc.longitude, time, rmc.speed));
            continue;
        }

        let (Some(sentence), Some(end)) = (&line.sentence, track.end_mut()) else {
            continue;
        };

        match sentence {
            Sentence::Gga(gga) if end.elevation == 0.0 => end.elevation = gga.altitude,
            Sentence::Dbt(dbt) if end.depth == 0.0 => end.depth = dbt.depth_feet * METERS_PER_FOOT,
            Sentence::Dpt(dpt) if end.depth == 0.0 => end.depth = dpt.depth,
            Sentence::Acceleration(axes) if end.acceleration.is_none() => {
                end.acceleration = Some(*axes)
            }
            Sentence::Gyro(axes) if end.gyro.is_none() => end.gyro = Some(*axes),
            Sentence::Voltage(vcc) if end.supply.is_none() => end.supply = Some(vcc.voltage),
            _ => {}
        }
    }

    track.label();
    log::debug!(
        "Track {:?}: {} waypoints",
        track.name,
        track.waypoints.len()
    );
    track
}

/// Concatenate the corrected lines of several files in time order
///
/// The sort is stable, so lines with equal times keep their file order.
pub fn merge_lines<I>(files: I) -> Vec<LogLine>
where
    I: IntoIterator<Item = Vec<LogLine>>,
{
    let mut merged: Vec<LogLine> = files.into_iter().flatten().collect();
    merged.sort_by_key(|line| line.corrected);
    merged
}
