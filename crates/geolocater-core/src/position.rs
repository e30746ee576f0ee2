//! Position fix types handed to the location sink.
//!
//! These mirror the coordinate and position records a host geolocation
//! service consumes, as plain data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accuracy, in meters, reported for an overridden position.
pub const OVERRIDE_ACCURACY: f64 = 10_000.0;

/// Geographic coordinates of a fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coords {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Horizontal accuracy in meters
    pub accuracy: f64,
    /// Altitude in meters
    pub altitude: f64,
    /// Altitude accuracy in meters
    pub altitude_accuracy: f64,
}

impl Coords {
    /// Coordinates with zeroed altitude fields.
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            altitude: 0.0,
            altitude_accuracy: 0.0,
        }
    }
}

/// A position fix: coordinates plus the time they were taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coords: Coords,
    pub timestamp: DateTime<Utc>,
}

impl Position {
    pub fn new(coords: Coords, timestamp: DateTime<Utc>) -> Self {
        Self { coords, timestamp }
    }

    /// Build a fix stamped with the current wall clock.
    pub fn now(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self::new(Coords::new(latitude, longitude, accuracy), Utc::now())
    }

    pub fn latitude(&self) -> f64 {
        self.coords.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.coords.longitude
    }

    /// Timestamp as milliseconds since the Unix epoch.
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}
