//! Protocol message types.
//!
//! - `PositionMessage`: a position fix, with `coords`, `address` and an epoch
//!   millisecond `timestamp`
//! - Change notices reuse [`ChangeEvent`] directly:
//!   `{"type": "change", "name": ..., "data": ...}`

use serde::{Deserialize, Serialize};

pub use geolocater_core::ChangeEvent;
use geolocater_core::{Coords, Position};

/// Coordinates of a position fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordsMessage {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub altitude_accuracy: f64,
}

/// A position fix as sent to location consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionMessage {
    pub coords: CoordsMessage,
    /// Civic address; never populated by an override.
    #[serde(default)]
    pub address: Option<String>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl From<&Coords> for CoordsMessage {
    fn from(coords: &Coords) -> Self {
        Self {
            latitude: coords.latitude,
            longitude: coords.longitude,
            accuracy: coords.accuracy,
            altitude: coords.altitude,
            altitude_accuracy: coords.altitude_accuracy,
        }
    }
}

impl From<&CoordsMessage> for Coords {
    fn from(msg: &CoordsMessage) -> Self {
        Coords {
            latitude: msg.latitude,
            longitude: msg.longitude,
            accuracy: msg.accuracy,
            altitude: msg.altitude,
            altitude_accuracy: msg.altitude_accuracy,
        }
    }
}

impl From<&Position> for PositionMessage {
    fn from(position: &Position) -> Self {
        Self {
            coords: CoordsMessage::from(&position.coords),
            address: None,
            timestamp: position.timestamp_millis(),
        }
    }
}
