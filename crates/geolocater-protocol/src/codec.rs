//! JSON codec for protocol messages.

use chrono::DateTime;
use thiserror::Error;

use crate::messages::{ChangeEvent, PositionMessage};
use geolocater_core::{Coords, Position};

/// Errors that can occur during message encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON (de)serialization failed.
    #[error("Failed to process message: {0}")]
    Json(#[from] serde_json::Error),

    /// The timestamp is outside the representable range.
    #[error("Timestamp out of range: {0}")]
    InvalidTimestamp(i64),
}

impl TryFrom<PositionMessage> for Position {
    type Error = CodecError;

    fn try_from(msg: PositionMessage) -> Result<Self, Self::Error> {
        let timestamp = DateTime::from_timestamp_millis(msg.timestamp)
            .ok_or(CodecError::InvalidTimestamp(msg.timestamp))?;
        Ok(Position::new(Coords::from(&msg.coords), timestamp))
    }
}

/// Encode a position fix as a single-line JSON string.
pub fn encode_position(position: &Position) -> Result<String, CodecError> {
    serde_json::to_string(&PositionMessage::from(position)).map_err(CodecError::from)
}

/// Decode a position fix. Sub-millisecond precision is not carried.
pub fn decode_position(text: &str) -> Result<Position, CodecError> {
    let msg: PositionMessage = serde_json::from_str(text)?;
    Position::try_from(msg)
}

/// Encode a change notice.
pub fn encode_change(event: &ChangeEvent) -> Result<String, CodecError> {
    serde_json::to_string(event).map_err(CodecError::from)
}

/// Decode a change notice.
pub fn decode_change(text: &str) -> Result<ChangeEvent, CodecError> {
    serde_json::from_str(text).map_err(CodecError::from)
}

/// Check if a JSON message appears to be a change notice.
///
/// Quick detection without full parsing. Only compact JSON, as produced by
/// [`encode_change`], is recognized; `"type": "change"` with whitespace is not.
pub fn is_change_message(text: &str) -> bool {
    text.contains("\"type\":\"change\"")
}
