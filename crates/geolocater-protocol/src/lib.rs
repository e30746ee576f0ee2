//! # geolocater-protocol
//!
//! JSON wire format for the geolocation override.
//!
//! This crate defines how a position fix and a configuration change notice
//! look on the wire, in the camelCase shape host geolocation consumers expect.

pub mod codec;
pub mod messages;

pub use codec::*;
pub use messages::*;
