//! # geolocater-core
//!
//! Core of the geolocation override.
//!
//! This crate provides:
//! - A named change-event bus with synchronous, ordered dispatch
//! - A configuration store that notifies listeners only on real changes
//! - Position fix types and the location sink seam
//! - Preference storage abstraction (in-memory and JSON file)
//!
//! This crate is intentionally runtime-agnostic and contains no async code.
//! The host supplies the preference backend and the location sink.

pub mod error;
pub mod events;
pub mod keys;
pub mod position;
pub mod prefs;
pub mod sink;
pub mod store;
pub mod value;

pub use error::{ConfigError, PrefError};
pub use events::{
    ChangeEvent, DispatchReport, EventBus, EventListener, EventType, Handler, ListenerError,
    ListenerFailure, ListenerResult,
};
pub use keys::{ConfigKey, ValueKind};
pub use position::{Coords, Position, OVERRIDE_ACCURACY};
pub use prefs::{JsonFilePreferences, MemoryPreferences, PreferenceStore};
pub use sink::{LocationSink, RecordingSink, TracingSink};
pub use store::{ConfigStore, WriteReport};
pub use value::{normalize_number, ConfigValue};
