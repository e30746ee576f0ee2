//! The recognized configuration keys.
//!
//! Each key has a short name, used as the event name on change, and the full
//! preference key it is stored under in the host's preference backend.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Expected type of a key's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Number,
}

/// A recognized configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// Location service endpoint URI.
    Uri,
    /// Secondary service URI, owned by the host.
    GoogleService,
    /// Local-mode flag.
    Localhost,
    /// Override latitude in decimal degrees.
    Latitude,
    /// Override longitude in decimal degrees.
    Longitude,
}

impl ConfigKey {
    /// All keys, in declaration order.
    pub const ALL: [ConfigKey; 5] = [
        ConfigKey::Uri,
        ConfigKey::GoogleService,
        ConfigKey::Localhost,
        ConfigKey::Latitude,
        ConfigKey::Longitude,
    ];

    /// Short name; also the name of the event dispatched on change.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::Uri => "uri",
            ConfigKey::GoogleService => "googserv",
            ConfigKey::Localhost => "localhost",
            ConfigKey::Latitude => "latitude",
            ConfigKey::Longitude => "longitude",
        }
    }

    /// Key in the preference backend.
    pub fn pref_key(&self) -> &'static str {
        match self {
            ConfigKey::Uri => "geo.wifi.uri",
            ConfigKey::GoogleService => "extensions.geolocater.googleservice",
            ConfigKey::Localhost => "extensions.geolocater.localhost",
            ConfigKey::Latitude => "devtools.geolocation.override-latitude",
            ConfigKey::Longitude => "devtools.geolocation.override-longitude",
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigKey::Latitude | ConfigKey::Longitude => ValueKind::Number,
            _ => ValueKind::Text,
        }
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, ConfigKey::GoogleService)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    /// Accepts either the short name or the full preference key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.name() == s || key.pref_key() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
