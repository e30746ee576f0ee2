//! Change-tracked configuration store.
//!
//! The store holds the override configuration in a [`PreferenceStore`]
//! backend and owns the [`EventBus`] used to announce changes. A write only
//! reaches the backend, and only notifies listeners, when the normalized
//! value differs from the current one. Repeated identical writes are
//! therefore silent.
//!
//! The store also turns the two override coordinates into a [`Position`]
//! and forwards it to the [`LocationSink`].

use crate::error::ConfigError;
use crate::events::{EventBus, ListenerFailure};
use crate::keys::{ConfigKey, ValueKind};
use crate::position::{Position, OVERRIDE_ACCURACY};
use crate::prefs::PreferenceStore;
use crate::sink::LocationSink;
use crate::value::ConfigValue;
use tracing::{debug, info};

/// Outcome of a successful [`ConfigStore::set`].
#[derive(Debug, Clone, PartialEq)]
pub struct WriteReport {
    /// Whether the stored value changed (and listeners were notified).
    pub changed: bool,
    /// Value held after the call.
    pub value: Option<ConfigValue>,
    /// Listeners that failed while being notified. The write itself stands.
    pub listener_failures: Vec<ListenerFailure>,
}

impl WriteReport {
    fn unchanged(value: Option<ConfigValue>) -> Self {
        Self {
            changed: false,
            value,
            listener_failures: Vec::new(),
        }
    }

    /// True if any listener failed.
    pub fn has_warnings(&self) -> bool {
        !self.listener_failures.is_empty()
    }
}

/// Configuration store with change notification.
pub struct ConfigStore<P, S> {
    prefs: P,
    sink: S,
    events: EventBus,
}

impl<P: PreferenceStore, S: LocationSink> ConfigStore<P, S> {
    /// Create a store over the given preference backend and location sink.
    pub fn new(prefs: P, sink: S) -> Self {
        Self {
            prefs,
            sink,
            events: EventBus::new(),
        }
    }

    /// Get the current value for a key given by short name or preference key.
    ///
    /// Returns `Ok(None)` when the key is recognized but unset.
    pub fn get(&self, key: &str) -> Result<Option<ConfigValue>, ConfigError> {
        self.get_key(key.parse()?)
    }

    /// Get the current value for a key.
    ///
    /// Numeric keys are reported as numbers even when the backend holds
    /// them as text such as `"45,5"`. A stored value that does not fit the
    /// key's kind is returned as stored.
    pub fn get_key(&self, key: ConfigKey) -> Result<Option<ConfigValue>, ConfigError> {
        let stored = self.prefs.get_value(key.pref_key())?;
        Ok(stored.map(|value| normalize(key, value.clone()).unwrap_or(value)))
    }

    /// Set a value for a key given by short name or preference key.
    pub fn set(
        &mut self,
        key: &str,
        value: impl Into<ConfigValue>,
    ) -> Result<WriteReport, ConfigError> {
        self.set_key(key.parse()?, value.into())
    }

    /// Set a value for a key.
    ///
    /// Numeric keys accept numbers or text with a decimal point or comma.
    /// An empty string written to [`ConfigKey::Uri`] is ignored and the
    /// current value kept. On an actual change the new value is stored and
    /// an event named after the key is dispatched before this returns.
    pub fn set_key(
        &mut self,
        key: ConfigKey,
        value: ConfigValue,
    ) -> Result<WriteReport, ConfigError> {
        if !key.is_writable() {
            return Err(ConfigError::ReadOnly(key.name().to_string()));
        }

        let current = self.get_key(key)?;

        // TODO: confirm with product whether clearing the URI should be allowed
        if key == ConfigKey::Uri && value.as_str() == Some("") {
            debug!("Ignoring empty write to '{}'", key);
            return Ok(WriteReport::unchanged(current));
        }

        let normalized = normalize(key, value)?;
        if current.as_ref() == Some(&normalized) {
            debug!("Value of '{}' unchanged", key);
            return Ok(WriteReport::unchanged(current));
        }

        self.prefs.set_value(key.pref_key(), normalized.clone())?;
        debug!(key = key.name(), value = %normalized, "Configuration value changed");

        let report = self.events.dispatch(key.name(), normalized.clone());
        Ok(WriteReport {
            changed: true,
            value: Some(normalized),
            listener_failures: report.failures,
        })
    }

    /// Build a fix from the override coordinates and forward it to the sink.
    ///
    /// Fails without touching the sink if either coordinate is unset or not
    /// a number.
    pub fn apply_override(&self) -> Result<Position, ConfigError> {
        let latitude = self.coordinate(ConfigKey::Latitude)?;
        let longitude = self.coordinate(ConfigKey::Longitude)?;

        let position = Position::now(latitude, longitude, OVERRIDE_ACCURACY);
        self.sink.update(&position);
        info!(latitude, longitude, "Location override applied");

        Ok(position)
    }

    /// Current value of every key, in [`ConfigKey::ALL`] order.
    pub fn snapshot(&self) -> Result<Vec<(ConfigKey, Option<ConfigValue>)>, ConfigError> {
        ConfigKey::ALL
            .into_iter()
            .map(|key| self.get_key(key).map(|value| (key, value)))
            .collect()
    }

    /// The owned event bus.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// The owned event bus, for registering and unregistering listeners.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// The preference backend.
    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    /// Tear the store down into its parts.
    pub fn into_parts(self) -> (P, S, EventBus) {
        (self.prefs, self.sink, self.events)
    }

    fn coordinate(&self, key: ConfigKey) -> Result<f64, ConfigError> {
        self.get_key(key)?
            .as_ref()
            .and_then(ConfigValue::to_number)
            .ok_or_else(|| ConfigError::MissingConfiguration {
                key: key.name().to_string(),
            })
    }
}

impl<P, S> std::fmt::Debug for ConfigStore<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

/// Check a value against the key's type and bring it to canonical form.
fn normalize(key: ConfigKey, value: ConfigValue) -> Result<ConfigValue, ConfigError> {
    match (key.kind(), value) {
        (ValueKind::Text, ConfigValue::Text(text)) => Ok(ConfigValue::Text(text)),
        (ValueKind::Text, ConfigValue::Number(n)) => Err(ConfigError::Validation {
            key: key.name().to_string(),
            reason: format!("expected text, got number {}", n),
        }),
        (ValueKind::Number, value) => match value.to_number() {
            Some(n) => Ok(ConfigValue::Number(n)),
            None => Err(ConfigError::Validation {
                key: key.name().to_string(),
                reason: format!("'{}' is not a finite number", value),
            }),
        },
    }
}
