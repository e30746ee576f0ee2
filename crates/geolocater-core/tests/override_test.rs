//! End-to-end tests for the geolocation override.
//!
//! These drive a `ConfigStore` the way a host would: seed preferences,
//! register listeners, write values, and apply the override into a sink.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use geolocater_core::{
    ChangeEvent, ConfigError, ConfigStore, ConfigValue, EventListener, Handler,
    JsonFilePreferences, ListenerResult, MemoryPreferences, PreferenceStore, RecordingSink,
    OVERRIDE_ACCURACY,
};

/// Listener object that counts the events it sees.
#[derive(Default)]
struct CountingListener {
    count: AtomicUsize,
}

impl EventListener for CountingListener {
    fn handle_event(&self, _event: &ChangeEvent) -> ListenerResult {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn new_store() -> (ConfigStore<MemoryPreferences, RecordingSink>, RecordingSink) {
    let sink = RecordingSink::new();
    let prefs = MemoryPreferences::new().with_value("geo.wifi.uri", "https://location.example");
    (ConfigStore::new(prefs, sink.clone()), sink)
}

#[test]
fn test_override_scenario() {
    let (mut store, sink) = new_store();
    let start = Utc::now();

    store.set("latitude", "48,85").expect("latitude accepted");
    store.set("longitude", "2,35").expect("longitude accepted");
    store.apply_override().expect("override applied");

    let fixes = sink.positions();
    assert_eq!(fixes.len(), 1);

    let fix = fixes[0];
    assert_eq!(fix.coords.latitude, 48.85);
    assert_eq!(fix.coords.longitude, 2.35);
    assert_eq!(fix.coords.accuracy, 10_000.0);
    assert_eq!(fix.coords.altitude, 0.0);
    assert_eq!(fix.coords.altitude_accuracy, 0.0);
    assert!(fix.timestamp >= start);
}

#[test]
fn test_missing_longitude_leaves_sink_untouched() {
    let (mut store, sink) = new_store();
    store.set("latitude", 48.85).unwrap();

    let err = store.apply_override().unwrap_err();
    assert!(matches!(err, ConfigError::MissingConfiguration { ref key } if key == "longitude"));
    assert!(sink.is_empty());
}

#[test]
fn test_missing_both_reports_latitude_first() {
    let (store, sink) = new_store();

    let err = store.apply_override().unwrap_err();
    assert!(matches!(err, ConfigError::MissingConfiguration { ref key } if key == "latitude"));
    assert!(sink.is_empty());
}

#[test]
fn test_repeated_override_refresh() {
    let (mut store, sink) = new_store();
    store.set("latitude", 51.5).unwrap();
    store.set("longitude", -0.12).unwrap();

    for _ in 0..3 {
        store.apply_override().unwrap();
    }

    assert_eq!(sink.len(), 3);
    let fixes = sink.positions();
    assert!(fixes.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn test_duplicate_listener_registration_delivers_once() {
    let (mut store, _) = new_store();
    let listener = Arc::new(CountingListener::default());

    let handler = Handler::shared(listener.clone());
    store.events_mut().register("uri", handler.clone());
    store.events_mut().register("uri", handler.clone());

    store.set("uri", "https://other.example").unwrap();
    assert_eq!(listener.count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unregister_silences_listener() {
    let (mut store, _) = new_store();
    let listener = Arc::new(CountingListener::default());
    let handler = Handler::shared(listener.clone());

    store.events_mut().register("latitude", handler.clone());
    store.set("latitude", 1.0).unwrap();
    store.events_mut().unregister("latitude", &handler);
    store.set("latitude", 2.0).unwrap();

    assert_eq!(listener.count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_set_get_round_trip_for_every_writable_key() {
    let (mut store, _) = new_store();

    let cases: Vec<(&str, ConfigValue, ConfigValue)> = vec![
        ("uri", "https://a.example".into(), "https://a.example".into()),
        ("localhost", "true".into(), "true".into()),
        ("latitude", "-12,25".into(), ConfigValue::Number(-12.25)),
        ("longitude", 130.0.into(), ConfigValue::Number(130.0)),
    ];

    for (key, input, expected) in cases {
        store.set(key, input).unwrap();
        assert_eq!(store.get(key).unwrap(), Some(expected), "{key}");
    }
}

#[test]
fn test_listener_observes_committed_value() {
    let (store, _) = new_store();
    let store = Arc::new(Mutex::new(store));
    let seen = Arc::new(Mutex::new(Vec::new()));

    {
        let seen = seen.clone();
        store.lock().unwrap().events_mut().register(
            "localhost",
            Handler::func(move |event| {
                seen.lock().unwrap().push(event.data.to_string());
                Ok(())
            }),
        );
    }

    store.lock().unwrap().set("localhost", "true").unwrap();
    store.lock().unwrap().set("localhost", "true").unwrap();
    store.lock().unwrap().set("localhost", "false").unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["true", "false"]);
}

#[test]
fn test_file_backed_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    {
        let prefs = JsonFilePreferences::open(&path).unwrap();
        let mut store = ConfigStore::new(prefs, RecordingSink::new());
        store.set("latitude", "35,68").unwrap();
        store.set("longitude", "139,69").unwrap();
    }

    let prefs = JsonFilePreferences::open(&path).unwrap();
    assert!(prefs.has_key("devtools.geolocation.override-latitude"));

    let sink = RecordingSink::new();
    let store = ConfigStore::new(prefs, sink.clone());
    let fix = store.apply_override().unwrap();

    assert_eq!(fix.latitude(), 35.68);
    assert_eq!(fix.longitude(), 139.69);
    assert_eq!(fix.coords.accuracy, OVERRIDE_ACCURACY);
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_host_written_comma_value_is_not_a_change() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, r#"{"devtools.geolocation.override-latitude": "45,5"}"#).unwrap();

    let prefs = JsonFilePreferences::open(&path).unwrap();
    let mut store = ConfigStore::new(prefs, RecordingSink::new());
    let listener = Arc::new(CountingListener::default());
    store
        .events_mut()
        .register("latitude", Handler::shared(listener.clone()));

    let report = store.set("latitude", "45,5").unwrap();

    assert!(!report.changed);
    assert_eq!(listener.count.load(Ordering::SeqCst), 0);
    assert_eq!(store.get("latitude").unwrap(), Some(ConfigValue::Number(45.5)));
}

#[test]
fn test_storage_failure_leaves_state_and_listeners_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let parent = dir.path().join("profile");
    let path = parent.join("prefs.json");

    let prefs = JsonFilePreferences::open(&path).unwrap();
    let mut store = ConfigStore::new(prefs, RecordingSink::new());
    store.set("latitude", 1.0).unwrap();

    let listener = Arc::new(CountingListener::default());
    store
        .events_mut()
        .register("latitude", Handler::shared(listener.clone()));

    std::fs::remove_dir_all(&parent).unwrap();
    std::fs::write(&parent, "not a directory").unwrap();

    let err = store.set("latitude", 2.0).unwrap_err();
    assert!(matches!(err, ConfigError::Storage(_)));
    assert_eq!(store.get("latitude").unwrap(), Some(ConfigValue::Number(1.0)));
    assert_eq!(listener.count.load(Ordering::SeqCst), 0);
    assert_eq!(store.prefs().path(), path.as_path());
}
