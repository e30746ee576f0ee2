use anyhow::{bail, Context};
use geolocater_core::{
    ChangeEvent, ConfigError, ConfigKey, ConfigStore, EventListener, Handler,
    JsonFilePreferences, ListenerResult, LocationSink, Position, WriteReport,
};
use geolocater_protocol::{encode_change, encode_position};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PREFS_PATH: &str = "geolocater-prefs.json";
const DEFAULT_INTERVAL_SECS: u64 = 5;

type Store = ConfigStore<JsonFilePreferences, JsonLinesSink>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,geolocater_core=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Geolocater starting...");

    let settings = RunnerSettings::from_env()?;
    let prefs = JsonFilePreferences::open(&settings.prefs_path).with_context(|| {
        format!(
            "failed to open preferences at {}",
            settings.prefs_path.display()
        )
    })?;

    let mut store = ConfigStore::new(prefs, JsonLinesSink);

    let logger = Handler::func(log_change);
    let notices = Handler::listener(ChangeNoticePrinter);
    for key in ConfigKey::ALL {
        store.events_mut().register(key.name(), logger.clone());
        store.events_mut().register(key.name(), notices.clone());
    }

    if let Some(latitude) = &settings.latitude {
        let report = store.set_key(ConfigKey::Latitude, latitude.as_str().into())?;
        report_write(ConfigKey::Latitude, report);
    }
    if let Some(longitude) = &settings.longitude {
        let report = store.set_key(ConfigKey::Longitude, longitude.as_str().into())?;
        report_write(ConfigKey::Longitude, report);
    }

    for (key, value) in store.snapshot()? {
        match value {
            Some(value) => tracing::info!("   {:<10} = {}", key.name(), value),
            None => tracing::info!("   {:<10} (unset)", key.name()),
        }
    }

    tracing::info!(
        "Re-applying override every {}s from {}",
        settings.interval.as_secs(),
        store.prefs().path().display()
    );

    let refresh_handle = tokio::spawn(refresh_loop(store, settings.interval));

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = refresh_handle => {
            tracing::warn!("Override refresh stopped");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Runner settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
struct RunnerSettings {
    /// JSON preference file
    prefs_path: PathBuf,
    /// How often the override is re-applied
    interval: Duration,
    /// Latitude to write at startup
    latitude: Option<String>,
    /// Longitude to write at startup
    longitude: Option<String>,
}

impl RunnerSettings {
    fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let prefs_path = lookup("GEOLOCATER_PREFS")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PREFS_PATH));

        let interval_secs = match lookup("GEOLOCATER_INTERVAL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("GEOLOCATER_INTERVAL_SECS is not a number: {raw}"))?,
            None => DEFAULT_INTERVAL_SECS,
        };
        if interval_secs == 0 {
            bail!("GEOLOCATER_INTERVAL_SECS must be at least 1");
        }

        Ok(Self {
            prefs_path,
            interval: Duration::from_secs(interval_secs),
            latitude: lookup("GEOLOCATER_LATITUDE"),
            longitude: lookup("GEOLOCATER_LONGITUDE"),
        })
    }
}

/// Re-apply the override on a fixed period.
async fn refresh_loop(store: Store, period: Duration) {
    let mut ticker = tokio::time::interval(period);

    loop {
        ticker.tick().await;
        match store.apply_override() {
            Ok(position) => tracing::debug!("Override refreshed at {}", position.timestamp),
            Err(ConfigError::MissingConfiguration { key }) => {
                tracing::warn!("Override not applied: '{}' is not set", key);
            }
            Err(e) => tracing::error!("Override failed: {}", e),
        }
    }
}

fn report_write(key: ConfigKey, report: WriteReport) {
    if report.changed {
        tracing::info!("Set {} from environment", key);
    }
    for failure in &report.listener_failures {
        tracing::warn!("{}", failure);
    }
}

fn log_change(event: &ChangeEvent) -> ListenerResult {
    tracing::info!(key = %event.name, value = %event.data, "Configuration changed");
    Ok(())
}

/// Writes each change notice to stdout as a JSON line.
struct ChangeNoticePrinter;

impl EventListener for ChangeNoticePrinter {
    fn handle_event(&self, event: &ChangeEvent) -> ListenerResult {
        let line = encode_change(event)?;
        writeln!(std::io::stdout().lock(), "{}", line)?;
        Ok(())
    }
}

/// Location sink that prints each fix to stdout as a JSON line.
struct JsonLinesSink;

impl LocationSink for JsonLinesSink {
    fn update(&self, position: &Position) {
        let line = match encode_position(position) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to encode position fix: {}", e);
                return;
            }
        };
        if let Err(e) = writeln!(std::io::stdout().lock(), "{}", line) {
            tracing::error!("Failed to write position fix: {}", e);
        }
    }
}
