//! The location sink: where an overridden position fix is delivered.

use crate::position::Position;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// Accepts a position fix and makes it the host's reported location.
///
/// Delivery is fire-and-forget; the core does not observe the outcome.
pub trait LocationSink: Send + Sync {
    fn update(&self, position: &Position);
}

impl<T: LocationSink + ?Sized> LocationSink for Arc<T> {
    fn update(&self, position: &Position) {
        (**self).update(position)
    }
}

/// Sink that keeps every fix it receives.
///
/// Clones share the same record, so a caller can hand one clone to the
/// configuration store and inspect another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    fixes: Arc<Mutex<Vec<Position>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All fixes received so far, oldest first.
    pub fn positions(&self) -> Vec<Position> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<Position> {
        self.lock().last().copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Position>> {
        self.fixes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LocationSink for RecordingSink {
    fn update(&self, position: &Position) {
        self.lock().push(*position);
    }
}

/// Sink that only logs each fix.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LocationSink for TracingSink {
    fn update(&self, position: &Position) {
        info!(
            latitude = position.coords.latitude,
            longitude = position.coords.longitude,
            accuracy = position.coords.accuracy,
            timestamp = %position.timestamp,
            "Position fix delivered"
        );
    }
}
