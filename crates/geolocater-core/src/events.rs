//! Named change events and the listener registry that fans them out.
//!
//! Listeners are registered against an event name. Dispatch is synchronous:
//! every handler registered for the name runs on the caller's thread, in
//! registration order, before `dispatch` returns.
//!
//! A handler is either a plain closure ([`Handler::func`]) or an object
//! implementing [`EventListener`] ([`Handler::listener`]). Handlers are
//! compared by identity, so keep a clone of the handler you registered if
//! you intend to unregister it later.

use crate::value::ConfigValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Error returned by a failing listener.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by every listener invocation.
pub type ListenerResult = Result<(), ListenerError>;

/// Kind of event delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Change,
}

/// The event record passed to listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Name the event was dispatched under.
    pub name: String,
    /// The payload, i.e. the new value.
    pub data: ConfigValue,
}

impl ChangeEvent {
    pub fn new(name: &str, data: ConfigValue) -> Self {
        Self {
            event_type: EventType::Change,
            name: name.to_string(),
            data,
        }
    }
}

/// Object-style listener exposing a single dispatch method.
pub trait EventListener: Send + Sync {
    /// Called once per dispatched event the listener is registered for.
    fn handle_event(&self, event: &ChangeEvent) -> ListenerResult;
}

type HandlerFn = dyn Fn(&ChangeEvent) -> ListenerResult + Send + Sync;

/// A registrable event handler.
///
/// Cloning is cheap and the clone is identical to the original: two handlers
/// are equal when they share the same allocation.
#[derive(Clone)]
pub enum Handler {
    /// Plain callable.
    Func(Arc<HandlerFn>),
    /// Object with a `handle_event` method.
    Listener(Arc<dyn EventListener>),
}

impl Handler {
    /// Wrap a closure.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&ChangeEvent) -> ListenerResult + Send + Sync + 'static,
    {
        Handler::Func(Arc::new(f))
    }

    /// Wrap a listener object.
    pub fn listener<L>(listener: L) -> Self
    where
        L: EventListener + 'static,
    {
        Handler::Listener(Arc::new(listener))
    }

    /// Wrap a listener the caller keeps a reference to.
    ///
    /// Wrapping the same `Arc` twice yields identical handlers.
    pub fn shared(listener: Arc<dyn EventListener>) -> Self {
        Handler::Listener(listener)
    }

    fn call(&self, event: &ChangeEvent) -> ListenerResult {
        match self {
            Handler::Func(f) => f(event),
            Handler::Listener(listener) => listener.handle_event(event),
        }
    }

    /// Address of the shared allocation, without the vtable.
    fn addr(&self) -> *const () {
        match self {
            Handler::Func(f) => Arc::as_ptr(f) as *const (),
            Handler::Listener(listener) => Arc::as_ptr(listener) as *const (),
        }
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Handler::Func(_), Handler::Func(_)) | (Handler::Listener(_), Handler::Listener(_))
        ) && self.addr() == other.addr()
    }
}

impl Eq for Handler {}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Func(_) => write!(f, "Handler::Func({:p})", self.addr()),
            Handler::Listener(_) => write!(f, "Handler::Listener({:p})", self.addr()),
        }
    }
}

/// A listener that returned an error during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    /// Event being dispatched when the listener failed.
    pub event: String,
    /// Rendered error message.
    pub message: String,
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener for '{}' failed: {}", self.event, self.message)
    }
}

/// Outcome of a single [`EventBus::dispatch`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers that completed successfully.
    pub delivered: usize,
    /// Handlers that returned an error.
    pub failures: Vec<ListenerFailure>,
}

impl DispatchReport {
    /// True when no handler failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of handlers invoked.
    pub fn invoked(&self) -> usize {
        self.delivered + self.failures.len()
    }
}

#[derive(Clone)]
struct Registration {
    event: String,
    handler: Handler,
}

impl Registration {
    fn matches(&self, event: &str, handler: &Handler) -> bool {
        self.event == event && &self.handler == handler
    }
}

/// Registry of (event name, handler) pairs with synchronous fan-out.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Vec<Registration>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event`.
    ///
    /// Registering an identical pair again is a no-op. Returns true if the
    /// pair was added.
    pub fn register(&mut self, event: &str, handler: Handler) -> bool {
        if self.listeners.iter().any(|r| r.matches(event, &handler)) {
            debug!("Listener {:?} already registered for '{}'", handler, event);
            return false;
        }

        debug!("Listener {:?} registered for '{}'", handler, event);
        self.listeners.push(Registration {
            event: event.to_string(),
            handler,
        });
        true
    }

    /// Remove every registration of `handler` for `event`.
    ///
    /// Returns the number of registrations removed; zero is not an error.
    pub fn unregister(&mut self, event: &str, handler: &Handler) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|r| !r.matches(event, handler));
        let removed = before - self.listeners.len();
        if removed > 0 {
            debug!("Listener {:?} unregistered from '{}'", handler, event);
        }
        removed
    }

    /// Deliver `data` to every handler registered for `event`.
    ///
    /// A failing handler does not stop delivery to the handlers after it;
    /// failures are logged and collected in the returned report.
    pub fn dispatch(&self, event: &str, data: ConfigValue) -> DispatchReport {
        let item = ChangeEvent::new(event, data);
        let mut report = DispatchReport::default();

        for registration in self.listeners.iter().filter(|r| r.event == event) {
            match registration.handler.call(&item) {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    warn!("Listener for '{}' failed: {}", event, error);
                    report.failures.push(ListenerFailure {
                        event: event.to_string(),
                        message: error.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Total number of registrations.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of registrations for one event name.
    pub fn listener_count_for(&self, event: &str) -> usize {
        self.listeners.iter().filter(|r| r.event == event).count()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
