//! Structured protocol events
//!
//! Every significant decision the plane makes is reported to an [`EventSink`]
//! as a dotted `operation.event-name` message with a string data map. The
//! message names and data keys are stable; downstream tooling matches on
//! them.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::{PoisonError, RwLock};
use tracing::{error, info};

use crate::api::error::Operation;

/// Severity of a protocol event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Error,
}

/// A single protocol event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub level: EventLevel,
    /// Dotted event name, e.g. `provision.instance-already-exists`
    pub message: String,
    pub data: BTreeMap<String, String>,
}

/// Destination for protocol events
pub trait EventSink: Send + Sync {
    fn record(&self, event: LogEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: LogEvent) {
        match event.level {
            EventLevel::Info => info!(data = ?event.data, "{}", event.message),
            EventLevel::Error => error!(data = ?event.data, "{}", event.message),
        }
    }
}

/// Keeps events in memory, in the order they were recorded
#[derive(Debug, Default)]
pub struct MemorySink {
    events: RwLock<Vec<LogEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded event
    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recently recorded event
    pub fn last(&self) -> Option<LogEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: LogEvent) {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Event builder scoped to one operation of one request
///
/// Carries the request's identifying fields (`instance-id`, `binding-id`) so
/// every event emitted for the request includes them.
pub struct EventLogger<'a> {
    sink: &'a dyn EventSink,
    operation: Operation,
    data: BTreeMap<String, String>,
}

impl<'a> EventLogger<'a> {
    pub fn new(sink: &'a dyn EventSink, operation: Operation) -> Self {
        Self {
            sink,
            operation,
            data: BTreeMap::new(),
        }
    }

    /// Attach a field to every event emitted by this logger
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn info(&self, action: &str, extra: &[(&str, &str)]) {
        self.emit(EventLevel::Info, action, extra);
    }

    /// Record a failure; the error text lands under the `error` key
    pub fn error(&self, action: &str, err: &dyn Display) {
        let text = err.to_string();
        self.emit(EventLevel::Error, action, &[("error", text.as_str())]);
    }

    fn emit(&self, level: EventLevel, action: &str, extra: &[(&str, &str)]) {
        let mut data = self.data.clone();
        for (key, value) in extra {
            data.insert((*key).to_string(), (*value).to_string());
        }

        self.sink.record(LogEvent {
            level,
            message: format!("{}.{}", self.operation.log_key(), action),
            data,
        });
    }
}
