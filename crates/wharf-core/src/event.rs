//! JSONL event envelope and sinks
//!
//! Docker Compose talks to a provider plugin over stdout: one JSON
//! object per line, each carrying a `type` and a `message`. The
//! `setenv` kind instructs Compose to inject an environment variable
//! into the service's containers and its message is always formatted
//! as `KEY=VALUE`.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Event discriminator understood by the Compose provider protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Info,
    Debug,
    Error,
    Setenv,
}

/// A single protocol event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub message: String,
}

impl Event {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Info,
            message: message.into(),
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Debug,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Error,
            message: message.into(),
        }
    }

    pub fn setenv(key: &str, value: &str) -> Self {
        Self {
            kind: EventKind::Setenv,
            message: format!("{key}={value}"),
        }
    }
}

/// Consumer of the ordered event stream.
///
/// Drivers emit through this trait object so the CLI can wire stdout
/// while tests capture events in memory. Emission order is the only
/// identity events have; sinks must preserve it.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);

    fn info(&self, message: &str) {
        self.emit(Event::info(message));
    }

    fn debug(&self, message: &str) {
        self.emit(Event::debug(message));
    }

    fn error(&self, message: &str) {
        self.emit(Event::error(message));
    }

    fn setenv(&self, key: &str, value: &str) {
        self.emit(Event::setenv(key, value));
    }
}

/// Sink that writes one JSON object per line to stdout.
///
/// This is the production sink: stdout is reserved for the provider
/// protocol, human-readable logging goes to stderr via `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonlSink;

impl JsonlSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for JsonlSink {
    fn emit(&self, event: Event) {
        // The envelope is a flat struct of string fields; serialization
        // cannot fail in practice.
        if let Ok(line) = serde_json::to_string(&event) {
            println!("{line}");
        }
    }
}

/// Sink that buffers events in memory, preserving emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events emitted so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Messages of a single kind, in emission order.
    pub fn messages_of(&self, kind: EventKind) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.message)
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
