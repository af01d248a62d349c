//! Status events emitted by the engine
//!
//! Components never print. They receive a [`Reporter`] and describe what they
//! did through `notify(level, action, detail)`; the caller decides how (and
//! whether) to display it.

use std::sync::Mutex;

/// Severity/kind of a status event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    /// A file or directory was written
    Create,
    Warn,
    Error,
    /// Verbose tracing (lookups, substitutions, removals)
    Debug,
}

/// Sink for status events
pub trait Reporter: Send + Sync {
    fn notify(&self, level: Level, action: &str, detail: &str);

    fn info(&self, action: &str, detail: &str) {
        self.notify(Level::Info, action, detail);
    }

    fn create(&self, action: &str, detail: &str) {
        self.notify(Level::Create, action, detail);
    }

    fn warn(&self, action: &str, detail: &str) {
        self.notify(Level::Warn, action, detail);
    }

    fn debug(&self, action: &str, detail: &str) {
        self.notify(Level::Debug, action, detail);
    }
}

/// A recorded status event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub level: Level,
    pub action: String,
    pub detail: String,
}

/// Reporter that keeps every event in memory
#[derive(Debug, Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far, in emission order
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Events of a single level
    pub fn at(&self, level: Level) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    pub fn warnings(&self) -> Vec<Event> {
        self.at(Level::Warn)
    }
}

impl Reporter for Recorder {
    fn notify(&self, level: Level, action: &str, detail: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(Event {
                level,
                action: action.to_string(),
                detail: detail.to_string(),
            });
        }
    }
}

/// Reporter that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Reporter for Silent {
    fn notify(&self, _level: Level, _action: &str, _detail: &str) {}
}
