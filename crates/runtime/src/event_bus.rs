use crate::frame::Frame;

/// How loud an event is.
///
/// `Warn` covers the tour's non-fatal taxonomy (failed branch loads, dead-end
/// scenes, dangling hotspot targets); `Error` is reserved for failures that
/// abort a user-requested navigation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Minimal structured event for traceability.
///
/// The host drains the bus once per frame and forwards events to whatever
/// console it has; core crates never log through an ambient global.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub frame_index: u64,
    /// Elapsed engine time when the event was emitted (seconds).
    pub time_s: f64,
    pub severity: Severity,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(
        &mut self,
        frame: Frame,
        severity: Severity,
        kind: &'static str,
        message: impl Into<String>,
    ) {
        self.events.push(Event {
            frame_index: frame.index,
            time_s: frame.time.0,
            severity,
            kind,
            message: message.into(),
        });
    }

    pub fn info(&mut self, frame: Frame, kind: &'static str, message: impl Into<String>) {
        self.emit(frame, Severity::Info, kind, message);
    }

    pub fn warn(&mut self, frame: Frame, kind: &'static str, message: impl Into<String>) {
        self.emit(frame, Severity::Warn, kind, message);
    }

    pub fn error(&mut self, frame: Frame, kind: &'static str, message: impl Into<String>) {
        self.emit(frame, Severity::Error, kind, message);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
