//! Fire-and-forget telemetry events.

use std::collections::BTreeMap;
use std::sync::Mutex;

/// Event logged once per invocation of the chat `#cpp` configuration tool.
pub const CHAT_TOOL_EVENT: &str = "Chat/Tool/cpp";

/// Event logged once per project-context request made on behalf of completions.
pub const PROJECT_CONTEXT_EVENT: &str = "Completions/tool";

/// Property bag attached to a telemetry event.
pub type TelemetryProperties = BTreeMap<String, String>;

/// Sink for language-model related telemetry events.
///
/// Implementations must not block and must not fail; a lost event is
/// preferable to a failed tool call.
pub trait TelemetrySink: Send + Sync {
    fn log_event(&self, event_name: &str, properties: &TelemetryProperties);
}

/// Emits every event as a structured record on the `telemetry` log target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn log_event(&self, event_name: &str, properties: &TelemetryProperties) {
        tracing::info!(
            target: "telemetry",
            event = event_name,
            properties = ?properties,
            "Telemetry event"
        );
    }
}

/// Keeps every event in memory, in order. Used by tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<(String, TelemetryProperties)>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<(String, TelemetryProperties)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn log_event(&self, event_name: &str, properties: &TelemetryProperties) {
        if let Ok(mut events) = self.events.lock() {
            events.push((event_name.to_string(), properties.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_telemetry_keeps_order() {
        let sink = RecordingTelemetry::new();
        let mut props = TelemetryProperties::new();
        props.insert("language".to_string(), "C++".to_string());

        sink.log_event(CHAT_TOOL_EVENT, &props);
        sink.log_event(PROJECT_CONTEXT_EVENT, &TelemetryProperties::new());

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, CHAT_TOOL_EVENT);
        assert_eq!(events[0].1.get("language").map(String::as_str), Some("C++"));
        assert_eq!(events[1].0, PROJECT_CONTEXT_EVENT);
        assert!(events[1].1.is_empty());
    }
}
