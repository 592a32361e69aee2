/// The pipeline's "signals" (SPEC_FULL.md §4.7.1): a thin telemetry sink
/// rather than a real in-process pub/sub bus, matching the framing in
/// §1 that downstream signal subscribers are external.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    TransactionProcessed { project_id: i64, event_id: String },
    EventProcessed { project_id: i64, group_id: i64, event_id: String },
    IssueUnignored { group_id: i64, transition_type: &'static str },
}

pub trait SignalSink: Send + Sync {
    fn emit(&self, signal: Signal);
}

/// Records every emitted signal in order — the reference implementation
/// used by tests and any deployment that doesn't need a real event bus.
pub struct RecordingSignalSink {
    signals: std::sync::Mutex<Vec<Signal>>,
}

impl RecordingSignalSink {
    pub fn new() -> Self {
        Self {
            signals: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn emitted(&self) -> Vec<Signal> {
        self.signals.lock().expect("signal log poisoned").clone()
    }
}

impl Default for RecordingSignalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalSink for RecordingSignalSink {
    fn emit(&self, signal: Signal) {
        tracing::debug!(?signal, "signal emitted");
        self.signals.lock().expect("signal log poisoned").push(signal);
    }
}
