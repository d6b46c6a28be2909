use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Receiver for human-readable progress and result messages.
///
/// The filters only format strings; what happens to them (console, log,
/// GUI event) is up to the host.
pub trait StatusSink: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> StatusSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Forwards status messages to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatus;

impl StatusSink for TracingStatus {
    fn report(&self, message: &str) {
        tracing::info!(target: "filterbench::status", "{}", message);
    }
}

/// Keeps every message in memory. Used by tests and by hosts that render
/// the messages later.
#[derive(Debug, Default)]
pub struct CollectingStatus {
    messages: Mutex<Vec<String>>,
}

impl CollectingStatus {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Returns true if any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().iter().any(|m| m.contains(needle))
    }

    /// Number of messages containing `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.messages
            .lock()
            .iter()
            .filter(|m| m.contains(needle))
            .count()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl StatusSink for CollectingStatus {
    fn report(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

/// Cloneable handle to a status sink, held by every filter.
#[derive(Clone)]
pub struct Status {
    sink: Arc<dyn StatusSink>,
}

impl Status {
    pub fn new<S: StatusSink + 'static>(sink: S) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// Wraps an already shared sink, so the caller can keep inspecting it.
    pub fn shared<S: StatusSink + 'static>(sink: Arc<S>) -> Self {
        Self { sink }
    }

    pub fn report(&self, message: impl AsRef<str>) {
        self.sink.report(message.as_ref());
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new(TracingStatus)
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Status").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_sink_receives_messages() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let status = Status::new({
            let seen = Arc::clone(&seen);
            move |message: &str| seen.lock().push(message.to_uppercase())
        });

        status.report("running");
        status.report(format!("done in {} ms", 3));

        assert_eq!(*seen.lock(), vec!["RUNNING", "DONE IN 3 MS"]);
    }

    #[test]
    fn collecting_sink_counts_matches() {
        let sink = Arc::new(CollectingStatus::default());
        let status = Status::shared(Arc::clone(&sink));

        status.report("Mismatch at (0,0,0): 1 vs 3");
        status.report("Mismatch at (1,0,0): 1 vs 3");
        status.report("Finished");

        assert_eq!(sink.count("Mismatch"), 2);
        assert!(sink.contains("Finished"));

        sink.clear();
        assert!(sink.messages().is_empty());
    }
}
