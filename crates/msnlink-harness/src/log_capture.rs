//! In-memory capture of tracing events.
//!
//! Several client paths only report through a warning log (duplicate
//! registrations, invites nobody handled, off-table transitions). Tests use
//! [`capture`] to run a closure under a recording subscriber and assert on
//! what was logged.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    Layer,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
};

/// A captured tracing event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Event level.
    pub level: Level,
    /// Formatted `message` field.
    pub message: String,
}

/// Events captured by [`capture`].
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedLogs {
    /// Every captured event, oldest first.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.lock().clone()
    }

    /// Number of events logged at `level`.
    pub fn count_at_level(&self, level: Level) -> usize {
        self.lock().iter().filter(|e| e.level == level).count()
    }

    /// Check if a warning containing `needle` was logged.
    pub fn has_warning(&self, needle: &str) -> bool {
        self.lock().iter().any(|e| e.level == Level::WARN && e.message.contains(needle))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CapturedEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct CaptureLayer {
    logs: CapturedLogs,
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.logs.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
        });
    }
}

/// Run `f` with a capturing subscriber installed on the current thread.
pub fn capture<R>(f: impl FnOnce() -> R) -> (R, CapturedLogs) {
    let logs = CapturedLogs::default();
    let subscriber =
        tracing_subscriber::registry().with(CaptureLayer { logs: logs.clone() });
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs)
}
