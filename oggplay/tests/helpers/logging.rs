//! Log capture for asserting on emitted diagnostics

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// Counts ERROR-level events seen by the thread-local subscriber
#[derive(Clone, Default)]
pub struct ErrorCount(Arc<AtomicUsize>);

impl ErrorCount {
    /// Route this thread's events through a fresh counter until the guard drops
    pub fn capture() -> (Self, DefaultGuard) {
        let count = Self::default();
        let subscriber = tracing_subscriber::registry().with(count.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (count, guard)
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for ErrorCount {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}
