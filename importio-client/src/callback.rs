use importio_rs_protocol::{Progress, Query, QueryMessage};

/// Receives every message for the queries it was registered with.
///
/// Invoked from the client's dispatcher task, concurrently with the task
/// that submitted the query. Exactly one invocation per query sees
/// `progress.is_finished()`; no further invocations follow it.
///
/// Closures taking `(&Query, &QueryMessage, &Progress)` implement this trait.
pub trait MessageCallback: Send + Sync + 'static {
    fn on_message(&self, query: &Query, message: &QueryMessage, progress: &Progress);
}

impl<F> MessageCallback for F
where
    F: Fn(&Query, &QueryMessage, &Progress) + Send + Sync + 'static,
{
    fn on_message(&self, query: &Query, message: &QueryMessage, progress: &Progress) {
        self(query, message, progress)
    }
}
