use std::sync::Arc;

use futures_core::Stream;
use importio_rs_protocol::{Progress, Query, QueryMessage};
use tokio::sync::mpsc;

use crate::callback::MessageCallback;

/// One message for a query together with the progress after it.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryEvent {
    pub message: QueryMessage,
    pub progress: Progress,
}

/// Receiving side of a query submitted with
/// [`query_events()`](crate::ImportIoClient::query_events).
///
/// Yields events in arrival order and ends after the terminal one.
pub struct QueryEvents {
    rx: mpsc::UnboundedReceiver<QueryEvent>,
    done: bool,
}

impl QueryEvents {
    /// Wait for the next event. Returns `None` after the terminal event.
    pub async fn next(&mut self) -> Option<QueryEvent> {
        if self.done {
            return None;
        }
        let event = self.rx.recv().await?;
        if event.progress.is_finished() {
            self.done = true;
        }
        Some(event)
    }

    /// Convert into a [`Stream`] of events.
    pub fn into_stream(self) -> impl Stream<Item = QueryEvent> {
        async_stream::stream! {
            let mut this = self;
            while let Some(event) = this.next().await {
                yield event;
            }
        }
    }
}

struct ChannelCallback {
    tx: mpsc::UnboundedSender<QueryEvent>,
}

impl MessageCallback for ChannelCallback {
    fn on_message(&self, _query: &Query, message: &QueryMessage, progress: &Progress) {
        // Receiver gone means nobody is listening anymore
        let _ = self.tx.send(QueryEvent {
            message: message.clone(),
            progress: *progress,
        });
    }
}

/// A callback that funnels messages into a [`QueryEvents`] receiver.
pub(crate) fn channel() -> (Arc<dyn MessageCallback>, QueryEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        Arc::new(ChannelCallback { tx }),
        QueryEvents { rx, done: false },
    )
}
