//! Routing of server messages to per-query callbacks.
//!
//! The client registers every query here before sending it. A single
//! dispatcher task reads frames, updates each query's [`Progress`], and
//! invokes its callback outside the table lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use importio_rs_protocol::{Progress, Query, QueryMessage};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::callback::MessageCallback;
use crate::connection::FrameReader;
use crate::error::{ClientError, Result};

struct PendingQuery {
    query: Arc<Query>,
    callback: Arc<dyn MessageCallback>,
    progress: Progress,
}

#[derive(Default)]
struct Table {
    queries: HashMap<Uuid, PendingQuery>,
    closed: bool,
}

/// Shared table of outstanding queries. Clone is cheap (Arc).
#[derive(Clone, Default)]
pub(crate) struct Dispatch(Arc<Mutex<Table>>);

impl Dispatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a query. Fails once the table has been closed.
    pub fn register(
        &self,
        request_id: Uuid,
        query: Arc<Query>,
        callback: Arc<dyn MessageCallback>,
    ) -> Result<()> {
        let mut table = self.table();
        if table.closed {
            return Err(ClientError::InvalidState {
                expected: "Connected|Querying",
                actual: "Disconnected",
            });
        }
        table.queries.insert(
            request_id,
            PendingQuery {
                query,
                callback,
                progress: Progress::new(),
            },
        );
        Ok(())
    }

    /// Forget a query without notifying its callback (the request never left).
    pub fn unregister(&self, request_id: &Uuid) {
        self.table().queries.remove(request_id);
    }

    /// Route one message. Messages for unknown or finished queries are dropped.
    pub fn deliver(&self, request_id: Uuid, message: QueryMessage) {
        let (query, callback, progress) = {
            let mut table = self.table();
            let Some(pending) = table.queries.get_mut(&request_id) else {
                debug!(%request_id, kind = %message.message_type(), "message for unknown query dropped");
                return;
            };
            pending.progress.observe(message.message_type());
            let progress = pending.progress;
            let entry = (pending.query.clone(), pending.callback.clone(), progress);
            if progress.is_finished() {
                table.queries.remove(&request_id);
                debug!(%request_id, "query finished");
            }
            entry
        };
        callback.on_message(&query, &message, &progress);
    }

    /// Close the table and end every outstanding query with a terminal
    /// `DISCONNECT`. Returns how many queries were ended.
    pub fn close(&self) -> usize {
        let drained: Vec<(Uuid, PendingQuery)> = {
            let mut table = self.table();
            table.closed = true;
            table.queries.drain().collect()
        };

        let count = drained.len();
        let message = QueryMessage::disconnected();
        for (request_id, mut pending) in drained {
            warn!(%request_id, "query ended by disconnect");
            pending.progress.observe(message.message_type());
            pending
                .callback
                .on_message(&pending.query, &message, &pending.progress);
        }
        count
    }

    pub fn outstanding(&self) -> usize {
        self.table().queries.len()
    }

    pub fn is_closed(&self) -> bool {
        self.table().closed
    }
}

/// Dispatcher loop: runs until the server closes the connection or a
/// transport error occurs, then closes the table.
pub(crate) async fn run(mut reader: FrameReader, dispatch: Dispatch) {
    loop {
        match reader.next_response().await {
            Ok(Some(response)) => match response.into_query_message() {
                Ok((request_id, message)) => dispatch.deliver(request_id, message),
                Err(e) => warn!(error = %e, "skipping undecodable frame"),
            },
            Ok(None) => {
                info!("server closed the session");
                break;
            }
            Err(ClientError::Protocol(e)) => {
                warn!(error = %e, "skipping malformed frame");
            }
            Err(e) => {
                warn!(error = %e, "session read failed");
                break;
            }
        }
    }

    let ended = dispatch.close();
    if ended > 0 {
        warn!(ended, "session closed with queries outstanding");
    }
}
