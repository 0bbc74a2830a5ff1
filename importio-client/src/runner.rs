//! Run a batch of queries and aggregate their results.
//!
//! [`QueryRunner`] is the callback shared by every query in the batch. It
//! appends result records to one accumulator, records service errors, and
//! counts terminal events; [`await_all`](QueryRunner::await_all) waits on
//! that count. Appends and the count update happen under one lock, so once
//! `await_all(n)` returns the records of all `n` queries are visible.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use importio_rs_protocol::{DataPayload, Progress, Query, QueryMessage};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::callback::MessageCallback;
use crate::client::ImportIoClient;
use crate::error::{ClientError, Result};

/// An error reported by the external source for one query.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceError {
    /// The payload's `errorType`.
    pub error_type: String,
    /// The whole payload object.
    pub detail: Value,
}

/// Outcome of a finished batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunReport {
    /// Every record received, in arrival order per message.
    pub results: Vec<Value>,
    /// Service errors, excluded from `results`.
    pub service_errors: Vec<ServiceError>,
    /// Number of terminal events observed.
    pub completed: usize,
}

/// Collection sizes at the start of a batch.
struct Mark {
    results: usize,
    service_errors: usize,
    completed: usize,
}

struct RunnerInner {
    collected: Mutex<RunReport>,
    completed: watch::Sender<usize>,
}

/// Shared result accumulator and completion counter. Clone is cheap (Arc).
#[derive(Clone)]
pub struct QueryRunner(Arc<RunnerInner>);

impl Default for QueryRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryRunner {
    pub fn new() -> Self {
        let (completed, _) = watch::channel(0);
        Self(Arc::new(RunnerInner {
            collected: Mutex::new(RunReport::default()),
            completed,
        }))
    }

    fn collected(&self) -> MutexGuard<'_, RunReport> {
        self.0
            .collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Submit one query with this runner as its callback.
    pub async fn submit(&self, client: &mut ImportIoClient, query: Query) -> Result<Uuid> {
        client.query(query, Arc::new(self.clone())).await
    }

    /// Wait until `expected` terminal events have been observed. No timeout:
    /// a query whose server never finishes it blocks forever, unless the
    /// session ends (which finishes it with `DISCONNECT`).
    pub async fn await_all(&self, expected: usize) -> Result<()> {
        let mut rx = self.0.completed.subscribe();
        rx.wait_for(|completed| *completed >= expected)
            .await
            .map_err(|_| ClientError::Disconnected)?;
        debug!(expected, "all queries finished");
        Ok(())
    }

    /// Like [`await_all`](Self::await_all), failing with
    /// [`ClientError::Timeout`] after `timeout`.
    pub async fn await_all_timeout(&self, expected: usize, timeout: Duration) -> Result<()> {
        tokio::time::timeout(timeout, self.await_all(expected))
            .await
            .map_err(|_| {
                warn!(
                    expected,
                    completed = self.completed(),
                    ?timeout,
                    "gave up waiting for queries"
                );
                ClientError::Timeout(timeout)
            })?
    }

    /// Submit `queries` with this runner as the callback, wait for all of
    /// them, and disconnect. See [`execute_with`](Self::execute_with).
    pub async fn execute(
        &self,
        client: ImportIoClient,
        queries: Vec<Query>,
        timeout: Option<Duration>,
    ) -> Result<RunReport> {
        self.execute_with(client, queries, timeout, |_, _, _| {})
            .await
    }

    /// Submit `queries`, wait for all of them, and disconnect.
    ///
    /// `observer` sees every message before this runner records it. The
    /// client is disconnected exactly once, also when a submit or the wait
    /// fails; the first error wins. The report covers only what arrived
    /// during this call, so a runner can be reused for several batches.
    pub async fn execute_with<F>(
        &self,
        mut client: ImportIoClient,
        queries: Vec<Query>,
        timeout: Option<Duration>,
        observer: F,
    ) -> Result<RunReport>
    where
        F: Fn(&Query, &QueryMessage, &Progress) + Send + Sync + 'static,
    {
        let runner = self.clone();
        let callback: Arc<dyn MessageCallback> =
            Arc::new(move |query: &Query, message: &QueryMessage, progress: &Progress| {
                observer(query, message, progress);
                runner.on_message(query, message, progress);
            });

        let mark = self.mark();
        let mut submitted = 0;
        let mut failure = None;

        for query in queries {
            match client.query(query, callback.clone()).await {
                Ok(request_id) => {
                    submitted += 1;
                    debug!(%request_id, submitted, "query submitted");
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if failure.is_none() {
            let expected = mark.completed + submitted;
            let waited = match timeout {
                Some(timeout) => self.await_all_timeout(expected, timeout).await,
                None => self.await_all(expected).await,
            };
            failure = waited.err();
        }

        let disconnected = client.disconnect().await;
        if let Some(e) = failure {
            return Err(e);
        }
        disconnected?;

        let report = self.report_since(&mark);
        info!(
            submitted,
            results = report.results.len(),
            service_errors = report.service_errors.len(),
            "batch complete"
        );
        Ok(report)
    }

    fn mark(&self) -> Mark {
        let collected = self.collected();
        Mark {
            results: collected.results.len(),
            service_errors: collected.service_errors.len(),
            completed: collected.completed,
        }
    }

    fn report_since(&self, mark: &Mark) -> RunReport {
        let collected = self.collected();
        RunReport {
            results: collected.results[mark.results..].to_vec(),
            service_errors: collected.service_errors[mark.service_errors..].to_vec(),
            completed: collected.completed - mark.completed,
        }
    }

    /// Number of terminal events observed so far.
    pub fn completed(&self) -> usize {
        *self.0.completed.borrow()
    }

    /// Snapshot of the records collected so far.
    pub fn results(&self) -> Vec<Value> {
        self.collected().results.clone()
    }

    /// Snapshot of the service errors collected so far.
    pub fn service_errors(&self) -> Vec<ServiceError> {
        self.collected().service_errors.clone()
    }

    /// Snapshot of everything collected so far.
    pub fn report(&self) -> RunReport {
        self.collected().clone()
    }
}

impl MessageCallback for QueryRunner {
    fn on_message(&self, _query: &Query, message: &QueryMessage, progress: &Progress) {
        let mut collected = self.collected();

        match message {
            QueryMessage::Data(DataPayload::Results(records)) => {
                debug!(count = records.len(), "results received");
                collected.results.extend(records.iter().cloned());
            }
            QueryMessage::Data(DataPayload::ServiceError { error_type, detail }) => {
                warn!(%error_type, "service reported an error");
                collected.service_errors.push(ServiceError {
                    error_type: error_type.clone(),
                    detail: detail.clone(),
                });
            }
            QueryMessage::Status { .. } => {}
        }

        if progress.is_finished() {
            collected.completed += 1;
            self.0.completed.send_replace(collected.completed);
        }
    }
}
