use std::sync::Arc;

use importio_rs_protocol::{Credential, Query, Request, Response};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::callback::MessageCallback;
use crate::connection::{Connection, FrameWriter};
use crate::dispatch::{self, Dispatch};
use crate::error::{ClientError, Result};
use crate::retry::with_retry;
use crate::state::{ClientConfig, ClientState};
use crate::stream::{self, QueryEvents};

/// Async client for the import.io query service.
///
/// A session goes `Connected` → `Querying` → `Disconnected`. Queries are
/// submitted without waiting for their results; a background dispatcher
/// task routes every server message to the callback registered with the
/// query.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> importio_rs_client::Result<()> {
/// use std::sync::Arc;
/// use importio_rs_client::{Credential, ImportIoClient, Progress, Query, QueryMessage};
/// use uuid::Uuid;
///
/// let credential = Credential::new(Uuid::new_v4(), "api-key");
/// let mut client = ImportIoClient::connect(credential).await?;
///
/// let query = Query::new()
///     .connector(Uuid::parse_str("caff10dc-3bf8-402e-b1b8-c799a77c3e8c").unwrap())
///     .input("searchterm", "avengers");
/// let callback = |_: &Query, message: &QueryMessage, progress: &Progress| {
///     println!("{message} finished={}", progress.is_finished());
/// };
/// client.query(query, Arc::new(callback)).await?;
///
/// client.disconnect().await?;
/// # Ok(())
/// # }
/// ```
pub struct ImportIoClient {
    writer: FrameWriter,
    dispatch: Dispatch,
    dispatcher: Option<JoinHandle<()>>,
    user_guid: Uuid,
    config: ClientConfig,
}

impl ImportIoClient {
    /// Connect and log in with default configuration.
    pub async fn connect(credential: Credential) -> Result<Self> {
        Self::connect_with_config(credential, ClientConfig::default()).await
    }

    /// Connect and log in with custom [`ClientConfig`].
    ///
    /// Transport failures are retried per [`ClientConfig::retry`] and end in
    /// [`ClientError::ConnectFailed`]; a rejected credential returns
    /// [`ClientError::Authentication`] right away.
    pub async fn connect_with_config(credential: Credential, config: ClientConfig) -> Result<Self> {
        let addr = credential.address()?;
        info!(%addr, user = %credential.user_guid(), "connecting");

        let connection = {
            let (addr, credential, config) = (&addr, &credential, &config);
            with_retry(&config.retry, move |attempt| {
                debug!(attempt, "connect attempt");
                Self::open_session(addr, credential, config)
            })
            .await?
        };

        let (reader, writer) = connection.into_split();
        let dispatch = Dispatch::new();
        let dispatcher = tokio::spawn(dispatch::run(reader, dispatch.clone()));

        info!(%addr, "connected");

        Ok(Self {
            writer,
            dispatch,
            dispatcher: Some(dispatcher),
            user_guid: credential.user_guid(),
            config,
        })
    }

    async fn open_session(
        addr: &str,
        credential: &Credential,
        config: &ClientConfig,
    ) -> Result<Connection> {
        let mut connection =
            Connection::connect(addr, config.connect_timeout, config.read_timeout).await?;

        connection
            .send(&Request::Login {
                user_guid: credential.user_guid(),
                api_key: credential.api_key().to_owned(),
            })
            .await?;

        match connection.read_response().await? {
            Response::Authenticated => Ok(connection),
            Response::Rejected { reason } => {
                warn!(%reason, "login rejected");
                Err(ClientError::Authentication(reason))
            }
            other => Err(ClientError::UnexpectedResponse(format!(
                "expected login reply, got: {other:?}"
            ))),
        }
    }

    // -- Accessors --

    /// Returns the current session state.
    pub fn state(&self) -> ClientState {
        if self.dispatch.is_closed() {
            ClientState::Disconnected
        } else if self.dispatch.outstanding() > 0 {
            ClientState::Querying
        } else {
            ClientState::Connected
        }
    }

    /// Number of submitted queries that have not finished yet.
    pub fn outstanding(&self) -> usize {
        self.dispatch.outstanding()
    }

    /// The user GUID this session logged in with.
    pub fn user_guid(&self) -> Uuid {
        self.user_guid
    }

    /// Returns the configuration used for this session.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -- Queries --

    /// Submit a query. Returns its request id as soon as the request is written.
    ///
    /// `callback` receives every message for this query, from the dispatcher
    /// task, in arrival order. Fails with [`ClientError::InvalidState`] once
    /// the session has closed.
    pub async fn query(
        &mut self,
        query: Query,
        callback: Arc<dyn MessageCallback>,
    ) -> Result<Uuid> {
        let request_id = Uuid::new_v4();
        let request = Request::Query {
            request_id,
            query: query.clone(),
        };

        // Register first so no reply can arrive for an unknown id
        self.dispatch
            .register(request_id, Arc::new(query), callback)?;

        debug!(%request_id, "submitting query");
        if let Err(e) = self.writer.send(&request).await {
            self.dispatch.unregister(&request_id);
            return Err(e);
        }
        Ok(request_id)
    }

    /// Submit a query and receive its messages through a channel instead of
    /// a callback. The returned [`QueryEvents`] ends after the terminal event.
    pub async fn query_events(&mut self, query: Query) -> Result<QueryEvents> {
        let (callback, events) = stream::channel();
        self.query(query, callback).await?;
        Ok(events)
    }

    // -- Teardown --

    /// Close the session.
    ///
    /// Sends the disconnect request, waits up to the read timeout for the
    /// server to close, then ends every outstanding query with a terminal
    /// `DISCONNECT` message. The session is released even when sending fails;
    /// that send error is returned afterwards.
    pub async fn disconnect(mut self) -> Result<()> {
        info!(outstanding = self.dispatch.outstanding(), "disconnecting");

        let sent = if self.dispatch.is_closed() {
            Ok(())
        } else {
            self.writer.send(&Request::Disconnect).await
        };
        if let Err(e) = &sent {
            warn!(error = %e, "disconnect request failed");
        }
        self.writer.shutdown().await.ok();

        if let Some(mut handle) = self.dispatcher.take()
            && tokio::time::timeout(self.config.read_timeout, &mut handle)
                .await
                .is_err()
        {
            warn!(timeout = ?self.config.read_timeout, "server kept the session open, stopping reader");
            handle.abort();
            let _ = handle.await;
        }

        let ended = self.dispatch.close();
        info!(ended, "disconnected");
        sent
    }
}

impl Drop for ImportIoClient {
    fn drop(&mut self) {
        if let Some(handle) = self.dispatcher.take() {
            handle.abort();
        }
        // Nothing can answer the outstanding queries anymore
        let ended = self.dispatch.close();
        if ended > 0 {
            warn!(ended, "client dropped with queries outstanding");
        }
    }
}
