use std::time::Duration;

use importio_rs_protocol::{Request, Response};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, trace, warn};

use crate::error::{ClientError, Result};

pub struct Connection {
    reader: FrameReader,
    writer: FrameWriter,
    read_timeout: Duration,
}

impl Connection {
    pub async fn connect(
        addr: &str,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self> {
        debug!(addr, "TCP connecting");
        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ClientError::Timeout(connect_timeout))?
            .map_err(ClientError::Io)?;

        stream.set_nodelay(true).ok();

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: FrameReader {
                inner: BufReader::new(read_half),
                line: String::new(),
            },
            writer: FrameWriter {
                inner: BufWriter::new(write_half),
            },
            read_timeout,
        })
    }

    pub async fn send(&mut self, request: &Request) -> Result<()> {
        self.writer.send(request).await
    }

    /// Read one frame, failing with [`ClientError::Timeout`] if none arrives
    /// within the read timeout and [`ClientError::Disconnected`] on EOF.
    pub async fn read_response(&mut self) -> Result<Response> {
        let frame = tokio::time::timeout(self.read_timeout, self.reader.next_response())
            .await
            .map_err(|_| {
                warn!(timeout = ?self.read_timeout, "read timeout");
                ClientError::Timeout(self.read_timeout)
            })??;
        frame.ok_or(ClientError::Disconnected)
    }

    /// Split into independently owned read and write halves.
    pub fn into_split(self) -> (FrameReader, FrameWriter) {
        (self.reader, self.writer)
    }
}

/// Read half: yields server frames until EOF. No timeout, since a query may
/// stay quiet for a long time.
pub struct FrameReader {
    inner: BufReader<OwnedReadHalf>,
    line: String,
}

impl FrameReader {
    /// Returns `Ok(None)` on clean EOF.
    pub async fn next_response(&mut self) -> Result<Option<Response>> {
        loop {
            self.line.clear();
            let n = self
                .inner
                .read_line(&mut self.line)
                .await
                .map_err(ClientError::Io)?;
            if n == 0 {
                return Ok(None);
            }
            if self.line.trim().is_empty() {
                continue;
            }
            trace!(len = n, "frame received");
            return Ok(Some(Response::parse_line(&self.line)?));
        }
    }
}

/// Write half: one request per line, flushed immediately.
pub struct FrameWriter {
    inner: BufWriter<OwnedWriteHalf>,
}

impl FrameWriter {
    pub async fn send(&mut self, request: &Request) -> Result<()> {
        trace!(request = request.name(), "sending");
        let bytes = request.to_bytes()?;
        self.inner.write_all(&bytes).await.map_err(ClientError::Io)?;
        self.inner.flush().await.map_err(ClientError::Io)?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.inner.shutdown().await.map_err(ClientError::Io)?;
        Ok(())
    }
}
