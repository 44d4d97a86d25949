//! Connection manager: connect, write with reconnect-on-broken-pipe, size query

use std::io::{self, ErrorKind, Read, Write};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::protocol::{parse_size, SIZE_QUERY};
use super::transport::{is_closed_pipe, Connector, Endpoint, TcpConnector, Transport};
use crate::canvas::Dimensions;
use crate::errors::{PinselError, Result};

/// Whether a socket is currently open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// How hard `write` tries before reporting zero progress on a full socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub would_block_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            would_block_retries: 64,
            backoff: Duration::from_micros(50),
        }
    }
}

/// Owns the socket to the canvas server
///
/// The stream is replaced in place on reconnect, so nothing outside should
/// hold on to it across a [`Connection::write`].
pub struct Connection<C: Connector = TcpConnector> {
    connector: C,
    endpoint: Endpoint,
    stream: Option<C::Stream>,
    retry: RetryPolicy,
    reconnects: u64,
}

impl Connection<TcpConnector> {
    /// Connect to `host:port` over TCP
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        Self::open_with(TcpConnector, Endpoint::new(host, port), RetryPolicy::default())
    }
}

impl<C: Connector> Connection<C> {
    /// Create a connection through `connector` and open it immediately
    pub fn open_with(connector: C, endpoint: Endpoint, retry: RetryPolicy) -> Result<Self> {
        let mut conn = Self {
            connector,
            endpoint,
            stream: None,
            retry,
            reconnects: 0,
        };
        conn.reconnect()?;
        Ok(conn)
    }

    /// Close any open stream and open a fresh one to the same endpoint
    ///
    /// Replacing an open stream counts towards [`Connection::reconnects`].
    pub fn reconnect(&mut self) -> Result<()> {
        let replacing = self.stream.take().is_some();
        let stream = self.connector.open(&self.endpoint)?;
        self.stream = Some(stream);
        if replacing {
            self.reconnects += 1;
        }
        info!("connected to {}", self.endpoint);
        Ok(())
    }

    pub fn state(&self) -> ConnectionState {
        if self.stream.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Number of times an open connection was replaced by a new one
    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// Try to hand `bytes` to the socket, returning how many it accepted
    ///
    /// A full socket is retried a bounded number of times and then reported
    /// as zero progress. A closed pipe reconnects and also reports zero, so
    /// callers simply call again with the same bytes. Any other failure is fatal.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        if bytes.is_empty() {
            return Ok(0);
        }
        if self.stream.is_none() {
            self.reconnect()?;
        }
        let mut attempts = 0;
        loop {
            let Some(stream) = self.stream.as_mut() else {
                return Ok(0);
            };
            match stream.write(bytes) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if attempts >= self.retry.would_block_retries {
                        debug!("socket still full after {} retries", attempts);
                        return Ok(0);
                    }
                    attempts += 1;
                    if !self.retry.backoff.is_zero() {
                        thread::sleep(self.retry.backoff);
                    }
                }
                Err(e) if is_closed_pipe(&e) => {
                    warn!("connection to {} lost ({}), reconnecting", self.endpoint, e);
                    self.reconnect()?;
                    return Ok(0);
                }
                Err(e) => return Err(PinselError::Transport(e)),
            }
        }
    }

    /// Ask the server for its canvas size
    ///
    /// Blocks for at most `timeout`. A missing or malformed answer is logged
    /// and replaced by `fallback`; only socket mode changes can fail here.
    pub fn query_size(&mut self, fallback: Dimensions, timeout: Duration) -> Result<Dimensions> {
        if self.stream.is_none() {
            self.reconnect()?;
        }
        let Some(stream) = self.stream.as_mut() else {
            return Ok(fallback);
        };

        stream.set_nonblocking(false).map_err(PinselError::SocketOption)?;
        stream
            .set_read_timeout(Some(timeout))
            .map_err(PinselError::SocketOption)?;
        let answer = exchange_size(stream);
        stream.set_read_timeout(None).map_err(PinselError::SocketOption)?;
        stream.set_nonblocking(true).map_err(PinselError::SocketOption)?;

        match answer {
            Ok(response) => match parse_size(&response) {
                Some(dims) => {
                    info!("canvas size is {}", dims);
                    Ok(dims)
                }
                None => {
                    warn!(
                        "malformed size response {:?}, using {}",
                        String::from_utf8_lossy(&response),
                        fallback
                    );
                    Ok(fallback)
                }
            },
            Err(e) => {
                warn!("size query failed ({}), using {}", e, fallback);
                Ok(fallback)
            }
        }
    }
}

/// Send `SIZE` and read a single response chunk
fn exchange_size<S: Transport>(stream: &mut S) -> io::Result<Vec<u8>> {
    stream.write_all(SIZE_QUERY)?;
    stream.flush()?;
    let mut buf = [0u8; 64];
    let n = loop {
        match stream.read(&mut buf) {
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            other => break other?,
        }
    };
    if n == 0 {
        return Err(io::Error::from(ErrorKind::UnexpectedEof));
    }
    Ok(buf[..n].to_vec())
}
