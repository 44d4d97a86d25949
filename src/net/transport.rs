//! Socket seams: what the connection manager needs from a stream and how it opens one

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::errors::{PinselError, Result};

/// Host and port of the canvas server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A byte stream to the canvas server
pub trait Transport: Read + Write {
    fn set_nonblocking(&mut self, nonblocking: bool) -> io::Result<()>;

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn set_nonblocking(&mut self, nonblocking: bool) -> io::Result<()> {
        TcpStream::set_nonblocking(self, nonblocking)
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }
}

/// Opens streams to an endpoint
///
/// Every failure returned from `open` is a fatal setup error.
pub trait Connector {
    type Stream: Transport;

    fn open(&mut self, endpoint: &Endpoint) -> Result<Self::Stream>;
}

/// Opens real TCP connections
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn open(&mut self, endpoint: &Endpoint) -> Result<TcpStream> {
        let addrs: Vec<SocketAddr> = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map(Iterator::collect)
            .unwrap_or_default();
        if addrs.is_empty() {
            return Err(PinselError::Resolve {
                host: endpoint.host.clone(),
            });
        }

        let mut last_err = None;
        let mut stream = None;
        for addr in &addrs {
            match TcpStream::connect(addr) {
                Ok(s) => {
                    debug!("connected to {} via {}", endpoint, addr);
                    stream = Some(s);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }
        let stream = match stream {
            Some(s) => s,
            None => {
                let source =
                    last_err.unwrap_or_else(|| io::Error::from(io::ErrorKind::AddrNotAvailable));
                return Err(classify_connect_error(endpoint, source));
            }
        };

        sys::enable_address_reuse(&stream).map_err(PinselError::SocketOption)?;
        sys::ignore_sigpipe();
        stream
            .set_nonblocking(true)
            .map_err(PinselError::SocketOption)?;
        Ok(stream)
    }
}

fn classify_connect_error(endpoint: &Endpoint, source: io::Error) -> PinselError {
    if sys::is_socket_creation_error(&source) {
        return PinselError::SocketCreate(source);
    }
    PinselError::Connect {
        endpoint: endpoint.to_string(),
        source,
    }
}

/// True for errors meaning the peer closed the connection under us
pub fn is_closed_pipe(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
    )
}

#[cfg(unix)]
mod sys {
    use std::io;
    use std::net::TcpStream;
    use std::os::unix::io::AsRawFd;

    fn set_flag(stream: &TcpStream, option: libc::c_int) -> io::Result<()> {
        let on: libc::c_int = 1;
        // SAFETY: the fd is owned by `stream` and stays open for the call; the
        // option value points to a live c_int whose size is passed alongside.
        let rc = unsafe {
            libc::setsockopt(
                stream.as_raw_fd(),
                libc::SOL_SOCKET,
                option,
                std::ptr::addr_of!(on).cast::<libc::c_void>(),
                std::mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if rc < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    pub(super) fn enable_address_reuse(stream: &TcpStream) -> io::Result<()> {
        set_flag(stream, libc::SO_REUSEADDR)?;
        #[cfg(not(any(target_os = "solaris", target_os = "illumos")))]
        set_flag(stream, libc::SO_REUSEPORT)?;
        Ok(())
    }

    /// Errors the OS reports when it cannot even allocate a socket
    pub(super) fn is_socket_creation_error(err: &io::Error) -> bool {
        matches!(
            err.raw_os_error(),
            Some(
                libc::EMFILE
                    | libc::ENFILE
                    | libc::ENOBUFS
                    | libc::ENOMEM
                    | libc::EAFNOSUPPORT
                    | libc::EPROTONOSUPPORT
                    | libc::EACCES
            )
        )
    }

    /// Make writes to a closed socket fail with `EPIPE` instead of killing the process
    pub(super) fn ignore_sigpipe() {
        // SAFETY: installing SIG_IGN has no handler code that could run unsafely.
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_IGN);
        }
    }
}

#[cfg(not(unix))]
mod sys {
    use std::io;
    use std::net::TcpStream;

    pub(super) fn enable_address_reuse(_stream: &TcpStream) -> io::Result<()> {
        Ok(())
    }

    pub(super) fn is_socket_creation_error(_err: &io::Error) -> bool {
        false
    }

    pub(super) fn ignore_sigpipe() {}
}
