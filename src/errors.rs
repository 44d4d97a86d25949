use std::io;

use thiserror::Error;

/// Errors that can occur in the pinselflut client
#[derive(Error, Debug)]
pub enum PinselError {
    /// The canvas host name did not resolve to any address
    #[error("no such host: {host}")]
    Resolve { host: String },

    /// The operating system refused to create a socket
    #[error("failed to open socket: {0}")]
    SocketCreate(#[source] io::Error),

    /// Setting a socket option failed
    #[error("failed to set socket option: {0}")]
    SocketOption(#[source] io::Error),

    /// Connecting to the canvas server failed
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// A socket write failed with an error that is neither retryable nor a closed pipe
    #[error("failed writing to socket: {0}")]
    Transport(#[source] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Terminal setup or drawing failed
    #[error("terminal error: {0}")]
    Terminal(#[source] io::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl PinselError {
    /// Process exit status for this error when it terminates the program
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Resolve { .. } => 2,
            Self::SocketCreate(_) => 3,
            Self::SocketOption(_) => 4,
            Self::Connect { .. } => 5,
            Self::Transport(_) => 6,
            Self::Config(_) => 7,
            Self::Terminal(_) => 8,
        }
    }
}

/// Type alias for Result with `PinselError`
pub type Result<T> = std::result::Result<T, PinselError>;
