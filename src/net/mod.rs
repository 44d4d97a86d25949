//! Network side of the client: wire format, socket seams, connection and output buffer

pub mod buffer;
pub mod connection;
pub mod protocol;
pub mod transport;

pub use buffer::OutputBuffer;
pub use connection::{Connection, ConnectionState, RetryPolicy};
pub use protocol::{encode_pixel, parse_size, MAX_CANVAS_AREA, MAX_COMMAND_LEN};
pub use transport::{Connector, Endpoint, TcpConnector, Transport};
