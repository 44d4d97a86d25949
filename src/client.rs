//! Pixel client: encodes pixels for the wire and mirrors them locally

use tracing::debug;

use crate::canvas::{Dimensions, Framebuffer, PixelSink, Rgba};
use crate::errors::Result;
use crate::net::protocol::KEEP_ALIVE;
use crate::net::transport::{Connector, TcpConnector};
use crate::net::{Connection, OutputBuffer};

/// Running totals for the status line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub pixels: u64,
    pub bytes_sent: u64,
    pub keep_alives: u64,
}

/// Connection, output buffer and local mirror of one canvas
///
/// Every accepted pixel is both queued for the server and blended into the
/// mirror, so the mirror shows what the server should be displaying.
pub struct FlutClient<C: Connector = TcpConnector> {
    connection: Connection<C>,
    buffer: OutputBuffer,
    mirror: Framebuffer,
    stats: ClientStats,
}

impl<C: Connector> FlutClient<C> {
    /// Wrap an open connection once the canvas size is known
    pub fn new(connection: Connection<C>, dims: Dimensions, buffer: OutputBuffer) -> Self {
        Self {
            connection,
            buffer,
            mirror: Framebuffer::new(dims),
            stats: ClientStats::default(),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.mirror.dimensions()
    }

    /// Read access to the local mirror for display
    pub fn mirror(&self) -> &Framebuffer {
        &self.mirror
    }

    /// Acknowledge that the mirror has been displayed
    pub fn mark_mirror_clean(&mut self) {
        self.mirror.mark_clean();
    }

    pub fn connection(&self) -> &Connection<C> {
        &self.connection
    }

    pub fn stats(&self) -> ClientStats {
        self.stats
    }

    /// Bytes queued but not yet accepted by the socket
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Queue one pixel and blend it into the mirror
    ///
    /// Off-canvas pixels are dropped without touching anything.
    pub fn append_pixel(&mut self, x: i32, y: i32, color: Rgba) -> Result<()> {
        let Some((ux, uy)) = self.mirror.dimensions().contains(x, y) else {
            return Ok(());
        };
        while !self.buffer.has_room() {
            self.drain_once()?;
        }
        self.buffer.push_pixel(ux, uy, color);
        self.mirror.blend(x, y, color);
        self.stats.pixels += 1;
        Ok(())
    }

    /// Hand everything queued to the socket
    ///
    /// Does not touch the socket at all when nothing is queued.
    pub fn flush(&mut self) -> Result<()> {
        while !self.buffer.is_empty() {
            self.drain_once()?;
        }
        Ok(())
    }

    /// One socket write of the queued bytes, dropping whatever was accepted
    fn drain_once(&mut self) -> Result<()> {
        let n = self.connection.write(self.buffer.pending())?;
        if n > 0 {
            self.buffer.consume(n);
            self.stats.bytes_sent += n as u64;
        }
        Ok(())
    }

    /// Keep an idle connection open with a bare newline
    ///
    /// Queued commands go out first so the newline never lands inside a
    /// partially sent command. Never waits on a full socket: when the queue
    /// or the newline cannot be handed over, the attempt is dropped and the
    /// next idle tick tries again.
    pub fn keep_alive(&mut self) -> Result<()> {
        while !self.buffer.is_empty() {
            let before = self.buffer.len();
            self.drain_once()?;
            if self.buffer.len() == before {
                debug!("keep-alive deferred, {} bytes still queued", before);
                return Ok(());
            }
        }
        if self.connection.write(KEEP_ALIVE)? == 0 {
            debug!("keep-alive skipped, socket full");
            return Ok(());
        }
        self.stats.keep_alives += 1;
        debug!("keep-alive sent");
        Ok(())
    }
}

impl<C: Connector> PixelSink for FlutClient<C> {
    fn put_pixel(&mut self, x: i32, y: i32, color: Rgba) -> Result<()> {
        self.append_pixel(x, y, color)
    }
}
