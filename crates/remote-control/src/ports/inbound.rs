//! # Driving Ports (Inbound API)
//!
//! What the protocol core exposes to the transport loop.

use std::net::SocketAddr;

/// A datagram ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundDatagram {
    /// Destination; the sender of the datagram being answered.
    pub peer: SocketAddr,
    /// Encoded response envelope.
    pub payload: Vec<u8>,
}

/// One receive→respond cycle, independent of any socket.
pub trait DatagramHandler: Send {
    /// Process one inbound datagram.
    ///
    /// Returns the response to send, or `None` when the datagram is
    /// discarded silently.
    fn handle_datagram(&self, payload: &[u8], peer: SocketAddr) -> Option<OutboundDatagram>;
}
