//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! - **Driving Ports (Inbound):** the per-datagram handler the transport
//!   loop drives
//! - **Driven Ports (Outbound):** the player, socket and clock the host
//!   supplies

pub mod inbound;
pub mod outbound;

pub use inbound::{DatagramHandler, OutboundDatagram};
pub use outbound::{
    ControllerError, DatagramTransport, PlaybackController, TimeSource, TransportError,
};
