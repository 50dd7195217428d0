//! # Request Context
//!
//! Per-cycle state: who sent the datagram and which command it carried.
//! A context is created on receipt and consumed when the acknowledgement is
//! signed, so nothing survives into the next cycle.

use std::net::SocketAddr;

use super::command::CorrelationId;

/// State of exactly one in-flight request.
///
/// Not `Clone`: ownership moves from receipt to the response signer.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestContext {
    peer: SocketAddr,
    correlation: Option<CorrelationId>,
}

impl RequestContext {
    /// Context for a datagram from `peer`, not yet correlated.
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            peer,
            correlation: None,
        }
    }

    /// Record the authenticated command's `time`.
    #[must_use]
    pub fn correlate(mut self, id: CorrelationId) -> Self {
        self.correlation = Some(id);
        self
    }

    /// Remote endpoint.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Pending correlation id.
    pub fn correlation(&self) -> Option<CorrelationId> {
        self.correlation
    }

    /// Consume the context.
    pub fn into_parts(self) -> (SocketAddr, Option<CorrelationId>) {
        (self.peer, self.correlation)
    }
}
