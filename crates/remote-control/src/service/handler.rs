//! # Remote Control Service
//!
//! One Processing step of the transport loop, with no socket attached:
//!
//! ```text
//! datagram ─┬─ "health" ─────────────────────────────────────→ signed ack (action = null)
//!           └─ decode → authenticate → dispatch → sign ───────→ signed ack (action = time)
//!                 │           │
//!                 └───────────┴─ failure → log, no response
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::dispatcher::{dispatch, DispatchOutcome};
use super::signer::ResponseSigner;
use crate::domain::{
    is_health_probe, Authenticator, Command, InboundError, RequestContext, RequestEnvelope,
};
use crate::ports::{DatagramHandler, OutboundDatagram, PlaybackController, TimeSource};

/// Authenticates, dispatches and acknowledges datagrams.
pub struct RemoteControlService<C: PlaybackController, T: TimeSource> {
    authenticator: Arc<Authenticator>,
    signer: ResponseSigner<T>,
    controller: C,
}

impl<C: PlaybackController, T: TimeSource> RemoteControlService<C, T> {
    /// Create a service.
    ///
    /// # Arguments
    /// * `authenticator` - Shared-secret verifier and signer
    /// * `controller` - Player the commands drive
    /// * `clock` - Source of acknowledgement send times
    pub fn new(authenticator: Authenticator, controller: C, clock: T) -> Self {
        let authenticator = Arc::new(authenticator);
        Self {
            signer: ResponseSigner::new(Arc::clone(&authenticator), clock),
            authenticator,
            controller,
        }
    }

    /// The controller commands are dispatched to.
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Decode and authenticate a datagram.
    pub fn admit(&self, payload: &[u8]) -> Result<Command, InboundError> {
        let envelope = RequestEnvelope::decode(payload)?;
        Ok(self.authenticator.authenticate(&envelope)?)
    }

    fn respond(&self, context: RequestContext, outcome: DispatchOutcome) -> Option<OutboundDatagram> {
        let peer = context.peer();
        match self.signer.acknowledge(context, outcome) {
            Ok(datagram) => {
                debug!(%peer, bytes = datagram.payload.len(), "sending acknowledgement");
                Some(datagram)
            }
            Err(e) => {
                error!(%peer, error = %e, "failed to sign acknowledgement");
                None
            }
        }
    }
}

impl<C: PlaybackController, T: TimeSource> DatagramHandler for RemoteControlService<C, T> {
    fn handle_datagram(&self, payload: &[u8], peer: SocketAddr) -> Option<OutboundDatagram> {
        debug!(%peer, payload = %String::from_utf8_lossy(payload), "received datagram");
        let context = RequestContext::new(peer);

        if is_health_probe(payload) {
            debug!(%peer, "health probe");
            return self.respond(context, DispatchOutcome::completed(true));
        }

        let command = match self.admit(payload) {
            Ok(command) => command,
            Err(InboundError::Auth(e)) => {
                info!(%peer, reason = %e, "authentication failed, discarding datagram");
                return None;
            }
            Err(InboundError::Decode(e)) => {
                warn!(%peer, reason = %e, "undecodable datagram, discarding");
                return None;
            }
        };

        let context = context.correlate(command.time);
        info!(
            %peer,
            action = %command.time,
            command = ?command.operation(),
            "received command"
        );

        let outcome = dispatch(&command, &self.controller);
        self.respond(context, outcome)
    }
}
