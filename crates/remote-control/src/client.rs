//! # Client Side
//!
//! `RequestSigner` stamps, encodes and signs commands and opens signed
//! acknowledgements. `RemoteClient` adds a socket: one request, one
//! response, with a receive deadline.

use serde_json::Value;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

use crate::adapters::{SystemTimeSource, UdpDatagramTransport};
use crate::domain::{
    Acknowledgement, AuthError, Authenticator, Command, CorrelationId, DecodeError,
    ResponseEnvelope, SignError, HEALTH_TOKEN, MAX_DATAGRAM_SIZE,
};
use crate::ports::{DatagramTransport, TimeSource, TransportError};

/// Client-side failures.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Socket failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No response before the deadline.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The request could not be signed.
    #[error(transparent)]
    Sign(#[from] SignError),

    /// The response is not a valid envelope.
    #[error("malformed response: {0}")]
    Decode(#[from] DecodeError),

    /// The response signature does not verify.
    #[error("response failed authentication: {0}")]
    Auth(#[from] AuthError),

    /// The response answers a different request.
    #[error("response correlates to {actual:?}, expected {expected:?}")]
    CorrelationMismatch {
        /// Correlation id sent.
        expected: Option<CorrelationId>,
        /// Correlation id received.
        actual: Option<CorrelationId>,
    },
}

/// Builds signed requests and verifies responses.
#[derive(Debug, Clone)]
pub struct RequestSigner<T: TimeSource = SystemTimeSource> {
    authenticator: Authenticator,
    clock: T,
}

impl RequestSigner<SystemTimeSource> {
    /// Signer stamping commands with the system clock.
    pub fn new(authenticator: Authenticator) -> Self {
        Self::with_clock(authenticator, SystemTimeSource)
    }
}

impl<T: TimeSource> RequestSigner<T> {
    /// Signer stamping commands with `clock`.
    pub fn with_clock(authenticator: Authenticator, clock: T) -> Self {
        Self {
            authenticator,
            clock,
        }
    }

    /// A command named `operation` stamped with the current time.
    pub fn command(&self, operation: &str) -> Command {
        Command::new(self.clock.now_millis(), operation)
    }

    /// Encode and sign `command` into datagram bytes.
    pub fn sign(&self, command: &Command) -> Result<Vec<u8>, SignError> {
        Ok(self.authenticator.sign_request(command)?.encode()?)
    }

    /// Decode and verify a response datagram.
    pub fn open(&self, payload: &[u8]) -> Result<Acknowledgement, ClientError> {
        let envelope = ResponseEnvelope::decode(payload)?;
        Ok(self.authenticator.authenticate_response(&envelope)?)
    }
}

/// Sends commands to one server and waits for each acknowledgement.
pub struct RemoteClient<Tr: DatagramTransport = UdpDatagramTransport> {
    transport: Tr,
    server: SocketAddr,
    signer: RequestSigner,
    timeout: Duration,
}

impl RemoteClient<UdpDatagramTransport> {
    /// Bind an ephemeral local socket for talking to `server`.
    pub fn connect(
        server: SocketAddr,
        authenticator: Authenticator,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let local = match server {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        };
        // Short polls so the deadline is honoured even under foreign traffic.
        let poll = timeout.min(Duration::from_millis(100));
        let transport = UdpDatagramTransport::bind(local, poll)?;
        Ok(Self::with_transport(transport, server, authenticator, timeout))
    }
}

impl<Tr: DatagramTransport> RemoteClient<Tr> {
    /// Client over an existing transport.
    pub fn with_transport(
        transport: Tr,
        server: SocketAddr,
        authenticator: Authenticator,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            server,
            signer: RequestSigner::new(authenticator),
            timeout,
        }
    }

    /// Server address.
    pub fn server(&self) -> SocketAddr {
        self.server
    }

    /// A fresh command stamped with the current time.
    pub fn command(&self, operation: &str) -> Command {
        self.signer.command(operation)
    }

    /// Send `operation` with at most one argument field.
    pub fn invoke(
        &mut self,
        operation: &str,
        argument: Option<(&str, Value)>,
    ) -> Result<Acknowledgement, ClientError> {
        let mut command = self.command(operation);
        if let Some((field, value)) = argument {
            command = command.with_field(field, value);
        }
        self.send(&command)
    }

    /// Sign and send `command`, then wait for its acknowledgement.
    pub fn send(&mut self, command: &Command) -> Result<Acknowledgement, ClientError> {
        let payload = self.signer.sign(command)?;
        self.send_raw(&payload)?;
        let ack = self.receive()?;
        expect_correlation(Some(command.time), &ack)?;
        Ok(ack)
    }

    /// Probe liveness. Needs no signature, but the reply is still verified.
    pub fn health(&mut self) -> Result<Acknowledgement, ClientError> {
        self.send_raw(HEALTH_TOKEN)?;
        let ack = self.receive()?;
        expect_correlation(None, &ack)?;
        Ok(ack)
    }

    /// Send bytes as-is.
    pub fn send_raw(&mut self, payload: &[u8]) -> Result<(), ClientError> {
        debug!(server = %self.server, bytes = payload.len(), "sending datagram");
        self.transport.send_to(payload, self.server)?;
        Ok(())
    }

    /// Wait for the next verified acknowledgement from the server.
    ///
    /// Datagrams from other peers are ignored.
    pub fn receive(&mut self) -> Result<Acknowledgement, ClientError> {
        let deadline = Instant::now() + self.timeout;
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE + 1];

        while Instant::now() < deadline {
            match self.transport.recv_from(&mut buf)? {
                Some((len, peer)) if peer == self.server => return self.signer.open(&buf[..len]),
                Some((_, peer)) => debug!(%peer, "ignoring datagram from unexpected peer"),
                None => {}
            }
        }
        Err(ClientError::Timeout(self.timeout))
    }
}

fn expect_correlation(
    expected: Option<CorrelationId>,
    ack: &Acknowledgement,
) -> Result<(), ClientError> {
    if ack.action == expected {
        Ok(())
    } else {
        Err(ClientError::CorrelationMismatch {
            expected,
            actual: ack.action,
        })
    }
}
