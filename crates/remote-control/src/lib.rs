//! # Remote Control
//!
//! Authenticated UDP remote control for a media player.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Accept JSON commands over UDP, verify each against a pre-shared secret,
//! drive a playback controller and answer every accepted command with a
//! signed acknowledgement:
//! - One datagram per request, one per response, at most 1024 bytes
//! - HMAC keyed with `secret || time`, digests as hex
//! - Unauthenticated `health` probe for liveness checks
//! - Unauthenticated or undecodable datagrams are dropped without a reply
//!
//! ## Wire Format
//!
//! | Direction | Envelope | Inner message |
//! |-----------|----------|---------------|
//! | client → server | `{"message": …, "hmac": …}` | `{"time", "command", …fields}` |
//! | server → client | `{"hmac": …, "message": …}` | `{"action", "time", "result", "message"}` |
//!
//! ## Security Notes
//!
//! | Property | Status |
//! |----------|--------|
//! | Integrity + authenticity | HMAC over the exact message text |
//! | Timing-safe compare | `Mac::verify_slice` |
//! | Secret hygiene | zeroized on drop, redacted in `Debug` |
//! | Replay protection | **none**; captured envelopes verify again |
//!
//! ## Module Structure
//!
//! ```text
//! remote-control/
//! ├── domain/      # Envelopes, commands, authenticator, media policy
//! ├── ports/       # PlaybackController, DatagramTransport, TimeSource
//! ├── service/     # Dispatch, response signing, transport loop
//! ├── adapters/    # UDP socket, system clock, controllers, config
//! └── client       # Request signing and a blocking UDP client
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod client;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports
pub use adapters::{
    ConfigError, LoggingConfig, LoggingController, NetworkConfig, PolicyController, RemoteConfig,
    SecurityConfig, SystemTimeSource, UdpDatagramTransport,
};
pub use client::{ClientError, RemoteClient, RequestSigner};
pub use domain::{
    is_health_probe, Acknowledgement, AuthError, Authenticator, Command, ControllerError,
    CorrelationId, DecodeError, DigestAlgorithm, DispatchError, EncodeError, InboundError,
    MediaPolicy, PathRejection, RequestContext, RequestEnvelope, ResponseEnvelope, SharedSecret,
    SignError, UnknownDigestAlgorithm, HEALTH_TOKEN, MAX_DATAGRAM_SIZE, NOT_IMPLEMENTED,
};
pub use ports::{
    DatagramHandler, DatagramTransport, OutboundDatagram, PlaybackController, TimeSource,
    TransportError,
};
pub use service::{
    dispatch, try_dispatch, DispatchOutcome, Invocation, LoopState, LoopStats, Operation,
    RemoteControlService, ResponseSigner, ShutdownSignal, TransportLoop,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
