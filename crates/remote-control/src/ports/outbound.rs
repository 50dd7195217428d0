//! # Driven Ports (Outbound SPI)
//!
//! Interfaces the host application provides: the media player, the
//! datagram socket and the wall clock.

use std::net::SocketAddr;
use thiserror::Error;

pub use crate::domain::ControllerError;

/// Playback capability driven by authenticated commands.
///
/// Each call returns the player's own success flag. `Err` is a fault and is
/// reported to the client as `"not implemented"`.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so the service can move onto a
/// dedicated worker thread.
pub trait PlaybackController: Send + Sync {
    /// Start playing the media at `path`.
    fn play(&self, path: &str) -> Result<bool, ControllerError>;

    /// Pause (`true`) or resume (`false`).
    fn pause(&self, state: bool) -> Result<bool, ControllerError>;

    /// Stop playback.
    fn stop(&self) -> Result<bool, ControllerError>;

    /// Seek by `seconds`.
    fn seek(&self, seconds: f64) -> Result<bool, ControllerError>;

    /// Set output volume.
    fn set_volume(&self, volume: f64) -> Result<bool, ControllerError>;

    /// Select a subtitle track.
    fn set_subtitles(&self, track: i64) -> Result<bool, ControllerError>;

    /// Enter (`true`) or leave (`false`) fullscreen.
    fn fullscreen(&self, state: bool) -> Result<bool, ControllerError>;

    /// Mute (`true`) or unmute (`false`).
    fn mute(&self, state: bool) -> Result<bool, ControllerError>;
}

/// Datagram socket used by the transport loop.
pub trait DatagramTransport: Send {
    /// Receive one datagram into `buffer`.
    ///
    /// Returns `Ok(None)` when the read timed out with nothing to process,
    /// giving the loop a chance to observe shutdown.
    fn recv_from(&mut self, buffer: &mut [u8])
        -> Result<Option<(usize, SocketAddr)>, TransportError>;

    /// Send one datagram to `peer`.
    fn send_to(&mut self, payload: &[u8], peer: SocketAddr) -> Result<(), TransportError>;
}

/// Errors from transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Underlying socket error.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload exceeds the datagram limit.
    #[error("payload of {0} bytes exceeds the datagram limit")]
    MessageTooLarge(usize),

    /// Fewer bytes were written than requested.
    #[error("short send: {sent} of {expected} bytes")]
    ShortSend {
        /// Bytes written.
        sent: usize,
        /// Bytes requested.
        expected: usize,
    },
}

/// Wall clock for acknowledgement send times.
///
/// Enables deterministic testing by injecting a fixed clock.
pub trait TimeSource: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}
