//! Test utilities for the remote-control protocol.
//!
//! Deterministic doubles for the driven ports. Enable with the `test-utils`
//! feature flag.
//!
//! # Example
//!
//! ```rust,ignore
//! use remote_control::test_utils::FixedTimeSource;
//! use remote_control::TimeSource;
//!
//! let clock = FixedTimeSource(1_700_000_000_000);
//! assert_eq!(clock.now_millis(), 1_700_000_000_000);
//! ```

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::domain::ControllerError;
use crate::ports::{DatagramTransport, PlaybackController, TimeSource, TransportError};
use crate::service::{Operation, ShutdownSignal};

/// A time source that always returns the same millisecond timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTimeSource(pub i64);

impl TimeSource for FixedTimeSource {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// One call observed by [`RecordingController`].
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerCall {
    /// `play(path)`
    Play(String),
    /// `pause(state)`
    Pause(bool),
    /// `stop()`
    Stop,
    /// `seek(seconds)`
    Seek(f64),
    /// `set_volume(volume)`
    SetVolume(f64),
    /// `set_subtitles(track)`
    SetSubtitles(i64),
    /// `fullscreen(state)`
    Fullscreen(bool),
    /// `mute(state)`
    Mute(bool),
}

/// Controller that records every call.
///
/// Clones share the call log, so a clone handed to a running service can be
/// inspected from the test thread.
#[derive(Debug, Clone)]
pub struct RecordingController {
    calls: Arc<Mutex<Vec<ControllerCall>>>,
    result: bool,
    failure: Option<ControllerError>,
    panic_on: Option<Operation>,
}

impl Default for RecordingController {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingController {
    /// Controller that accepts every call.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            result: true,
            failure: None,
            panic_on: None,
        }
    }

    /// Report `result` from every call.
    pub fn returning(mut self, result: bool) -> Self {
        self.result = result;
        self
    }

    /// Fail every call with `error`.
    pub fn failing_with(mut self, error: ControllerError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Panic when `operation` is invoked.
    pub fn panicking_on(mut self, operation: Operation) -> Self {
        self.panic_on = Some(operation);
        self
    }

    /// Calls observed so far.
    pub fn calls(&self) -> Vec<ControllerCall> {
        self.calls.lock().clone()
    }

    fn record(&self, operation: Operation, call: ControllerCall) -> Result<bool, ControllerError> {
        if self.panic_on == Some(operation) {
            panic!("controller panicked on {operation}");
        }
        self.calls.lock().push(call);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.result),
        }
    }
}

impl PlaybackController for RecordingController {
    fn play(&self, path: &str) -> Result<bool, ControllerError> {
        self.record(Operation::Play, ControllerCall::Play(path.to_string()))
    }

    fn pause(&self, state: bool) -> Result<bool, ControllerError> {
        self.record(Operation::Pause, ControllerCall::Pause(state))
    }

    fn stop(&self) -> Result<bool, ControllerError> {
        self.record(Operation::Stop, ControllerCall::Stop)
    }

    fn seek(&self, seconds: f64) -> Result<bool, ControllerError> {
        self.record(Operation::Seek, ControllerCall::Seek(seconds))
    }

    fn set_volume(&self, volume: f64) -> Result<bool, ControllerError> {
        self.record(Operation::SetVolume, ControllerCall::SetVolume(volume))
    }

    fn set_subtitles(&self, track: i64) -> Result<bool, ControllerError> {
        self.record(Operation::SetSubtitles, ControllerCall::SetSubtitles(track))
    }

    fn fullscreen(&self, state: bool) -> Result<bool, ControllerError> {
        self.record(Operation::Fullscreen, ControllerCall::Fullscreen(state))
    }

    fn mute(&self, state: bool) -> Result<bool, ControllerError> {
        self.record(Operation::Mute, ControllerCall::Mute(state))
    }
}

/// In-memory datagram transport.
///
/// Serves queued datagrams in order, truncating each to the receive buffer
/// the way a UDP socket does. Once the queue is empty it triggers the
/// attached shutdown signal, so `TransportLoop::run` returns after the last
/// datagram.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    inbound: VecDeque<(Vec<u8>, SocketAddr)>,
    sent: Vec<(Vec<u8>, SocketAddr)>,
    shutdown: Option<ShutdownSignal>,
}

impl MemoryTransport {
    /// Empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger `signal` when the inbound queue runs dry.
    pub fn stopping(mut self, signal: ShutdownSignal) -> Self {
        self.shutdown = Some(signal);
        self
    }

    /// Queue a datagram from `peer`.
    pub fn push(&mut self, payload: impl Into<Vec<u8>>, peer: SocketAddr) {
        self.inbound.push_back((payload.into(), peer));
    }

    /// Datagrams sent so far, oldest first.
    pub fn sent(&self) -> &[(Vec<u8>, SocketAddr)] {
        &self.sent
    }

    /// Datagrams still queued.
    pub fn pending(&self) -> usize {
        self.inbound.len()
    }
}

impl DatagramTransport for MemoryTransport {
    fn recv_from(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, TransportError> {
        match self.inbound.pop_front() {
            Some((payload, peer)) => {
                let len = payload.len().min(buf.len());
                buf[..len].copy_from_slice(&payload[..len]);
                Ok(Some((len, peer)))
            }
            None => {
                if let Some(signal) = &self.shutdown {
                    signal.trigger();
                }
                Ok(None)
            }
        }
    }

    fn send_to(&mut self, payload: &[u8], peer: SocketAddr) -> Result<(), TransportError> {
        self.sent.push((payload.to_vec(), peer));
        Ok(())
    }
}
