//! # Transport Loop
//!
//! Single worker that owns the socket and processes datagrams strictly one
//! at a time.
//!
//! ```text
//!            ┌──────────────────────┐   datagram    ┌────────────┐
//!   start ──→│ WaitingForDatagram   │──────────────→│ Processing │
//!            └──────────────────────┘←──────────────└────────────┘
//!                     │               one cycle done
//!                     └─ shutdown ──→ stop
//! ```
//!
//! A datagram arriving mid-cycle waits in the socket buffer. There is no
//! per-request timeout: a controller call that hangs stalls the loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::MAX_DATAGRAM_SIZE;
use crate::ports::{DatagramHandler, DatagramTransport};

/// First pause after a receive error.
pub const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_millis(10);

/// Longest pause between failing receives.
pub const MAX_RECEIVE_ERROR_BACKOFF: Duration = Duration::from_millis(500);

/// Cooperative shutdown flag shared with the process layer.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    /// Create an untriggered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop after the current cycle.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown was requested.
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Blocked on the socket.
    WaitingForDatagram,
    /// Handling one datagram.
    Processing,
}

/// Counters accumulated over the loop's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Datagrams received.
    pub received: u64,
    /// Responses sent.
    pub responded: u64,
    /// Datagrams discarded without a response.
    pub dropped: u64,
    /// Responses that failed to send.
    pub send_failures: u64,
    /// Receive errors other than timeouts.
    pub receive_errors: u64,
}

/// Owns the transport and drives the handler.
pub struct TransportLoop<Tr: DatagramTransport, H: DatagramHandler> {
    transport: Tr,
    handler: H,
    shutdown: ShutdownSignal,
    state: LoopState,
    stats: LoopStats,
    consecutive_receive_errors: u32,
    // One byte over the limit so oversize datagrams are detectable.
    buffer: Box<[u8]>,
}

impl<Tr: DatagramTransport, H: DatagramHandler> TransportLoop<Tr, H> {
    /// Create a loop over `transport`.
    pub fn new(transport: Tr, handler: H, shutdown: ShutdownSignal) -> Self {
        Self {
            transport,
            handler,
            shutdown,
            state: LoopState::WaitingForDatagram,
            stats: LoopStats::default(),
            consecutive_receive_errors: 0,
            buffer: vec![0u8; MAX_DATAGRAM_SIZE + 1].into_boxed_slice(),
        }
    }

    /// Current state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Counters so far.
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Receive errors since the last successful read or timeout.
    pub fn consecutive_receive_errors(&self) -> u32 {
        self.consecutive_receive_errors
    }

    /// The transport.
    pub fn transport(&self) -> &Tr {
        &self.transport
    }

    /// The handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Shutdown handle.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Run until shutdown is triggered. Blocks the calling thread.
    pub fn run(&mut self) -> LoopStats {
        info!("transport loop started");
        while !self.shutdown.is_triggered() {
            self.poll_once();
        }
        info!(
            received = self.stats.received,
            responded = self.stats.responded,
            dropped = self.stats.dropped,
            "transport loop stopped"
        );
        self.stats
    }

    /// Wait for at most one datagram and process it.
    ///
    /// Returns `true` if a datagram was processed.
    pub fn poll_once(&mut self) -> bool {
        self.state = LoopState::WaitingForDatagram;

        let (len, peer) = match self.transport.recv_from(&mut self.buffer) {
            Ok(Some(received)) => {
                self.consecutive_receive_errors = 0;
                received
            }
            Ok(None) => {
                self.consecutive_receive_errors = 0;
                return false;
            }
            Err(e) => {
                self.stats.receive_errors += 1;
                self.consecutive_receive_errors = self.consecutive_receive_errors.saturating_add(1);
                let consecutive = self.consecutive_receive_errors;
                // Log on 1, 2, 4, 8, ... consecutive failures only.
                if consecutive.is_power_of_two() {
                    warn!(error = %e, consecutive, "receive failed");
                }
                std::thread::sleep(receive_backoff(consecutive));
                return false;
            }
        };

        self.state = LoopState::Processing;
        self.stats.received += 1;

        match self.handler.handle_datagram(&self.buffer[..len], peer) {
            Some(outbound) => match self.transport.send_to(&outbound.payload, outbound.peer) {
                Ok(()) => self.stats.responded += 1,
                Err(e) => {
                    self.stats.send_failures += 1;
                    warn!(peer = %outbound.peer, error = %e, "failed to send response");
                }
            },
            None => {
                self.stats.dropped += 1;
                debug!(%peer, "no response sent");
            }
        }

        self.state = LoopState::WaitingForDatagram;
        true
    }
}

/// Exponential pause after `consecutive` failed receives (capped at 500ms).
pub fn receive_backoff(consecutive: u32) -> Duration {
    let doublings = consecutive.saturating_sub(1).min(16);
    RECEIVE_ERROR_BACKOFF
        .saturating_mul(1u32 << doublings)
        .min(MAX_RECEIVE_ERROR_BACKOFF)
}
