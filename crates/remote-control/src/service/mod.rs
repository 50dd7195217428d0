//! # Remote Control Service
//!
//! The receive→respond cycle and the loop that drives it.
//!
//! ## Architecture
//!
//! This service:
//! 1. Implements `DatagramHandler` for one datagram at a time
//! 2. Dispatches authenticated commands to a `PlaybackController`
//! 3. Signs every acknowledgement with its own send time
//! 4. Uses dependency injection for the player, socket and clock

mod dispatcher;
mod handler;
mod signer;
mod transport_loop;

pub use dispatcher::{dispatch, try_dispatch, DispatchOutcome, Invocation, Operation};
pub use handler::RemoteControlService;
pub use signer::ResponseSigner;
pub use transport_loop::{
    receive_backoff, LoopState, LoopStats, ShutdownSignal, TransportLoop,
    MAX_RECEIVE_ERROR_BACKOFF, RECEIVE_ERROR_BACKOFF,
};
