//! # Remote Runtime Library
//!
//! Exposes the daemon's wiring for tests. The entry point is `main.rs`.
//!
//! - `runtime` - binds the socket and runs the transport loop
//! - `telemetry` - installs the `tracing` subscriber

#![warn(missing_docs)]

pub mod runtime;
pub mod telemetry;

pub use runtime::{DefaultController, RemoteRuntime, RuntimeError, RuntimeHandle};
pub use telemetry::{init_logging, TelemetryError};
