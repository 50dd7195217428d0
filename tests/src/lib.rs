//! # Media Remote Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs      # Daemon on loopback + client fixtures
//! ├── exploits/       # Attack simulations against a live daemon
//! └── integration/    # End-to-end request/acknowledgement flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p remote-tests
//!
//! # By category
//! cargo test -p remote-tests integration::
//! cargo test -p remote-tests exploits::
//! ```

pub mod exploits;
pub mod harness;
pub mod integration;
