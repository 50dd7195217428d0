//! # Integration Tests
//!
//! End-to-end flows against a daemon on loopback UDP.

pub mod loopback;
