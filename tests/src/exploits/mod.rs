//! # Attack Simulations
//!
//! Forgery, tampering, replay and malformed-input attempts against a live
//! daemon. Each test states whether the attack is expected to succeed.

pub mod forgery;
