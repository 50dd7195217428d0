//! # Adapters
//!
//! Concrete implementations of the driven ports, plus configuration.
//!
//! - `udp` - `DatagramTransport` over `std::net::UdpSocket`
//! - `time` - `TimeSource` from the system clock
//! - `controller` - logging player and media-policy guard
//! - `config` - TOML + environment configuration

pub mod config;
pub mod controller;
pub mod time;
pub mod udp;

pub use config::{ConfigError, LoggingConfig, NetworkConfig, RemoteConfig, SecurityConfig};
pub use controller::{LoggingController, PolicyController};
pub use time::SystemTimeSource;
pub use udp::UdpDatagramTransport;
