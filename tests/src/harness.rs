//! # Test Harness
//!
//! A daemon bound to an ephemeral loopback port with a recording controller
//! behind the media policy, plus clients pointed at it.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use remote_control::test_utils::RecordingController;
use remote_control::{
    Authenticator, DigestAlgorithm, LoopStats, MediaPolicy, PolicyController, RemoteClient,
    RemoteConfig, SharedSecret,
};
use remote_runtime::{RemoteRuntime, RuntimeHandle};

/// Secret shared by the harness daemon and its clients.
pub const SECRET: &str = "integration-secret";

/// Media root the harness policy confines `play` to.
pub const MEDIA_ROOT: &str = "/srv/media";

/// Client timeout for exchanges expected to succeed.
pub const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Client timeout for exchanges expected to be dropped.
pub const SILENCE_TIMEOUT: Duration = Duration::from_millis(300);

/// Loopback config with a short read timeout.
pub fn config(digest: DigestAlgorithm) -> RemoteConfig {
    let mut config = RemoteConfig::default();
    config.network.bind_address = "127.0.0.1".to_string();
    config.network.port = 0;
    config.network.read_timeout_ms = 20;
    config.security.secret = Some(SECRET.to_string());
    config.security.digest = digest;
    config.media = MediaPolicy {
        root: PathBuf::from(MEDIA_ROOT),
        allow_hidden: false,
        filetypes: vec!["mkv".to_string(), "mp4".to_string()],
    };
    config
}

/// Authenticator matching the harness daemon.
pub fn authenticator(digest: DigestAlgorithm) -> Authenticator {
    Authenticator::new(SharedSecret::from(SECRET), digest)
}

/// A running daemon. Stopped on drop.
pub struct Daemon {
    handle: Option<RuntimeHandle>,
    controller: RecordingController,
    addr: SocketAddr,
    digest: DigestAlgorithm,
}

impl Daemon {
    /// Start with the default (md5) config.
    pub fn start() -> Self {
        Self::start_with(&config(DigestAlgorithm::Md5))
    }

    /// Start with `config`.
    pub fn start_with(config: &RemoteConfig) -> Self {
        let controller = RecordingController::new();
        let guarded = PolicyController::new(controller.clone(), config.media.clone());
        let runtime =
            RemoteRuntime::bind_with_controller(config, guarded).expect("daemon should bind");
        let addr = runtime.local_addr();
        let handle = runtime.spawn().expect("daemon thread should start");

        Self {
            handle: Some(handle),
            controller,
            addr,
            digest: config.security.digest,
        }
    }

    /// Daemon address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Calls that reached the player.
    pub fn controller(&self) -> &RecordingController {
        &self.controller
    }

    /// Client with the right secret and digest.
    pub fn client(&self) -> RemoteClient {
        self.client_with(authenticator(self.digest), REPLY_TIMEOUT)
    }

    /// Client with arbitrary credentials.
    pub fn client_with(&self, authenticator: Authenticator, timeout: Duration) -> RemoteClient {
        RemoteClient::connect(self.addr, authenticator, timeout).expect("client should bind")
    }

    /// Stop the daemon and return its counters.
    pub fn stop(mut self) -> LoopStats {
        self.handle
            .take()
            .expect("daemon runs until stopped")
            .stop()
            .expect("daemon thread should not panic")
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.stop();
        }
    }
}
