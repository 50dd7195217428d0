//! # Remote Runtime
//!
//! Wires the configured adapters into a transport loop.
//!
//! ## Startup Sequence
//!
//! 1. Build the authenticator from the validated config
//! 2. Bind the UDP socket with the configured read timeout
//! 3. Wrap the controller in the media policy
//! 4. Run the loop on a dedicated blocking thread until shutdown

use std::net::SocketAddr;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::info;

use remote_control::{
    ConfigError, LoggingController, LoopStats, PlaybackController, PolicyController,
    RemoteConfig, RemoteControlService, ShutdownSignal, SystemTimeSource, TransportError,
    TransportLoop, UdpDatagramTransport,
};

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The socket could not be bound.
    #[error("failed to bind socket: {0}")]
    Transport(#[from] TransportError),

    /// The worker thread could not be started.
    #[error("failed to spawn transport thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker thread panicked.
    #[error("transport thread panicked")]
    WorkerPanicked,
}

/// The daemon's default controller stack.
pub type DefaultController = PolicyController<LoggingController>;

type Loop<C> = TransportLoop<UdpDatagramTransport, RemoteControlService<C, SystemTimeSource>>;

/// A bound, not yet running, remote-control daemon.
pub struct RemoteRuntime<C: PlaybackController> {
    transport_loop: Loop<C>,
    local_addr: SocketAddr,
}

impl RemoteRuntime<DefaultController> {
    /// Bind with the logging controller behind the configured media policy.
    pub fn bind(config: &RemoteConfig) -> Result<Self, RuntimeError> {
        let controller = PolicyController::new(LoggingController, config.media.clone());
        Self::bind_with_controller(config, controller)
    }
}

impl<C: PlaybackController> RemoteRuntime<C> {
    /// Bind with a caller-supplied controller.
    pub fn bind_with_controller(config: &RemoteConfig, controller: C) -> Result<Self, RuntimeError> {
        let authenticator = config.authenticator()?;
        let digest = authenticator.algorithm();
        let transport = UdpDatagramTransport::bind(config.listen_addr()?, config.read_timeout())?;
        let local_addr = transport.local_addr()?;

        let service = RemoteControlService::new(authenticator, controller, SystemTimeSource);
        let transport_loop = TransportLoop::new(transport, service, ShutdownSignal::new());

        info!(%local_addr, %digest, "remote control listening");
        Ok(Self {
            transport_loop,
            local_addr,
        })
    }

    /// Bound address; resolves port 0 to the assigned port.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle that stops the loop after its current cycle.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.transport_loop.shutdown_signal()
    }

    /// Run on the calling thread until shutdown.
    pub fn run_blocking(mut self) -> LoopStats {
        self.transport_loop.run()
    }
}

impl<C: PlaybackController + 'static> RemoteRuntime<C> {
    /// Run on a dedicated thread.
    pub fn spawn(self) -> Result<RuntimeHandle, RuntimeError> {
        let local_addr = self.local_addr;
        let shutdown = self.shutdown_signal();
        let worker = thread::Builder::new()
            .name("transport-loop".to_string())
            .spawn(move || self.run_blocking())
            .map_err(RuntimeError::Spawn)?;

        Ok(RuntimeHandle {
            worker,
            shutdown,
            local_addr,
        })
    }
}

/// A runtime running on its own thread.
#[derive(Debug)]
pub struct RuntimeHandle {
    worker: JoinHandle<LoopStats>,
    shutdown: ShutdownSignal,
    local_addr: SocketAddr,
}

impl RuntimeHandle {
    /// Bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signal shutdown and wait for the loop to finish.
    ///
    /// Returns within one read timeout plus the in-flight cycle.
    pub fn stop(self) -> Result<LoopStats, RuntimeError> {
        self.shutdown.trigger();
        self.worker.join().map_err(|_| RuntimeError::WorkerPanicked)
    }
}
