//! # Domain Module
//!
//! Wire types, authentication and path policy. No I/O.

pub mod command;
pub mod context;
pub mod envelope;
pub mod errors;
pub mod policy;
pub mod security;

pub use command::{Acknowledgement, Command, CorrelationId};
pub use context::RequestContext;
pub use envelope::{
    is_health_probe, RequestEnvelope, ResponseEnvelope, HEALTH_TOKEN, MAX_DATAGRAM_SIZE,
};
pub use errors::{
    AuthError, ControllerError, DecodeError, DispatchError, EncodeError, InboundError, SignError,
    NOT_IMPLEMENTED,
};
pub use policy::{MediaPolicy, PathRejection};
pub use security::{Authenticator, DigestAlgorithm, SharedSecret, UnknownDigestAlgorithm};
