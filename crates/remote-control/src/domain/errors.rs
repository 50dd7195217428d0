//! # Domain Errors
//!
//! Error taxonomy for the remote-control protocol.
//!
//! | Error | Raised by | Outcome on the wire |
//! |-------|-----------|---------------------|
//! | `DecodeError` | envelope codec | silent drop |
//! | `AuthError` | authenticator | silent drop |
//! | `DispatchError::MissingField` | dispatcher | failed ack naming the field |
//! | other `DispatchError` | dispatcher | failed ack, `"not implemented"` |

use thiserror::Error;

/// Diagnostic returned for unknown commands and controller faults.
pub const NOT_IMPLEMENTED: &str = "not implemented";

/// Failure to turn raw transport bytes into a protocol value.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The datagram is larger than the protocol allows.
    #[error("datagram of {size} bytes exceeds the {max} byte limit")]
    Oversize {
        /// Bytes received.
        size: usize,
        /// Protocol limit.
        max: usize,
    },

    /// The payload is not UTF-8 text.
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The payload is not JSON of the expected shape.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to serialize a protocol value.
#[derive(Debug, Error)]
#[error("failed to encode message: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Authentication failure. Never reported to the sender.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The signed `message` does not decode into a command with a `time`.
    #[error("signed message is malformed: {0}")]
    MalformedMessage(#[source] DecodeError),

    /// The `hmac` field is not hexadecimal.
    #[error("hmac field is not valid hex")]
    MalformedDigest,

    /// The digest does not match the message.
    #[error("digest mismatch")]
    DigestMismatch,

    /// The MAC rejected the derived key material.
    #[error("key material rejected by the MAC")]
    InvalidKey,
}

/// Failure while producing a signature.
#[derive(Debug, Error)]
pub enum SignError {
    /// The body could not be serialized.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The MAC rejected the derived key material.
    #[error("key material rejected by the MAC")]
    InvalidKey,
}

/// Controller fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// The controller does not implement this operation.
    #[error("operation '{0}' is not supported")]
    Unsupported(&'static str),

    /// The player could not be reached.
    #[error("player unavailable: {0}")]
    Unavailable(String),

    /// The player rejected the call.
    #[error("{0}")]
    Failed(String),
}

/// Failure while executing an authenticated command.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A required field is absent. Reported back with the field name.
    #[error("missing field '{0}'")]
    MissingField(String),

    /// The `command` value matches no known operation.
    #[error("unknown command {0}")]
    UnknownCommand(String),

    /// A required field is present with the wrong JSON type.
    #[error("field '{field}' must be {expected}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Expected JSON type.
        expected: &'static str,
    },

    /// The operation table and the supplied argument disagree.
    #[error("operation '{0}' does not take the supplied argument")]
    ArgumentMismatch(&'static str),

    /// The controller reported a fault.
    #[error("controller fault: {0}")]
    Controller(#[from] ControllerError),

    /// The controller panicked.
    #[error("controller panicked during {0}")]
    ControllerPanicked(&'static str),
}

impl DispatchError {
    /// Whether this is a validation failure (missing field).
    pub fn is_validation(&self) -> bool {
        matches!(self, DispatchError::MissingField(_))
    }

    /// Text placed in the acknowledgement's `message` field.
    pub fn diagnostic(&self) -> String {
        match self {
            DispatchError::MissingField(field) => format!("missing field '{field}'"),
            _ => NOT_IMPLEMENTED.to_string(),
        }
    }
}

/// Reason an inbound datagram was discarded without a response.
#[derive(Debug, Error)]
pub enum InboundError {
    /// Envelope could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Envelope failed authentication.
    #[error(transparent)]
    Auth(#[from] AuthError),
}
