//! # Envelope Codec
//!
//! Outer wire structures. Each carries an opaque JSON `message` string and
//! its hex digest.
//!
//! ```text
//! request:  {"message": "<JSON Command>", "hmac": "<hex>"}   or  health
//! response: {"hmac": "<hex>", "message": "<JSON Acknowledgement>"}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::errors::{DecodeError, EncodeError};

/// Largest datagram payload accepted or produced.
pub const MAX_DATAGRAM_SIZE: usize = 1024;

/// Unauthenticated liveness probe payload.
pub const HEALTH_TOKEN: &[u8] = b"health";

/// Whether a raw datagram is the health bypass token.
pub fn is_health_probe(payload: &[u8]) -> bool {
    payload == HEALTH_TOKEN
}

/// Signed request as sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Encoded `Command`, exactly as signed.
    pub message: String,
    /// Hex digest of `message`.
    pub hmac: String,
}

impl RequestEnvelope {
    /// Decode a raw datagram.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        decode_datagram(payload)
    }

    /// Encode into a datagram payload.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Signed response as sent by the listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Hex digest of `message`.
    pub hmac: String,
    /// Encoded `Acknowledgement`, exactly as signed.
    pub message: String,
}

impl ResponseEnvelope {
    /// Decode a raw datagram.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        decode_datagram(payload)
    }

    /// Encode into a datagram payload.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(self)?)
    }
}

fn decode_datagram<T: DeserializeOwned>(payload: &[u8]) -> Result<T, DecodeError> {
    if payload.len() > MAX_DATAGRAM_SIZE {
        return Err(DecodeError::Oversize {
            size: payload.len(),
            max: MAX_DATAGRAM_SIZE,
        });
    }
    let text = std::str::from_utf8(payload)?;
    Ok(serde_json::from_str(text)?)
}
