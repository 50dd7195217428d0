//! # Message Authentication
//!
//! Keyed digests binding a message body to its declared timestamp and the
//! shared secret.
//!
//! ## Scheme
//!
//! ```text
//! request:  hmac = HMAC(key = secret || decimal(command.time), data = message)
//! response: hmac = HMAC(key = secret || decimal(ack.time),     data = message)
//! ```
//!
//! Digests travel as hex and compare case-insensitively. The key material
//! itself is never transmitted.
//!
//! ## Known Limitation
//!
//! The per-message key is derived from a client-chosen timestamp, not a
//! server-issued nonce. A byte-for-byte replay of a captured envelope
//! verifies again. Closing this requires a protocol change on both ends.

use hmac::digest::{InvalidLength, KeyInit};
use hmac::{Hmac, Mac};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use zeroize::Zeroizing;

use super::command::{Acknowledgement, Command};
use super::envelope::{RequestEnvelope, ResponseEnvelope};
use super::errors::{AuthError, SignError};

type HmacMd5 = Hmac<Md5>;
type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// DIGEST ALGORITHM
// =============================================================================

/// Hash function underlying the HMAC.
///
/// `Md5` is the historical default and stays wire compatible with existing
/// clients. Both ends of a deployment must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// HMAC-MD5.
    #[default]
    Md5,
    /// HMAC-SHA256.
    Sha256,
}

impl DigestAlgorithm {
    /// Configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Sha256 => "sha256",
        }
    }

    fn compute(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, InvalidLength> {
        match self {
            DigestAlgorithm::Md5 => compute_mac::<HmacMd5>(key, data),
            DigestAlgorithm::Sha256 => compute_mac::<HmacSha256>(key, data),
        }
    }

    fn matches(&self, key: &[u8], data: &[u8], expected: &[u8]) -> Result<bool, InvalidLength> {
        match self {
            DigestAlgorithm::Md5 => verify_mac::<HmacMd5>(key, data, expected),
            DigestAlgorithm::Sha256 => verify_mac::<HmacSha256>(key, data, expected),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognized digest algorithm name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown digest algorithm '{0}' (expected md5 or sha256)")]
pub struct UnknownDigestAlgorithm(pub String);

impl FromStr for DigestAlgorithm {
    type Err = UnknownDigestAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(DigestAlgorithm::Md5),
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            _ => Err(UnknownDigestAlgorithm(s.to_string())),
        }
    }
}

fn compute_mac<M: Mac + KeyInit>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, InvalidLength> {
    let mut mac = <M as Mac>::new_from_slice(key)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn verify_mac<M: Mac + KeyInit>(
    key: &[u8],
    data: &[u8],
    expected: &[u8],
) -> Result<bool, InvalidLength> {
    let mut mac = <M as Mac>::new_from_slice(key)?;
    mac.update(data);
    // Constant-time comparison
    Ok(mac.verify_slice(expected).is_ok())
}

// =============================================================================
// SHARED SECRET
// =============================================================================

/// Pre-shared secret. Zeroed on drop and redacted from `Debug`.
#[derive(Clone)]
pub struct SharedSecret(Zeroizing<Vec<u8>>);

impl SharedSecret {
    /// Wrap secret bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    /// Whether the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Per-message key: `secret || decimal(stamp)`.
    fn key_material(&self, stamp: i64) -> Zeroizing<Vec<u8>> {
        let suffix = stamp.to_string();
        let mut key = Zeroizing::new(Vec::with_capacity(self.0.len() + suffix.len()));
        key.extend_from_slice(&self.0);
        key.extend_from_slice(suffix.as_bytes());
        key
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

impl From<&str> for SharedSecret {
    fn from(secret: &str) -> Self {
        Self::new(secret.as_bytes())
    }
}

// =============================================================================
// AUTHENTICATOR
// =============================================================================

/// Signs and verifies envelopes with the shared secret.
///
/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Authenticator {
    secret: SharedSecret,
    algorithm: DigestAlgorithm,
}

impl Authenticator {
    /// Create an authenticator.
    pub fn new(secret: SharedSecret, algorithm: DigestAlgorithm) -> Self {
        Self { secret, algorithm }
    }

    /// Digest algorithm in use.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Verify a request envelope and return the command it carries.
    ///
    /// Parses `message` first because its `time` is part of the key.
    pub fn authenticate(&self, envelope: &RequestEnvelope) -> Result<Command, AuthError> {
        let command = Command::decode(&envelope.message).map_err(AuthError::MalformedMessage)?;
        self.check(&envelope.message, command.time.as_i64(), &envelope.hmac)?;
        Ok(command)
    }

    /// Whether a request envelope is authentic. Never fails.
    pub fn verify(&self, envelope: &RequestEnvelope) -> bool {
        self.authenticate(envelope).is_ok()
    }

    /// Hex digest of `body` keyed with `send_time`.
    pub fn sign(&self, body: &str, send_time: i64) -> Result<String, SignError> {
        let key = self.secret.key_material(send_time);
        let digest = self
            .algorithm
            .compute(&key, body.as_bytes())
            .map_err(|_| SignError::InvalidKey)?;
        Ok(hex::encode(digest))
    }

    /// Encode and sign a command as a client would.
    pub fn sign_request(&self, command: &Command) -> Result<RequestEnvelope, SignError> {
        let message = command.encode()?;
        let hmac = self.sign(&message, command.time.as_i64())?;
        Ok(RequestEnvelope { message, hmac })
    }

    /// Verify a response envelope and return its acknowledgement.
    pub fn authenticate_response(
        &self,
        envelope: &ResponseEnvelope,
    ) -> Result<Acknowledgement, AuthError> {
        let ack =
            Acknowledgement::decode(&envelope.message).map_err(AuthError::MalformedMessage)?;
        self.check(&envelope.message, ack.time, &envelope.hmac)?;
        Ok(ack)
    }

    fn check(&self, body: &str, stamp: i64, claimed_hex: &str) -> Result<(), AuthError> {
        // hex::decode accepts either case
        let claimed = hex::decode(claimed_hex).map_err(|_| AuthError::MalformedDigest)?;
        let key = self.secret.key_material(stamp);
        let matches = self
            .algorithm
            .matches(&key, body.as_bytes(), &claimed)
            .map_err(|_| AuthError::InvalidKey)?;

        if matches {
            Ok(())
        } else {
            Err(AuthError::DigestMismatch)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
