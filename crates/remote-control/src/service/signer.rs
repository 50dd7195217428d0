//! # Response Signer
//!
//! Builds the acknowledgement for a finished cycle, signs it with the send
//! time as key material and addresses it to the requesting peer.

use std::sync::Arc;

use super::dispatcher::DispatchOutcome;
use crate::domain::{Acknowledgement, Authenticator, RequestContext, ResponseEnvelope, SignError};
use crate::ports::{OutboundDatagram, TimeSource};

/// Signs acknowledgements.
pub struct ResponseSigner<T: TimeSource> {
    authenticator: Arc<Authenticator>,
    clock: T,
}

impl<T: TimeSource> ResponseSigner<T> {
    /// Create a signer sharing `authenticator` with the verifier.
    pub fn new(authenticator: Arc<Authenticator>, clock: T) -> Self {
        Self {
            authenticator,
            clock,
        }
    }

    /// Close out a cycle.
    ///
    /// Consumes `context`; the peer and correlation id are gone once the
    /// datagram is built.
    pub fn acknowledge(
        &self,
        context: RequestContext,
        outcome: DispatchOutcome,
    ) -> Result<OutboundDatagram, SignError> {
        let (peer, action) = context.into_parts();
        let send_time = self.clock.now_millis();

        let ack = Acknowledgement {
            action,
            time: send_time,
            result: outcome.success,
            message: outcome.diagnostic,
        };
        let message = ack.encode()?;
        let hmac = self.authenticator.sign(&message, send_time)?;
        let payload = ResponseEnvelope { hmac, message }.encode()?;

        Ok(OutboundDatagram { peer, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CorrelationId, DigestAlgorithm, SharedSecret};
    use crate::test_utils::FixedTimeSource;

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(
            SharedSecret::from("secret"),
            DigestAlgorithm::Md5,
        ))
    }

    #[test]
    fn test_acknowledge_echoes_correlation_and_signs_with_send_time() {
        let auth = authenticator();
        let signer = ResponseSigner::new(Arc::clone(&auth), FixedTimeSource(1_700_000_000_999));
        let peer = "10.0.0.5:5555".parse().unwrap();
        let context = RequestContext::new(peer).correlate(CorrelationId::new(42));

        let datagram = signer
            .acknowledge(context, DispatchOutcome::completed(true))
            .unwrap();
        let envelope = ResponseEnvelope::decode(&datagram.payload).unwrap();
        let ack = auth.authenticate_response(&envelope).unwrap();

        assert_eq!(datagram.peer, peer);
        assert_eq!(
            ack,
            Acknowledgement {
                action: Some(CorrelationId::new(42)),
                time: 1_700_000_000_999,
                result: true,
                message: None,
            }
        );
        assert_eq!(envelope.hmac, auth.sign(&envelope.message, ack.time).unwrap());
    }

    #[test]
    fn test_acknowledge_failure_carries_diagnostic() {
        let signer = ResponseSigner::new(authenticator(), FixedTimeSource(5));
        let context = RequestContext::new("127.0.0.1:9".parse().unwrap());
        let outcome = DispatchOutcome {
            success: false,
            diagnostic: Some("missing field 'path'".to_string()),
        };

        let datagram = signer.acknowledge(context, outcome).unwrap();
        let envelope = ResponseEnvelope::decode(&datagram.payload).unwrap();

        assert_eq!(
            envelope.message,
            r#"{"action":null,"time":5,"result":false,"message":"missing field 'path'"}"#
        );
    }
}
