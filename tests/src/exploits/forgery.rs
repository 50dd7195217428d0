//! # Forgery and Replay
//!
//! | Attack | Expected |
//! |--------|----------|
//! | Wrong secret | dropped, no reply |
//! | Body tampered after signing | dropped |
//! | `time` rewritten to re-key the digest | dropped |
//! | Upper-case digest | accepted (hex is case-insensitive) |
//! | Byte-for-byte replay | **accepted**; no nonce tracking |
//! | Oversize datagram | dropped, daemon keeps serving |
//! | Garbage flood | dropped, daemon keeps serving |

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;
    use std::net::UdpSocket;

    use remote_control::test_utils::ControllerCall;
    use remote_control::{
        Authenticator, ClientError, Command, DigestAlgorithm, RequestEnvelope, SharedSecret,
        MAX_DATAGRAM_SIZE,
    };

    use crate::harness::{self, Daemon, SILENCE_TIMEOUT};

    fn signed(command: &Command) -> RequestEnvelope {
        harness::authenticator(DigestAlgorithm::Md5)
            .sign_request(command)
            .unwrap()
    }

    fn expect_silence(daemon: &Daemon, payload: &[u8]) {
        let mut client =
            daemon.client_with(harness::authenticator(DigestAlgorithm::Md5), SILENCE_TIMEOUT);
        client.send_raw(payload).unwrap();
        assert!(matches!(client.receive(), Err(ClientError::Timeout(_))));
    }

    #[test]
    fn test_wrong_secret_gets_no_reply() {
        let daemon = Daemon::start();
        let attacker = Authenticator::new(SharedSecret::from("guessed"), DigestAlgorithm::Md5);
        let payload = attacker
            .sign_request(&Command::new(1, "stop"))
            .unwrap()
            .encode()
            .unwrap();

        expect_silence(&daemon, &payload);
        assert!(daemon.controller().calls().is_empty());
    }

    #[test]
    fn test_tampered_body_gets_no_reply() {
        let daemon = Daemon::start();
        let mut envelope = signed(&Command::new(1, "set_volume").with_field("volume", 10));
        envelope.message = envelope.message.replace("10", "100");

        expect_silence(&daemon, &envelope.encode().unwrap());
        assert!(daemon.controller().calls().is_empty());
    }

    #[test]
    fn test_rewritten_time_gets_no_reply() {
        let daemon = Daemon::start();
        let mut envelope = signed(&Command::new(1_000, "stop"));
        envelope.message = envelope.message.replace("1000", "2000");

        expect_silence(&daemon, &envelope.encode().unwrap());
        assert!(daemon.controller().calls().is_empty());
    }

    #[test]
    fn test_uppercase_digest_is_accepted() {
        let daemon = Daemon::start();
        let mut envelope = signed(&Command::new(5, "stop"));
        envelope.hmac = envelope.hmac.to_ascii_uppercase();

        let mut client = daemon.client();
        client.send_raw(&envelope.encode().unwrap()).unwrap();
        let ack = client.receive().unwrap();

        assert_eq!(ack.action.map(|id| id.as_i64()), Some(5));
        assert_eq!(daemon.controller().calls(), vec![ControllerCall::Stop]);
    }

    #[test]
    fn test_replay_is_executed_again() {
        let daemon = Daemon::start();
        let payload = signed(&Command::new(42, "mute").with_field("state", true))
            .encode()
            .unwrap();

        let mut client = daemon.client();
        for _ in 0..2 {
            client.send_raw(&payload).unwrap();
            assert!(client.receive().unwrap().result);
        }

        assert_eq!(
            daemon.controller().calls(),
            vec![ControllerCall::Mute(true), ControllerCall::Mute(true)]
        );
    }

    #[test]
    fn test_oversize_datagram_is_dropped_and_daemon_survives() {
        let daemon = Daemon::start();
        let path = "x".repeat(MAX_DATAGRAM_SIZE);
        let payload = signed(&Command::new(7, "play").with_field("path", path))
            .encode()
            .unwrap();
        assert!(payload.len() > MAX_DATAGRAM_SIZE);

        // The client transport refuses to send oversize datagrams; use a bare socket.
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_read_timeout(Some(SILENCE_TIMEOUT)).unwrap();
        assert_eq!(socket.send_to(&payload, daemon.addr()).unwrap(), payload.len());

        let mut reply = [0u8; MAX_DATAGRAM_SIZE + 1];
        let err = socket.recv_from(&mut reply).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut));

        assert!(daemon.client().health().unwrap().result);
        assert!(daemon.controller().calls().is_empty());
        assert_eq!(daemon.stop().dropped, 1);
    }

    #[test]
    fn test_garbage_flood_is_dropped_and_daemon_survives() {
        let daemon = Daemon::start();
        let mut client = daemon.client();
        let junk: [&[u8]; 5] = [
            b"",
            b"\x00\x01\x02",
            b"{\"message\": 1, \"hmac\": 2}",
            b"{\"message\": \"{}\", \"hmac\": \"zz\"}",
            b"health ",
        ];
        for payload in junk {
            client.send_raw(payload).unwrap();
        }

        assert!(client.health().unwrap().result);
        assert!(daemon.controller().calls().is_empty());
    }
}
