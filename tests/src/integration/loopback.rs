//! # Loopback Flows
//!
//! Real sockets, real clock: client → daemon → recording player → signed
//! acknowledgement back to the client.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use remote_control::test_utils::ControllerCall;
    use remote_control::{ClientError, Command, DigestAlgorithm, RemoteClient, RemoteConfig};
    use remote_runtime::RemoteRuntime;
    use serde_json::Value;

    use crate::harness::{self, Daemon, SILENCE_TIMEOUT};

    #[test]
    fn test_health_probe_round_trip() {
        let daemon = Daemon::start();
        let ack = daemon.client().health().unwrap();

        assert_eq!(ack.action, None);
        assert!(ack.result);
        assert_eq!(ack.message, None);
        assert!(daemon.controller().calls().is_empty());
    }

    #[test]
    fn test_play_reaches_player_under_media_root() {
        let daemon = Daemon::start();
        let mut client = daemon.client();
        let command = client.command("play").with_field("path", "films/a.mkv");

        let ack = client.send(&command).unwrap();

        assert_eq!(ack.action, Some(command.time));
        assert!(ack.result);
        assert_eq!(
            daemon.controller().calls(),
            vec![ControllerCall::Play("/srv/media/films/a.mkv".to_string())]
        );
    }

    #[test]
    fn test_policy_rejection_is_a_plain_failure() {
        let daemon = Daemon::start();
        let ack = daemon
            .client()
            .invoke("play", Some(("path", Value::from("../../etc/passwd"))))
            .unwrap();

        assert!(!ack.result);
        assert_eq!(ack.message, None);
        assert!(daemon.controller().calls().is_empty());
    }

    #[test]
    fn test_every_operation_round_trips() {
        let daemon = Daemon::start();
        let mut client = daemon.client();

        let requests = [
            ("pause", Some(("state", Value::from(true)))),
            ("stop", None),
            ("seek", Some(("seconds", Value::from(-5.5)))),
            ("set_volume", Some(("volume", Value::from(40)))),
            ("set_subtitles", Some(("track", Value::from(3)))),
            ("fullscreen", Some(("state", Value::from(false)))),
            ("mute", Some(("state", Value::from(true)))),
        ];
        for (operation, argument) in requests {
            let ack = client.invoke(operation, argument).unwrap();
            assert!(ack.result, "{operation}");
        }

        assert_eq!(
            daemon.controller().calls(),
            vec![
                ControllerCall::Pause(true),
                ControllerCall::Stop,
                ControllerCall::Seek(-5.5),
                ControllerCall::SetVolume(40.0),
                ControllerCall::SetSubtitles(3),
                ControllerCall::Fullscreen(false),
                ControllerCall::Mute(true),
            ]
        );
    }

    #[test]
    fn test_validation_failures_are_acknowledged() {
        let daemon = Daemon::start();
        let mut client = daemon.client();

        let missing = client.invoke("seek", None).unwrap();
        assert!(!missing.result);
        assert_eq!(missing.message.as_deref(), Some("missing field 'seconds'"));

        let unknown = client.invoke("rewind", None).unwrap();
        assert!(!unknown.result);
        assert_eq!(unknown.message.as_deref(), Some("not implemented"));

        assert!(daemon.controller().calls().is_empty());
    }

    #[test]
    fn test_acknowledgement_is_stamped_with_send_time() {
        let daemon = Daemon::start();
        let mut client = daemon.client();
        let command = client.command("stop");

        let ack = client.send(&command).unwrap();

        // Clocks are shared on loopback, so the ack cannot predate the request.
        assert!(ack.time >= command.time.as_i64());
    }

    #[test]
    fn test_two_clients_get_their_own_acknowledgements() {
        let daemon = Daemon::start();
        let mut first = daemon.client();
        let mut second = daemon.client();

        let a = first.command("mute").with_field("state", true);
        let b = Command::new(a.time.as_i64() + 1, "mute").with_field("state", false);

        assert_eq!(first.send(&a).unwrap().action, Some(a.time));
        assert_eq!(second.send(&b).unwrap().action, Some(b.time));
    }

    #[test]
    fn test_sha256_deployment() {
        let daemon = Daemon::start_with(&harness::config(DigestAlgorithm::Sha256));

        let ack = daemon.client().invoke("stop", None).unwrap();
        assert!(ack.result);

        let mut md5_client =
            daemon.client_with(harness::authenticator(DigestAlgorithm::Md5), SILENCE_TIMEOUT);
        assert!(matches!(
            md5_client.invoke("stop", None),
            Err(ClientError::Timeout(_))
        ));
        assert_eq!(daemon.controller().calls().len(), 1);
    }

    #[test]
    fn test_stop_reports_counters() {
        let daemon = Daemon::start();
        let mut client = daemon.client();
        client.health().unwrap();
        client.invoke("stop", None).unwrap();
        client.send_raw(b"garbage").unwrap();
        // Datagrams are handled in order, so this reply follows the drop.
        client.health().unwrap();
        let stats = daemon.stop();

        assert_eq!(stats.received, 4);
        assert_eq!(stats.responded, 3);
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_daemon_from_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[network]\nbind_address = \"127.0.0.1\"\nport = 0\nread_timeout_ms = 20\n\
             [security]\nsecret = \"{}\"\n",
            harness::SECRET
        )
        .unwrap();

        let mut config =
            RemoteConfig::parse(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        config.media.root = harness::MEDIA_ROOT.into();
        let handle = RemoteRuntime::bind(&config).unwrap().spawn().unwrap();

        let mut client = RemoteClient::connect(
            handle.local_addr(),
            harness::authenticator(DigestAlgorithm::Md5),
            harness::REPLY_TIMEOUT,
        )
        .unwrap();
        assert!(client.health().unwrap().result);
        assert!(client.invoke("play", Some(("path", Value::from("a.mkv")))).unwrap().result);

        handle.stop().unwrap();
    }
}
