//! remote-ctl: Media Remote control tool
//!
//! Sends one signed command (or a health probe) to a media-remote daemon,
//! waits for the acknowledgement, verifies its hmac and prints it.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use remote_control::{Authenticator, DigestAlgorithm, RemoteClient, SharedSecret};

/// remote-ctl: Media Remote control tool
#[derive(Parser, Debug)]
#[command(name = "remote-ctl")]
#[command(about = "Send a signed command to a media-remote daemon")]
struct Args {
    /// Daemon address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:5005")]
    server: String,

    /// Shared secret
    #[arg(long, env = "MR_SECRET", hide_env_values = true)]
    secret: String,

    /// HMAC digest (md5 or sha256)
    #[arg(long, env = "MR_DIGEST", default_value = "md5")]
    digest: DigestAlgorithm,

    /// Response timeout in milliseconds
    #[arg(long, default_value = "2000")]
    timeout_ms: u64,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Action {
    /// Unauthenticated liveness probe
    Health,
    /// Play a file
    Play { path: String },
    /// Pause (true) or resume (false)
    Pause {
        #[arg(action = ArgAction::Set)]
        state: bool,
    },
    /// Stop playback
    Stop,
    /// Seek relative to the current position
    Seek {
        #[arg(allow_negative_numbers = true)]
        seconds: f64,
    },
    /// Set the volume
    Volume { volume: f64 },
    /// Select a subtitle track
    Subtitles {
        #[arg(allow_negative_numbers = true)]
        track: i64,
    },
    /// Enter (true) or leave (false) fullscreen
    Fullscreen {
        #[arg(action = ArgAction::Set)]
        state: bool,
    },
    /// Mute (true) or unmute (false)
    Mute {
        #[arg(action = ArgAction::Set)]
        state: bool,
    },
}

impl Action {
    /// Wire operation and argument field, or `None` for the health probe.
    fn request(&self) -> Option<(&'static str, Option<(&'static str, Value)>)> {
        let request = match self {
            Action::Health => return None,
            Action::Play { path } => ("play", Some(("path", Value::from(path.as_str())))),
            Action::Pause { state } => ("pause", Some(("state", Value::from(*state)))),
            Action::Stop => ("stop", None),
            Action::Seek { seconds } => ("seek", Some(("seconds", Value::from(*seconds)))),
            Action::Volume { volume } => ("set_volume", Some(("volume", Value::from(*volume)))),
            Action::Subtitles { track } => ("set_subtitles", Some(("track", Value::from(*track)))),
            Action::Fullscreen { state } => ("fullscreen", Some(("state", Value::from(*state)))),
            Action::Mute { state } => ("mute", Some(("state", Value::from(*state)))),
        };
        Some(request)
    }
}

fn resolve(server: &str) -> Result<SocketAddr> {
    server
        .to_socket_addrs()
        .with_context(|| format!("cannot resolve {server}"))?
        .next()
        .with_context(|| format!("{server} resolved to no addresses"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let server = resolve(&args.server)?;
    let authenticator = Authenticator::new(SharedSecret::from(args.secret.as_str()), args.digest);
    let mut client =
        RemoteClient::connect(server, authenticator, Duration::from_millis(args.timeout_ms))
            .context("failed to open socket")?;

    let ack = match args.action.request() {
        None => client.health(),
        Some((operation, argument)) => client.invoke(operation, argument),
    }
    .with_context(|| format!("no valid acknowledgement from {server}"))?;

    println!("{}", serde_json::to_string_pretty(&ack)?);

    if !ack.result {
        bail!(
            "command failed: {}",
            ack.message.as_deref().unwrap_or("controller reported failure")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        let mut full = vec!["remote-ctl", "--secret", "s"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_bool_arguments_take_a_value() {
        let args = parse(&["pause", "false"]);
        assert_eq!(args.action, Action::Pause { state: false });
        assert_eq!(
            args.action.request(),
            Some(("pause", Some(("state", Value::from(false)))))
        );
    }

    #[test]
    fn test_negative_seek() {
        let args = parse(&["seek", "-10"]);
        assert_eq!(
            args.action.request(),
            Some(("seek", Some(("seconds", Value::from(-10.0)))))
        );
    }

    #[test]
    fn test_volume_maps_to_set_volume() {
        let args = parse(&["volume", "80"]);
        assert_eq!(args.action.request().map(|(op, _)| op), Some("set_volume"));
    }

    #[test]
    fn test_health_has_no_request() {
        assert_eq!(parse(&["health"]).action.request(), None);
    }

    #[test]
    fn test_digest_parses() {
        let args = parse(&["--digest", "sha256", "stop"]);
        assert_eq!(args.digest, DigestAlgorithm::Sha256);
    }
}
