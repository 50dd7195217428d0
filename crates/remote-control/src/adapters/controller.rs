//! # Controller Adapters
//!
//! - `LoggingController`: a stand-in player that logs every call and
//!   reports success
//! - `PolicyController`: wraps any controller and refuses `play` paths the
//!   media policy rejects

use tracing::{info, warn};

use crate::domain::{ControllerError, MediaPolicy};
use crate::ports::PlaybackController;

/// Player that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingController;

impl PlaybackController for LoggingController {
    fn play(&self, path: &str) -> Result<bool, ControllerError> {
        info!(path, "play");
        Ok(true)
    }

    fn pause(&self, state: bool) -> Result<bool, ControllerError> {
        info!(state, "pause");
        Ok(true)
    }

    fn stop(&self) -> Result<bool, ControllerError> {
        info!("stop");
        Ok(true)
    }

    fn seek(&self, seconds: f64) -> Result<bool, ControllerError> {
        info!(seconds, "seek");
        Ok(true)
    }

    fn set_volume(&self, volume: f64) -> Result<bool, ControllerError> {
        info!(volume, "set_volume");
        Ok(true)
    }

    fn set_subtitles(&self, track: i64) -> Result<bool, ControllerError> {
        info!(track, "set_subtitles");
        Ok(true)
    }

    fn fullscreen(&self, state: bool) -> Result<bool, ControllerError> {
        info!(state, "fullscreen");
        Ok(true)
    }

    fn mute(&self, state: bool) -> Result<bool, ControllerError> {
        info!(state, "mute");
        Ok(true)
    }
}

/// Applies a [`MediaPolicy`] to `play` before delegating.
///
/// A rejected path is reported as `Ok(false)` and never reaches the inner
/// controller. Accepted paths are passed on resolved against the root.
#[derive(Debug, Clone)]
pub struct PolicyController<C> {
    inner: C,
    policy: MediaPolicy,
}

impl<C: PlaybackController> PolicyController<C> {
    /// Guard `inner` with `policy`.
    pub fn new(inner: C, policy: MediaPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped controller.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// The policy in force.
    pub fn policy(&self) -> &MediaPolicy {
        &self.policy
    }
}

impl<C: PlaybackController> PlaybackController for PolicyController<C> {
    fn play(&self, path: &str) -> Result<bool, ControllerError> {
        match self.policy.resolve(path) {
            Ok(resolved) => self.inner.play(&resolved.to_string_lossy()),
            Err(reason) => {
                warn!(path, %reason, "refusing to play");
                Ok(false)
            }
        }
    }

    fn pause(&self, state: bool) -> Result<bool, ControllerError> {
        self.inner.pause(state)
    }

    fn stop(&self) -> Result<bool, ControllerError> {
        self.inner.stop()
    }

    fn seek(&self, seconds: f64) -> Result<bool, ControllerError> {
        self.inner.seek(seconds)
    }

    fn set_volume(&self, volume: f64) -> Result<bool, ControllerError> {
        self.inner.set_volume(volume)
    }

    fn set_subtitles(&self, track: i64) -> Result<bool, ControllerError> {
        self.inner.set_subtitles(track)
    }

    fn fullscreen(&self, state: bool) -> Result<bool, ControllerError> {
        self.inner.fullscreen(state)
    }

    fn mute(&self, state: bool) -> Result<bool, ControllerError> {
        self.inner.mute(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ControllerCall, RecordingController};
    use std::path::PathBuf;

    fn guarded() -> PolicyController<RecordingController> {
        let policy = MediaPolicy {
            root: PathBuf::from("/srv/media"),
            allow_hidden: false,
            filetypes: vec!["mkv".to_string(), "mp4".to_string()],
        };
        PolicyController::new(RecordingController::new(), policy)
    }

    #[test]
    fn test_accepted_path_is_resolved_and_forwarded() {
        let controller = guarded();
        assert_eq!(controller.play("films/a.mkv"), Ok(true));
        assert_eq!(
            controller.inner().calls(),
            vec![ControllerCall::Play("/srv/media/films/a.mkv".to_string())]
        );
    }

    #[test]
    fn test_rejected_paths_never_reach_the_player() {
        let controller = guarded();
        for path in ["", "../etc/passwd", "/etc/passwd", ".secret/a.mkv", "notes.txt"] {
            assert_eq!(controller.play(path), Ok(false), "{path}");
        }
        assert!(controller.inner().calls().is_empty());
    }

    #[test]
    fn test_other_operations_pass_through() {
        let controller = guarded();
        controller.mute(true).unwrap();
        controller.seek(12.5).unwrap();
        assert_eq!(
            controller.inner().calls(),
            vec![ControllerCall::Mute(true), ControllerCall::Seek(12.5)]
        );
    }

    #[test]
    fn test_logging_controller_always_succeeds() {
        assert_eq!(LoggingController.play("x.mkv"), Ok(true));
        assert_eq!(LoggingController.set_subtitles(-1), Ok(true));
    }
}
