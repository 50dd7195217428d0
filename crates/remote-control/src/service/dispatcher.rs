//! # Command Dispatcher
//!
//! Maps an authenticated command onto one controller call.
//!
//! | command | required field | controller call |
//! |---------|----------------|-----------------|
//! | play | path | `play(path)` |
//! | pause | state | `pause(state)` |
//! | stop | - | `stop()` |
//! | seek | seconds | `seek(seconds)` |
//! | set_volume | volume | `set_volume(volume)` |
//! | set_subtitles | track | `set_subtitles(track)` |
//! | fullscreen | state | `fullscreen(state)` |
//! | mute | state | `mute(state)` |

use serde_json::Value;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

use crate::domain::{Command, ControllerError, DispatchError};
use crate::ports::PlaybackController;

/// A controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `play`
    Play,
    /// `pause`
    Pause,
    /// `stop`
    Stop,
    /// `seek`
    Seek,
    /// `set_volume`
    SetVolume,
    /// `set_subtitles`
    SetSubtitles,
    /// `fullscreen`
    Fullscreen,
    /// `mute`
    Mute,
}

impl Operation {
    /// Every operation, in table order.
    pub const ALL: [Operation; 8] = [
        Operation::Play,
        Operation::Pause,
        Operation::Stop,
        Operation::Seek,
        Operation::SetVolume,
        Operation::SetSubtitles,
        Operation::Fullscreen,
        Operation::Mute,
    ];

    /// Wire name.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Play => "play",
            Operation::Pause => "pause",
            Operation::Stop => "stop",
            Operation::Seek => "seek",
            Operation::SetVolume => "set_volume",
            Operation::SetSubtitles => "set_subtitles",
            Operation::Fullscreen => "fullscreen",
            Operation::Mute => "mute",
        }
    }

    /// Look up an operation by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Field that must accompany this operation.
    pub fn required_field(&self) -> Option<&'static str> {
        match self {
            Operation::Play => Some("path"),
            Operation::Pause | Operation::Fullscreen | Operation::Mute => Some("state"),
            Operation::Stop => None,
            Operation::Seek => Some("seconds"),
            Operation::SetVolume => Some("volume"),
            Operation::SetSubtitles => Some("track"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated controller call with its typed argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation<'a> {
    /// `play(path)`
    Play(&'a str),
    /// `pause(state)`
    Pause(bool),
    /// `stop()`
    Stop,
    /// `seek(seconds)`
    Seek(f64),
    /// `set_volume(volume)`
    SetVolume(f64),
    /// `set_subtitles(track)`
    SetSubtitles(i64),
    /// `fullscreen(state)`
    Fullscreen(bool),
    /// `mute(state)`
    Mute(bool),
}

impl<'a> Invocation<'a> {
    /// Validate a command into an invocation.
    pub fn from_command(command: &'a Command) -> Result<Self, DispatchError> {
        let name = command
            .operation()
            .ok_or_else(|| DispatchError::MissingField(Command::COMMAND_KEY.to_string()))?;

        let operation = name
            .as_str()
            .and_then(Operation::from_name)
            .ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))?;

        let argument = match operation.required_field() {
            Some(field) => Some((
                field,
                command
                    .field(field)
                    .ok_or_else(|| DispatchError::MissingField(field.to_string()))?,
            )),
            None => None,
        };

        Self::bind(operation, argument)
    }

    /// Pair an operation with its validated argument.
    fn bind(
        operation: Operation,
        argument: Option<(&'static str, &'a Value)>,
    ) -> Result<Self, DispatchError> {
        Ok(match (operation, argument) {
            (Operation::Play, Some((field, value))) => Invocation::Play(as_str(field, value)?),
            (Operation::Pause, Some((field, value))) => Invocation::Pause(as_bool(field, value)?),
            (Operation::Stop, None) => Invocation::Stop,
            (Operation::Seek, Some((field, value))) => Invocation::Seek(as_f64(field, value)?),
            (Operation::SetVolume, Some((field, value))) => {
                Invocation::SetVolume(as_f64(field, value)?)
            }
            (Operation::SetSubtitles, Some((field, value))) => {
                Invocation::SetSubtitles(as_i64(field, value)?)
            }
            (Operation::Fullscreen, Some((field, value))) => {
                Invocation::Fullscreen(as_bool(field, value)?)
            }
            (Operation::Mute, Some((field, value))) => Invocation::Mute(as_bool(field, value)?),
            (operation, _) => return Err(DispatchError::ArgumentMismatch(operation.name())),
        })
    }

    /// Operation being invoked.
    pub fn operation(&self) -> Operation {
        match self {
            Invocation::Play(_) => Operation::Play,
            Invocation::Pause(_) => Operation::Pause,
            Invocation::Stop => Operation::Stop,
            Invocation::Seek(_) => Operation::Seek,
            Invocation::SetVolume(_) => Operation::SetVolume,
            Invocation::SetSubtitles(_) => Operation::SetSubtitles,
            Invocation::Fullscreen(_) => Operation::Fullscreen,
            Invocation::Mute(_) => Operation::Mute,
        }
    }

    /// Perform the call.
    pub fn apply<C: PlaybackController + ?Sized>(
        &self,
        controller: &C,
    ) -> Result<bool, ControllerError> {
        match *self {
            Invocation::Play(path) => controller.play(path),
            Invocation::Pause(state) => controller.pause(state),
            Invocation::Stop => controller.stop(),
            Invocation::Seek(seconds) => controller.seek(seconds),
            Invocation::SetVolume(volume) => controller.set_volume(volume),
            Invocation::SetSubtitles(track) => controller.set_subtitles(track),
            Invocation::Fullscreen(state) => controller.fullscreen(state),
            Invocation::Mute(state) => controller.mute(state),
        }
    }
}

fn as_str<'a>(field: &'static str, value: &'a Value) -> Result<&'a str, DispatchError> {
    value.as_str().ok_or(DispatchError::InvalidField {
        field,
        expected: "a string",
    })
}

fn as_bool(field: &'static str, value: &Value) -> Result<bool, DispatchError> {
    value.as_bool().ok_or(DispatchError::InvalidField {
        field,
        expected: "a boolean",
    })
}

fn as_f64(field: &'static str, value: &Value) -> Result<f64, DispatchError> {
    value.as_f64().ok_or(DispatchError::InvalidField {
        field,
        expected: "a number",
    })
}

fn as_i64(field: &'static str, value: &Value) -> Result<i64, DispatchError> {
    value.as_i64().ok_or(DispatchError::InvalidField {
        field,
        expected: "an integer",
    })
}

/// Result of dispatching one command: the acknowledgement's `result` and
/// `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Controller success flag.
    pub success: bool,
    /// Diagnostic on failure.
    pub diagnostic: Option<String>,
}

impl DispatchOutcome {
    /// The controller ran and returned `success`.
    pub fn completed(success: bool) -> Self {
        Self {
            success,
            diagnostic: None,
        }
    }

    /// Dispatch failed before or during the controller call.
    pub fn failed(error: &DispatchError) -> Self {
        Self {
            success: false,
            diagnostic: Some(error.diagnostic()),
        }
    }
}

/// Validate and execute `command`, surfacing the failure reason.
///
/// Controller panics are caught here and never reach the transport loop.
pub fn try_dispatch<C: PlaybackController + ?Sized>(
    command: &Command,
    controller: &C,
) -> Result<bool, DispatchError> {
    let invocation = Invocation::from_command(command)?;
    let operation = invocation.operation();

    match panic::catch_unwind(AssertUnwindSafe(|| invocation.apply(controller))) {
        Ok(result) => Ok(result?),
        Err(_) => Err(DispatchError::ControllerPanicked(operation.name())),
    }
}

/// Validate and execute `command`, folding every failure into an outcome.
pub fn dispatch<C: PlaybackController + ?Sized>(command: &Command, controller: &C) -> DispatchOutcome {
    match try_dispatch(command, controller) {
        Ok(success) => {
            debug!(action = %command.time, success, "command dispatched");
            DispatchOutcome::completed(success)
        }
        Err(error) => {
            warn!(action = %command.time, %error, "command dispatch failed");
            DispatchOutcome::failed(&error)
        }
    }
}
