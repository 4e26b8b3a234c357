use std::fmt;
use std::io;

use framesync_codec::FrameError;

// Exit codes follow sysexits-style semantics where one applies.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const NO_INPUT: i32 = 66;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound => NO_INPUT,
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::InvalidConfig(_) | FrameError::InvalidState(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        FrameError::LengthOutOfRange { .. }
        | FrameError::TagMismatch { .. }
        | FrameError::PayloadTooLarge { .. }
        | FrameError::LengthUnencodable { .. }
        | FrameError::FixedLengthMismatch { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}
