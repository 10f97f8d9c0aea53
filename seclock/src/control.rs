//! The privileged control channel for setting and resetting the password.
//!
//! A Unix domain socket with a one-line-per-request protocol:
//!
//! ```text
//! SET <up to 4 bytes>    ->  OK | ERR invalid argument
//! RESET                  ->  OK
//! anything else          ->  ERR unsupported operation
//! ```
//!
//! The serving thread is independent of the scan cycle; concurrent access
//! to the stored password is safe through [SharedPassword]'s mutex.

use crate::password::SharedPassword;
use log::{debug, info, warn};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum ControlError {
    /// The caller's bytes could not be obtained (missing or unreadable
    /// argument).
    #[error("invalid argument")]
    InvalidArgument,
    /// The command verb is not one the controller knows.
    #[error("unsupported operation")]
    UnsupportedOperation,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Command {
    SetPassword(Vec<u8>),
    ResetPassword,
}

/// Parses one request line (without the trailing newline).
///
/// Passwords are raw bytes; the protocol does not validate the character
/// set, only that a `SET` actually carries an argument.
pub fn parse_request(line: &[u8]) -> Result<Command, ControlError> {
    if line == b"RESET" {
        return Ok(Command::ResetPassword);
    }

    if let Some(arg) = line.strip_prefix(b"SET ") {
        if arg.is_empty() {
            return Err(ControlError::InvalidArgument);
        }
        return Ok(Command::SetPassword(arg.to_vec()));
    }

    if line == b"SET" {
        // A set with no argument at all: the bytes cannot be obtained.
        return Err(ControlError::InvalidArgument);
    }

    Err(ControlError::UnsupportedOperation)
}

/// Applies a parsed command to the stored password.
///
/// Neither operation has a failure mode of its own: a set always overwrites
/// (truncated to capacity) and a reset always restores the default.
pub fn dispatch(password: &SharedPassword, command: Command) {
    match command {
        Command::SetPassword(bytes) => password.set(&bytes),
        Command::ResetPassword => password.reset(),
    }
}

/// Parses and applies one request, producing the wire response.
pub fn handle_request(password: &SharedPassword, line: &[u8]) -> String {
    match parse_request(line) {
        Ok(command) => {
            dispatch(password, command);
            "OK".to_string()
        }
        Err(err) => format!("ERR {err}"),
    }
}

fn serve_client(password: &SharedPassword, mut stream: UnixStream) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }
        while line.last() == Some(&b'\n') || line.last() == Some(&b'\r') {
            line.pop();
        }

        let response = handle_request(password, &line);
        debug!("control request handled: {response}");
        stream.write_all(response.as_bytes())?;
        stream.write_all(b"\n")?;
    }
}

/// Accept loop for the control socket. Runs until the listener fails;
/// intended to live on its own thread for the life of the process.
///
/// Clients are served one at a time: a second connection queues in the
/// listener backlog until the current client disconnects.
pub fn serve(listener: UnixListener, password: SharedPassword) {
    info!("Control channel listening.");
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(err) = serve_client(&password, stream) {
                    warn!("Control client error: {err}");
                }
            }
            Err(err) => {
                warn!("Control accept failed: {err}");
            }
        }
    }
}
