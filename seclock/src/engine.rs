//! The password-entry state machine.

use crate::feedback::Feedback;
use crate::password::{PASSWORD_CAPACITY, SharedPassword};
use log::{debug, warn};
use seclock_gpio::GpioResult;
use seclock_gpio::keypad::KeypadKey;

/// The in-progress entry: up to four bytes with an explicit length.
#[derive(Debug, Default)]
pub struct Entry {
    bytes: [u8; PASSWORD_CAPACITY],
    len: usize,
}

impl Entry {
    /// Appends a byte; silently dropped when the buffer is full. Only
    /// submit or clear releases a full buffer.
    fn push(&mut self, byte: u8) {
        if self.len < PASSWORD_CAPACITY {
            self.bytes[self.len] = byte;
            self.len += 1;
        }
    }

    fn clear(&mut self) {
        self.bytes = [0; PASSWORD_CAPACITY];
        self.len = 0;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Consumes key events and drives the stored-password comparison.
///
/// The engine reads the shared password only inside the comparison; all
/// feedback runs outside the lock.
#[derive(Debug)]
pub struct Engine {
    password: SharedPassword,
    entry: Entry,
}

impl Engine {
    pub fn new(password: SharedPassword) -> Self {
        Engine {
            password,
            entry: Entry::default(),
        }
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Handles one key event.
    ///
    /// Every detected key is first acknowledged with the confirmation beep
    /// (the system's only debounce), then:
    /// - `*` submits: the entry is compared against the stored password and
    ///   reset, with granted/denied feedback as the outcome;
    /// - `#` clears the entry;
    /// - anything else is appended while there is room, and silently
    ///   dropped once the entry is full.
    ///
    /// A failed comparison is a normal outcome, not an error.
    pub fn handle_key(&mut self, key: KeypadKey, feedback: &mut dyn Feedback) -> GpioResult<()> {
        feedback.key_ack()?;

        match key {
            KeypadKey::KeyAsterisk => {
                let matched = self.password.matches(self.entry.as_bytes());
                self.entry.clear();
                if matched {
                    feedback.granted()?;
                } else {
                    warn!("Incorrect password entered.");
                    feedback.denied()?;
                }
            }
            KeypadKey::KeyHash => {
                self.entry.clear();
                feedback.cleared()?;
            }
            other => {
                if self.entry.len() == PASSWORD_CAPACITY {
                    debug!("Entry full; key dropped.");
                }
                self.entry.push(other.to_char() as u8);
            }
        }

        Ok(())
    }
}
