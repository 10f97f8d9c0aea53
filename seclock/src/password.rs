//! The stored password and its concurrency contract.

use log::info;
use std::sync::{Arc, Mutex};

/// The password the lock falls back to at startup and on reset.
///
/// The stored password is never persisted; a restart always comes back up
/// with this value.
pub const DEFAULT_PASSWORD: &[u8] = b"1234";

/// Maximum password length in bytes.
pub const PASSWORD_CAPACITY: usize = 4;

/// A bounded password value: up to [PASSWORD_CAPACITY] bytes with an
/// explicit length.
///
/// Construction truncates at the first NUL byte and then at capacity, so a
/// value shorter than the capacity compares exactly as a null-terminated
/// buffer would. No character-set validation is done; any bytes are
/// accepted.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Password {
    bytes: [u8; PASSWORD_CAPACITY],
    len: usize,
}

impl Password {
    pub fn from_bytes(input: &[u8]) -> Self {
        let terminated = input
            .iter()
            .position(|&b| b == 0)
            .map_or(input, |nul| &input[..nul]);
        let len = terminated.len().min(PASSWORD_CAPACITY);

        let mut bytes = [0u8; PASSWORD_CAPACITY];
        bytes[..len].copy_from_slice(&terminated[..len]);

        Password { bytes, len }
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

impl Default for Password {
    fn default() -> Self {
        Password::from_bytes(DEFAULT_PASSWORD)
    }
}

/// The stored password, shared between the scan cycle (reader) and the
/// control channel (writer).
///
/// The mutex is held only for the duration of a read or a write, never
/// across actuator calls, which block for seconds. A set or reset landing
/// between two scans therefore takes effect atomically at the next
/// comparison.
#[derive(Clone, Debug)]
pub struct SharedPassword {
    inner: Arc<Mutex<Password>>,
}

impl SharedPassword {
    pub fn new() -> Self {
        SharedPassword {
            inner: Arc::new(Mutex::new(Password::default())),
        }
    }

    /// Overwrites the stored password, truncated to capacity.
    pub fn set(&self, bytes: &[u8]) {
        let password = Password::from_bytes(bytes);
        *self.lock() = password;
        info!("Password updated.");
    }

    /// Unconditionally restores the default password.
    pub fn reset(&self) {
        *self.lock() = Password::default();
        info!("Password reset to default.");
    }

    /// Compares an entered sequence against the stored password.
    pub fn matches(&self, entered: &[u8]) -> bool {
        self.lock().as_bytes() == entered
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Password> {
        // A poisoned lock only means a panic elsewhere; the value itself
        // is always a valid Password.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SharedPassword {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_1234() {
        assert_eq!(Password::default().as_bytes(), b"1234");
    }

    #[test]
    fn from_bytes_truncates_to_capacity() {
        assert_eq!(Password::from_bytes(b"123456").as_bytes(), b"1234");
    }

    #[test]
    fn from_bytes_truncates_at_nul() {
        assert_eq!(Password::from_bytes(b"12\x004").as_bytes(), b"12");
    }

    #[test]
    fn shorter_passwords_compare_exactly() {
        let shared = SharedPassword::new();
        shared.set(b"91");
        assert!(shared.matches(b"91"));
        assert!(!shared.matches(b"9100"));
        assert!(!shared.matches(b"9"));
    }

    #[test]
    fn arbitrary_bytes_are_accepted() {
        let shared = SharedPassword::new();
        shared.set(&[0xff, 0x01, b'*']);
        assert!(shared.matches(&[0xff, 0x01, b'*']));
    }

    #[test]
    fn reset_restores_default_over_anything() {
        let shared = SharedPassword::new();
        shared.set(b"A1B2");
        assert!(!shared.matches(DEFAULT_PASSWORD));
        shared.reset();
        assert!(shared.matches(DEFAULT_PASSWORD));
    }

    #[test]
    fn empty_entry_only_matches_empty_password() {
        let shared = SharedPassword::new();
        assert!(!shared.matches(b""));
        shared.set(b"");
        assert!(shared.matches(b""));
    }

    #[test]
    fn clones_share_the_same_value() {
        let shared = SharedPassword::new();
        let control_side = shared.clone();
        control_side.set(b"7777");
        assert!(shared.matches(b"7777"));
    }
}
