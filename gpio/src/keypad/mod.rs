mod matrix;

use crate::GpioResult;
use std::fmt::Debug;
pub use matrix::*;

/// The `Keypad` trait defines the interface for keypad input devices.
///
/// One call to [Keypad::read] is one full sweep of the device; it returns
/// every key found pressed during that sweep, in scan order.
pub trait Keypad: Debug {
    type Key;

    fn read(&self) -> GpioResult<Vec<Self::Key>>;
}
