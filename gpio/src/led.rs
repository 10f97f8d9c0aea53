use crate::{GpioOutput, GpioResult};
use std::fmt::{Debug, Formatter};

/// A status LED on a single GPIO output.
pub struct Led<'a> {
    pin: &'a dyn GpioOutput,
}

impl Debug for Led<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Led({:?})", self.pin)
    }
}

impl<'a> Led<'a> {
    pub fn new(pin: &'a dyn GpioOutput) -> Self {
        Led { pin }
    }

    pub fn set(&self, on: bool) -> GpioResult<()> {
        self.pin.write(on)
    }

    pub fn on(&self) -> GpioResult<()> {
        self.set(true)
    }

    pub fn off(&self) -> GpioResult<()> {
        self.set(false)
    }
}
