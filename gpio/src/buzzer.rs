use crate::{GpioOutput, GpioResult};
use log::trace;
use std::fmt::{Debug, Formatter};
use std::thread::sleep;
use std::time::Duration;

/// An active buzzer on a single GPIO output.
///
/// [Buzzer::beep] is a blocking call: the caller is occupied for the whole
/// pulse train. That is deliberate; the audible pattern durations are part
/// of the lock's user feedback contract.
pub struct Buzzer<'a> {
    pin: &'a dyn GpioOutput,
}

impl Debug for Buzzer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Buzzer({:?})", self.pin)
    }
}

impl<'a> Buzzer<'a> {
    pub fn new(pin: &'a dyn GpioOutput) -> Self {
        Buzzer { pin }
    }

    /// Sounds `times` pulses of `duration` each, separated by `duration` of
    /// silence. There is no trailing gap after the last pulse, so the call
    /// blocks for `(times * 2 - 1) * duration` in total.
    pub fn beep(&self, times: u32, duration: Duration) -> GpioResult<()> {
        trace!("beep x{times} @ {duration:?}");
        for i in 0..times {
            self.pin.write(true)?;
            sleep(duration);
            self.pin.write(false)?;
            if i + 1 < times {
                sleep(duration);
            }
        }
        Ok(())
    }
}
