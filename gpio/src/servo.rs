use crate::{GpioError, GpioOutput, GpioResult};
use log::trace;
use std::fmt::{Debug, Formatter};
use std::thread::sleep;
use std::time::Duration;

/// Minimum pulse width, corresponding to 0 degrees.
const MIN_PULSE_US: u64 = 500;
/// Maximum pulse width, corresponding to 180 degrees.
const MAX_PULSE_US: u64 = 2400;
/// One 50 Hz PWM period.
const PERIOD_US: u64 = 20_000;

/// A hobby servo driven by software PWM on a single GPIO output.
///
/// [Servo::rotate_to] emits exactly one pulse per call and blocks for one
/// full 20 ms period. A servo only holds its position while pulses keep
/// coming, so callers that need the position held must reissue the call
/// periodically. The unlock sequence instead accepts that a single pulse
/// gets the horn moving and the load may relax afterwards.
pub struct Servo<'a> {
    pin: &'a dyn GpioOutput,
}

impl Debug for Servo<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Servo({:?})", self.pin)
    }
}

/// Computes the pulse width for an angle, linear between the endpoints.
pub fn pulse_width_us(angle: u32) -> u64 {
    MIN_PULSE_US + angle as u64 * (MAX_PULSE_US - MIN_PULSE_US) / 180
}

impl<'a> Servo<'a> {
    pub fn new(pin: &'a dyn GpioOutput) -> Self {
        Servo { pin }
    }

    /// Emits one position pulse for `angle` degrees (0 to 180).
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if the angle is above 180.
    pub fn rotate_to(&self, angle: u32) -> GpioResult<()> {
        if angle > 180 {
            return Err(GpioError::InvalidArgument);
        }

        let pulse_us = pulse_width_us(angle);
        trace!("servo pulse {pulse_us}us for {angle} deg");

        self.pin.write(true)?;
        sleep(Duration::from_micros(pulse_us));
        self.pin.write(false)?;
        sleep(Duration::from_micros(PERIOD_US - pulse_us));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Default)]
    struct FakePin {
        level: Cell<bool>,
    }

    impl GpioOutput for FakePin {
        fn write(&self, value: bool) -> GpioResult<()> {
            self.level.set(value);
            Ok(())
        }
    }

    #[test]
    fn pulse_width_is_linear_between_endpoints() {
        assert_eq!(pulse_width_us(0), 500);
        assert_eq!(pulse_width_us(90), 1450);
        assert_eq!(pulse_width_us(180), 2400);
    }

    #[test]
    fn unlock_angles_map_into_the_valid_band() {
        // The lock uses 130 deg for open and 30 deg for closed.
        assert_eq!(pulse_width_us(130), 1872);
        assert_eq!(pulse_width_us(30), 816);
    }

    #[test]
    fn angle_above_180_is_rejected() {
        let pin = FakePin::default();
        let servo = Servo::new(&pin);
        assert_eq!(servo.rotate_to(181).unwrap_err(), GpioError::InvalidArgument);
        // The pin must not have been touched.
        assert!(!pin.level.get());
    }
}
