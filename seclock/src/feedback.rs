//! Actuator feedback choreography.

use log::{debug, info};
use seclock_gpio::GpioResult;
use seclock_gpio::buzzer::Buzzer;
use seclock_gpio::led::Led;
use seclock_gpio::servo::Servo;
use std::thread::sleep;
use std::time::Duration;

/// Servo angle for the open position.
const UNLOCK_ANGLE: u32 = 130;
/// Servo angle for the closed position.
const LOCK_ANGLE: u32 = 30;

const KEY_ACK_BEEP: Duration = Duration::from_millis(200);
const GRANTED_BEEP: Duration = Duration::from_millis(100);
const DENIED_BEEP: Duration = Duration::from_millis(200);
const CLEARED_BEEP: Duration = Duration::from_millis(1000);

/// The feedback the lock gives through its actuators.
///
/// Every operation is synchronous and runs to completion; there is no
/// cancellation path. The scan cycle is documented to block on these calls,
/// so their durations directly delay the next keypad sweep.
pub trait Feedback {
    /// One short beep confirming a key detection.
    fn key_ack(&mut self) -> GpioResult<()>;
    /// The full unlock sequence for an accepted password.
    fn granted(&mut self) -> GpioResult<()>;
    /// The rejection pattern for a failed comparison.
    fn denied(&mut self) -> GpioResult<()>;
    /// The acknowledgement for clearing the entry.
    fn cleared(&mut self) -> GpioResult<()>;
}

/// [Feedback] wired to the real actuators.
pub struct GpioFeedback<'a> {
    buzzer: Buzzer<'a>,
    led: Led<'a>,
    servo: Servo<'a>,
    unlock_hold: Duration,
}

impl<'a> GpioFeedback<'a> {
    pub fn new(buzzer: Buzzer<'a>, led: Led<'a>, servo: Servo<'a>, unlock_hold: Duration) -> Self {
        GpioFeedback {
            buzzer,
            led,
            servo,
            unlock_hold,
        }
    }
}

impl Feedback for GpioFeedback<'_> {
    fn key_ack(&mut self) -> GpioResult<()> {
        self.buzzer.beep(1, KEY_ACK_BEEP)
    }

    /// Two short beeps, LED on, servo to open, hold, servo to closed, LED
    /// off.
    ///
    /// The hold is a single position pulse followed by a plain sleep; the
    /// pulse is not refreshed during the hold, so a loaded servo may relax
    /// before the closing pulse arrives.
    fn granted(&mut self) -> GpioResult<()> {
        info!("Access granted; unlocking.");
        self.buzzer.beep(2, GRANTED_BEEP)?;
        self.led.on()?;
        self.servo.rotate_to(UNLOCK_ANGLE)?;
        sleep(self.unlock_hold);
        self.servo.rotate_to(LOCK_ANGLE)?;
        self.led.off()?;
        debug!("Lock closed again.");
        Ok(())
    }

    fn denied(&mut self) -> GpioResult<()> {
        info!("Access denied.");
        self.buzzer.beep(5, DENIED_BEEP)
    }

    fn cleared(&mut self) -> GpioResult<()> {
        debug!("Entry cleared.");
        self.buzzer.beep(1, CLEARED_BEEP)
    }
}
