//! Ties the keypad sweep to the password engine.

use crate::engine::Engine;
use crate::feedback::Feedback;
use log::trace;
use seclock_gpio::GpioResult;
use seclock_gpio::keypad::{Keypad, KeypadKey};

/// One controller owns the engine and runs one scan-and-evaluate cycle per
/// tick.
pub struct Controller<'a> {
    keypad: &'a dyn Keypad<Key = KeypadKey>,
    engine: Engine,
    feedback: Box<dyn Feedback + 'a>,
}

impl<'a> Controller<'a> {
    pub fn new(
        keypad: &'a dyn Keypad<Key = KeypadKey>,
        engine: Engine,
        feedback: Box<dyn Feedback + 'a>,
    ) -> Self {
        Controller {
            keypad,
            engine,
            feedback,
        }
    }

    /// Runs one cycle: a full keypad sweep, then engine handling for every
    /// key event the sweep produced, in order.
    ///
    /// Feedback is synchronous, so a cycle that reaches the unlock sequence
    /// blocks here for its full duration; the caller reschedules the next
    /// tick relative to whenever this returns.
    pub fn tick(&mut self) -> GpioResult<()> {
        let keys = self.keypad.read()?;
        if !keys.is_empty() {
            trace!("sweep produced {} key event(s)", keys.len());
        }
        for key in keys {
            self.engine.handle_key(key, self.feedback.as_mut())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::SharedPassword;
    use std::cell::RefCell;

    /// A keypad that replays one scripted sweep per read call.
    #[derive(Debug)]
    struct ScriptedKeypad {
        sweeps: RefCell<Vec<Vec<KeypadKey>>>,
    }

    impl ScriptedKeypad {
        fn new(mut sweeps: Vec<Vec<KeypadKey>>) -> Self {
            sweeps.reverse();
            ScriptedKeypad {
                sweeps: RefCell::new(sweeps),
            }
        }
    }

    impl Keypad for ScriptedKeypad {
        type Key = KeypadKey;

        fn read(&self) -> GpioResult<Vec<KeypadKey>> {
            Ok(self.sweeps.borrow_mut().pop().unwrap_or_default())
        }
    }

    #[derive(Debug, Default)]
    struct CountingFeedback {
        granted: std::rc::Rc<RefCell<u32>>,
        denied: std::rc::Rc<RefCell<u32>>,
    }

    impl Feedback for CountingFeedback {
        fn key_ack(&mut self) -> GpioResult<()> {
            Ok(())
        }

        fn granted(&mut self) -> GpioResult<()> {
            *self.granted.borrow_mut() += 1;
            Ok(())
        }

        fn denied(&mut self) -> GpioResult<()> {
            *self.denied.borrow_mut() += 1;
            Ok(())
        }

        fn cleared(&mut self) -> GpioResult<()> {
            Ok(())
        }
    }

    use KeypadKey::*;

    #[test]
    fn one_key_per_tick_unlocks_over_six_ticks() {
        let keypad = ScriptedKeypad::new(vec![
            vec![Key1],
            vec![Key2],
            vec![],
            vec![Key3],
            vec![Key4],
            vec![KeyAsterisk],
        ]);
        let feedback = CountingFeedback::default();
        let granted = feedback.granted.clone();
        let mut controller = Controller::new(
            &keypad,
            Engine::new(SharedPassword::new()),
            Box::new(feedback),
        );

        for _ in 0..6 {
            controller.tick().unwrap();
        }
        assert_eq!(*granted.borrow(), 1);
    }

    #[test]
    fn multiple_events_in_one_sweep_are_handled_in_order() {
        // One sweep carrying the whole entry plus submit, as happens when
        // several keys in distinct rows are held simultaneously.
        let keypad = ScriptedKeypad::new(vec![vec![Key1, Key2, Key3, Key4, KeyAsterisk]]);
        let feedback = CountingFeedback::default();
        let granted = feedback.granted.clone();
        let mut controller = Controller::new(
            &keypad,
            Engine::new(SharedPassword::new()),
            Box::new(feedback),
        );

        controller.tick().unwrap();
        assert_eq!(*granted.borrow(), 1);
    }

    #[test]
    fn control_channel_update_lands_between_ticks() {
        let password = SharedPassword::new();
        let keypad = ScriptedKeypad::new(vec![vec![Key7], vec![Key7, KeyAsterisk]]);
        let feedback = CountingFeedback::default();
        let granted = feedback.granted.clone();
        let denied = feedback.denied.clone();
        let mut controller = Controller::new(
            &keypad,
            Engine::new(password.clone()),
            Box::new(feedback),
        );

        controller.tick().unwrap();
        // A set lands while "7" is already buffered; the comparison at
        // submit time sees the new value.
        password.set(b"77");
        controller.tick().unwrap();

        assert_eq!(*granted.borrow(), 1);
        assert_eq!(*denied.borrow(), 0);
    }
}
