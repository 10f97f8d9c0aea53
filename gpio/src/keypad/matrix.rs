use crate::keypad::Keypad;
use crate::{GpioBusInput, GpioBusOutput, GpioResult};
use std::fmt::{Debug, Formatter};

pub const ROWS: usize = 4;
pub const COLS: usize = 4;

/// Represents the keys on a 4x4 keypad.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeypadKey {
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Key0,
    /// The `*` key, used to submit the entered password.
    KeyAsterisk,
    /// The `#` key, used to clear the entered password.
    KeyHash,
    KeyA,
    KeyB,
    KeyC,
    KeyD,
}

impl KeypadKey {
    /// Converts a position tuple (row, column) to a [KeypadKey].
    ///
    /// The key map is fixed for the life of the device: one key per cell,
    /// matching the legend printed on the common 4x4 membrane keypad.
    pub fn from_position(pos: (usize, usize)) -> Option<KeypadKey> {
        use KeypadKey::*;

        const KEYS: [[KeypadKey; COLS]; ROWS] = [
            [Key1, Key2, Key3, KeyA],
            [Key4, Key5, Key6, KeyB],
            [Key7, Key8, Key9, KeyC],
            [KeyAsterisk, Key0, KeyHash, KeyD],
        ];

        if pos.0 < ROWS && pos.1 < COLS {
            Some(KEYS[pos.0][pos.1])
        } else {
            None
        }
    }

    /// Converts the [KeypadKey] to its legend character.
    pub fn to_char(self) -> char {
        use KeypadKey::*;

        match self {
            Key1 => '1',
            Key2 => '2',
            Key3 => '3',
            Key4 => '4',
            Key5 => '5',
            Key6 => '6',
            Key7 => '7',
            Key8 => '8',
            Key9 => '9',
            Key0 => '0',
            KeyAsterisk => '*',
            KeyHash => '#',
            KeyA => 'A',
            KeyB => 'B',
            KeyC => 'C',
            KeyD => 'D',
        }
    }
}

/// A 4x4 matrix keypad read through row/column pin multiplexing.
///
/// Rows are a 4-wide output bus and columns a 4-wide input bus. Both are
/// expected to be configured active-low (the selected row is driven low,
/// all others high; columns are pulled up and read low when a key shorts
/// them to the selected row).
pub struct MatrixKeypad<'a> {
    rows: &'a dyn GpioBusOutput<ROWS>,
    cols: &'a dyn GpioBusInput<COLS>,
}

impl Debug for MatrixKeypad<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MatrixKeypad({:?}, {:?})", self.rows, self.cols)
    }
}

impl<'a> MatrixKeypad<'a> {
    pub fn new(rows: &'a dyn GpioBusOutput<ROWS>, cols: &'a dyn GpioBusInput<COLS>) -> Self {
        MatrixKeypad { rows, cols }
    }
}

impl Keypad for MatrixKeypad<'_> {
    type Key = KeypadKey;

    /// Sweeps rows 0..4 in order, driving one row active at a time and
    /// reading all four columns under it.
    ///
    /// Every (row, col) coincidence found during the sweep is reported, in
    /// row-major order. The sweep is not cut short after the first hit:
    /// keys held in distinct rows all show up in the same sweep, and a key
    /// held across two sweeps is reported twice. The only debounce this
    /// device gets is the per-detection confirmation beep downstream.
    fn read(&self) -> GpioResult<Vec<Self::Key>> {
        let mut pressed = Vec::new();

        for row in 0..ROWS {
            let mut selected = [false; ROWS];
            selected[row] = true;
            self.rows.write(&selected)?;

            let columns = self.cols.read()?;
            for (col, &active) in columns.iter().enumerate() {
                if active {
                    if let Some(key) = KeypadKey::from_position((row, col)) {
                        pressed.push(key);
                    }
                }
            }
        }

        Ok(pressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Shared crosspoint state: which keys are held, and which row the
    /// scanner is currently driving.
    #[derive(Default)]
    struct Crosspoint {
        pressed: Cell<[[bool; COLS]; ROWS]>,
        driven_row: Cell<Option<usize>>,
    }

    impl Crosspoint {
        fn press(&self, row: usize, col: usize) {
            let mut pressed = self.pressed.get();
            pressed[row][col] = true;
            self.pressed.set(pressed);
        }

        fn release_all(&self) {
            self.pressed.set([[false; COLS]; ROWS]);
        }
    }

    #[derive(Debug)]
    struct RowBus(Rc<Crosspoint>);

    impl Debug for Crosspoint {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "Crosspoint")
        }
    }

    impl GpioBusOutput<ROWS> for RowBus {
        fn write(&self, values: &[bool; ROWS]) -> GpioResult<()> {
            self.0
                .driven_row
                .set(values.iter().position(|&selected| selected));
            Ok(())
        }
    }

    #[derive(Debug)]
    struct ColBus(Rc<Crosspoint>);

    impl GpioBusInput<COLS> for ColBus {
        fn read(&self) -> GpioResult<[bool; COLS]> {
            match self.0.driven_row.get() {
                Some(row) => Ok(self.0.pressed.get()[row]),
                None => Ok([false; COLS]),
            }
        }
    }

    fn keypad(crosspoint: &Rc<Crosspoint>) -> (RowBus, ColBus) {
        (RowBus(Rc::clone(crosspoint)), ColBus(Rc::clone(crosspoint)))
    }

    #[test]
    fn idle_sweep_reports_nothing() {
        let crosspoint = Rc::new(Crosspoint::default());
        let (rows, cols) = keypad(&crosspoint);
        let keypad = MatrixKeypad::new(&rows, &cols);

        assert!(keypad.read().unwrap().is_empty());
    }

    #[test]
    fn single_key_is_reported_at_its_cell() {
        let crosspoint = Rc::new(Crosspoint::default());
        let (rows, cols) = keypad(&crosspoint);
        let keypad = MatrixKeypad::new(&rows, &cols);

        crosspoint.press(2, 1);
        assert_eq!(keypad.read().unwrap(), vec![KeypadKey::Key8]);
    }

    #[test]
    fn keys_in_distinct_rows_all_fire_in_one_sweep() {
        let crosspoint = Rc::new(Crosspoint::default());
        let (rows, cols) = keypad(&crosspoint);
        let keypad = MatrixKeypad::new(&rows, &cols);

        crosspoint.press(3, 0); // '*'
        crosspoint.press(0, 0); // '1'
        crosspoint.press(1, 2); // '6'

        // Row-major order, not press order, and no suppression after the
        // first hit.
        assert_eq!(
            keypad.read().unwrap(),
            vec![KeypadKey::Key1, KeypadKey::Key6, KeypadKey::KeyAsterisk]
        );
    }

    #[test]
    fn keys_in_the_same_row_all_fire() {
        let crosspoint = Rc::new(Crosspoint::default());
        let (rows, cols) = keypad(&crosspoint);
        let keypad = MatrixKeypad::new(&rows, &cols);

        crosspoint.press(0, 1);
        crosspoint.press(0, 3);
        assert_eq!(
            keypad.read().unwrap(),
            vec![KeypadKey::Key2, KeypadKey::KeyA]
        );
    }

    #[test]
    fn key_held_across_sweeps_is_reported_twice() {
        let crosspoint = Rc::new(Crosspoint::default());
        let (rows, cols) = keypad(&crosspoint);
        let keypad = MatrixKeypad::new(&rows, &cols);

        crosspoint.press(1, 1);
        assert_eq!(keypad.read().unwrap(), vec![KeypadKey::Key5]);
        assert_eq!(keypad.read().unwrap(), vec![KeypadKey::Key5]);

        crosspoint.release_all();
        assert!(keypad.read().unwrap().is_empty());
    }

    #[test]
    fn key_map_covers_every_cell_exactly_once() {
        let mut seen = Vec::new();
        for row in 0..ROWS {
            for col in 0..COLS {
                let key = KeypadKey::from_position((row, col)).unwrap();
                assert!(!seen.contains(&key));
                seen.push(key);
            }
        }
        assert_eq!(seen.len(), 16);
        assert!(KeypadKey::from_position((4, 0)).is_none());
        assert!(KeypadKey::from_position((0, 4)).is_none());
    }
}
