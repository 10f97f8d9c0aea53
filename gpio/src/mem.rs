//! In-memory GPIO backend.
//!
//! Latches one wire level per pin. Follows the same acquisition discipline
//! as the hardware backend, so code can be exercised on hosts without GPIO
//! and in tests; `set_level`/`level` poke and inspect the wires directly.

use crate::{
    GpioActiveLevel, GpioBias, GpioBus, GpioBusInput, GpioBusOutput, GpioDriver, GpioError,
    GpioInput, GpioOutput, GpioPin, GpioResult,
};
use bitvec::vec::BitVec;
use std::cell::Cell;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::AtomicU8;

pub struct MemGpioDriver {
    levels: Vec<Cell<bool>>,
    biases: Vec<Cell<GpioBias>>,
    used_pins: BitVec<AtomicU8>,
}

impl MemGpioDriver {
    pub fn new(pin_count: usize) -> Self {
        MemGpioDriver {
            levels: (0..pin_count).map(|_| Cell::new(false)).collect(),
            biases: (0..pin_count).map(|_| Cell::new(GpioBias::None)).collect(),
            used_pins: BitVec::repeat(false, pin_count),
        }
    }

    /// Sets the wire level of a pin, as if driven externally.
    pub fn set_level(&self, index: usize, level: bool) {
        self.levels[index].set(level);
    }

    /// Gets the current wire level of a pin.
    pub fn level(&self, index: usize) -> bool {
        self.levels[index].get()
    }

    /// Gets the configured bias of a pin.
    pub fn pin_bias(&self, index: usize) -> GpioBias {
        self.biases[index].get()
    }
}

impl Debug for MemGpioDriver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MemGpioDriver({} pins)", self.levels.len())
    }
}

impl GpioDriver for MemGpioDriver {
    fn count(&self) -> GpioResult<usize> {
        Ok(self.levels.len())
    }

    fn get_pin(&self, index: usize) -> GpioResult<Box<dyn GpioPin + '_>> {
        if index >= self.count()? {
            return Err(GpioError::InvalidArgument);
        }

        if self.used_pins[index] {
            return Err(GpioError::AlreadyInUse);
        }

        self.used_pins.set_aliased(index, true);

        Ok(Box::new(MemGpioPin {
            driver: self,
            pin_index: index,
            active_level: GpioActiveLevel::High,
        }))
    }

    fn get_pin_bus<const N: usize>(
        &self,
        indices: [usize; N],
    ) -> GpioResult<Box<dyn GpioBus<N> + '_>> {
        let n = self.count()?;

        if indices.iter().any(|&index| index >= n) {
            return Err(GpioError::InvalidArgument);
        }

        if indices.iter().any(|&index| self.used_pins[index]) {
            return Err(GpioError::AlreadyInUse);
        }

        for &index in &indices {
            self.used_pins.set_aliased(index, true);
        }

        Ok(Box::new(MemGpioBus {
            driver: self,
            pin_indices: indices,
            active_level: GpioActiveLevel::High,
        }))
    }
}

struct MemGpioPin<'a> {
    driver: &'a MemGpioDriver,
    pin_index: usize,
    active_level: GpioActiveLevel,
}

impl Debug for MemGpioPin<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[{}]", self.driver, self.pin_index)
    }
}

impl GpioPin for MemGpioPin<'_> {
    fn as_input(&mut self) -> GpioResult<Box<dyn GpioInput + '_>> {
        Ok(Box::new(MemGpioInput { pin: self }))
    }

    fn as_output(&mut self) -> GpioResult<Box<dyn GpioOutput + '_>> {
        Ok(Box::new(MemGpioOutput { pin: self }))
    }

    fn supports_active_level(&self) -> bool {
        true
    }

    fn active_level(&self) -> GpioActiveLevel {
        self.active_level
    }

    fn set_active_level(&mut self, level: GpioActiveLevel) -> GpioResult<()> {
        self.active_level = level;
        Ok(())
    }

    fn supports_bias(&self) -> bool {
        true
    }

    fn bias(&self) -> GpioBias {
        self.driver.biases[self.pin_index].get()
    }

    fn set_bias(&mut self, bias: GpioBias) -> GpioResult<()> {
        self.driver.biases[self.pin_index].set(bias);
        Ok(())
    }
}

impl Drop for MemGpioPin<'_> {
    fn drop(&mut self) {
        self.driver.used_pins.set_aliased(self.pin_index, false);
    }
}

struct MemGpioInput<'a> {
    pin: &'a MemGpioPin<'a>,
}

impl Debug for MemGpioInput<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[input]", self.pin)
    }
}

impl GpioInput for MemGpioInput<'_> {
    fn read(&self) -> GpioResult<bool> {
        let level = self.pin.driver.levels[self.pin.pin_index].get();
        Ok(self.pin.active_level.wire_level(level))
    }
}

struct MemGpioOutput<'a> {
    pin: &'a MemGpioPin<'a>,
}

impl Debug for MemGpioOutput<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[output]", self.pin)
    }
}

impl GpioOutput for MemGpioOutput<'_> {
    fn write(&self, value: bool) -> GpioResult<()> {
        let level = self.pin.active_level.wire_level(value);
        self.pin.driver.levels[self.pin.pin_index].set(level);
        Ok(())
    }
}

struct MemGpioBus<'a, const N: usize> {
    driver: &'a MemGpioDriver,
    pin_indices: [usize; N],
    active_level: GpioActiveLevel,
}

impl<const N: usize> Debug for MemGpioBus<'_, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}{:?}", self.driver, self.pin_indices)
    }
}

impl<const N: usize> GpioBus<N> for MemGpioBus<'_, N> {
    fn as_input(&mut self) -> GpioResult<Box<dyn GpioBusInput<N> + '_>> {
        Ok(Box::new(MemGpioBusInput { bus: self }))
    }

    fn as_output(&mut self) -> GpioResult<Box<dyn GpioBusOutput<N> + '_>> {
        Ok(Box::new(MemGpioBusOutput { bus: self }))
    }

    fn supports_active_level(&self) -> bool {
        true
    }

    fn active_level(&self) -> GpioActiveLevel {
        self.active_level
    }

    fn set_active_level(&mut self, level: GpioActiveLevel) -> GpioResult<()> {
        self.active_level = level;
        Ok(())
    }

    fn supports_bias(&self) -> bool {
        true
    }

    fn bias(&self) -> GpioBias {
        self.driver.biases[self.pin_indices[0]].get()
    }

    fn set_bias(&mut self, bias: GpioBias) -> GpioResult<()> {
        for &pin_index in &self.pin_indices {
            self.driver.biases[pin_index].set(bias);
        }
        Ok(())
    }
}

impl<const N: usize> Drop for MemGpioBus<'_, N> {
    fn drop(&mut self) {
        for &pin_index in &self.pin_indices {
            self.driver.used_pins.set_aliased(pin_index, false);
        }
    }
}

struct MemGpioBusInput<'a, const N: usize> {
    bus: &'a MemGpioBus<'a, N>,
}

impl<const N: usize> Debug for MemGpioBusInput<'_, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[input]", self.bus)
    }
}

impl<const N: usize> GpioBusInput<N> for MemGpioBusInput<'_, N> {
    fn read(&self) -> GpioResult<[bool; N]> {
        let mut values = [false; N];
        for (i, &pin_index) in self.bus.pin_indices.iter().enumerate() {
            let level = self.bus.driver.levels[pin_index].get();
            values[i] = self.bus.active_level.wire_level(level);
        }
        Ok(values)
    }
}

struct MemGpioBusOutput<'a, const N: usize> {
    bus: &'a MemGpioBus<'a, N>,
}

impl<const N: usize> Debug for MemGpioBusOutput<'_, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[output]", self.bus)
    }
}

impl<const N: usize> GpioBusOutput<N> for MemGpioBusOutput<'_, N> {
    fn write(&self, values: &[bool; N]) -> GpioResult<()> {
        for (i, &pin_index) in self.bus.pin_indices.iter().enumerate() {
            let level = self.bus.active_level.wire_level(values[i]);
            self.bus.driver.levels[pin_index].set(level);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_cannot_be_acquired_twice() {
        let driver = MemGpioDriver::new(8);
        let _pin = driver.get_pin(3).unwrap();
        assert_eq!(driver.get_pin(3).unwrap_err(), GpioError::AlreadyInUse);
    }

    #[test]
    fn pin_is_released_on_drop() {
        let driver = MemGpioDriver::new(8);
        {
            let _pin = driver.get_pin(3).unwrap();
        }
        assert!(driver.get_pin(3).is_ok());
    }

    #[test]
    fn bus_acquisition_is_all_or_nothing_per_pin() {
        let driver = MemGpioDriver::new(8);
        let _pin = driver.get_pin(2).unwrap();
        assert_eq!(
            driver.get_pin_bus([0, 1, 2, 3]).unwrap_err(),
            GpioError::AlreadyInUse
        );
    }

    #[test]
    fn out_of_range_pin_is_rejected() {
        let driver = MemGpioDriver::new(4);
        assert_eq!(driver.get_pin(4).unwrap_err(), GpioError::InvalidArgument);
    }

    #[test]
    fn output_write_reaches_the_wire() {
        let driver = MemGpioDriver::new(4);
        let mut pin = driver.get_pin(1).unwrap();
        let out = pin.as_output().unwrap();
        out.write(true).unwrap();
        assert!(driver.level(1));
        out.write(false).unwrap();
        assert!(!driver.level(1));
    }

    #[test]
    fn active_low_input_inverts_the_wire() {
        let driver = MemGpioDriver::new(4);
        let mut pin = driver.get_pin(0).unwrap();
        pin.set_active_level(GpioActiveLevel::Low).unwrap();
        let input = pin.as_input().unwrap();

        driver.set_level(0, false);
        assert!(input.read().unwrap());
        driver.set_level(0, true);
        assert!(!input.read().unwrap());
    }

    #[test]
    fn active_low_bus_write_inverts_the_wires() {
        let driver = MemGpioDriver::new(4);
        let mut bus = driver.get_pin_bus([0, 1, 2, 3]).unwrap();
        bus.set_active_level(GpioActiveLevel::Low).unwrap();
        let out = bus.as_output().unwrap();

        out.write(&[true, false, false, false]).unwrap();
        assert!(!driver.level(0));
        assert!(driver.level(1));
        assert!(driver.level(2));
        assert!(driver.level(3));
    }
}
