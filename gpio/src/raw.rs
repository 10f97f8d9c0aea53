//! Memory-mapped GPIO backend for the BCM2711 (Raspberry Pi 4).
//!
//! Maps the GPIO register window through `/dev/gpiomem` (or `/dev/mem`) and
//! drives the pins directly. Pins are tracked as in-use for the lifetime of
//! the handles returned by the driver and released when they drop.

use crate::{
    GpioActiveLevel, GpioBias, GpioBus, GpioBusInput, GpioBusOutput, GpioDriver, GpioError,
    GpioInput, GpioOutput, GpioPin, GpioResult,
};
use bitvec::vec::BitVec;
use log::trace;
use memmap2::{MmapOptions, MmapRaw};
use std::fmt::{Debug, Formatter};
use std::fs::OpenOptions;
use std::sync::atomic::AtomicU8;

// Register word offsets within the GPIO window.
const GPFSEL0: usize = 0x00 / 4;
const GPSET0: usize = 0x1c / 4;
const GPCLR0: usize = 0x28 / 4;
const GPLEV0: usize = 0x34 / 4;
const GPIO_PUP_PDN_CNTRL_REG0: usize = 0xe4 / 4;

pub struct RawGpioDriver {
    mmap: MmapRaw,
    used_pins: BitVec<AtomicU8>,
}

impl RawGpioDriver {
    const GPIO_BASE: u32 = 0x3F200000;

    const PIN_COUNT: usize = 58;

    fn create(path: &str) -> GpioResult<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        let mmap = MmapOptions::new()
            .offset(Self::GPIO_BASE as u64)
            .len(4096)
            .map_raw(&file)?;

        Ok(RawGpioDriver {
            mmap,
            used_pins: BitVec::repeat(false, Self::PIN_COUNT),
        })
    }

    pub fn new_gpiomem() -> GpioResult<Self> {
        Self::create("/dev/gpiomem")
    }

    pub fn new_mem() -> GpioResult<Self> {
        Self::create("/dev/mem")
    }

    fn check_pin(pin_index: usize) -> GpioResult<()> {
        if pin_index >= Self::PIN_COUNT {
            return Err(GpioError::InvalidArgument);
        }
        Ok(())
    }

    /// Selects the pin function: 0 for input, 1 for output.
    fn raw_set_pin_function(&self, pin_index: usize, function: u8) -> GpioResult<()> {
        Self::check_pin(pin_index)?;
        if function > 0b111 {
            return Err(GpioError::InvalidArgument);
        }

        let mmap = self.mmap.as_mut_ptr() as *mut u32;
        let register_ptr = unsafe { mmap.add(GPFSEL0 + pin_index / 10) };
        let shift = (pin_index % 10) * 3;

        let mut register_value = unsafe { register_ptr.read_volatile() };
        register_value &= !(0b111 << shift);
        register_value |= (function as u32) << shift;
        unsafe { register_ptr.write_volatile(register_value) };

        trace!("pin {pin_index} function set to {function}");

        Ok(())
    }

    fn raw_set_pin_output(&self, pin_index: usize, high: bool) -> GpioResult<()> {
        Self::check_pin(pin_index)?;

        let mmap = self.mmap.as_mut_ptr() as *mut u32;
        // GPSETn and GPCLRn are write-1-to-act, so no read-modify-write here.
        let base = if high { GPSET0 } else { GPCLR0 };
        let register_ptr = unsafe { mmap.add(base + pin_index / 32) };
        let shift = pin_index % 32;

        unsafe { register_ptr.write_volatile(1 << shift) };

        Ok(())
    }

    fn raw_get_pin_level(&self, pin_index: usize) -> GpioResult<bool> {
        Self::check_pin(pin_index)?;

        let mmap = self.mmap.as_ptr() as *const u32;
        let register_ptr = unsafe { mmap.add(GPLEV0 + pin_index / 32) };
        let shift = pin_index % 32;

        let register_value = unsafe { register_ptr.read_volatile() };
        Ok((register_value >> shift) & 1 != 0)
    }

    fn raw_set_bias(&self, pin_index: usize, bias: GpioBias) -> GpioResult<()> {
        Self::check_pin(pin_index)?;

        let bias_value = match bias {
            GpioBias::None => 0b00,
            GpioBias::PullUp => 0b01,
            GpioBias::PullDown => 0b10,
        };

        let mmap = self.mmap.as_mut_ptr() as *mut u32;
        let register_ptr = unsafe { mmap.add(GPIO_PUP_PDN_CNTRL_REG0 + pin_index / 16) };
        let shift = (pin_index % 16) * 2;
        let mut register_value = unsafe { register_ptr.read_volatile() };
        register_value &= !(0b11 << shift);
        register_value |= bias_value << shift;

        unsafe { register_ptr.write_volatile(register_value) };

        Ok(())
    }

    fn raw_get_bias(&self, pin_index: usize) -> GpioResult<GpioBias> {
        Self::check_pin(pin_index)?;

        let mmap = self.mmap.as_ptr() as *const u32;
        let register_ptr = unsafe { mmap.add(GPIO_PUP_PDN_CNTRL_REG0 + pin_index / 16) };
        let shift = (pin_index % 16) * 2;
        let register_value = unsafe { register_ptr.read_volatile() };

        match (register_value >> shift) & 0b11 {
            0b00 => Ok(GpioBias::None),
            0b01 => Ok(GpioBias::PullUp),
            0b10 => Ok(GpioBias::PullDown),
            _ => Err(GpioError::NotSupported),
        }
    }

    /// Returns the pin to a known state: input, no bias, output latch low.
    fn raw_reset(&self, pin_index: usize) -> GpioResult<()> {
        self.raw_set_pin_function(pin_index, 0)?;
        self.raw_set_bias(pin_index, GpioBias::None)?;
        self.raw_set_pin_output(pin_index, false)?;
        Ok(())
    }
}

impl Debug for RawGpioDriver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawGpioDriver({:?})", self.mmap.as_ptr().addr())
    }
}

impl GpioDriver for RawGpioDriver {
    fn count(&self) -> GpioResult<usize> {
        Ok(Self::PIN_COUNT)
    }

    fn get_pin(&self, index: usize) -> GpioResult<Box<dyn GpioPin + '_>> {
        if index >= self.count()? {
            return Err(GpioError::InvalidArgument);
        }

        if self.used_pins[index] {
            return Err(GpioError::AlreadyInUse);
        }

        self.used_pins.set_aliased(index, true);
        self.raw_reset(index)?;

        Ok(Box::new(RawGpioPin {
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
            self.raw_reset(index)?;
        }

        Ok(Box::new(RawGpioBus {
            driver: self,
            pin_indices: indices,
            active_level: GpioActiveLevel::High,
        }))
    }
}

struct RawGpioPin<'a> {
    driver: &'a RawGpioDriver,
    pin_index: usize,
    active_level: GpioActiveLevel,
}

impl Debug for RawGpioPin<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[{}]", self.driver, self.pin_index)
    }
}

impl GpioPin for RawGpioPin<'_> {
    fn as_input(&mut self) -> GpioResult<Box<dyn GpioInput + '_>> {
        self.driver.raw_set_pin_function(self.pin_index, 0)?;
        Ok(Box::new(RawGpioInput { pin: self }))
    }

    fn as_output(&mut self) -> GpioResult<Box<dyn GpioOutput + '_>> {
        self.driver.raw_set_pin_function(self.pin_index, 1)?;
        Ok(Box::new(RawGpioOutput { pin: self }))
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
        self.driver.raw_get_bias(self.pin_index).unwrap_or(GpioBias::None)
    }

    fn set_bias(&mut self, bias: GpioBias) -> GpioResult<()> {
        self.driver.raw_set_bias(self.pin_index, bias)
    }
}

impl Drop for RawGpioPin<'_> {
    fn drop(&mut self) {
        self.driver.used_pins.set_aliased(self.pin_index, false);
    }
}

struct RawGpioInput<'a> {
    pin: &'a RawGpioPin<'a>,
}

impl Debug for RawGpioInput<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[input]", self.pin)
    }
}

impl GpioInput for RawGpioInput<'_> {
    fn read(&self) -> GpioResult<bool> {
        let level = self.pin.driver.raw_get_pin_level(self.pin.pin_index)?;
        Ok(self.pin.active_level.wire_level(level))
    }
}

struct RawGpioOutput<'a> {
    pin: &'a RawGpioPin<'a>,
}

impl Debug for RawGpioOutput<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[output]", self.pin)
    }
}

impl GpioOutput for RawGpioOutput<'_> {
    fn write(&self, value: bool) -> GpioResult<()> {
        self.pin
            .driver
            .raw_set_pin_output(self.pin.pin_index, self.pin.active_level.wire_level(value))
    }
}

struct RawGpioBus<'a, const N: usize> {
    driver: &'a RawGpioDriver,
    pin_indices: [usize; N],
    active_level: GpioActiveLevel,
}

impl<const N: usize> Debug for RawGpioBus<'_, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}{:?}", self.driver, self.pin_indices)
    }
}

impl<const N: usize> GpioBus<N> for RawGpioBus<'_, N> {
    fn as_input(&mut self) -> GpioResult<Box<dyn GpioBusInput<N> + '_>> {
        for &pin_index in &self.pin_indices {
            self.driver.raw_set_pin_function(pin_index, 0)?;
        }
        Ok(Box::new(RawGpioBusInput { bus: self }))
    }

    fn as_output(&mut self) -> GpioResult<Box<dyn GpioBusOutput<N> + '_>> {
        for &pin_index in &self.pin_indices {
            self.driver.raw_set_pin_function(pin_index, 1)?;
        }
        Ok(Box::new(RawGpioBusOutput { bus: self }))
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
        self.driver
            .raw_get_bias(self.pin_indices[0])
            .unwrap_or(GpioBias::None)
    }

    fn set_bias(&mut self, bias: GpioBias) -> GpioResult<()> {
        for &pin_index in &self.pin_indices {
            self.driver.raw_set_bias(pin_index, bias)?;
        }
        Ok(())
    }
}

impl<const N: usize> Drop for RawGpioBus<'_, N> {
    fn drop(&mut self) {
        for &pin_index in &self.pin_indices {
            _ = self.driver.raw_set_pin_function(pin_index, 0);
            self.driver.used_pins.set_aliased(pin_index, false);
        }
    }
}

struct RawGpioBusInput<'a, const N: usize> {
    bus: &'a RawGpioBus<'a, N>,
}

impl<const N: usize> Debug for RawGpioBusInput<'_, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[input]", self.bus)
    }
}

impl<const N: usize> GpioBusInput<N> for RawGpioBusInput<'_, N> {
    fn read(&self) -> GpioResult<[bool; N]> {
        let mut values = [false; N];
        for (i, &pin_index) in self.bus.pin_indices.iter().enumerate() {
            let level = self.bus.driver.raw_get_pin_level(pin_index)?;
            values[i] = self.bus.active_level.wire_level(level);
        }
        Ok(values)
    }
}

struct RawGpioBusOutput<'a, const N: usize> {
    bus: &'a RawGpioBus<'a, N>,
}

impl<const N: usize> Debug for RawGpioBusOutput<'_, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[output]", self.bus)
    }
}

impl<const N: usize> GpioBusOutput<N> for RawGpioBusOutput<'_, N> {
    fn write(&self, values: &[bool; N]) -> GpioResult<()> {
        for (i, &pin_index) in self.bus.pin_indices.iter().enumerate() {
            self.bus
                .driver
                .raw_set_pin_output(pin_index, self.bus.active_level.wire_level(values[i]))?;
        }
        Ok(())
    }
}
