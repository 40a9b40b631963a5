//! Bus capabilities consumed by the [`P3`](crate::P3) driver.
//!
//! The driver never talks to a bus directly.  Everything goes through a [`Transport`], which is
//! either an [`I2cTransport`] wrapping an [`I2c`] from the target platform HAL, or a
//! [`Callbacks`] table for integrations that already have plain register read/write functions.

use crate::{address_check, OutOfRange};
use embedded_hal::i2c::{I2c, Operation};

/// Address of the PiicoDev board with the ADDR jumper open.
pub const DEFAULT_ADDRESS: u8 = 0x10;
/// Address with the ADDR pin pulled high.
pub const ALTERNATIVE_ADDRESS: u8 = 0x48;

/// Status reported by [`Callbacks`] when `read` or `write` is missing.
pub const UNAVAILABLE: i32 = -2;

/// Register level access to a single device.
pub trait Transport {
    type Error;

    /// Bus setup.  Called once by [`P3::init`](crate::P3::init) before the first register write.
    fn init(&mut self) {}

    /// Bus teardown.  The driver never calls this; it belongs to whoever owns the transport.
    fn deinit(&mut self) {}

    /// Writes `data` starting at `register`.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying bus, passed through untouched.
    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Fills `buffer` starting at `register`.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying bus, passed through untouched.
    fn read(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Millisecond tick, if the platform exposes one.
    fn tick(&mut self) -> Option<u32> {
        None
    }

    /// Level of the interrupt pin, if it is wired up.
    fn read_pin(&mut self) -> Option<bool> {
        None
    }

    /// Whether both `read` and `write` can actually reach the bus.
    fn is_available(&self) -> bool {
        true
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn init(&mut self) {
        (**self).init();
    }

    fn deinit(&mut self) {
        (**self).deinit();
    }

    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write(register, data)
    }

    fn read(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read(register, buffer)
    }

    fn tick(&mut self) -> Option<u32> {
        (**self).tick()
    }

    fn read_pin(&mut self) -> Option<bool> {
        (**self).read_pin()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// [`Transport`] over an embedded-hal [`I2c`] bus.
pub struct I2cTransport<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cTransport<I2C> {
    /// Transport for a board with the ADDR jumper open (`0x10`).
    pub const fn default(i2c: I2C) -> Self {
        Self {
            i2c,
            address: DEFAULT_ADDRESS,
        }
    }

    /// Transport for a board with the ADDR pin pulled high (`0x48`).
    pub const fn alternative(i2c: I2C) -> Self {
        Self {
            i2c,
            address: ALTERNATIVE_ADDRESS,
        }
    }

    /// Expects [`I2c`] (obtainable from target platform HAL) and an I2C device address in the
    /// range `0x08..=0x77`.
    ///
    /// # Errors
    ///
    /// [`OutOfRange`]: address is ouside of the allowed range `0x08..=0x77`
    pub fn new(i2c: I2C, address: u8) -> Result<Self, OutOfRange> {
        address_check(address)?;
        Ok(Self { i2c, address })
    }

    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Consumes the transport and hands back the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> Transport for I2cTransport<I2C> {
    type Error = I2C::Error;

    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        if data.len() > 32 {
            // adjacent writes in one transaction go out without a repeated start
            return self.i2c.transaction(
                self.address,
                &mut [Operation::Write(&[register]), Operation::Write(data)],
            );
        }
        let mut buffer = [0u8; 33];
        buffer[0] = register;
        buffer[1..=data.len()].copy_from_slice(data);

        self.i2c.write(self.address, &buffer[..=data.len()])
    }

    fn read(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[register], buffer)
    }
}

/// Register write callback: returns `0` on success, anything else is a bus specific failure.
pub type WriteFn<'a> = &'a mut dyn FnMut(u8, &[u8]) -> i32;
/// Register read callback: returns `0` on success, anything else is a bus specific failure.
pub type ReadFn<'a> = &'a mut dyn FnMut(u8, &mut [u8]) -> i32;

/// A [`Transport`] assembled from individual callbacks.
///
/// Every entry is optional.  The driver refuses to initialize unless both `read` and `write` are
/// present, and any non-zero status a callback returns is reported unchanged as the bus error.
#[derive(Default)]
pub struct Callbacks<'a> {
    pub init: Option<&'a mut dyn FnMut()>,
    pub deinit: Option<&'a mut dyn FnMut()>,
    pub write: Option<WriteFn<'a>>,
    pub read: Option<ReadFn<'a>>,
    pub tick: Option<&'a mut dyn FnMut() -> u32>,
    pub read_pin: Option<&'a mut dyn FnMut() -> bool>,
}

const fn status(code: i32) -> Result<(), i32> {
    if code == 0 {
        Ok(())
    } else {
        Err(code)
    }
}

impl Transport for Callbacks<'_> {
    type Error = i32;

    fn init(&mut self) {
        if let Some(init) = &mut self.init {
            init();
        }
    }

    fn deinit(&mut self) {
        if let Some(deinit) = &mut self.deinit {
            deinit();
        }
    }

    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), i32> {
        match &mut self.write {
            Some(write) => status(write(register, data)),
            None => Err(UNAVAILABLE),
        }
    }

    fn read(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), i32> {
        match &mut self.read {
            Some(read) => status(read(register, buffer)),
            None => Err(UNAVAILABLE),
        }
    }

    fn tick(&mut self) -> Option<u32> {
        self.tick.as_mut().map(|tick| tick())
    }

    fn read_pin(&mut self) -> Option<bool> {
        self.read_pin.as_mut().map(|read_pin| read_pin())
    }

    fn is_available(&self) -> bool {
        self.read.is_some() && self.write.is_some()
    }
}
