//! Register map and checked register access.
//!
//! Every bus request made by the driver goes through a [`Context`], which checks the request as a
//! whole before the transport ever sees it.  All broken preconditions are reported together in a
//! single [`Violations`] set rather than stopping at the first.

use core::ops::BitOr;

use num_enum::IntoPrimitive;

use crate::p3::Error;
use crate::transport::Transport;

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    AlsConf = 0x00,
    AlsHighThreshold = 0x01,
    AlsLowThreshold = 0x02,
    PowerSaving = 0x03,
    Als = 0x04,
    White = 0x05,
    AlsInt = 0x06,
}

/// Highest address [`Context`] lets through.
pub const LAST_REGISTER: u8 = Register::AlsInt as u8;

/// Preconditions broken by a single register request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Violations(u8);

impl Violations {
    /// The transport is missing `read` or `write`.
    pub const CONTEXT: Self = Self(1 << 0);
    /// Register address beyond [`LAST_REGISTER`].
    pub const ADDRESS: Self = Self(1 << 1);
    /// Buffer shorter than the requested length.
    pub const BUFFER: Self = Self(1 << 2);
    /// Zero length request.
    pub const LENGTH: Self = Self(1 << 3);

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Composite status word: sign bit set, then bit 27 for context, 28 for address, 29 for
    /// length and 30 for buffer.
    #[must_use]
    pub const fn code(self) -> i32 {
        if self.is_empty() {
            return 0;
        }
        let mut code = i32::MIN;
        if self.contains(Self::CONTEXT) {
            code |= 1 << 27;
        }
        if self.contains(Self::ADDRESS) {
            code |= 1 << 28;
        }
        if self.contains(Self::LENGTH) {
            code |= 1 << 29;
        }
        if self.contains(Self::BUFFER) {
            code |= 1 << 30;
        }
        code
    }
}

impl BitOr for Violations {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Direction of a register request together with the bytes it moves.
pub enum Access<'a> {
    Read(&'a mut [u8]),
    Write(&'a [u8]),
}

impl Access<'_> {
    fn capacity(&self) -> usize {
        match self {
            Access::Read(buffer) => buffer.len(),
            Access::Write(data) => data.len(),
        }
    }
}

/// Checked register access on top of a borrowed [`Transport`].
pub struct Context<'a, T> {
    transport: &'a mut T,
}

impl<'a, T: Transport> Context<'a, T> {
    pub fn new(transport: &'a mut T) -> Self {
        Self { transport }
    }

    /// Every precondition `register`, `capacity` and `length` break at once.
    pub fn validate(&self, register: u8, capacity: usize, length: usize) -> Violations {
        let mut violations = Violations::empty();
        if !self.transport.is_available() {
            violations = violations | Violations::CONTEXT;
        }
        if register > LAST_REGISTER {
            violations = violations | Violations::ADDRESS;
        }
        if capacity < length {
            violations = violations | Violations::BUFFER;
        }
        if length == 0 {
            violations = violations | Violations::LENGTH;
        }
        violations
    }

    /// Moves the first `length` bytes of `access` to or from `register`.  The transport is
    /// called once and its result returned as is.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`]: one or more preconditions failed; the transport was not called.
    /// - [`Error::Bus`]: the transport failed.
    pub fn access(
        &mut self,
        access: Access<'_>,
        register: u8,
        length: usize,
    ) -> Result<(), Error<T::Error>> {
        let violations = self.validate(register, access.capacity(), length);
        if !violations.is_empty() {
            #[cfg(feature = "defmt")]
            defmt::debug!(
                "rejected access to {=u8:#x}: {=u8:#b}",
                register,
                violations.bits()
            );
            return Err(Error::Validation(violations));
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("access {=u8:#x}, {} bytes", register, length);
        match access {
            Access::Read(buffer) => self.transport.read(register, &mut buffer[..length])?,
            Access::Write(data) => self.transport.write(register, &data[..length])?,
        }
        Ok(())
    }

    /// # Errors
    ///
    /// See [`Context::access`].
    pub fn read(
        &mut self,
        register: u8,
        buffer: &mut [u8],
        length: usize,
    ) -> Result<(), Error<T::Error>> {
        self.access(Access::Read(buffer), register, length)
    }

    /// # Errors
    ///
    /// See [`Context::access`].
    pub fn write(&mut self, register: u8, data: &[u8], length: usize) -> Result<(), Error<T::Error>> {
        self.access(Access::Write(data), register, length)
    }
}
