#![no_std]
#![doc = include_str!("../README.md")]

/// The I2C address handed to [`I2cTransport::new`] is outside the 7-bit range `0x08..=0x77`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange;

pub(crate) fn address_check(address: u8) -> Result<(), OutOfRange> {
    if (0x08..=0x77).contains(&address) {
        Ok(())
    } else {
        Err(OutOfRange)
    }
}

pub mod p3;
pub mod transport;

pub use p3::P3;
pub use transport::{Callbacks, I2cTransport, Transport};
