//! Raw ALS counts to lux and back.

use crate::p3::config::{Gain, IntegrationTime};

/// Lux per count, indexed by [`IntegrationTime::row`] then [`Gain::column`].
static RESOLUTION: [[f32; 4]; 6] = [
    [0.0036, 0.0072, 0.0288, 0.0576],
    [0.0072, 0.0144, 0.0576, 0.1152],
    [0.0144, 0.0288, 0.1152, 0.2304],
    [0.0288, 0.0576, 0.2304, 0.4608],
    [0.0576, 0.1152, 0.4608, 0.9216],
    [0.1152, 0.2304, 0.9216, 1.8432],
];

/// Lux threshold that cannot be expressed as a count: negative or NaN.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParameterError;

#[must_use]
pub fn resolution(integration_time: IntegrationTime, gain: Gain) -> f32 {
    RESOLUTION[integration_time.row()][gain.column()]
}

#[must_use]
pub fn to_lux(raw: u16, resolution: f32) -> f32 {
    f32::from(raw) * resolution
}

/// Converts lux into a register count, truncating any fraction.  Anything beyond the top of the
/// 16-bit range saturates at `0xFFFF`.
///
/// # Errors
///
/// [`ParameterError`]: `lux` is negative or NaN.
pub fn to_raw(lux: f32, resolution: f32) -> Result<u16, ParameterError> {
    if lux < 0.0 {
        return Err(ParameterError);
    }
    match cast::u16(lux / resolution) {
        Ok(count) => Ok(count),
        Err(cast::Error::Overflow | cast::Error::Infinite) => Ok(u16::MAX),
        Err(cast::Error::NaN | cast::Error::Underflow) => Err(ParameterError),
    }
}
