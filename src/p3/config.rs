//! Contents of the `ALS_CONF` (0x00) and `PSM` (0x03) registers.
//!
//! `ALS_CONF` layout:
//!
//! | bits  | field              |
//! |-------|--------------------|
//! | 11–12 | gain               |
//! | 6–9   | integration time   |
//! | 4–5   | persistence        |
//! | 1     | interrupt enable   |
//!
//! `PSM` layout: bit 0 enables power saving, bits 1–2 select the mode.

use fugit::MillisDurationU32;
use num_enum::{IntoPrimitive, TryFromPrimitive};

const GAIN_SHIFT: u16 = 11;
const GAIN_MASK: u16 = 0b11;
const INTEGRATION_TIME_SHIFT: u16 = 6;
const INTEGRATION_TIME_MASK: u16 = 0b1111;
const PERSISTENCE_SHIFT: u16 = 4;
const PERSISTENCE_MASK: u16 = 0b11;
const INTERRUPT_ENABLE: u16 = 1 << 1;

const POWER_SAVING_ENABLE: u8 = 1;
const POWER_SAVING_MODE_SHIFT: u8 = 1;
const POWER_SAVING_MAX: u8 = 0x07;

/// A configuration value the sensor cannot accept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Power saving register value above `0x07`.
    PowerSaving,
    /// Integration time field is not one of `0x0`, `0x1`, `0x2`, `0x3`, `0x8`, `0xC`.
    IntegrationTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Gain {
    X1 = 0b00,
    X2 = 0b01,
    /// ×1/8
    Div8 = 0b10,
    /// ×1/4
    Div4 = 0b11,
}

impl Gain {
    #[must_use]
    pub const fn factor(self) -> f32 {
        match self {
            Self::X1 => 1.0,
            Self::X2 => 2.0,
            Self::Div8 => 0.125,
            Self::Div4 => 0.25,
        }
    }

    /// Column of the resolution table.
    pub(crate) const fn column(self) -> usize {
        self as usize
    }
}

/// Integration time.  The register codes are not in duration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IntegrationTime {
    Ms25 = 0xC,
    Ms50 = 0x8,
    Ms100 = 0x0,
    Ms200 = 0x1,
    Ms400 = 0x2,
    Ms800 = 0x3,
}

impl IntegrationTime {
    #[must_use]
    pub const fn duration(self) -> MillisDurationU32 {
        match self {
            Self::Ms25 => MillisDurationU32::millis(25),
            Self::Ms50 => MillisDurationU32::millis(50),
            Self::Ms100 => MillisDurationU32::millis(100),
            Self::Ms200 => MillisDurationU32::millis(200),
            Self::Ms400 => MillisDurationU32::millis(400),
            Self::Ms800 => MillisDurationU32::millis(800),
        }
    }

    /// Row of the resolution table: 100, 200, 400, 800, 50 then 25 ms.
    pub(crate) const fn row(self) -> usize {
        match self {
            Self::Ms100 => 0,
            Self::Ms200 => 1,
            Self::Ms400 => 2,
            Self::Ms800 => 3,
            Self::Ms50 => 4,
            Self::Ms25 => 5,
        }
    }
}

/// Number of consecutive out-of-window samples before the threshold interrupt fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Persistence {
    One = 0b00,
    Two = 0b01,
    Four = 0b10,
    Eight = 0b11,
}

/// Raw `ALS_CONF` register value.
///
/// Built field by field, or from raw bits when the value comes from elsewhere.  Only
/// [`AlsConfig::integration_time`] can fail: every 2-bit gain and persistence code is legal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlsConfig(u16);

impl AlsConfig {
    #[must_use]
    pub const fn new(gain: Gain, integration_time: IntegrationTime) -> Self {
        Self(0)
            .with_gain(gain)
            .with_integration_time(integration_time)
    }

    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn with_gain(self, gain: Gain) -> Self {
        Self((self.0 & !(GAIN_MASK << GAIN_SHIFT)) | ((gain as u16) << GAIN_SHIFT))
    }

    #[must_use]
    pub const fn with_integration_time(self, integration_time: IntegrationTime) -> Self {
        Self(
            (self.0 & !(INTEGRATION_TIME_MASK << INTEGRATION_TIME_SHIFT))
                | ((integration_time as u16) << INTEGRATION_TIME_SHIFT),
        )
    }

    #[must_use]
    pub const fn with_persistence(self, persistence: Persistence) -> Self {
        Self(
            (self.0 & !(PERSISTENCE_MASK << PERSISTENCE_SHIFT))
                | ((persistence as u16) << PERSISTENCE_SHIFT),
        )
    }

    #[must_use]
    pub const fn with_interrupt(self, enable: bool) -> Self {
        if enable {
            Self(self.0 | INTERRUPT_ENABLE)
        } else {
            Self(self.0 & !INTERRUPT_ENABLE)
        }
    }

    #[must_use]
    pub const fn gain(self) -> Gain {
        match (self.0 >> GAIN_SHIFT) & GAIN_MASK {
            0b00 => Gain::X1,
            0b01 => Gain::X2,
            0b10 => Gain::Div8,
            _ => Gain::Div4,
        }
    }

    /// # Errors
    ///
    /// [`ConfigError::IntegrationTime`]: bits 6–9 hold a code the sensor does not define.
    pub fn integration_time(self) -> Result<IntegrationTime, ConfigError> {
        let code = (self.0 >> INTEGRATION_TIME_SHIFT) & INTEGRATION_TIME_MASK;
        IntegrationTime::try_from(code as u8).map_err(|_| ConfigError::IntegrationTime)
    }

    #[must_use]
    pub const fn persistence(self) -> Persistence {
        match (self.0 >> PERSISTENCE_SHIFT) & PERSISTENCE_MASK {
            0b00 => Persistence::One,
            0b01 => Persistence::Two,
            0b10 => Persistence::Four,
            _ => Persistence::Eight,
        }
    }

    #[must_use]
    pub const fn interrupt_enabled(self) -> bool {
        self.0 & INTERRUPT_ENABLE != 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PowerSavingMode {
    Mode1 = 0b00,
    Mode2 = 0b01,
    Mode3 = 0b10,
    Mode4 = 0b11,
}

/// Raw `PSM` register value.  The driver writes it as given and does nothing else with it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerSaving(u8);

impl PowerSaving {
    #[must_use]
    pub const fn disabled() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn enabled(mode: PowerSavingMode) -> Self {
        Self(POWER_SAVING_ENABLE | ((mode as u8) << POWER_SAVING_MODE_SHIFT))
    }

    /// Unchecked: values above `0x07` are only rejected by [`PowerSaving::validate`].
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_enabled(self) -> bool {
        self.0 & POWER_SAVING_ENABLE != 0
    }

    #[must_use]
    pub const fn mode(self) -> PowerSavingMode {
        match (self.0 >> POWER_SAVING_MODE_SHIFT) & 0b11 {
            0b00 => PowerSavingMode::Mode1,
            0b01 => PowerSavingMode::Mode2,
            0b10 => PowerSavingMode::Mode3,
            _ => PowerSavingMode::Mode4,
        }
    }

    /// # Errors
    ///
    /// [`ConfigError::PowerSaving`]: value above `0x07`.
    pub const fn validate(self) -> Result<(), ConfigError> {
        if self.0 > POWER_SAVING_MAX {
            Err(ConfigError::PowerSaving)
        } else {
            Ok(())
        }
    }
}

/// Everything [`P3::init`](crate::P3::init) writes to the sensor.  The default is the all-zero
/// power-on configuration: gain ×1, 100 ms, persistence 1, interrupt and power saving off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub als: AlsConfig,
    pub power_saving: PowerSaving,
}
