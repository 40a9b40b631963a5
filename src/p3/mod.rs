//! # Unofficial Rust Driver for `PiicoDev` Ambient Light Sensor
//!
//! Register level driver for the VEML6030.  [`P3::init`] writes the ALS and power saving
//! configuration, after which [`P3::read_light`] reports lux and the threshold accessors set or
//! fetch the interrupt window, also in lux.
//!
//! ## External Links
//!
//! - [Official Hardware Repository]
//! - [Official MicroPython Repository]
//! - [Official Product Site]
//! - [Datasheet]
//! - [Alternate Driver]
//!
//! [Official Hardware Repository]: https://github.com/CoreElectronics/CE-PiicoDev-Ambient-Light-Sensor-VEML6030/tree/2c46d51e90e8e83d5c3dfa3b6a614adb75469b6c
//! [Official MicroPython Repository]: https://github.com/CoreElectronics/CE-PiicoDev-VEML6030-MicroPython-Module/tree/14b19d9dffe959efd90a55e7a37e663788ab53ff
//! [Official Product Site]: https://piico.dev/p3
//! [Datasheet]: https://www.vishay.com/en/product/84366/
//! [Alternate Driver]: https://github.com/eldruin/veml6030-rs

pub mod config;
pub mod conversion;
pub mod registers;

use crate::transport::Transport;
use config::{ConfigError, Settings};
use conversion::{resolution, to_lux, to_raw, ParameterError};
use registers::{Context, Register, Violations};

/// Width in bytes of every VEML6030 register.
const REGISTER_WIDTH: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The settings handed to [`P3::init`] cannot be written.
    Config(ConfigError),
    /// The transport cannot both read and write.
    TransportUnavailable,
    /// [`P3::init`] has not succeeded yet.
    NotInitialized,
    /// A threshold below zero (or NaN) was requested.
    Parameter,
    /// The transport failed.
    Bus(E),
    /// A register request broke one or more preconditions and never reached the transport.
    Validation(Violations),
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}

impl<E> Error<E> {
    /// Integer status code for callers that report errors numerically.  Bus errors have no fixed
    /// code: their encoding belongs to the transport.
    pub const fn code(&self) -> Option<i32> {
        match self {
            Self::TransportUnavailable => Some(-2),
            Self::NotInitialized => Some(-3),
            Self::Config(ConfigError::PowerSaving) => Some(-4),
            Self::Config(ConfigError::IntegrationTime) | Self::Parameter => Some(-5),
            Self::Validation(violations) => Some(violations.code()),
            Self::Bus(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Uninitialized,
    Initialized,
}

pub struct P3<T> {
    transport: T,
    status: Status,
    resolution: f32,
}

impl<T: Transport> P3<T> {
    /// Wraps `transport` without touching the hardware.  Nothing but [`P3::init`] is usable until
    /// initialization succeeds.
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            status: Status::Uninitialized,
            resolution: 0.0,
        }
    }

    /// Validates `settings`, then writes them to the sensor.  Calling this again once
    /// initialized does nothing.  If any step fails the handle stays uninitialized and `init`
    /// may be retried.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`]: power saving value above `0x07`, or an undefined integration time.
    /// - [`Error::TransportUnavailable`]: the transport is missing `read` or `write`.
    /// - [`Error::Bus`] / [`Error::Validation`]: writing either register failed.
    pub fn init(&mut self, settings: Settings) -> Result<(), Error<T::Error>> {
        settings.power_saving.validate().map_err(Error::Config)?;
        if self.status == Status::Initialized {
            return Ok(());
        }
        if !self.transport.is_available() {
            return Err(Error::TransportUnavailable);
        }

        let integration_time = settings.als.integration_time().map_err(Error::Config)?;
        let lux_per_count = resolution(integration_time, settings.als.gain());

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "init: ALS_CONF {=u16:#x}, PSM {=u8:#x}, {} lux/count",
            settings.als.bits(),
            settings.power_saving.bits(),
            lux_per_count
        );

        self.transport.init();
        self.write_register(Register::AlsConf, settings.als.bits())?;
        self.write_register(
            Register::PowerSaving,
            u16::from(settings.power_saving.bits()),
        )?;
        self.resolution = lux_per_count;
        self.status = Status::Initialized;
        Ok(())
    }

    /// Ambient light in lux.
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`]
    /// - [`Error::Bus`] / [`Error::Validation`]: reading the ALS register failed.
    pub fn read_light(&mut self) -> Result<f32, Error<T::Error>> {
        self.ensure_initialized()?;
        let raw = self.read_register(Register::Als)?;
        Ok(to_lux(raw, self.resolution))
    }

    /// Sets the upper edge of the interrupt window.  Values past the top of the range clamp to
    /// the largest count the sensor holds.
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`]
    /// - [`Error::Parameter`]: `lux` is negative; nothing is written.
    /// - [`Error::Bus`] / [`Error::Validation`]: writing the threshold register failed.
    pub fn set_high_threshold(&mut self, lux: f32) -> Result<(), Error<T::Error>> {
        self.set_threshold(Register::AlsHighThreshold, lux)
    }

    /// Sets the lower edge of the interrupt window.  See [`P3::set_high_threshold`].
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`]
    /// - [`Error::Parameter`]: `lux` is negative; nothing is written.
    /// - [`Error::Bus`] / [`Error::Validation`]: writing the threshold register failed.
    pub fn set_low_threshold(&mut self, lux: f32) -> Result<(), Error<T::Error>> {
        self.set_threshold(Register::AlsLowThreshold, lux)
    }

    /// # Errors
    ///
    /// - [`Error::NotInitialized`]
    /// - [`Error::Bus`] / [`Error::Validation`]: reading the threshold register failed.
    pub fn get_high_threshold(&mut self) -> Result<f32, Error<T::Error>> {
        self.get_threshold(Register::AlsHighThreshold)
    }

    /// # Errors
    ///
    /// - [`Error::NotInitialized`]
    /// - [`Error::Bus`] / [`Error::Validation`]: reading the threshold register failed.
    pub fn get_low_threshold(&mut self) -> Result<f32, Error<T::Error>> {
        self.get_threshold(Register::AlsLowThreshold)
    }

    pub fn is_initialized(&self) -> bool {
        self.status == Status::Initialized
    }

    pub const fn status(&self) -> Status {
        self.status
    }

    /// Lux per count for the configured gain and integration time, `None` before [`P3::init`].
    pub fn resolution(&self) -> Option<f32> {
        self.is_initialized().then_some(self.resolution)
    }

    /// Consumes the driver and hands back the transport.  [`Transport::deinit`] is left to the
    /// caller.
    pub fn release(self) -> T {
        self.transport
    }

    fn ensure_initialized(&self) -> Result<(), Error<T::Error>> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn set_threshold(&mut self, register: Register, lux: f32) -> Result<(), Error<T::Error>> {
        self.ensure_initialized()?;
        let raw = to_raw(lux, self.resolution).map_err(|ParameterError| Error::Parameter)?;
        self.write_register(register, raw)
    }

    fn get_threshold(&mut self, register: Register) -> Result<f32, Error<T::Error>> {
        self.ensure_initialized()?;
        let raw = self.read_register(register)?;
        Ok(to_lux(raw, self.resolution))
    }

    fn read_register(&mut self, register: Register) -> Result<u16, Error<T::Error>> {
        let mut data = [0u8; REGISTER_WIDTH];
        Context::new(&mut self.transport).read(register.into(), &mut data, REGISTER_WIDTH)?;
        Ok(u16::from_le_bytes(data))
    }

    fn write_register(&mut self, register: Register, value: u16) -> Result<(), Error<T::Error>> {
        Context::new(&mut self.transport).write(
            register.into(),
            &value.to_le_bytes(),
            REGISTER_WIDTH,
        )
    }
}

#[cfg(all(test, not(all(target_arch = "arm", target_os = "none"))))]
mod test {
    extern crate std;
    use std::vec;
    extern crate embedded_hal;
    extern crate embedded_hal_mock;

    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    use crate::p3::config::{
        AlsConfig, ConfigError, Gain, IntegrationTime, Persistence, PowerSaving, PowerSavingMode,
        Settings,
    };
    use crate::p3::{Error, Status, P3};
    use crate::transport::I2cTransport;

    fn initialized<I2C>(i2c: I2C, resolution: f32) -> P3<I2cTransport<I2C>> {
        P3 {
            transport: I2cTransport::default(i2c),
            status: Status::Initialized,
            resolution,
        }
    }

    #[test]
    pub fn new() {
        let i2c = I2cMock::new(&[]);
        let mut i2c_clone = i2c.clone();

        let p3 = P3::new(I2cTransport::default(i2c));
        assert_eq!(p3.status(), Status::Uninitialized);
        assert_eq!(p3.resolution(), None);
        i2c_clone.done();
    }

    #[test]
    pub fn init() {
        let expectations = [
            I2cTransaction::write(0x10, vec![0x00, 0x00, 0x00]),
            I2cTransaction::write(0x10, vec![0x03, 0x00, 0x00]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut i2c_clone = i2c.clone();

        let mut p3 = P3::new(I2cTransport::default(i2c));
        assert_eq!(p3.init(Settings::default()), Ok(()));
        assert!(p3.is_initialized());
        assert_eq!(p3.resolution(), Some(0.0036));
        i2c_clone.done();
    }

    #[test]
    pub fn init_writes_settings_lsb_first() {
        let expectations = [
            I2cTransaction::write(0x10, vec![0x00, 0xF2, 0x18]),
            I2cTransaction::write(0x10, vec![0x03, 0x07, 0x00]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut i2c_clone = i2c.clone();

        let settings = Settings {
            als: AlsConfig::new(Gain::Div4, IntegrationTime::Ms800)
                .with_persistence(Persistence::Eight)
                .with_interrupt(true),
            power_saving: PowerSaving::enabled(PowerSavingMode::Mode4),
        };
        let mut p3 = P3::new(I2cTransport::default(i2c));
        assert_eq!(p3.init(settings), Ok(()));
        assert_eq!(p3.resolution(), Some(0.4608));
        i2c_clone.done();
    }

    #[test]
    pub fn init_twice() {
        let expectations = [
            I2cTransaction::write(0x10, vec![0x00, 0x00, 0x00]),
            I2cTransaction::write(0x10, vec![0x03, 0x00, 0x00]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut i2c_clone = i2c.clone();

        let mut p3 = P3::new(I2cTransport::default(i2c));
        p3.init(Settings::default()).unwrap();
        let other = Settings {
            als: AlsConfig::new(Gain::X2, IntegrationTime::Ms25),
            power_saving: PowerSaving::disabled(),
        };
        assert_eq!(p3.init(other), Ok(()));
        assert_eq!(p3.resolution(), Some(0.0036));
        i2c_clone.done();
    }

    #[test]
    pub fn init_power_saving_out_of_range() {
        let i2c = I2cMock::new(&[]);
        let mut i2c_clone = i2c.clone();

        let mut p3 = P3::new(I2cTransport::default(i2c));
        let settings = Settings {
            power_saving: PowerSaving::from_bits(0x08),
            ..Settings::default()
        };
        assert_eq!(
            p3.init(settings),
            Err(Error::Config(ConfigError::PowerSaving))
        );
        assert!(!p3.is_initialized());
        i2c_clone.done();
    }

    #[test]
    pub fn init_illegal_integration_time() {
        let i2c = I2cMock::new(&[]);
        let mut i2c_clone = i2c.clone();

        let mut p3 = P3::new(I2cTransport::default(i2c));
        let settings = Settings {
            als: AlsConfig::from_bits(0x4 << 6),
            ..Settings::default()
        };
        assert_eq!(
            p3.init(settings),
            Err(Error::Config(ConfigError::IntegrationTime))
        );
        assert_eq!(p3.status(), Status::Uninitialized);
        i2c_clone.done();
    }

    #[test]
    pub fn init_bus_error_leaves_uninitialized() {
        let expectations = [
            I2cTransaction::write(0x10, vec![0x00, 0x00, 0x00]),
            I2cTransaction::write(0x10, vec![0x03, 0x00, 0x00]).with_error(ErrorKind::Other),
            I2cTransaction::write(0x10, vec![0x00, 0x00, 0x00]),
            I2cTransaction::write(0x10, vec![0x03, 0x00, 0x00]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut i2c_clone = i2c.clone();

        let mut p3 = P3::new(I2cTransport::default(i2c));
        assert_eq!(
            p3.init(Settings::default()),
            Err(Error::Bus(ErrorKind::Other))
        );
        assert!(!p3.is_initialized());
        assert_eq!(p3.resolution, 0.0);
        assert_eq!(p3.init(Settings::default()), Ok(()));
        assert!(p3.is_initialized());
        assert_eq!(p3.resolution(), Some(0.0036));
        i2c_clone.done();
    }

    #[test]
    pub fn read_light() {
        let expectations = [I2cTransaction::write_read(
            0x10,
            vec![0x04],
            vec![0xE8, 0x03],
        )];
        let i2c = I2cMock::new(&expectations);
        let mut i2c_clone = i2c.clone();

        let mut p3 = initialized(i2c, 0.0036);
        let lux = p3.read_light().unwrap();
        assert!((lux - 3.6).abs() < 1e-4);
        i2c_clone.done();
    }

    #[test]
    pub fn read_light_bus_error() {
        let expectations = [
            I2cTransaction::write_read(0x10, vec![0x04], vec![0x00, 0x00])
                .with_error(ErrorKind::Other),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut i2c_clone = i2c.clone();

        let mut p3 = initialized(i2c, 0.0036);
        assert_eq!(p3.read_light(), Err(Error::Bus(ErrorKind::Other)));
        assert!(p3.is_initialized());
        i2c_clone.done();
    }

    #[test]
    pub fn uninitialized_guard() {
        let i2c = I2cMock::new(&[]);
        let mut i2c_clone = i2c.clone();

        let mut p3 = P3::new(I2cTransport::default(i2c));
        assert_eq!(p3.read_light(), Err(Error::NotInitialized));
        assert_eq!(p3.set_high_threshold(10.0), Err(Error::NotInitialized));
        assert_eq!(p3.set_low_threshold(10.0), Err(Error::NotInitialized));
        assert_eq!(p3.get_high_threshold(), Err(Error::NotInitialized));
        assert_eq!(p3.get_low_threshold(), Err(Error::NotInitialized));
        i2c_clone.done();
    }

    #[test]
    pub fn set_high_threshold() {
        let expectations = [I2cTransaction::write(0x10, vec![0x01, 0xE8, 0x03])];
        let i2c = I2cMock::new(&expectations);
        let mut i2c_clone = i2c.clone();

        let mut p3 = initialized(i2c, 0.5);
        assert_eq!(p3.set_high_threshold(500.0), Ok(()));
        i2c_clone.done();
    }

    #[test]
    pub fn set_high_threshold_saturates() {
        let expectations = [I2cTransaction::write(0x10, vec![0x01, 0xFF, 0xFF])];
        let i2c = I2cMock::new(&expectations);
        let mut i2c_clone = i2c.clone();

        let mut p3 = initialized(i2c, 0.0036);
        assert_eq!(p3.set_high_threshold(300_000.0), Ok(()));
        i2c_clone.done();
    }

    #[test]
    pub fn set_low_threshold() {
        let expectations = [I2cTransaction::write(0x10, vec![0x02, 0x0A, 0x00])];
        let i2c = I2cMock::new(&expectations);
        let mut i2c_clone = i2c.clone();

        let mut p3 = initialized(i2c, 1.0);
        assert_eq!(p3.set_low_threshold(10.9), Ok(()));
        i2c_clone.done();
    }

    #[test]
    pub fn negative_threshold() {
        let i2c = I2cMock::new(&[]);
        let mut i2c_clone = i2c.clone();

        let mut p3 = initialized(i2c, 0.0036);
        assert_eq!(p3.set_high_threshold(-1.0), Err(Error::Parameter));
        assert_eq!(p3.set_low_threshold(-0.001), Err(Error::Parameter));
        i2c_clone.done();
    }

    #[test]
    pub fn get_thresholds_read() {
        let expectations = [
            I2cTransaction::write_read(0x10, vec![0x01], vec![0x00, 0x01]),
            I2cTransaction::write_read(0x10, vec![0x02], vec![0x10, 0x00]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut i2c_clone = i2c.clone();

        let mut p3 = initialized(i2c, 0.5);
        assert_eq!(p3.get_high_threshold(), Ok(128.0));
        assert_eq!(p3.get_low_threshold(), Ok(8.0));
        i2c_clone.done();
    }

    #[test]
    pub fn codes() {
        assert_eq!(Error::<()>::TransportUnavailable.code(), Some(-2));
        assert_eq!(Error::<()>::NotInitialized.code(), Some(-3));
        assert_eq!(
            Error::<()>::Config(ConfigError::PowerSaving).code(),
            Some(-4)
        );
        assert_eq!(Error::<()>::Parameter.code(), Some(-5));
        assert_eq!(Error::Bus(7).code(), None);
    }

    #[test]
    pub fn release() {
        let i2c = I2cMock::new(&[]);
        let mut i2c_clone = i2c.clone();

        let p3 = P3::new(I2cTransport::default(i2c));
        let i2c = p3.release().release();
        assert_eq!(I2cTransport::default(i2c).address(), 0x10);
        i2c_clone.done();
    }
}
