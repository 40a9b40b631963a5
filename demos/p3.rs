#![no_std]
#![no_main]

#[cfg(not(target_os = "none"))]
mod other {
    extern crate std;
    use std::println;
    #[no_mangle]
    pub extern "C" fn main() {
        loop {
            println!("unsupported target");
        }
    }
}

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod arm {
    use defmt::*;
    use defmt_rtt as _;
    use fugit::RateExtU32;
    use panic_probe as _;
    use piicodev_veml6030::p3::config::{
        AlsConfig, Gain, IntegrationTime, Persistence, PowerSaving, Settings,
    };
    use piicodev_veml6030::{I2cTransport, P3};
    use rp2040_hal::{
        clocks::{init_clocks_and_plls, Clock},
        entry,
        gpio::{FunctionI2C, Pin, PullUp},
        i2c::I2C,
        pac,
        sio::Sio,
        watchdog::Watchdog,
    };

    const INTEGRATION_TIME: IntegrationTime = IntegrationTime::Ms100;

    #[link_section = ".boot2"]
    #[used]
    pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

    #[entry]
    fn main() -> ! {
        let mut pac = pac::Peripherals::take().unwrap();
        let core = pac::CorePeripherals::take().unwrap();
        let mut watchdog = Watchdog::new(pac.WATCHDOG);
        let sio = Sio::new(pac.SIO);

        let external_xtal_freq_hz = 12_000_000u32;
        let clocks = init_clocks_and_plls(
            external_xtal_freq_hz,
            pac.XOSC,
            pac.CLOCKS,
            pac.PLL_SYS,
            pac.PLL_USB,
            &mut pac.RESETS,
            &mut watchdog,
        )
        .ok()
        .unwrap();

        let pins = rp2040_hal::gpio::Pins::new(
            pac.IO_BANK0,
            pac.PADS_BANK0,
            sio.gpio_bank0,
            &mut pac.RESETS,
        );

        let sda: Pin<_, FunctionI2C, PullUp> = pins.gpio8.reconfigure();
        let scl: Pin<_, FunctionI2C, PullUp> = pins.gpio9.reconfigure();
        let i2c = I2C::i2c0(
            pac.I2C0,
            sda,
            scl,
            400.kHz(),
            &mut pac.RESETS,
            clocks.system_clock.freq(),
        );

        let mut delay = cortex_m::delay::Delay::new(core.SYST, clocks.system_clock.freq().to_Hz());

        let mut p3 = P3::new(I2cTransport::default(i2c));
        p3.init(Settings {
            als: AlsConfig::new(Gain::Div4, INTEGRATION_TIME)
                .with_persistence(Persistence::Two)
                .with_interrupt(true),
            power_saving: PowerSaving::disabled(),
        })
        .unwrap();
        p3.set_high_threshold(500.0).unwrap();
        p3.set_low_threshold(20.0).unwrap();

        loop {
            delay.delay_ms(INTEGRATION_TIME.duration().to_millis());
            // read the ambient light and print it in lux
            let lux = p3.read_light().unwrap();
            println!("{} lux", lux);
        }
    }
}
