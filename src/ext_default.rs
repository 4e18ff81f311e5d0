// Licensed under the Apache-2.0 license

//! The `ext_default` LCD extern device.
//!
//! A generic panel power controller: everything it does on power on and
//! power off comes from its command tables. Without platform supplied
//! settings it is an I2C device at `0x1c` running the built-in tables
//! below with 9-byte fixed steps.
//!
//! ```rust,ignore
//! let config = ExternConfigBuilder::new().build()?;
//! let bus = I2cCommandBus::from_config(i2c, &config);
//! let mut panel = LcdExtern::new(config, pins, bus, delay, LogFacade);
//! panel.power_on()?;
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::SevenBitAddress;
use hex_literal::hex;

use crate::common::{Logger, NoOpLogger};
use crate::config::{BusType, ExternConfig, PowerState};
use crate::error::Error;
use crate::sequencer::Sequencer;
use crate::traits::{CommandBus, GpioBank};

pub const INDEX: u8 = 0;
pub const NAME: &str = "ext_default";
pub const BUS_TYPE: BusType = BusType::I2c;
pub const CMD_SIZE: u8 = 9;

pub const I2C_ADDR: SevenBitAddress = 0x1c;
pub const I2C_BUS: u8 = 0;

pub const SPI_GPIO_CS: u8 = 0;
pub const SPI_GPIO_CLK: u8 = 1;
pub const SPI_GPIO_DATA: u8 = 2;
pub const SPI_CLK_FREQ_HZ: u32 = 10_000;
pub const SPI_CLK_POL: bool = true;

pub const INIT_ON_TABLE: [u8; 81] = hex!(
    "00 20 01 02 00 40 ff 00 00"
    "00 80 02 00 40 62 51 73 00"
    "00 61 06 00 00 00 00 00 00"
    "00 c1 05 0f 00 08 70 00 00"
    "00 13 01 00 00 00 00 00 00"
    "00 3d 02 01 00 00 00 00 00"
    "00 ed 0d 01 00 00 00 00 00"
    "00 23 02 00 00 00 00 00 0a"
    "ff 00 00 00 00 00 00 00 00"
);

pub const INIT_OFF_TABLE: [u8; 9] = hex!("ff 00 00 00 00 00 00 00 00");

/// An LCD extern device bound to its GPIO lines and command bus.
pub struct LcdExtern<'a, G, B, D, L = NoOpLogger> {
    config: ExternConfig<'a>,
    gpio: G,
    bus: B,
    delay: D,
    logger: L,
}

impl<'a, G, B, D, L> LcdExtern<'a, G, B, D, L>
where
    G: GpioBank,
    B: CommandBus<G>,
    D: DelayNs,
    L: Logger,
{
    pub fn new(config: ExternConfig<'a>, gpio: G, bus: B, delay: D, logger: L) -> Self {
        Self {
            config,
            gpio,
            bus,
            delay,
            logger,
        }
    }

    pub fn config(&self) -> &ExternConfig<'a> {
        &self.config
    }

    /// Runs the power-on table.
    ///
    /// # Errors
    ///
    /// See [`Sequencer::run`].
    pub fn power_on(&mut self) -> Result<(), Error<B::Error>> {
        self.power_ctrl(PowerState::On)
    }

    /// Runs the power-off table.
    ///
    /// # Errors
    ///
    /// See [`Sequencer::run`].
    pub fn power_off(&mut self) -> Result<(), Error<B::Error>> {
        self.power_ctrl(PowerState::Off)
    }

    fn power_ctrl(&mut self, power: PowerState) -> Result<(), Error<B::Error>> {
        self.bus.prepare(&mut self.gpio);
        let result = Sequencer::new(
            &self.config,
            &mut self.gpio,
            &mut self.bus,
            &mut self.delay,
            &mut self.logger,
        )
        .run(power);
        self.bus.release(&mut self.gpio);

        self.logger.info(format_args!(
            "{}({}): power {}",
            self.config.name.as_str(),
            self.config.index,
            power
        ));
        result
    }

    /// Consumes the device and returns its parts.
    pub fn free(self) -> (ExternConfig<'a>, G, B, D, L) {
        (self.config, self.gpio, self.bus, self.delay, self.logger)
    }
}
