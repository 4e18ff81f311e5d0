// Licensed under the Apache-2.0 license

//! Per-device configuration for an LCD extern power controller.
//!
//! An [`ExternConfig`] is built once when the device is bound, either from
//! the built-in defaults of the `ext_default` device or from values the
//! platform loaded elsewhere, and is read-only afterwards. Command tables
//! are borrowed, never copied: the built-in ones are `'static`, platform
//! ones live wherever the platform parsed them.

use core::fmt;

use embedded_hal::i2c::SevenBitAddress;
use fugit::{HertzU32, MicrosDurationU32};
use heapless::String;

use crate::ext_default;

/// Raw `cmd_size` value selecting self-describing step sizes.
pub const CMD_SIZE_DYNAMIC: u8 = 0xff;
/// Default upper bound on readable power-on table bytes.
pub const INIT_ON_MAX: usize = 3000;
/// Default upper bound on readable power-off table bytes.
pub const INIT_OFF_MAX: usize = 100;
/// Default number of addressable GPIO lines.
pub const LCD_GPIO_MAX: u8 = 0xff;
/// Longest device name accepted.
pub const NAME_LEN_MAX: usize = 30;

pub type DeviceName = String<NAME_LEN_MAX>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PowerState {
    On,
    Off,
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerState::On => f.write_str("on"),
            PowerState::Off => f.write_str("off"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusType {
    I2c,
    Spi,
}

/// Step encoding of a command table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CmdSize {
    /// Every step carries its own size byte.
    Dynamic,
    /// Every step is exactly this many bytes wide.
    Fixed(u8),
}

impl From<u8> for CmdSize {
    fn from(raw: u8) -> Self {
        if raw == CMD_SIZE_DYNAMIC {
            CmdSize::Dynamic
        } else {
            CmdSize::Fixed(raw)
        }
    }
}

impl CmdSize {
    #[must_use]
    pub fn raw(self) -> u8 {
        match self {
            CmdSize::Dynamic => CMD_SIZE_DYNAMIC,
            CmdSize::Fixed(width) => width,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct I2cSettings {
    pub address: SevenBitAddress,
    /// Second address for `Cmd2` steps.
    pub address2: Option<SevenBitAddress>,
    pub bus: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpiPins {
    pub cs: u8,
    pub clk: u8,
    pub data: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpiSettings {
    pub pins: SpiPins,
    pub clk_freq: HertzU32,
    /// Clock level while no byte is being shifted. Bits are latched on the
    /// transition away from the opposite level.
    pub clk_pol: bool,
}

impl SpiSettings {
    /// Settle time after every line transition: one clock period.
    #[must_use]
    pub fn transition_delay(&self) -> MicrosDurationU32 {
        let hz = self.clk_freq.to_Hz();
        MicrosDurationU32::micros(1_000_000_u32.checked_div(hz).unwrap_or(0))
    }
}

pub struct ExternConfig<'a> {
    pub index: u8,
    pub name: DeviceName,
    pub bus_type: BusType,
    pub cmd_size: CmdSize,
    pub i2c: I2cSettings,
    pub spi: SpiSettings,
    /// Lines at or above this index are never driven by `Gpio` steps.
    pub gpio_max: u8,
    pub table_init_on: Option<&'a [u8]>,
    pub table_init_off: Option<&'a [u8]>,
    pub init_on_max: usize,
    pub init_off_max: usize,
}

impl<'a> ExternConfig<'a> {
    /// The table and read bound for a power transition.
    #[must_use]
    pub fn table(&self, power: PowerState) -> (Option<&'a [u8]>, usize) {
        match power {
            PowerState::On => (self.table_init_on, self.init_on_max),
            PowerState::Off => (self.table_init_off, self.init_off_max),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Address does not fit in seven bits.
    InvalidI2cAddress(u8),
    /// SPI clock of zero.
    InvalidSpiClock,
    NameTooLong,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::InvalidI2cAddress(addr) => {
                write!(f, "invalid i2c address: 0x{addr:02x}")
            }
            ConfigurationError::InvalidSpiClock => f.write_str("spi clock frequency is zero"),
            ConfigurationError::NameTooLong => {
                write!(f, "name longer than {NAME_LEN_MAX} characters")
            }
        }
    }
}

pub struct ExternConfigBuilder<'a> {
    index: u8,
    name: &'a str,
    bus_type: BusType,
    cmd_size: CmdSize,
    i2c: I2cSettings,
    spi: SpiSettings,
    gpio_max: u8,
    table_init_on: Option<&'a [u8]>,
    table_init_off: Option<&'a [u8]>,
    init_on_max: usize,
    init_off_max: usize,
}

impl Default for ExternConfigBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ExternConfigBuilder<'a> {
    /// Starts from the `ext_default` device settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: ext_default::INDEX,
            name: ext_default::NAME,
            bus_type: ext_default::BUS_TYPE,
            cmd_size: CmdSize::from(ext_default::CMD_SIZE),
            i2c: I2cSettings {
                address: ext_default::I2C_ADDR,
                address2: None,
                bus: ext_default::I2C_BUS,
            },
            spi: SpiSettings {
                pins: SpiPins {
                    cs: ext_default::SPI_GPIO_CS,
                    clk: ext_default::SPI_GPIO_CLK,
                    data: ext_default::SPI_GPIO_DATA,
                },
                clk_freq: HertzU32::Hz(ext_default::SPI_CLK_FREQ_HZ),
                clk_pol: ext_default::SPI_CLK_POL,
            },
            gpio_max: LCD_GPIO_MAX,
            table_init_on: Some(&ext_default::INIT_ON_TABLE),
            table_init_off: Some(&ext_default::INIT_OFF_TABLE),
            init_on_max: INIT_ON_MAX,
            init_off_max: INIT_OFF_MAX,
        }
    }
    #[must_use]
    pub fn index(mut self, index: u8) -> Self {
        self.index = index;
        self
    }
    #[must_use]
    pub fn name(mut self, name: &'a str) -> Self {
        self.name = name;
        self
    }
    #[must_use]
    pub fn bus_type(mut self, bus_type: BusType) -> Self {
        self.bus_type = bus_type;
        self
    }
    #[must_use]
    pub fn cmd_size(mut self, cmd_size: CmdSize) -> Self {
        self.cmd_size = cmd_size;
        self
    }
    #[must_use]
    pub fn i2c_address(mut self, address: u8) -> Self {
        self.i2c.address = address;
        self
    }
    /// A raw value of `0xff` means the device has no second address.
    #[must_use]
    pub fn i2c_address2(mut self, address: u8) -> Self {
        self.i2c.address2 = if address == 0xff { None } else { Some(address) };
        self
    }
    #[must_use]
    pub fn i2c_bus(mut self, bus: u8) -> Self {
        self.i2c.bus = bus;
        self
    }
    #[must_use]
    pub fn spi_pins(mut self, pins: SpiPins) -> Self {
        self.spi.pins = pins;
        self
    }
    #[must_use]
    pub fn spi_clk_freq(mut self, freq: HertzU32) -> Self {
        self.spi.clk_freq = freq;
        self
    }
    #[must_use]
    pub fn spi_clk_pol(mut self, pol: bool) -> Self {
        self.spi.clk_pol = pol;
        self
    }
    #[must_use]
    pub fn gpio_max(mut self, gpio_max: u8) -> Self {
        self.gpio_max = gpio_max;
        self
    }
    #[must_use]
    pub fn init_on_table(mut self, table: Option<&'a [u8]>) -> Self {
        self.table_init_on = table;
        self
    }
    #[must_use]
    pub fn init_off_table(mut self, table: Option<&'a [u8]>) -> Self {
        self.table_init_off = table;
        self
    }
    #[must_use]
    pub fn init_on_max(mut self, max_len: usize) -> Self {
        self.init_on_max = max_len;
        self
    }
    #[must_use]
    pub fn init_off_max(mut self, max_len: usize) -> Self {
        self.init_off_max = max_len;
        self
    }

    /// Validates the settings. The tables stay borrowed.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for an I2C address above `0x7f`, a
    /// zero SPI clock on an SPI device, or an over-long name. `cmd_size` is
    /// checked when a table runs.
    pub fn build(self) -> Result<ExternConfig<'a>, ConfigurationError> {
        if self.bus_type == BusType::I2c {
            for address in core::iter::once(self.i2c.address).chain(self.i2c.address2) {
                if address > 0x7f {
                    return Err(ConfigurationError::InvalidI2cAddress(address));
                }
            }
        }
        if self.bus_type == BusType::Spi && self.spi.clk_freq.to_Hz() == 0 {
            return Err(ConfigurationError::InvalidSpiClock);
        }

        let mut name = DeviceName::new();
        name.push_str(self.name)
            .map_err(|()| ConfigurationError::NameTooLong)?;

        Ok(ExternConfig {
            index: self.index,
            name,
            bus_type: self.bus_type,
            cmd_size: self.cmd_size,
            i2c: self.i2c,
            spi: self.spi,
            gpio_max: self.gpio_max,
            table_init_on: self.table_init_on,
            table_init_off: self.table_init_off,
            init_on_max: self.init_on_max,
            init_off_max: self.init_off_max,
        })
    }
}
