// Licensed under the Apache-2.0 license

//! Bit-banged SPI writer for panels without a hardware SPI block.
//!
//! Chip select is held low for the whole write. Each byte goes out MSB
//! first: clock to its active level, data bit, clock back to idle. The
//! clock idles high unless the config's `clk_pol` says otherwise. Every
//! line transition is followed by one clock period of settle time.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use fugit::MicrosDurationU32;

use crate::config::{ExternConfig, SpiPins};
use crate::traits::{CommandBus, Endpoint, GpioBank};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpiError {
    /// Fewer than two bytes: a register address needs data after it.
    InvalidArgument { len: usize },
    /// The SPI link has a single target.
    UnsupportedEndpoint,
}

impl fmt::Display for SpiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpiError::InvalidArgument { len } => write!(f, "spi write len {len} error"),
            SpiError::UnsupportedEndpoint => f.write_str("spi has no secondary endpoint"),
        }
    }
}

pub struct SpiBitBang<D> {
    pins: SpiPins,
    clk_idle: PinState,
    settle: MicrosDurationU32,
    delay: D,
}

impl<D: DelayNs> SpiBitBang<D> {
    pub fn new(pins: SpiPins, settle: MicrosDurationU32, delay: D) -> Self {
        Self {
            pins,
            clk_idle: PinState::High,
            settle,
            delay,
        }
    }

    /// Pins, clock polarity and timing from an SPI extern config.
    pub fn from_config(config: &ExternConfig<'_>, delay: D) -> Self {
        Self::new(config.spi.pins, config.spi.transition_delay(), delay)
            .with_clk_idle(PinState::from(config.spi.clk_pol))
    }

    #[must_use]
    pub fn with_clk_idle(mut self, idle: PinState) -> Self {
        self.clk_idle = idle;
        self
    }

    fn drive<G: GpioBank>(&mut self, gpio: &mut G, line: u8, state: PinState) {
        gpio.set(line, state);
        self.delay.delay_us(self.settle.ticks());
    }

    fn write_byte<G: GpioBank>(&mut self, gpio: &mut G, byte: u8) {
        let clk = self.pins.clk;
        for bit in (0..8u8).rev() {
            self.drive(gpio, clk, !self.clk_idle);
            self.drive(gpio, self.pins.data, PinState::from((byte >> bit) & 1 == 1));
            self.drive(gpio, clk, self.clk_idle);
        }
    }

    fn idle<G: GpioBank>(&mut self, gpio: &mut G) {
        let SpiPins { cs, clk, data } = self.pins;
        self.drive(gpio, cs, PinState::High);
        self.drive(gpio, clk, self.clk_idle);
        self.drive(gpio, data, PinState::High);
    }

    fn set_all<G: GpioBank>(&mut self, gpio: &mut G, order: [u8; 3], state: PinState) {
        for line in order {
            self.drive(gpio, line, state);
        }
    }
}

impl<D: DelayNs, G: GpioBank> CommandBus<G> for SpiBitBang<D> {
    type Error = SpiError;

    fn write(&mut self, endpoint: Endpoint, bytes: &[u8], gpio: &mut G) -> Result<(), Self::Error> {
        if endpoint != Endpoint::Primary {
            return Err(SpiError::UnsupportedEndpoint);
        }
        if bytes.len() < 2 {
            return Err(SpiError::InvalidArgument { len: bytes.len() });
        }

        self.drive(gpio, self.pins.cs, PinState::Low);
        for &byte in bytes {
            self.write_byte(gpio, byte);
        }
        self.idle(gpio);
        self.delay.delay_us(self.settle.ticks());
        Ok(())
    }

    /// Chip select and data high, clock at its idle level.
    fn prepare(&mut self, gpio: &mut G) {
        self.idle(gpio);
    }

    /// Park all lines low.
    fn release(&mut self, gpio: &mut G) {
        let SpiPins { cs, clk, data } = self.pins;
        self.set_all(gpio, [data, clk, cs], PinState::Low);
    }
}
