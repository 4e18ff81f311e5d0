// Licensed under the Apache-2.0 license

use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::config::ExternConfig;
use crate::traits::{CommandBus, Endpoint, GpioBank};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum I2cBusError<E> {
    /// The controller reported a failure talking to `address`.
    Transfer { address: SevenBitAddress, source: E },
    /// `Cmd2` write on a device with a single address.
    NoSecondaryAddress,
}

impl<E: embedded_hal::i2c::Error> embedded_hal::i2c::Error for I2cBusError<E> {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        match self {
            I2cBusError::Transfer { source, .. } => source.kind(),
            I2cBusError::NoSecondaryAddress => embedded_hal::i2c::ErrorKind::NoAcknowledge(
                embedded_hal::i2c::NoAcknowledgeSource::Address,
            ),
        }
    }
}

pub struct I2cCommandBus<I> {
    i2c: I,
    address: SevenBitAddress,
    address2: Option<SevenBitAddress>,
}

impl<I: I2c> I2cCommandBus<I> {
    pub fn new(i2c: I, address: SevenBitAddress, address2: Option<SevenBitAddress>) -> Self {
        Self {
            i2c,
            address,
            address2,
        }
    }

    /// Uses the addresses of an I2C extern config.
    pub fn from_config(i2c: I, config: &ExternConfig<'_>) -> Self {
        Self::new(i2c, config.i2c.address, config.i2c.address2)
    }

    /// Gives the controller back.
    pub fn free(self) -> I {
        self.i2c
    }
}

impl<I: I2c, G: GpioBank> CommandBus<G> for I2cCommandBus<I> {
    type Error = I2cBusError<I::Error>;

    fn write(&mut self, endpoint: Endpoint, bytes: &[u8], _gpio: &mut G) -> Result<(), Self::Error> {
        let address = match endpoint {
            Endpoint::Primary => self.address,
            Endpoint::Secondary => self.address2.ok_or(I2cBusError::NoSecondaryAddress)?,
        };
        self.i2c
            .write(address, bytes)
            .map_err(|source| I2cBusError::Transfer { address, source })
    }

    fn supports(&self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::Primary => true,
            Endpoint::Secondary => self.address2.is_some(),
        }
    }
}
