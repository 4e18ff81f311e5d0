// Licensed under the Apache-2.0 license

//! I2C transport for command table writes.
//!
//! Wraps any embedded-hal [`I2c`](embedded_hal::i2c::I2c) controller and
//! maps table endpoints onto the device's primary and secondary addresses.

pub mod command_bus;

pub use command_bus::{I2cBusError, I2cCommandBus};
