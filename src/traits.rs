// Licensed under the Apache-2.0 license

//! # Host capabilities consumed by the power sequencer
//!
//! The sequencer never touches a transport directly. The platform supplies
//! two small capabilities:
//!
//! ```text
//! GpioBank                 (indexed GPIO lines)
//! CommandBus<G: GpioBank>  (register/command writes)
//!     ├── I2cCommandBus    (embedded-hal I2C, one or two addresses)
//!     └── SpiBitBang       (3-wire SPI clocked out over the GpioBank)
//! ```
//!
//! A bit-banged bus drives the same GPIO lines that table steps drive, so
//! writes borrow the bank for the duration of the call instead of owning a
//! second handle to it.

use embedded_hal::digital::PinState;

/// Destination of a command write.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// The device's main address (or the only SPI target).
    Primary,
    /// A second address on the same transport.
    Secondary,
}

/// A set of output lines addressed by table index.
pub trait GpioBank {
    /// Drive line `index` to `state`.
    ///
    /// Indices the platform does not know about are ignored.
    fn set(&mut self, index: u8, state: PinState);
}

/// Transport for `Cmd`/`Cmd2` table steps.
pub trait CommandBus<G: GpioBank> {
    type Error: core::fmt::Debug;

    /// Write `bytes` to `endpoint` as one transaction.
    ///
    /// # Errors
    ///
    /// Returns the transport's error when the write is rejected or fails on
    /// the wire.
    fn write(&mut self, endpoint: Endpoint, bytes: &[u8], gpio: &mut G)
        -> Result<(), Self::Error>;

    /// Whether writes to `endpoint` are possible on this bus.
    fn supports(&self, endpoint: Endpoint) -> bool {
        endpoint == Endpoint::Primary
    }

    /// Called once before a power transition runs its table.
    fn prepare(&mut self, _gpio: &mut G) {}

    /// Called once after a power transition, whatever its outcome.
    fn release(&mut self, _gpio: &mut G) {}
}
