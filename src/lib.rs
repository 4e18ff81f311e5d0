// Licensed under the Apache-2.0 license

// Keep table decoding panic-free in production code
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::indexing_slicing))]
#![cfg_attr(not(test), warn(clippy::expect_used))]
#![cfg_attr(not(test), no_std)]
pub mod common;
pub mod config;
pub mod error;
pub mod ext_default;
pub mod gpio;
pub mod i2c;
pub mod sequencer;
pub mod spi;
pub mod step;
pub mod traits;

#[cfg(test)]
mod mock;

pub use config::{BusType, CmdSize, ConfigurationError, ExternConfig, ExternConfigBuilder, PowerState};
pub use error::Error;
pub use ext_default::LcdExtern;
pub use sequencer::Sequencer;
pub use step::{Step, StepType, Steps};
pub use traits::{CommandBus, Endpoint, GpioBank};
