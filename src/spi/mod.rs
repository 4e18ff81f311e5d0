// Licensed under the Apache-2.0 license

//! 3-wire SPI clocked out over GPIO lines.

pub mod bitbang;

pub use bitbang::{SpiBitBang, SpiError};
