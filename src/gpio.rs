// Licensed under the Apache-2.0 license

//! [`GpioBank`] over a fixed array of embedded-hal output pins.

use crate::traits::GpioBank;
use embedded_hal::digital::{OutputPin, PinState};

impl<P: OutputPin, const N: usize> GpioBank for [P; N] {
    fn set(&mut self, index: u8, state: PinState) {
        if let Some(pin) = self.get_mut(usize::from(index)) {
            // Line errors are not reported back to the table.
            let _ = pin.set_state(state);
        }
    }
}
