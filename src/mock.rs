// Licensed under the Apache-2.0 license

//! Recording doubles for GPIO, bus and delay, sharing one event journal so
//! tests can assert on the interleaving of effects.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::traits::{CommandBus, Endpoint, GpioBank};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Gpio(u8, PinState),
    Write(Endpoint, Vec<u8>),
    DelayMs(u32),
    DelayUs(u32),
    Prepare,
    Release,
}

#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Event>>>);

impl Journal {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }
}

pub struct MockGpio {
    pub journal: Journal,
}

impl GpioBank for MockGpio {
    fn set(&mut self, index: u8, state: PinState) {
        self.journal.push(Event::Gpio(index, state));
    }
}

#[derive(Clone)]
pub struct MockDelay {
    pub journal: Journal,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_us(&mut self, us: u32) {
        self.journal.push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.journal.push(Event::DelayMs(ms));
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MockBusError(pub usize);

/// Fails the writes whose zero-based ordinal is listed in `fail_on`.
pub struct MockBus {
    pub journal: Journal,
    pub secondary: bool,
    pub fail_on: Vec<usize>,
    writes: usize,
}

impl MockBus {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            secondary: true,
            fail_on: Vec::new(),
            writes: 0,
        }
    }
}

impl<G: GpioBank> CommandBus<G> for MockBus {
    type Error = MockBusError;

    fn write(&mut self, endpoint: Endpoint, bytes: &[u8], _gpio: &mut G) -> Result<(), Self::Error> {
        let ordinal = self.writes;
        self.writes += 1;
        self.journal.push(Event::Write(endpoint, bytes.to_vec()));
        if self.fail_on.contains(&ordinal) {
            Err(MockBusError(ordinal))
        } else {
            Ok(())
        }
    }

    fn supports(&self, endpoint: Endpoint) -> bool {
        endpoint == Endpoint::Primary || self.secondary
    }

    fn prepare(&mut self, _gpio: &mut G) {
        self.journal.push(Event::Prepare);
    }

    fn release(&mut self, _gpio: &mut G) {
        self.journal.push(Event::Release);
    }
}

pub struct Rig {
    pub journal: Journal,
    pub gpio: MockGpio,
    pub bus: MockBus,
    pub delay: MockDelay,
}

impl Rig {
    pub fn new() -> Self {
        let journal = Journal::default();
        Self {
            gpio: MockGpio {
                journal: journal.clone(),
            },
            bus: MockBus::new(journal.clone()),
            delay: MockDelay {
                journal: journal.clone(),
            },
            journal,
        }
    }
}
