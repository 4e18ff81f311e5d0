// Licensed under the Apache-2.0 license

//! Power sequence interpreter.
//!
//! Runs a command table to completion on the calling thread, turning each
//! decoded step into GPIO writes, bus writes and blocking delays in table
//! order. Precondition failures abort before any effect; per-step problems
//! are logged and the sequence carries on, since a partially sequenced
//! panel is preferable to an unpowered one.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::common::{Logger, NoOpLogger};
use crate::config::{ExternConfig, PowerState};
use crate::error::Error;
use crate::step::{InvalidCmdSize, Step, Steps};
use crate::traits::{CommandBus, Endpoint, GpioBank};

pub struct Sequencer<'a, G, B, D, L = NoOpLogger> {
    config: &'a ExternConfig<'a>,
    gpio: &'a mut G,
    bus: &'a mut B,
    delay: &'a mut D,
    logger: &'a mut L,
}

impl<'a, G, B, D, L> Sequencer<'a, G, B, D, L>
where
    G: GpioBank,
    B: CommandBus<G>,
    D: DelayNs,
    L: Logger,
{
    pub fn new(
        config: &'a ExternConfig<'a>,
        gpio: &'a mut G,
        bus: &'a mut B,
        delay: &'a mut D,
        logger: &'a mut L,
    ) -> Self {
        Self {
            config,
            gpio,
            bus,
            delay,
            logger,
        }
    }

    /// Runs the configured table for `power`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] for a fixed `cmd_size` below 2, even when
    ///   the table is also missing.
    /// - [`Error::MissingTable`] when no table is configured for `power`.
    /// - Otherwise as [`Sequencer::run_table`].
    pub fn run(&mut self, power: PowerState) -> Result<(), Error<B::Error>> {
        let (table, max_len) = self.config.table(power);
        let steps = self.steps(table.unwrap_or_default(), max_len)?;
        if table.is_none() {
            self.logger
                .error(format_args!("init {} table is missing", power));
            return Err(Error::MissingTable(power));
        }
        self.execute(steps)
    }

    /// Runs `table`, reading no byte at or beyond `max_len`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] for a fixed `cmd_size` below 2, before any
    /// step runs. Otherwise the last recorded [`Error::BusWrite`] or
    /// [`Error::MalformedStep`], unless a later write succeeded.
    pub fn run_table(&mut self, table: &[u8], max_len: usize) -> Result<(), Error<B::Error>> {
        let steps = self.steps(table, max_len)?;
        self.execute(steps)
    }

    fn steps<'t>(&mut self, table: &'t [u8], max_len: usize) -> Result<Steps<'t>, Error<B::Error>> {
        let secondary = self.bus.supports(Endpoint::Secondary);
        Steps::new(table, max_len, self.config.cmd_size, secondary).map_err(|InvalidCmdSize(raw)| {
            self.logger
                .error(format_args!("cmd_size {} is invalid", raw));
            Error::InvalidConfig { cmd_size: raw }
        })
    }

    fn execute(&mut self, steps: Steps<'_>) -> Result<(), Error<B::Error>> {
        let mut outcome = Ok(());
        for (index, step) in steps {
            self.logger.debug(format_args!(
                "{}: step {}: {:?}",
                self.config.name.as_str(),
                index,
                step
            ));
            match step {
                Step::Delay { .. } => {}
                Step::Gpio { index: line, value, .. } => {
                    if line < self.config.gpio_max {
                        self.gpio.set(line, PinState::from(value != 0));
                    }
                }
                Step::Cmd {
                    endpoint, payload, ..
                } => {
                    outcome = match self.bus.write(endpoint, payload, &mut *self.gpio) {
                        Ok(()) => Ok(()),
                        Err(err) => {
                            self.logger.error(format_args!(
                                "step {}: {:?} write failed: {:?}",
                                index, endpoint, err
                            ));
                            Err(Error::BusWrite(err))
                        }
                    };
                }
                Step::Malformed { kind, size } => {
                    self.logger.error(format_args!(
                        "step {}: invalid cmd_size {} for type 0x{:02x}",
                        index, size, kind
                    ));
                    outcome = Err(Error::MalformedStep {
                        step: index,
                        kind,
                        size,
                    });
                }
                Step::Unknown { kind, .. } => {
                    self.logger.error(format_args!(
                        "{}({}): step {}: type 0x{:02x} invalid",
                        self.config.name.as_str(),
                        self.config.index,
                        index,
                        kind
                    ));
                }
            }
            let delay_ms = step.delay_ms();
            if delay_ms > 0 {
                self.delay.delay_ms(u32::from(delay_ms));
            }
        }
        outcome
    }
}
