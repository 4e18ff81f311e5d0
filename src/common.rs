// Licensed under the Apache-2.0 license

//! Logging sinks shared by the sequencer and the device driver.
//!
//! Drivers are generic over a [`Logger`] so that a bare board can route
//! diagnostics to a serial console, a hosted build can use the `log`
//! facade, and production images can compile logging out with
//! [`NoOpLogger`].

use core::fmt;

pub trait Logger {
    fn debug(&mut self, args: fmt::Arguments<'_>);
    fn info(&mut self, args: fmt::Arguments<'_>);
    fn error(&mut self, args: fmt::Arguments<'_>);
}

/// Discards everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn debug(&mut self, _args: fmt::Arguments<'_>) {}
    fn info(&mut self, _args: fmt::Arguments<'_>) {}
    fn error(&mut self, _args: fmt::Arguments<'_>) {}
}

/// Forwards to the `log` crate under the `lcd_extern` target.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogFacade;

impl Logger for LogFacade {
    fn debug(&mut self, args: fmt::Arguments<'_>) {
        log::debug!(target: "lcd_extern", "{}", args);
    }

    fn info(&mut self, args: fmt::Arguments<'_>) {
        log::info!(target: "lcd_extern", "{}", args);
    }

    fn error(&mut self, args: fmt::Arguments<'_>) {
        log::error!(target: "lcd_extern", "{}", args);
    }
}

/// Writes one line per message to a serial port.
///
/// Write errors are dropped; a broken console must not stop a power
/// sequence.
pub struct UartLogger<W: embedded_io::Write> {
    uart: W,
    verbose: bool,
}

impl<W: embedded_io::Write> UartLogger<W> {
    /// Debug messages are only emitted when `verbose` is set.
    pub fn new(uart: W, verbose: bool) -> Self {
        Self { uart, verbose }
    }

    pub fn into_inner(self) -> W {
        self.uart
    }

    fn line(&mut self, level: &str, args: fmt::Arguments<'_>) {
        let _ = self
            .uart
            .write_fmt(format_args!("lcd extern {}: {}\r\n", level, args));
    }
}

impl<W: embedded_io::Write> Logger for UartLogger<W> {
    fn debug(&mut self, args: fmt::Arguments<'_>) {
        if self.verbose {
            self.line("dbg", args);
        }
    }

    fn info(&mut self, args: fmt::Arguments<'_>) {
        self.line("info", args);
    }

    fn error(&mut self, args: fmt::Arguments<'_>) {
        self.line("err", args);
    }
}
