// Licensed under the Apache-2.0 license

use core::fmt;

use crate::config::PowerState;

/// Outcome of running a command table.
///
/// `InvalidConfig` and `MissingTable` are returned before any step runs.
/// `MalformedStep` and `BusWrite` are recorded while the table keeps
/// running; a run reports the last one recorded, and a later successful
/// write replaces it. Unknown step types are only logged.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// Fixed step width that cannot hold a type and a delay byte.
    InvalidConfig { cmd_size: u8 },
    /// No table configured for this transition.
    MissingTable(PowerState),
    /// A step too small for its type; its effects were skipped.
    MalformedStep { step: usize, kind: u8, size: u8 },
    /// The bus rejected a command write.
    BusWrite(E),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig { cmd_size } => write!(f, "cmd_size {cmd_size} is invalid"),
            Error::MissingTable(power) => write!(f, "init {power} table is missing"),
            Error::MalformedStep { step, kind, size } => write!(
                f,
                "step {step}: invalid cmd_size {size} for type 0x{kind:02x}"
            ),
            Error::BusWrite(err) => write!(f, "command write failed: {err:?}"),
        }
    }
}
