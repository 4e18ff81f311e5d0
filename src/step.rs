// Licensed under the Apache-2.0 license

//! Command table decoding.
//!
//! A table is a flat byte blob of steps in one of two encodings:
//!
//! ```text
//! dynamic: | type | size | payload (size - 1) | delay_ms |
//! fixed:   | type | payload (cmd_size - 2)   | delay_ms |
//! ```
//!
//! [`Steps`] walks a table and yields typed [`Step`]s. It never reads at or
//! beyond the smaller of the configured max length and the table length,
//! and stops at the first `End` type.

use crate::config::CmdSize;
use crate::traits::Endpoint;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum StepType {
    /// Write the payload to the primary endpoint.
    Cmd = 0x00,
    /// Write the payload to the secondary endpoint.
    Cmd2 = 0x01,
    /// Drive a GPIO line.
    Gpio = 0xf0,
    /// Delay only.
    None = 0x10,
    /// Terminates the table.
    End = 0xff,
}

impl TryFrom<u8> for StepType {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0x00 => Ok(StepType::Cmd),
            0x01 => Ok(StepType::Cmd2),
            0xf0 => Ok(StepType::Gpio),
            0x10 => Ok(StepType::None),
            0xff => Ok(StepType::End),
            other => Err(other),
        }
    }
}

/// One decoded table step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step<'a> {
    Delay {
        delay_ms: u8,
    },
    Gpio {
        index: u8,
        value: u8,
        delay_ms: u8,
    },
    Cmd {
        endpoint: Endpoint,
        payload: &'a [u8],
        delay_ms: u8,
    },
    /// Declared size too small for the type. Has no effects.
    Malformed {
        kind: u8,
        size: u8,
    },
    /// Type byte not understood by this bus.
    Unknown {
        kind: u8,
        delay_ms: u8,
    },
}

impl Step<'_> {
    /// Milliseconds to wait after the step's effect.
    #[must_use]
    pub fn delay_ms(&self) -> u8 {
        match *self {
            Step::Delay { delay_ms }
            | Step::Gpio { delay_ms, .. }
            | Step::Cmd { delay_ms, .. }
            | Step::Unknown { delay_ms, .. } => delay_ms,
            Step::Malformed { .. } => 0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Layout {
    Dynamic,
    Fixed(usize),
}

/// Fixed step width that cannot frame a type byte and a delay byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InvalidCmdSize(pub u8);

/// Iterator over the steps of a command table, yielding `(step, Step)`.
pub struct Steps<'a> {
    table: &'a [u8],
    limit: usize,
    layout: Layout,
    secondary: bool,
    cursor: usize,
    step: usize,
}

impl<'a> Steps<'a> {
    /// `secondary` tells whether `Cmd2` steps have somewhere to go; without
    /// it they decode as [`Step::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCmdSize`] for a fixed width below 2.
    pub fn new(
        table: &'a [u8],
        max_len: usize,
        cmd_size: CmdSize,
        secondary: bool,
    ) -> Result<Self, InvalidCmdSize> {
        let layout = match cmd_size {
            CmdSize::Dynamic => Layout::Dynamic,
            CmdSize::Fixed(width) if width >= 2 => Layout::Fixed(usize::from(width)),
            CmdSize::Fixed(width) => return Err(InvalidCmdSize(width)),
        };
        Ok(Self {
            table,
            limit: max_len.min(table.len()),
            layout,
            secondary,
            cursor: 0,
            step: 0,
        })
    }

    fn cmd_endpoint(&self, kind: StepType) -> Option<Endpoint> {
        match kind {
            StepType::Cmd => Some(Endpoint::Primary),
            StepType::Cmd2 if self.secondary => Some(Endpoint::Secondary),
            _ => None,
        }
    }

    fn next_dynamic(&mut self) -> Option<Step<'a>> {
        let start = self.cursor;
        if start + 2 >= self.limit {
            return None;
        }
        let &[kind, size] = self.table.get(start..start + 2)? else {
            return None;
        };
        if kind == StepType::End as u8 {
            return None;
        }
        let end = start + 2 + usize::from(size);
        if end > self.limit {
            // Truncated step: nothing further is in bounds.
            return None;
        }
        let body = self.table.get(start + 2..end)?;
        self.cursor = end;

        let step = match StepType::try_from(kind) {
            Ok(StepType::None) => match body.first() {
                Some(&delay_ms) => Step::Delay { delay_ms },
                None => Step::Malformed { kind, size },
            },
            Ok(StepType::Gpio) => match *body {
                [index, value, delay_ms, ..] => Step::Gpio {
                    index,
                    value,
                    delay_ms,
                },
                _ => Step::Malformed { kind, size },
            },
            Ok(command @ (StepType::Cmd | StepType::Cmd2)) => {
                match (self.cmd_endpoint(command), body.split_last()) {
                    (Some(endpoint), Some((&delay_ms, payload))) => Step::Cmd {
                        endpoint,
                        payload,
                        delay_ms,
                    },
                    (Some(_), None) => Step::Malformed { kind, size },
                    (None, _) => Step::Unknown { kind, delay_ms: 0 },
                }
            }
            Ok(StepType::End) => return None,
            Err(kind) => Step::Unknown { kind, delay_ms: 0 },
        };
        Some(step)
    }

    fn next_fixed(&mut self, width: usize) -> Option<Step<'a>> {
        let start = self.cursor;
        if start + width > self.limit {
            return None;
        }
        let frame = self.table.get(start..start + width)?;
        let (&kind, rest) = frame.split_first()?;
        let (&delay_ms, body) = rest.split_last()?;
        if kind == StepType::End as u8 {
            return None;
        }
        self.cursor = start + width;

        // Frames are at most 255 bytes wide.
        let size = u8::try_from(width).unwrap_or(u8::MAX);
        let step = match StepType::try_from(kind) {
            Ok(StepType::None) => Step::Delay { delay_ms },
            Ok(StepType::Gpio) => match *body {
                [index, value, ..] => Step::Gpio {
                    index,
                    value,
                    delay_ms,
                },
                _ => Step::Malformed { kind, size },
            },
            Ok(command @ (StepType::Cmd | StepType::Cmd2)) => match self.cmd_endpoint(command) {
                Some(_) if body.is_empty() => Step::Malformed { kind, size },
                Some(endpoint) => Step::Cmd {
                    endpoint,
                    payload: body,
                    delay_ms,
                },
                None => Step::Unknown { kind, delay_ms },
            },
            Ok(StepType::End) => return None,
            Err(kind) => Step::Unknown { kind, delay_ms },
        };
        Some(step)
    }
}

impl<'a> Iterator for Steps<'a> {
    type Item = (usize, Step<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let step = match self.layout {
            Layout::Dynamic => self.next_dynamic()?,
            Layout::Fixed(width) => self.next_fixed(width)?,
        };
        let index = self.step;
        self.step += 1;
        Some((index, step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ext_default::INIT_ON_TABLE;

    fn decode(table: &[u8], max_len: usize, cmd_size: CmdSize) -> Vec<(usize, Step<'_>)> {
        Steps::new(table, max_len, cmd_size, true).unwrap().collect()
    }

    #[test]
    fn test_step_type_bytes() {
        assert_eq!(StepType::try_from(0x00), Ok(StepType::Cmd));
        assert_eq!(StepType::try_from(0x01), Ok(StepType::Cmd2));
        assert_eq!(StepType::try_from(0xf0), Ok(StepType::Gpio));
        assert_eq!(StepType::try_from(0x10), Ok(StepType::None));
        assert_eq!(StepType::try_from(0xff), Ok(StepType::End));
        assert_eq!(StepType::try_from(0x42), Err(0x42));
    }

    #[test]
    fn test_fixed_width_below_two_rejected() {
        assert_eq!(
            Steps::new(&[0xff], 10, CmdSize::Fixed(0), false).err(),
            Some(InvalidCmdSize(0))
        );
        assert_eq!(
            Steps::new(&[0xff], 10, CmdSize::Fixed(1), false).err(),
            Some(InvalidCmdSize(1))
        );
    }

    #[test]
    fn test_default_on_table_decodes_to_eight_writes() {
        let steps = decode(&INIT_ON_TABLE, 3000, CmdSize::Fixed(9));

        assert_eq!(steps.len(), 8);
        assert_eq!(
            steps[0],
            (
                0,
                Step::Cmd {
                    endpoint: Endpoint::Primary,
                    payload: &[0x20, 0x01, 0x02, 0x00, 0x40, 0xff, 0x00],
                    delay_ms: 0
                }
            )
        );
        assert_eq!(
            steps[7],
            (
                7,
                Step::Cmd {
                    endpoint: Endpoint::Primary,
                    payload: &[0x23, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00],
                    delay_ms: 10
                }
            )
        );
    }

    #[test]
    fn test_dynamic_steps() {
        let table = [
            0xf0, 0x03, 0x02, 0x01, 0x14, // gpio 2 high, 20ms
            0x00, 0x03, 0xb0, 0x5a, 0x00, // cmd b0 5a
            0x10, 0x01, 0x0a, // delay 10ms
            0xff, 0x00,
        ];
        let steps = decode(&table, table.len(), CmdSize::Dynamic);

        assert_eq!(
            steps,
            vec![
                (
                    0,
                    Step::Gpio {
                        index: 2,
                        value: 1,
                        delay_ms: 20
                    }
                ),
                (
                    1,
                    Step::Cmd {
                        endpoint: Endpoint::Primary,
                        payload: &[0xb0, 0x5a],
                        delay_ms: 0
                    }
                ),
                (2, Step::Delay { delay_ms: 10 }),
            ]
        );
    }

    #[test]
    fn test_dynamic_gpio_then_delay_bytes() {
        let table = [0xf0, 0x03, 0x02, 0x01, 0x0a, 0x10, 0x01, 0x05, 0xff];
        let steps: Vec<_> = Steps::new(&table, table.len(), CmdSize::Dynamic, false)
            .unwrap()
            .collect();

        assert_eq!(
            steps,
            vec![
                (
                    0,
                    Step::Gpio {
                        index: 2,
                        value: 1,
                        delay_ms: 10
                    }
                ),
                (1, Step::Delay { delay_ms: 5 }),
            ]
        );
    }

    #[test]
    fn test_dynamic_cmd_without_delay_byte_is_malformed() {
        let table = [0x00, 0x00, 0x01, 0x00, 0x10, 0x01, 0x04, 0xff];
        let steps = decode(&table, table.len(), CmdSize::Dynamic);

        assert_eq!(
            steps,
            vec![
                (0, Step::Malformed { kind: 0x00, size: 0 }),
                (1, Step::Malformed { kind: 0x01, size: 0 }),
                (2, Step::Delay { delay_ms: 4 }),
            ]
        );
    }

    #[test]
    fn test_dynamic_malformed_step_advances_by_declared_size() {
        let table = [
            0xf0, 0x02, 0x05, 0x01, // gpio needs 3 bytes
            0x10, 0x00, // delay needs 1 byte
            0x10, 0x01, 0x07, 0xff, 0x00,
        ];
        let steps = decode(&table, table.len(), CmdSize::Dynamic);

        assert_eq!(
            steps,
            vec![
                (0, Step::Malformed { kind: 0xf0, size: 2 }),
                (1, Step::Malformed { kind: 0x10, size: 0 }),
                (2, Step::Delay { delay_ms: 7 }),
            ]
        );
    }

    #[test]
    fn test_dynamic_truncated_step_stops() {
        // Declares 10 payload bytes but only 2 are inside max_len.
        let table = [0x10, 0x01, 0x01, 0x00, 0x0a, 0x01, 0x02, 0x00, 0x00];
        let steps = decode(&table, 6, CmdSize::Dynamic);

        assert_eq!(steps, vec![(0, Step::Delay { delay_ms: 1 })]);
    }

    #[test]
    fn test_never_reads_past_max_len() {
        // A valid write sits entirely after max_len.
        let table = [0x10, 0x01, 0x00, 0x00, 0x02, 0x11, 0x00];
        assert_eq!(decode(&table, 3, CmdSize::Dynamic).len(), 1);
        assert_eq!(decode(&table, 4, CmdSize::Dynamic).len(), 1);
        assert_eq!(decode(&table, 7, CmdSize::Dynamic).len(), 2);

        let fixed = [0x10, 0x00, 0x05, 0x00, 0x11, 0x00];
        assert_eq!(decode(&fixed, 5, CmdSize::Fixed(3)).len(), 1);
    }

    #[test]
    fn test_table_without_end_stops_at_table_length() {
        let table = [0x10, 0x01, 0x03];
        let steps = decode(&table, 3000, CmdSize::Dynamic);
        assert_eq!(steps, vec![(0, Step::Delay { delay_ms: 3 })]);

        let fixed = [0xf0, 0x01, 0x01, 0x00, 0xf0];
        assert_eq!(decode(&fixed, 3000, CmdSize::Fixed(4)).len(), 1);
    }

    #[test]
    fn test_end_first_yields_nothing() {
        let table = [0xff, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(decode(&table, table.len(), CmdSize::Fixed(9)).is_empty());
        assert!(decode(&table, table.len(), CmdSize::Dynamic).is_empty());
    }

    #[test]
    fn test_fixed_gpio_needs_index_and_value() {
        let table = [0xf0, 0x05, 0x0a, 0xff, 0x00, 0x00];
        let steps = decode(&table, table.len(), CmdSize::Fixed(3));
        assert_eq!(steps, vec![(0, Step::Malformed { kind: 0xf0, size: 3 })]);

        let table = [0xf0, 0x05, 0x01, 0x0a, 0xff, 0x00, 0x00, 0x00];
        let steps = decode(&table, table.len(), CmdSize::Fixed(4));
        assert_eq!(
            steps,
            vec![(
                0,
                Step::Gpio {
                    index: 5,
                    value: 1,
                    delay_ms: 10
                }
            )]
        );
    }

    #[test]
    fn test_fixed_cmd_needs_payload() {
        let table = [0x00, 0x05, 0xff, 0x00];
        let steps = decode(&table, table.len(), CmdSize::Fixed(2));
        assert_eq!(steps, vec![(0, Step::Malformed { kind: 0x00, size: 2 })]);
    }

    #[test]
    fn test_fixed_cmd2_goes_to_secondary() {
        let table = [0x01, 0x3a, 0x5b, 0x02, 0xff, 0x00, 0x00, 0x00];
        let steps = decode(&table, table.len(), CmdSize::Fixed(4));
        assert_eq!(
            steps,
            vec![(
                0,
                Step::Cmd {
                    endpoint: Endpoint::Secondary,
                    payload: &[0x3a, 0x5b],
                    delay_ms: 2
                }
            )]
        );

        let steps: Vec<_> = Steps::new(&table, table.len(), CmdSize::Fixed(4), false)
            .unwrap()
            .collect();
        assert_eq!(steps, vec![(0, Step::Unknown { kind: 0x01, delay_ms: 2 })]);
    }

    #[test]
    fn test_unknown_type_delay_by_encoding() {
        let fixed = [0x42, 0x01, 0x02, 0x08];
        assert_eq!(
            decode(&fixed, fixed.len(), CmdSize::Fixed(4)),
            vec![(0, Step::Unknown { kind: 0x42, delay_ms: 8 })]
        );

        let dynamic = [0x42, 0x02, 0x01, 0x08, 0xff];
        assert_eq!(
            decode(&dynamic, dynamic.len(), CmdSize::Dynamic),
            vec![(0, Step::Unknown { kind: 0x42, delay_ms: 0 })]
        );
    }

    #[test]
    fn test_cmd2_without_secondary_is_unknown() {
        let table = [0x01, 0x02, 0x3a, 0x05, 0xff, 0x00];
        let steps: Vec<_> = Steps::new(&table, table.len(), CmdSize::Dynamic, false)
            .unwrap()
            .collect();
        assert_eq!(steps, vec![(0, Step::Unknown { kind: 0x01, delay_ms: 0 })]);

        let steps = decode(&table, table.len(), CmdSize::Dynamic);
        assert_eq!(
            steps,
            vec![(
                0,
                Step::Cmd {
                    endpoint: Endpoint::Secondary,
                    payload: &[0x3a],
                    delay_ms: 5
                }
            )]
        );
    }
}
