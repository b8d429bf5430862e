//! Pin backend that replays a recorded bus trace
//!
//! Each non-empty line of a trace is one tick:
//!
//! ```text
//! # comment
//! MR 0000      memory read
//! MW 8000 3E   memory write
//! IR 81        I/O read
//! IW 10 01     I/O write
//! IA           interrupt acknowledge
//! --           idle
//! IR 11 *3     the same sample held for three ticks
//! ```
//!
//! Numbers are hexadecimal without a prefix.

use std::{collections::VecDeque, str::FromStr};

use thiserror::Error;

use super::{BusSample, Pins};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    #[error("line {line}: unknown cycle kind {kind:?}")]
    UnknownKind { line: usize, kind: String },
    #[error("line {line}: expected {expected} operand(s)")]
    MissingOperand { line: usize, expected: usize },
    #[error("line {line}: {value:?} is not a valid hex value")]
    BadNumber { line: usize, value: String },
    #[error("line {line}: bad repeat count {value:?}")]
    BadRepeat { line: usize, value: String },
    #[error("line {line}: repeat count without a cycle")]
    MissingKind { line: usize },
}

/// What happened on the pins during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRecord {
    pub sample: BusSample,
    pub driven: Option<u8>,
    pub interrupt: bool,
}

#[derive(Debug)]
pub struct TracePins {
    /// Queued samples with the number of ticks each is held for
    samples: VecDeque<(BusSample, u64)>,
    records: Vec<TickRecord>,
    clock: bool,
    interrupt: bool,
    reset: bool,
    driving: Option<u8>,
}

impl TracePins {
    /// The processor starts out held in reset
    pub fn new() -> Self {
        Self {
            samples: VecDeque::new(),
            records: Vec::new(),
            clock: false,
            interrupt: false,
            reset: true,
            driving: None,
        }
    }

    pub fn from_samples(samples: impl IntoIterator<Item = BusSample>) -> Self {
        let mut pins = Self::new();
        pins.samples
            .extend(samples.into_iter().map(|sample| (sample, 1)));
        pins
    }

    pub fn push(&mut self, sample: BusSample) -> &mut Self {
        self.push_held(sample, 1)
    }

    pub fn push_held(&mut self, sample: BusSample, ticks: u64) -> &mut Self {
        if ticks > 0 {
            self.samples.push_back((sample, ticks));
        }
        self
    }

    pub fn remaining(&self) -> u64 {
        self.samples.iter().map(|&(_, ticks)| ticks).sum()
    }

    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    pub fn last_record(&self) -> Option<&TickRecord> {
        self.records.last()
    }

    /// Bytes the bridge drove, one per tick that drove anything
    pub fn driven(&self) -> impl Iterator<Item = u8> + '_ {
        self.records.iter().filter_map(|record| record.driven)
    }

    pub fn clock(&self) -> bool {
        self.clock
    }

    pub fn interrupt(&self) -> bool {
        self.interrupt
    }

    pub fn reset(&self) -> bool {
        self.reset
    }

    pub fn driving(&self) -> Option<u8> {
        self.driving
    }
}

impl Default for TracePins {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for TracePins {
    type Err = TraceError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut pins = Self::new();
        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            let content = line.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }
            let mut fields: Vec<&str> = content.split_whitespace().collect();
            let mut repeat = 1;
            if let Some(count) = fields.last().and_then(|field| field.strip_prefix('*')) {
                repeat = count
                    .parse::<u64>()
                    .ok()
                    .filter(|&count| count > 0)
                    .ok_or_else(|| TraceError::BadRepeat {
                        line: line_number,
                        value: count.to_owned(),
                    })?;
                fields.pop();
                if fields.is_empty() {
                    return Err(TraceError::MissingKind { line: line_number });
                }
            }
            let sample = parse_sample(line_number, &fields)?;
            pins.push_held(sample, repeat);
        }
        Ok(pins)
    }
}

fn parse_sample(line: usize, fields: &[&str]) -> Result<BusSample, TraceError> {
    let operand = |position: usize, expected: usize| -> Result<u16, TraceError> {
        let value = fields
            .get(position)
            .ok_or(TraceError::MissingOperand { line, expected })?;
        u16::from_str_radix(value, 16).map_err(|_| TraceError::BadNumber {
            line,
            value: (*value).to_owned(),
        })
    };
    let byte = |position: usize, expected: usize| -> Result<u8, TraceError> {
        let value = operand(position, expected)?;
        u8::try_from(value).map_err(|_| TraceError::BadNumber {
            line,
            value: fields[position].to_owned(),
        })
    };
    // Kind is always present, blank lines never get here
    let kind = fields[0].to_ascii_uppercase();
    Ok(match kind.as_str() {
        "MR" => BusSample::memory_read(operand(1, 1)?),
        "MW" => BusSample::memory_write(operand(1, 2)?, byte(2, 2)?),
        "IR" => BusSample::io_read(byte(1, 1)?),
        "IW" => BusSample::io_write(byte(1, 2)?, byte(2, 2)?),
        "IA" => BusSample::interrupt_ack(),
        "--" => BusSample::idle(),
        _ => {
            return Err(TraceError::UnknownKind {
                line,
                kind: fields[0].to_owned(),
            })
        }
    })
}

impl Pins for TracePins {
    fn set_clock(&mut self, high: bool) {
        self.clock = high;
    }

    fn set_interrupt(&mut self, asserted: bool) {
        self.interrupt = asserted;
    }

    fn set_reset(&mut self, asserted: bool) {
        self.reset = asserted;
    }

    fn sample(&mut self) -> BusSample {
        let sample = match self.samples.front_mut() {
            Some((sample, ticks)) => {
                let sample = *sample;
                *ticks -= 1;
                if *ticks == 0 {
                    self.samples.pop_front();
                }
                sample
            }
            None => BusSample::idle(),
        };
        self.records.push(TickRecord {
            sample,
            driven: None,
            interrupt: self.interrupt,
        });
        sample
    }

    fn drive_data(&mut self, value: u8) {
        self.driving = Some(value);
        if let Some(record) = self.records.last_mut() {
            record.driven = Some(value);
        }
    }

    fn release_data(&mut self) {
        self.driving = None;
    }

    fn exhausted(&self) -> bool {
        self.samples.is_empty()
    }
}
