//! Scripted in-memory bus used by the driver tests.

use std::collections::VecDeque;

use super::Atm90e26Interface;
use crate::registers::{MAX_ADDRESS, READ_MARKER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MockError;

/// Outcome served for one bus exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reply {
    /// Full-length exchange; reads return this value.
    Value(u16),
    /// Exchange reports this many bytes.
    Short(usize),
    /// Underlying call fails.
    Fail,
}

/// One decoded bus access, in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read(u8),
    Write(u8, u16),
}

#[derive(Default)]
pub(crate) struct ScriptedInterface {
    reads: VecDeque<Reply>,
    write_faults: Vec<(u8, Reply)>,
    pub accesses: Vec<Access>,
    pub speeds: Vec<u32>,
    pub opened: usize,
    pub closed: usize,
    pub fail_open: bool,
    pub fail_configure: bool,
    pub fail_close: bool,
}

impl ScriptedInterface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues read replies, consumed one per read.
    pub fn with_reads(mut self, replies: &[Reply]) -> Self {
        self.reads.extend(replies.iter().copied());
        self
    }

    /// Queues read values, consumed one per read.
    pub fn with_values(self, values: &[u16]) -> Self {
        let replies: Vec<Reply> = values.iter().map(|&v| Reply::Value(v)).collect();
        self.with_reads(&replies)
    }

    /// Makes every write to `address` produce `reply`.
    pub fn with_write_fault(mut self, address: u8, reply: Reply) -> Self {
        self.write_faults.push((address, reply));
        self
    }

    pub fn read_count(&self) -> usize {
        self.accesses
            .iter()
            .filter(|access| matches!(access, Access::Read(_)))
            .count()
    }

    pub fn writes(&self) -> Vec<(u8, u16)> {
        self.accesses
            .iter()
            .filter_map(|access| match *access {
                Access::Write(address, value) => Some((address, value)),
                Access::Read(_) => None,
            })
            .collect()
    }

    pub fn pending_reads(&self) -> usize {
        self.reads.len()
    }
}

impl Atm90e26Interface for ScriptedInterface {
    type Error = MockError;

    fn open(&mut self) -> Result<(), MockError> {
        self.opened += 1;
        if self.fail_open { Err(MockError) } else { Ok(()) }
    }

    fn configure(&mut self, speed_hz: u32) -> Result<(), MockError> {
        if self.fail_configure {
            return Err(MockError);
        }
        self.speeds.push(speed_hz);
        Ok(())
    }

    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<usize, MockError> {
        assert_eq!(tx.len(), 1, "read header must be one byte");
        assert_eq!(rx.len(), 2, "register reads receive two bytes");
        assert_ne!(tx[0] & READ_MARKER, 0, "read marker missing");

        self.accesses.push(Access::Read(tx[0] & MAX_ADDRESS));
        match self.reads.pop_front().expect("unexpected register read") {
            Reply::Value(value) => {
                rx.copy_from_slice(&value.to_be_bytes());
                Ok(rx.len())
            }
            Reply::Short(count) => Ok(count),
            Reply::Fail => Err(MockError),
        }
    }

    fn write(&mut self, tx: &[u8]) -> Result<usize, MockError> {
        assert_eq!(tx.len(), 3, "write frames are three bytes");
        assert_eq!(tx[0] & READ_MARKER, 0, "write frame carries read marker");

        let address = tx[0];
        self.accesses
            .push(Access::Write(address, u16::from_be_bytes([tx[1], tx[2]])));
        match self.write_faults.iter().find(|(addr, _)| *addr == address) {
            Some((_, Reply::Short(count))) => Ok(*count),
            Some((_, Reply::Fail)) => Err(MockError),
            Some((_, Reply::Value(_))) | None => Ok(tx.len()),
        }
    }

    fn close(&mut self) -> Result<(), MockError> {
        self.closed += 1;
        if self.fail_close { Err(MockError) } else { Ok(()) }
    }
}
