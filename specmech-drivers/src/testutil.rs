//! Scripted bus double for driver tests

use std::collections::VecDeque;
use std::vec::Vec;

use specmech_hal::{BusDirection, BusError, TwiBus};

/// One recorded bus operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Begin(u8, BusDirection),
    Write(u8),
    Read(bool),
    End,
}

/// Records every operation and serves scripted read bytes
///
/// `fail_at` injects a classified error on the Nth operation (0-based)
/// so unwind behavior can be checked.
#[derive(Default)]
pub struct MockBus {
    pub ops: Vec<BusOp>,
    pub read_data: VecDeque<u8>,
    pub fail_at: Option<(usize, BusError)>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reads(bytes: &[u8]) -> Self {
        Self {
            read_data: bytes.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn check_fail(&self) -> Result<(), BusError> {
        match self.fail_at {
            // The op was already recorded, so index is len - 1
            Some((n, e)) if self.ops.len() == n + 1 => Err(e),
            _ => Ok(()),
        }
    }

    /// Operations recorded after the last `End`
    pub fn ends_cleanly(&self) -> bool {
        self.ops.last() == Some(&BusOp::End)
    }
}

impl TwiBus for MockBus {
    fn begin(&mut self, address: u8, direction: BusDirection) -> Result<(), BusError> {
        self.ops.push(BusOp::Begin(address, direction));
        self.check_fail()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), BusError> {
        self.ops.push(BusOp::Write(byte));
        self.check_fail()
    }

    fn read_byte(&mut self, is_last: bool) -> Result<u8, BusError> {
        self.ops.push(BusOp::Read(is_last));
        self.check_fail()?;
        Ok(self.read_data.pop_front().unwrap_or(0))
    }

    fn end(&mut self) {
        self.ops.push(BusOp::End);
    }
}
