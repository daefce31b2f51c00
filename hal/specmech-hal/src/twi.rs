//! Two-wire (I2C) bus transaction abstraction
//!
//! Every peripheral driver builds on this phase-level contract: a
//! transaction is a start/address phase, zero or more data phases, and a
//! stop. The layer classifies failures but never retries; retry policy
//! belongs to the caller. Callers must fully unwind a transaction with
//! [`TwiBus::end`] on the first error so the bus is never left mid-cycle.

/// Classified two-wire bus failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Addressed device did not acknowledge
    Nack,
    /// Bus arbitration lost or transaction timed out
    Timeout,
    /// Controller not ready to start a transaction
    NotReady,
}

/// Data direction of the address phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusDirection {
    Write,
    Read,
}

/// Two-wire bus master
///
/// Drives the physical bus lines directly, so exactly one execution
/// context may own an implementation at a time. The command engine is
/// the single owner in this firmware; anything that introduces
/// concurrency must wrap the bus in an explicit mutex.
pub trait TwiBus {
    /// Issue a (repeated) start condition and address a device
    ///
    /// `address` is the 7-bit device address.
    fn begin(&mut self, address: u8, direction: BusDirection) -> Result<(), BusError>;

    /// Write one byte in the data phase
    fn write_byte(&mut self, byte: u8) -> Result<(), BusError>;

    /// Read one byte in the data phase
    ///
    /// `is_last` must be true for the final byte of a read phase so the
    /// controller NACKs it and frames the stop condition. This is part of
    /// the device protocol, not an optional hint.
    fn read_byte(&mut self, is_last: bool) -> Result<u8, BusError>;

    /// Issue a stop condition, releasing the bus
    ///
    /// Safe to call after a failed phase; drivers call it unconditionally
    /// when unwinding.
    fn end(&mut self);
}
