//! MCP23008 8-bit port expander
//!
//! Two of these sit on the bus: one drives the high-current valve
//! outputs, the other reads the GMR cylinder-position sensors. Both go
//! through the same two register primitives. A transaction that fails
//! partway is unwound with a stop condition before the error propagates,
//! so the bus is never left mid-cycle.

use specmech_hal::{BusDirection, BusError, TwiBus};

/// MCP23008 register addresses
pub mod reg {
    /// Pin direction; 1 for input, 0 for output
    pub const IODIR: u8 = 0x00;
    /// Input polarity inversion
    pub const IPOL: u8 = 0x01;
    /// Interrupt-on-change enable
    pub const GPINTEN: u8 = 0x02;
    /// Default comparison value for GPINTEN
    pub const DEFVAL: u8 = 0x03;
    /// Interrupt control
    pub const INTCON: u8 = 0x04;
    /// Expander configuration
    pub const IOCON: u8 = 0x05;
    /// 100K pullup enable
    pub const GPPU: u8 = 0x06;
    /// Interrupt flag
    pub const INTF: u8 = 0x07;
    /// GPIO state at interrupt capture
    pub const INTCAP: u8 = 0x08;
    /// Read for input
    pub const GPIO: u8 = 0x09;
    /// Write for output
    pub const OLAT: u8 = 0x0A;
}

/// One MCP23008 at a fixed 7-bit address
#[derive(Debug, Clone, Copy)]
pub struct Mcp23008 {
    address: u8,
}

impl Mcp23008 {
    pub fn new(address: u8) -> Self {
        Self { address }
    }

    /// Read one register: select it with a write phase, then read one
    /// byte after a repeated start
    pub fn read_register<B: TwiBus>(&self, bus: &mut B, register: u8) -> Result<u8, BusError> {
        let result = (|| {
            bus.begin(self.address, BusDirection::Write)?;
            bus.write_byte(register)?;
            bus.begin(self.address, BusDirection::Read)?;
            bus.read_byte(true)
        })();
        bus.end();
        result
    }

    /// Write one register
    pub fn write_register<B: TwiBus>(
        &self,
        bus: &mut B,
        register: u8,
        value: u8,
    ) -> Result<(), BusError> {
        let result = (|| {
            bus.begin(self.address, BusDirection::Write)?;
            bus.write_byte(register)?;
            bus.write_byte(value)
        })();
        bus.end();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{BusOp, MockBus};

    const ADDR: u8 = 0x24;

    #[test]
    fn test_read_register_sequence() {
        let mut bus = MockBus::with_reads(&[0xA5]);
        let chip = Mcp23008::new(ADDR);

        let value = chip.read_register(&mut bus, reg::GPIO).unwrap();
        assert_eq!(value, 0xA5);
        assert_eq!(
            bus.ops,
            [
                BusOp::Begin(ADDR, specmech_hal::BusDirection::Write),
                BusOp::Write(reg::GPIO),
                BusOp::Begin(ADDR, specmech_hal::BusDirection::Read),
                BusOp::Read(true),
                BusOp::End,
            ]
        );
    }

    #[test]
    fn test_write_register_sequence() {
        let mut bus = MockBus::new();
        let chip = Mcp23008::new(ADDR);

        chip.write_register(&mut bus, reg::OLAT, 0x22).unwrap();
        assert_eq!(
            bus.ops,
            [
                BusOp::Begin(ADDR, specmech_hal::BusDirection::Write),
                BusOp::Write(reg::OLAT),
                BusOp::Write(0x22),
                BusOp::End,
            ]
        );
    }

    #[test]
    fn test_error_unwinds_with_stop() {
        let mut bus = MockBus::new();
        // Fail the register-select write (second op)
        bus.fail_at = Some((1, BusError::Nack));
        let chip = Mcp23008::new(ADDR);

        let err = chip.read_register(&mut bus, reg::GPIO).unwrap_err();
        assert_eq!(err, BusError::Nack);
        // The transaction still ends with a stop condition
        assert!(bus.ends_cleanly());
    }

    #[test]
    fn test_nack_on_address_propagates() {
        let mut bus = MockBus::new();
        bus.fail_at = Some((0, BusError::Nack));
        let chip = Mcp23008::new(ADDR);

        assert_eq!(
            chip.write_register(&mut bus, reg::IODIR, 0x00),
            Err(BusError::Nack)
        );
        assert!(bus.ends_cleanly());
    }
}
