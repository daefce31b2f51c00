//! MCP9808 board temperature sensor
//!
//! The fourth temperature channel sits on the controller board itself,
//! so problems with the cryostat sensor chain can be told apart from a
//! hot enclosure. Only the ambient temperature register is used; the
//! power-on defaults (continuous conversion, +/-0.0625 C resolution)
//! suit the report rate.

use specmech_hal::{BusDirection, BusError, TwiBus};

/// Default 7-bit address (all strap pins low)
pub const MCP9808_ADDR: u8 = 0x18;

/// Ambient temperature register
const REG_TEMP: u8 = 0x05;

#[derive(Debug, Clone, Copy)]
pub struct Mcp9808 {
    address: u8,
}

impl Default for Mcp9808 {
    fn default() -> Self {
        Self::new(MCP9808_ADDR)
    }
}

impl Mcp9808 {
    pub fn new(address: u8) -> Self {
        Self { address }
    }

    /// Read the ambient temperature in Celsius
    pub fn read_celsius<B: TwiBus>(&self, bus: &mut B) -> Result<f32, BusError> {
        let result = (|| {
            bus.begin(self.address, BusDirection::Write)?;
            bus.write_byte(REG_TEMP)?;
            bus.begin(self.address, BusDirection::Read)?;
            let hi = bus.read_byte(false)?;
            let lo = bus.read_byte(true)?;
            Ok(u16::from_be_bytes([hi, lo]))
        })();
        bus.end();

        Ok(decode(result?))
    }
}

/// Convert the raw register value: 12 data bits in 1/16 C steps, with
/// bit 12 carrying the sign. The top three bits are alarm flags.
fn decode(raw: u16) -> f32 {
    let magnitude = (raw & 0x0FFF) as f32 / 16.0;
    if raw & 0x1000 != 0 {
        magnitude - 256.0
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{BusOp, MockBus};

    #[test]
    fn test_read_sequence() {
        // 0x01C4 = 452/16 = 28.25 C
        let mut bus = MockBus::with_reads(&[0x01, 0xC4]);
        let sensor = Mcp9808::default();

        let celsius = sensor.read_celsius(&mut bus).unwrap();
        assert!((celsius - 28.25).abs() < 1e-6);
        assert_eq!(
            bus.ops,
            [
                BusOp::Begin(MCP9808_ADDR, specmech_hal::BusDirection::Write),
                BusOp::Write(REG_TEMP),
                BusOp::Begin(MCP9808_ADDR, specmech_hal::BusDirection::Read),
                BusOp::Read(false),
                BusOp::Read(true),
                BusOp::End,
            ]
        );
    }

    #[test]
    fn test_negative_temperature() {
        // Sign bit set, magnitude 4000/16 = 250 -> -6 C
        assert!((decode(0x1FA0) - (-6.0)).abs() < 1e-6);
    }

    #[test]
    fn test_alarm_flags_masked() {
        // Alarm bits 15:13 must not disturb the value
        assert!((decode(0xE1C4) - decode(0x01C4)).abs() < 1e-6);
    }

    #[test]
    fn test_nack_propagates() {
        let mut bus = MockBus::new();
        bus.fail_at = Some((0, BusError::Nack));
        let sensor = Mcp9808::default();

        assert_eq!(sensor.read_celsius(&mut bus), Err(BusError::Nack));
        assert!(bus.ends_cleanly());
    }
}
