//! ADS1115 4-channel 16-bit ADC
//!
//! One conversion at a time: write the config register to kick off a
//! single-shot conversion on one single-ended input, poll the OS bit
//! until it reports ready, then read the conversion register. The poll
//! is bounded; a chip that never raises OS surfaces as a timeout
//! instead of hanging the command loop.

use specmech_hal::{BusDirection, BusError, TwiBus};

/// Default 7-bit address (ADDR pin tied to ground)
pub const ADS1115_ADDR: u8 = 0x48;

/// ADS1115 register pointer values
mod reg {
    pub const CONVERSION: u8 = 0x00;
    pub const CONFIG: u8 = 0x01;
}

/// Conversion-ready polls before giving up
///
/// At 128 SPS a conversion takes about 8 ms; with the bus clock at
/// 100 kHz each poll cycle takes roughly 0.5 ms, so this allows several
/// full conversion periods of slack.
const MAX_CONVERSION_POLLS: usize = 100;

/// Programmable gain amplifier range
///
/// Selects the full-scale input range and, with it, the volts-per-count
/// scale applied to the raw conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pga {
    /// +/-6.144 V
    Fsr6V144,
    /// +/-4.096 V
    Fsr4V096,
    /// +/-2.048 V
    Fsr2V048,
    /// +/-1.024 V
    Fsr1V024,
    /// +/-0.512 V
    Fsr0V512,
    /// +/-0.256 V
    Fsr0V256,
}

impl Pga {
    /// Config register bits 11:9
    fn bits(self) -> u8 {
        match self {
            Pga::Fsr6V144 => 0b000,
            Pga::Fsr4V096 => 0b001,
            Pga::Fsr2V048 => 0b010,
            Pga::Fsr1V024 => 0b011,
            Pga::Fsr0V512 => 0b100,
            Pga::Fsr0V256 => 0b101,
        }
    }

    /// Volts per count at this range
    pub fn scale(self) -> f32 {
        match self {
            Pga::Fsr6V144 => 0.000_187_5,
            Pga::Fsr4V096 => 0.000_125,
            Pga::Fsr2V048 => 0.000_062_5,
            Pga::Fsr1V024 => 0.000_031_25,
            Pga::Fsr0V512 => 0.000_015_625,
            Pga::Fsr0V256 => 0.000_007_812_5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ads1115 {
    address: u8,
}

impl Ads1115 {
    pub fn new(address: u8) -> Self {
        Self { address }
    }

    /// Convert one single-ended channel (0..=3) and return volts
    pub fn read_single_ended<B: TwiBus>(
        &self,
        bus: &mut B,
        channel: u8,
        pga: Pga,
    ) -> Result<f32, BusError> {
        // OS=1 starts the conversion, MUX=1xx selects channel-to-ground,
        // MODE=1 single-shot
        let config_hi = 0x80 | ((0b100 | (channel & 0x03)) << 4) | (pga.bits() << 1) | 0x01;
        // 128 SPS, comparator disabled
        let config_lo = 0x83;

        self.write_config(bus, config_hi, config_lo)?;

        let mut ready = false;
        for _ in 0..MAX_CONVERSION_POLLS {
            // OS reads 1 once the conversion completes
            if self.read_config_hi(bus)? & 0x80 != 0 {
                ready = true;
                break;
            }
        }
        if !ready {
            return Err(BusError::Timeout);
        }

        let raw = self.read_conversion(bus)?;
        Ok(raw as f32 * pga.scale())
    }

    fn write_config<B: TwiBus>(&self, bus: &mut B, hi: u8, lo: u8) -> Result<(), BusError> {
        let result = (|| {
            bus.begin(self.address, BusDirection::Write)?;
            bus.write_byte(reg::CONFIG)?;
            bus.write_byte(hi)?;
            bus.write_byte(lo)
        })();
        bus.end();
        result
    }

    /// Read just the high config byte; that is where the OS bit lives
    fn read_config_hi<B: TwiBus>(&self, bus: &mut B) -> Result<u8, BusError> {
        let result = (|| {
            bus.begin(self.address, BusDirection::Write)?;
            bus.write_byte(reg::CONFIG)?;
            bus.begin(self.address, BusDirection::Read)?;
            bus.read_byte(true)
        })();
        bus.end();
        result
    }

    fn read_conversion<B: TwiBus>(&self, bus: &mut B) -> Result<i16, BusError> {
        let result = (|| {
            bus.begin(self.address, BusDirection::Write)?;
            bus.write_byte(reg::CONVERSION)?;
            bus.begin(self.address, BusDirection::Read)?;
            let hi = bus.read_byte(false)?;
            let lo = bus.read_byte(true)?;
            Ok(i16::from_be_bytes([hi, lo]))
        })();
        bus.end();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{BusOp, MockBus};

    #[test]
    fn test_config_word_for_channel() {
        // Channel 2, +/-4.096 V: OS | MUX=110 | PGA=001 | MODE=1
        let mut bus = MockBus::with_reads(&[0x80, 0x10, 0x00]);
        let adc = Ads1115::new(ADS1115_ADDR);

        adc.read_single_ended(&mut bus, 2, Pga::Fsr4V096).unwrap();
        assert_eq!(bus.ops[0], BusOp::Begin(ADS1115_ADDR, specmech_hal::BusDirection::Write));
        assert_eq!(bus.ops[1], BusOp::Write(reg::CONFIG));
        assert_eq!(bus.ops[2], BusOp::Write(0b1110_0011));
        assert_eq!(bus.ops[3], BusOp::Write(0x83));
    }

    #[test]
    fn test_conversion_scales_to_volts() {
        // OS set on first poll, conversion reads 0x1000 = 4096 counts
        let mut bus = MockBus::with_reads(&[0x80, 0x10, 0x00]);
        let adc = Ads1115::new(ADS1115_ADDR);

        let volts = adc.read_single_ended(&mut bus, 0, Pga::Fsr4V096).unwrap();
        assert!((volts - 0.512).abs() < 1e-6);
        assert!(bus.ends_cleanly());
    }

    #[test]
    fn test_negative_counts() {
        let mut bus = MockBus::with_reads(&[0x80, 0xF0, 0x00]);
        let adc = Ads1115::new(ADS1115_ADDR);

        let volts = adc.read_single_ended(&mut bus, 0, Pga::Fsr6V144).unwrap();
        assert!(volts < 0.0);
    }

    #[test]
    fn test_stuck_conversion_times_out() {
        // No scripted reads: every OS poll sees 0x00
        let mut bus = MockBus::new();
        let adc = Ads1115::new(ADS1115_ADDR);

        let err = adc.read_single_ended(&mut bus, 1, Pga::Fsr2V048).unwrap_err();
        assert_eq!(err, BusError::Timeout);
        assert!(bus.ends_cleanly());
        // Config write plus exactly MAX_CONVERSION_POLLS poll cycles,
        // 5 ops each
        assert_eq!(bus.ops.len(), 5 + MAX_CONVERSION_POLLS * 5);
    }

    #[test]
    fn test_address_nack_propagates() {
        let mut bus = MockBus::new();
        bus.fail_at = Some((0, BusError::Nack));
        let adc = Ads1115::new(ADS1115_ADDR);

        assert_eq!(
            adc.read_single_ended(&mut bus, 0, Pga::Fsr4V096),
            Err(BusError::Nack)
        );
        assert!(bus.ends_cleanly());
    }
}
