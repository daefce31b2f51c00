//! DS3231 battery-backed day-time clock
//!
//! The seven time registers (0x00..0x06) hold seconds, minutes, hours,
//! day-of-week, date, month, and year in BCD, running UTC. Outside this
//! driver time travels as ISO-8601 text: reads produce the full
//! `YYYY-MM-DDThh:mm:ssZ`, writes take the 19-character form without the
//! zone suffix (the dispatcher enforces that length).

use core::fmt::Write;

use specmech_core::IsoTime;
use specmech_hal::{BusDirection, BusError, TwiBus};

/// Fixed 7-bit bus address; the chip offers no strap options
pub const DS3231_ADDR: u8 = 0x68;

/// Number of time registers, 0x00 through 0x06
const TIME_REGS: usize = 7;

#[derive(Debug, Clone, Copy)]
pub struct Ds3231 {
    address: u8,
}

impl Default for Ds3231 {
    fn default() -> Self {
        Self::new(DS3231_ADDR)
    }
}

impl Ds3231 {
    pub fn new(address: u8) -> Self {
        Self { address }
    }

    /// Read the clock and render it as ISO time
    pub fn read_time<B: TwiBus>(&self, bus: &mut B) -> Result<IsoTime, BusError> {
        let mut regs = [0u8; TIME_REGS];
        let result = (|| {
            bus.begin(self.address, BusDirection::Write)?;
            bus.write_byte(0x00)?;
            bus.begin(self.address, BusDirection::Read)?;
            for i in 0..TIME_REGS {
                regs[i] = bus.read_byte(i == TIME_REGS - 1)?;
            }
            Ok(())
        })();
        bus.end();
        result?;

        Ok(bcd_to_iso(&regs))
    }

    /// Set the clock from `YYYY-MM-DDThh:mm:ss`
    ///
    /// The string must be exactly 19 ASCII characters; shorter input is
    /// rejected here as a second line of defense behind the dispatcher's
    /// length check.
    pub fn set_time<B: TwiBus>(&self, bus: &mut B, iso: &str) -> Result<(), BusError> {
        let Some(regs) = iso_to_bcd(iso) else {
            // Not a bus fault, but the caller contract was broken and
            // nothing was written
            return Err(BusError::NotReady);
        };

        let result = (|| {
            bus.begin(self.address, BusDirection::Write)?;
            bus.write_byte(0x00)?;
            for &r in &regs {
                bus.write_byte(r)?;
            }
            Ok(())
        })();
        bus.end();
        result
    }
}

/// Render the seven BCD registers as ISO text
///
/// BCD digits print directly as hex digits, so the conversion is a
/// format string. Century is fixed at 20xx.
fn bcd_to_iso(regs: &[u8; TIME_REGS]) -> IsoTime {
    let [seconds, minutes, hours, _dow, date, month, year] = *regs;
    let mut iso = IsoTime::new();
    // Always fits: 20 characters into a 20-character buffer
    let _ = write!(
        iso,
        "20{:02x}-{:02x}-{:02x}T{:02x}:{:02x}:{:02x}Z",
        year, month, date, hours, minutes, seconds
    );
    iso
}

/// Pack a 19-character ISO string into the seven BCD registers
///
/// Returns None if the string is the wrong length or has non-digits in
/// the digit positions. Day-of-week is not tracked; it is pinned to 1.
fn iso_to_bcd(iso: &str) -> Option<[u8; TIME_REGS]> {
    let b = iso.as_bytes();
    if b.len() != 19 {
        return None;
    }

    let pair = |hi: usize, lo: usize| -> Option<u8> {
        if b[hi].is_ascii_digit() && b[lo].is_ascii_digit() {
            Some(((b[hi] - b'0') << 4) | (b[lo] - b'0'))
        } else {
            None
        }
    };

    Some([
        pair(17, 18)?, // seconds
        pair(14, 15)?, // minutes
        pair(11, 12)?, // hours (bit 6 clear selects the 24-hour clock)
        1,             // day of week, unused
        pair(8, 9)?,   // date
        pair(5, 6)?,   // month
        pair(2, 3)?,   // year
    ])
}
