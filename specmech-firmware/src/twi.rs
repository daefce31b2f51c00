//! Bit-banged two-wire bus
//!
//! The transaction layer needs explicit start, repeated start, stop, and
//! per-byte acknowledge control; the RP2040 I2C block only exposes whole
//! transfers, so the bus is clocked in software over two GPIOs. The
//! lines are emulated open-drain: driven for low, released to the board
//! pullups for high. Devices may stretch the clock, with a bounded wait.

use cortex_m::asm;
use embassy_rp::gpio::{Flex, Pull};
use specmech_hal::{BusDirection, BusError, TwiBus};

/// Half-bit delay in core cycles; about 100 kHz at the 125 MHz clock
const HALF_BIT_CYCLES: u32 = 625;

/// Half-bit waits allowed for a stretched clock before giving up
const STRETCH_LIMIT: u32 = 2_000;

pub struct SoftTwi<'d> {
    sda: Flex<'d>,
    scl: Flex<'d>,
    active: bool,
}

impl<'d> SoftTwi<'d> {
    pub fn new(mut sda: Flex<'d>, mut scl: Flex<'d>) -> Self {
        // Output latches stay low forever; high is always the released
        // line under its pullup
        sda.set_low();
        scl.set_low();
        sda.set_as_input();
        scl.set_as_input();
        sda.set_pull(Pull::Up);
        scl.set_pull(Pull::Up);
        Self {
            sda,
            scl,
            active: false,
        }
    }

    fn half_bit(&self) {
        asm::delay(HALF_BIT_CYCLES);
    }

    fn sda_release(&mut self) {
        self.sda.set_as_input();
    }

    fn sda_low(&mut self) {
        self.sda.set_as_output();
    }

    fn scl_low(&mut self) {
        self.scl.set_as_output();
    }

    /// Release SCL and wait for it to actually rise, honoring clock
    /// stretching up to the bound
    fn scl_release(&mut self) -> Result<(), BusError> {
        self.scl.set_as_input();
        let mut waited = 0;
        while self.scl.is_low() {
            waited += 1;
            if waited > STRETCH_LIMIT {
                return Err(BusError::Timeout);
            }
            self.half_bit();
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), BusError> {
        if self.active {
            // Repeated start: restore both lines high first
            self.sda_release();
            self.half_bit();
            self.scl_release()?;
            self.half_bit();
        } else {
            self.sda_release();
            self.scl_release()?;
            // A held-low SDA means another device is wedging the bus
            if self.sda.is_low() {
                return Err(BusError::NotReady);
            }
        }
        // SDA falls while SCL is high
        self.sda_low();
        self.half_bit();
        self.scl_low();
        self.active = true;
        Ok(())
    }

    fn stop(&mut self) {
        // SDA rises while SCL is high
        self.sda_low();
        self.half_bit();
        let _ = self.scl_release();
        self.half_bit();
        self.sda_release();
        self.half_bit();
        self.active = false;
    }

    fn write_raw(&mut self, byte: u8) -> Result<(), BusError> {
        for i in (0..8).rev() {
            if byte & (1 << i) != 0 {
                self.sda_release();
            } else {
                self.sda_low();
            }
            self.half_bit();
            self.scl_release()?;
            self.half_bit();
            self.scl_low();
        }
        // Ninth clock: the device acknowledges by holding SDA low
        self.sda_release();
        self.half_bit();
        self.scl_release()?;
        let acked = self.sda.is_low();
        self.half_bit();
        self.scl_low();
        if acked {
            Ok(())
        } else {
            Err(BusError::Nack)
        }
    }

    fn read_raw(&mut self, nack: bool) -> Result<u8, BusError> {
        let mut byte = 0u8;
        self.sda_release();
        for _ in 0..8 {
            self.half_bit();
            self.scl_release()?;
            byte = (byte << 1) | u8::from(self.sda.is_high());
            self.half_bit();
            self.scl_low();
        }
        // Ack to keep the device sending, nack to frame the stop
        if nack {
            self.sda_release();
        } else {
            self.sda_low();
        }
        self.half_bit();
        self.scl_release()?;
        self.half_bit();
        self.scl_low();
        self.sda_release();
        Ok(byte)
    }
}

impl TwiBus for SoftTwi<'_> {
    fn begin(&mut self, address: u8, direction: BusDirection) -> Result<(), BusError> {
        self.start()?;
        let dir_bit = match direction {
            BusDirection::Write => 0,
            BusDirection::Read => 1,
        };
        self.write_raw((address << 1) | dir_bit)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), BusError> {
        self.write_raw(byte)
    }

    fn read_byte(&mut self, is_last: bool) -> Result<u8, BusError> {
        self.read_raw(is_last)
    }

    fn end(&mut self) {
        if self.active {
            self.stop();
        }
    }
}
