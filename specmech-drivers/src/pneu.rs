//! Pneumatic valve actuation and cylinder position sensing
//!
//! Each mechanism (shutter, left Hartmann door, right Hartmann door) is
//! driven by a pair of solenoid valves on the high-current port
//! expander, one to pressurize each side of its air cylinder. The pair
//! is interlocked in software: every actuation is a read-modify-write
//! on the output latch whose action mask clears the opposing valve bit
//! in the same write, so both solenoids of a pair are never energized
//! together no matter what state the latch was left in.
//!
//! A second expander reads the GMR position sensors, two per cylinder,
//! plus the supply air pressure switch.

use specmech_core::{DeviceError, Mechanism, Operation, Peripheral, ValveAction, ValveError};
use specmech_hal::TwiBus;

use crate::mcp23008::{reg, Mcp23008};

/// High-current valve driver expander, 7-bit address
pub const HIGH_CURRENT_ADDR: u8 = 0x24;
/// Cylinder sensor expander, 7-bit address
pub const PNEU_SENSORS_ADDR: u8 = 0x21;

/// Valve pair bits and the action masks that clear the opposing valve
mod mask {
    pub const SHUTTER_PAIR: u8 = 0x22;
    pub const SHUTTER_OPEN: u8 = 0xCE;
    pub const SHUTTER_CLOSE: u8 = 0xEC;

    pub const LEFT_PAIR: u8 = 0x44;
    pub const LEFT_OPEN: u8 = 0xAE;
    pub const LEFT_CLOSE: u8 = 0xEA;

    pub const RIGHT_PAIR: u8 = 0x88;
    pub const RIGHT_OPEN: u8 = 0x6E;
    pub const RIGHT_CLOSE: u8 = 0xE6;
}

/// Where a cylinder's two GMR sensors say it is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CylinderState {
    Open,
    Closed,
    /// Both end sensors made: the piston is between them
    InTransit,
    /// Neither sensor made; a wiring or sensor fault, not a position
    Invalid,
}

impl CylinderState {
    /// Single-letter form for reports and the self-test log
    pub fn letter(self) -> char {
        match self {
            CylinderState::Open => 'o',
            CylinderState::Closed => 'c',
            CylinderState::InTransit => 't',
            CylinderState::Invalid => 'x',
        }
    }
}

/// Snapshot of all three cylinders and the air supply switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CylinderStatus {
    pub shutter: CylinderState,
    pub left: CylinderState,
    pub right: CylinderState,
    pub air_ok: bool,
}

/// The two expanders behind the pneumatics
#[derive(Debug, Clone, Copy)]
pub struct ValveBank {
    driver: Mcp23008,
    sensors: Mcp23008,
}

impl Default for ValveBank {
    fn default() -> Self {
        Self {
            driver: Mcp23008::new(HIGH_CURRENT_ADDR),
            sensors: Mcp23008::new(PNEU_SENSORS_ADDR),
        }
    }
}

impl ValveBank {
    /// Configure both expanders: driver all-output with the latch
    /// cleared (every valve off), sensors all-input
    pub fn init<B: TwiBus>(&self, bus: &mut B) -> Result<(), DeviceError> {
        let write = |bus: &mut B, r, v| {
            self.driver
                .write_register(bus, r, v)
                .map_err(|e| DeviceError::new(Peripheral::ValveDriver, Operation::Write, e))
        };
        write(bus, reg::OLAT, 0x00)?;
        write(bus, reg::IODIR, 0x00)?;

        self.sensors
            .write_register(bus, reg::IODIR, 0xFF)
            .map_err(|e| DeviceError::new(Peripheral::CylinderSensors, Operation::Write, e))
    }

    /// Move one mechanism, expanding `Both` into left-then-right
    pub fn actuate<B: TwiBus>(
        &self,
        bus: &mut B,
        target: Mechanism,
        action: ValveAction,
    ) -> Result<(), ValveError> {
        if target == Mechanism::Both {
            self.set_valves(bus, Mechanism::Left, action)?;
            // No rollback: if the right door fails the left door's
            // motion stands, and the error says which is which
            return self
                .set_valves(bus, Mechanism::Right, action)
                .map_err(|source| ValveError::Partial {
                    completed: Mechanism::Left,
                    failed: Mechanism::Right,
                    source,
                });
        }
        Ok(self.set_valves(bus, target, action)?)
    }

    /// One interlocked latch update
    fn set_valves<B: TwiBus>(
        &self,
        bus: &mut B,
        target: Mechanism,
        action: ValveAction,
    ) -> Result<(), DeviceError> {
        let (pair, action_mask) = masks(target, action);

        let latch = self
            .driver
            .read_register(bus, reg::OLAT)
            .map_err(|e| DeviceError::new(Peripheral::ValveDriver, Operation::Read, e))?;

        self.driver
            .write_register(bus, reg::OLAT, (latch | pair) & action_mask)
            .map_err(|e| DeviceError::new(Peripheral::ValveDriver, Operation::Write, e))
    }

    /// Read the GMR sensors and decode every cylinder
    pub fn read_cylinders<B: TwiBus>(&self, bus: &mut B) -> Result<CylinderStatus, DeviceError> {
        let gpio = self
            .sensors
            .read_register(bus, reg::GPIO)
            .map_err(|e| DeviceError::new(Peripheral::CylinderSensors, Operation::Read, e))?;
        Ok(decode_cylinders(gpio))
    }
}

/// Pair bits and action mask for a single mechanism
///
/// `Both` never reaches here; `actuate` expands it first.
fn masks(target: Mechanism, action: ValveAction) -> (u8, u8) {
    match (target, action) {
        (Mechanism::Shutter, ValveAction::Open) => (mask::SHUTTER_PAIR, mask::SHUTTER_OPEN),
        (Mechanism::Shutter, ValveAction::Close) => (mask::SHUTTER_PAIR, mask::SHUTTER_CLOSE),
        (Mechanism::Left | Mechanism::Both, ValveAction::Open) => {
            (mask::LEFT_PAIR, mask::LEFT_OPEN)
        }
        (Mechanism::Left | Mechanism::Both, ValveAction::Close) => {
            (mask::LEFT_PAIR, mask::LEFT_CLOSE)
        }
        (Mechanism::Right, ValveAction::Open) => (mask::RIGHT_PAIR, mask::RIGHT_OPEN),
        (Mechanism::Right, ValveAction::Close) => (mask::RIGHT_PAIR, mask::RIGHT_CLOSE),
    }
}

/// Decode the sensor expander's GPIO byte
///
/// Shutter sensors sit on bits 7:6, left door on 5:4, right door on
/// 3:2, the air pressure switch on bit 1 (low when supply pressure is
/// present). The left door's sensor pair is wired with open and closed
/// swapped relative to the other two.
fn decode_cylinders(gpio: u8) -> CylinderStatus {
    let two_bit = |shift: u8, swapped: bool| match ((gpio >> shift) & 0x03, swapped) {
        (0b01, false) | (0b10, true) => CylinderState::Closed,
        (0b10, false) | (0b01, true) => CylinderState::Open,
        (0b11, _) => CylinderState::InTransit,
        _ => CylinderState::Invalid,
    };

    CylinderStatus {
        shutter: two_bit(6, false),
        left: two_bit(4, true),
        right: two_bit(2, false),
        air_ok: gpio & 0x02 == 0,
    }
}
