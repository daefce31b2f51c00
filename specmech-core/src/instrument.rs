//! Collaborator contract between the command engine and the board
//!
//! The engine never touches the bus itself; it drives the hardware
//! through [`Instrument`], which the firmware implements over the real
//! drivers and host tests implement with mocks. Every fallible method
//! reports a [`DeviceError`] that records which peripheral and which
//! operation failed, wrapping the classified bus error underneath.

use heapless::String;
use specmech_hal::BusError;

/// ISO-8601 timestamp `YYYY-MM-DDThh:mm:ssZ` (20 characters)
pub type IsoTime = String<20>;

/// Peripherals the engine can name in an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Peripheral {
    /// MCP23008 driving the high-current valve bank
    ValveDriver,
    /// MCP23008 reading the cylinder GMR sensors
    CylinderSensors,
    /// DS3231 battery-backed clock
    Clock,
    /// ADS1115 sensor ADC
    Adc,
    /// Motion controller on the auxiliary serial link
    Motion,
}

/// Which half of a register transaction failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    Read,
    Write,
}

/// A bus failure attributed to a peripheral and operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceError {
    pub peripheral: Peripheral,
    pub operation: Operation,
    pub source: BusError,
}

impl DeviceError {
    pub fn new(peripheral: Peripheral, operation: Operation, source: BusError) -> Self {
        Self {
            peripheral,
            operation,
            source,
        }
    }
}

/// Pneumatic mechanism addressed by an open/close command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mechanism {
    Shutter,
    /// Left Hartmann door
    Left,
    /// Right Hartmann door
    Right,
    /// Both Hartmann doors, actuated left then right
    Both,
}

impl Mechanism {
    /// Map a command object character to a mechanism
    pub fn from_object(object: u8) -> Option<Self> {
        match object {
            b's' => Some(Mechanism::Shutter),
            b'l' => Some(Mechanism::Left),
            b'r' => Some(Mechanism::Right),
            b'b' => Some(Mechanism::Both),
            _ => None,
        }
    }
}

/// Direction to drive a valve pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValveAction {
    Open,
    Close,
}

/// Valve actuation failure
///
/// `Both` expands to two independent actuations with no rollback: when
/// the second half fails the first half's motion stands, and the error
/// says so explicitly instead of collapsing into a bare failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValveError {
    /// The single requested actuation failed
    Device(DeviceError),
    /// A two-door actuation failed halfway
    Partial {
        /// The door that moved before the failure
        completed: Mechanism,
        /// The door whose actuation failed
        failed: Mechanism,
        source: DeviceError,
    },
}

impl From<DeviceError> for ValveError {
    fn from(e: DeviceError) -> Self {
        ValveError::Device(e)
    }
}

/// Temperatures and humidity for the environment report
///
/// A failed channel is `None`; the report renders it as a sentinel in
/// the sentence body rather than failing the whole report.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvReport {
    /// Collimator, red camera, blue camera, and MCP9808 board sensor
    pub temperatures_c: [Option<f32>; 4],
    /// Humidity next to the first three temperature channels
    pub humidity_pct: [Option<f32>; 3],
}

/// Ion pump vacuum readings for the two cryostats
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VacReport {
    pub red_torr: Option<f32>,
    pub blue_torr: Option<f32>,
}

/// Everything the dispatcher needs from the board
///
/// One implementation owns the bus and all drivers, which keeps the
/// shared two-wire bus and the valve bank single-owner by construction.
pub trait Instrument {
    /// Move a pneumatic mechanism
    fn actuate_valves(&mut self, target: Mechanism, action: ValveAction)
        -> Result<(), ValveError>;

    /// Read the battery-backed clock as ISO time
    fn read_clock(&mut self) -> Result<IsoTime, DeviceError>;

    /// Set the battery-backed clock from a 19-character ISO string
    /// (`YYYY-MM-DDThh:mm:ss`, no zone suffix)
    fn set_clock(&mut self, iso: &str) -> Result<(), DeviceError>;

    /// Read all temperature and humidity channels
    fn read_environment(&mut self) -> EnvReport;

    /// Read both ion pump gauges
    fn read_vacuum(&mut self) -> VacReport;

    /// Forward an extended motion command to the motor controller
    fn motion_command(&mut self, value: &str) -> Result<(), DeviceError>;

    /// Run the hardware self-test routine
    fn self_test(&mut self);

    /// Arm the periodic status tick (display timeout timer); called once
    /// when the reboot acknowledgment is received
    fn arm_status_tick(&mut self);
}
