//! Hardware drivers for the specMech controller
//!
//! Per-chip register drivers built strictly on the [`specmech_hal::TwiBus`]
//! transaction contract, plus the valve actuation logic that layers the
//! paired-valve interlock over the port expander:
//!
//! - MCP23008 port expanders (valve bank, cylinder sensors)
//! - DS3231 battery-backed clock
//! - ADS1115 sensor ADC, MCP9808 board temperature sensor
//! - Pneumatic valve read-modify-write sequencing
//! - Analog sensor conversion formulas (AD590, HiH-4031, ion pump)
//!
//! Drivers hold only their configuration; the caller passes the shared
//! bus into each call, so bus ownership stays with the single command
//! engine context.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod ads1115;
pub mod ds3231;
pub mod mcp23008;
pub mod mcp9808;
pub mod pneu;
pub mod sensor;

#[cfg(test)]
pub(crate) mod testutil;
