//! Board-agnostic command engine for the specMech controller
//!
//! This crate contains the protocol/state-machine half of the firmware,
//! with no knowledge of any specific chip:
//!
//! - Collaborator traits the board must implement ([`instrument`])
//! - The bounded command queue ([`queue`])
//! - The reboot-acknowledgment gate ([`gate`])
//! - The dispatcher that ties a command line to hardware actions and a
//!   prompt ([`engine`])
//!
//! The engine processes one line at a time, synchronously, and owns all
//! of its state explicitly; there is no process-wide static anywhere.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod engine;
pub mod gate;
pub mod instrument;
pub mod queue;

pub use engine::{Disposition, Engine, EngineConfig};
pub use instrument::{
    DeviceError, EnvReport, Instrument, IsoTime, Mechanism, Operation, Peripheral, VacReport,
    ValveAction, ValveError,
};
