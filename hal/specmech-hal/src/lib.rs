//! specMech Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the board-agnostic crates are
//! written against. The firmware binary implements them for the real
//! controller board; host tests implement them with scripted mocks.
//!
//! # Traits
//!
//! - [`twi::TwiBus`] - Phase-level two-wire (I2C) bus transactions
//! - [`uart::SerialTx`] - Response transport for command output

#![no_std]
#![deny(unsafe_code)]

pub mod twi;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use twi::{BusDirection, BusError, TwiBus};
pub use uart::SerialTx;
