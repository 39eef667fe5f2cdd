//! Control of the RP2350 core voltage regulator through the POWMAN registers.
//!
//! A requested voltage is validated against the supported levels, encoded into
//! `VREG.VSEL`, merged into the current register content and stored with a
//! single password protected write. The regulator only follows once
//! `VREG_CTRL.UNLOCK` has been set.

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod config;
pub mod console;
pub mod error;
mod levels;
pub mod overclock;
pub mod register;
pub mod rp2350_core_voltage;
pub mod voltage;

pub use config::Config;
pub use error::{ConsoleError, OverclockError, ParseError, VregError};
pub use register::{MemoryMappedRegister, Mmio, RegisterAddress, RegisterValue};
pub use rp2350_core_voltage::CoreVoltageRegulator;
pub use voltage::{encode_voltage, VregVoltage};
