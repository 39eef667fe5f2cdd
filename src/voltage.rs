/* RP2350 core voltage control
 * Copyright (C) 2025 Sebastian Quilitz
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation; either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

//! Mapping between requested volts and `VREG.VSEL` codes.

use core::convert::Infallible;

use crate::error::VregError;
pub use crate::levels::{
    MAX_SUPPORTED_VOLTAGE, MIN_SUPPORTED_VOLTAGE, SUPPORTED_VOLTS, VOLTAGE_STEP,
    VOLTAGE_TOLERANCE,
};
use crate::levels::supported_level_index;

/// Every output level of the RP2350 core regulator, by VSEL code.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VregVoltage {
    VregVoltage0_55 = 0b00000,
    VregVoltage0_60 = 0b00001,
    VregVoltage0_65 = 0b00010,
    VregVoltage0_70 = 0b00011,
    VregVoltage0_75 = 0b00100,
    VregVoltage0_80 = 0b00101,
    VregVoltage0_85 = 0b00110,
    VregVoltage0_90 = 0b00111,
    VregVoltage0_95 = 0b01000,
    VregVoltage1_00 = 0b01001,
    VregVoltage1_05 = 0b01010,
    VregVoltage1_10 = 0b01011,
    VregVoltage1_15 = 0b01100,
    VregVoltage1_20 = 0b01101,
    VregVoltage1_25 = 0b01110,
    VregVoltage1_30 = 0b01111,
    VregVoltage1_35 = 0b10000,
    VregVoltage1_40 = 0b10001,
    VregVoltage1_50 = 0b10010,
    VregVoltage1_60 = 0b10011,
    VregVoltage1_65 = 0b10100,
    VregVoltage1_70 = 0b10101,
    VregVoltage1_80 = 0b10110,
    VregVoltage1_90 = 0b10111,
    VregVoltage2_00 = 0b11000,
    VregVoltage2_35 = 0b11001,
    VregVoltage2_50 = 0b11010,
    VregVoltage2_65 = 0b11011,
    VregVoltage2_80 = 0b11100,
    VregVoltage3_00 = 0b11101,
    VregVoltage3_15 = 0b11110,
    VregVoltage3_30 = 0b11111,
}

use VregVoltage::*;

/// VSEL code -> level, indexed by code.
static VSEL_TABLE: [(VregVoltage, u16); 32] = [
    (VregVoltage0_55, 550),
    (VregVoltage0_60, 600),
    (VregVoltage0_65, 650),
    (VregVoltage0_70, 700),
    (VregVoltage0_75, 750),
    (VregVoltage0_80, 800),
    (VregVoltage0_85, 850),
    (VregVoltage0_90, 900),
    (VregVoltage0_95, 950),
    (VregVoltage1_00, 1000),
    (VregVoltage1_05, 1050),
    (VregVoltage1_10, 1100),
    (VregVoltage1_15, 1150),
    (VregVoltage1_20, 1200),
    (VregVoltage1_25, 1250),
    (VregVoltage1_30, 1300),
    (VregVoltage1_35, 1350),
    (VregVoltage1_40, 1400),
    (VregVoltage1_50, 1500),
    (VregVoltage1_60, 1600),
    (VregVoltage1_65, 1650),
    (VregVoltage1_70, 1700),
    (VregVoltage1_80, 1800),
    (VregVoltage1_90, 1900),
    (VregVoltage2_00, 2000),
    (VregVoltage2_35, 2350),
    (VregVoltage2_50, 2500),
    (VregVoltage2_65, 2650),
    (VregVoltage2_80, 2800),
    (VregVoltage3_00, 3000),
    (VregVoltage3_15, 3150),
    (VregVoltage3_30, 3300),
];

/// Levels accepted from the application, in the order of [`SUPPORTED_VOLTS`].
/// Anything above 1.30V needs the voltage limit lifted in hardware and is not offered.
static SUPPORTED_LEVELS: [VregVoltage; 10] = [
    VregVoltage0_85,
    VregVoltage0_90,
    VregVoltage0_95,
    VregVoltage1_00,
    VregVoltage1_05,
    VregVoltage1_10,
    VregVoltage1_15,
    VregVoltage1_20,
    VregVoltage1_25,
    VregVoltage1_30,
];

impl VregVoltage {
    pub fn from_bits(code: u8) -> Option<Self> {
        VSEL_TABLE.get(code as usize).map(|(voltage, _)| *voltage)
    }

    pub const fn bits(self) -> u8 {
        self as u8
    }

    pub fn millivolts(self) -> u16 {
        VSEL_TABLE[self as usize].1
    }

    pub fn volts(self) -> f32 {
        self.millivolts() as f32 / 1000.0
    }

    /// Whether [`encode_voltage`] can produce this level.
    pub fn is_supported(self) -> bool {
        SUPPORTED_LEVELS.contains(&self)
    }
}

/// Maps a requested voltage onto its VSEL level.
///
/// Pure, touches no hardware. Fails with `UnsupportedVoltage` unless `volts`
/// is within [`VOLTAGE_TOLERANCE`] of one of 0.85V ~ 1.30V in 0.05V steps.
pub fn encode_voltage(volts: f32) -> Result<VregVoltage, VregError<Infallible>> {
    supported_level_index(volts)
        .map(|index| SUPPORTED_LEVELS[index])
        .ok_or(VregError::UnsupportedVoltage {
            requested: volts,
            min: MIN_SUPPORTED_VOLTAGE,
            max: MAX_SUPPORTED_VOLTAGE,
            step: VOLTAGE_STEP,
        })
}
