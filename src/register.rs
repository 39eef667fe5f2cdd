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

//! Access to the two POWMAN registers that control the core regulator.
//!
//! POWMAN starts at 0x40100000. The regulator can be directly controlled by
//! software, but must first be unlocked by setting `VREG_CTRL.UNLOCK`. Once
//! unlocked, the output is selected via `VREG.VSEL`. Every write to POWMAN
//! must carry the password 0x5afe in bits 31:16, otherwise the hardware
//! drops it.

use core::ptr;

/// Full contents of a 32 bit hardware register.
pub type RegisterValue = u32;

pub const POWMAN_BASE: u32 = 0x4010_0000u32;

/// Must be or'ed into every write to a POWMAN register.
pub const POWMAN_PASSWORD_BITS: RegisterValue = 0x5afe_0000u32;

/// `VREG_CTRL.UNLOCK`, bit 13. Cannot be relocked by software once set.
pub const VREG_CTRL_UNLOCK_BITS: RegisterValue = 0x0000_2000u32;

/// `VREG.UPDATE_IN_PROGRESS`, bit 15, read only.
pub const VREG_UPDATE_IN_PROGRESS_BITS: RegisterValue = 0x0000_8000u32;

/// `VREG.VSEL` occupies bits [8:4].
pub const VSEL_SHIFT: u32 = 4;
pub const VSEL_FIELD_MASK: RegisterValue = 0x0000_01f0u32;

/// Everything except `VREG.VSEL`.
pub const CLEAN_VSEL_VALUE_MASK: RegisterValue = 0xffff_fe0fu32;

/// One of the two fixed register locations this crate touches.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterAddress(u32);

impl RegisterAddress {
    /// Regulator control, holds the UNLOCK bit.
    pub const VREG_CTRL: RegisterAddress = RegisterAddress(POWMAN_BASE + 0x04);
    /// Regulator voltage select.
    pub const VREG: RegisterAddress = RegisterAddress(POWMAN_BASE + 0x0c);

    pub const fn addr(&self) -> u32 {
        self.0
    }
}

/// Load/store capability over the regulator registers.
///
/// The regulator logic only talks to the hardware through this trait, so it
/// can run against an in-memory register block as well as against [`Mmio`].
pub trait MemoryMappedRegister {
    /// Reported when a store does not take effect.
    type Error: core::fmt::Debug;

    fn read(&mut self, address: RegisterAddress) -> RegisterValue;

    /// Stores `value` exactly once. No read-modify-write happens in here.
    fn write(&mut self, address: RegisterAddress, value: RegisterValue) -> Result<(), Self::Error>;
}

/// The real POWMAN block, accessed with volatile loads and stores.
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    ///
    /// The caller must make sure nothing else accesses `VREG_CTRL` and `VREG`
    /// while this value exists, and that the code runs on an RP2350 where
    /// both addresses are mapped.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl MemoryMappedRegister for Mmio {
    type Error = core::convert::Infallible;

    fn read(&mut self, address: RegisterAddress) -> RegisterValue {
        unsafe { ptr::read_volatile(address.addr() as *const u32) }
    }

    fn write(&mut self, address: RegisterAddress, value: RegisterValue) -> Result<(), Self::Error> {
        unsafe { ptr::write_volatile(address.addr() as *mut u32, value) };
        Ok(())
    }
}

/// Clears `VREG.VSEL` and keeps every other bit as it is.
pub const fn isolate_voltage_field(value: RegisterValue) -> RegisterValue {
    value & CLEAN_VSEL_VALUE_MASK
}

/// Moves a VSEL code into bits [8:4]. Bits of `code` that do not fit the
/// field are dropped.
pub const fn encode_field_bits(code: u8) -> RegisterValue {
    ((code as u32) << VSEL_SHIFT) & VSEL_FIELD_MASK
}

/// Extracts the VSEL code from a `VREG` value.
pub const fn decode_field_bits(value: RegisterValue) -> u8 {
    ((value & VSEL_FIELD_MASK) >> VSEL_SHIFT) as u8
}

/// Stores an already merged `VREG` value, adding the password.
pub fn write_voltage_register<R: MemoryMappedRegister>(
    regs: &mut R,
    merged_value: RegisterValue,
) -> Result<(), R::Error> {
    let value = merged_value | POWMAN_PASSWORD_BITS;
    trace!("VREG <- {=u32:#010x}", value);
    regs.write(RegisterAddress::VREG, value)
}
