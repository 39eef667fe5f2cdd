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

use crate::config::{Config, DEFAULT_UPDATE_POLL_LIMIT};
use crate::error::VregError;
use crate::register::{
    decode_field_bits, encode_field_bits, isolate_voltage_field, write_voltage_register,
    MemoryMappedRegister, RegisterAddress, POWMAN_PASSWORD_BITS, VREG_CTRL_UNLOCK_BITS,
    VREG_UPDATE_IN_PROGRESS_BITS,
};
use crate::voltage::{encode_voltage, VregVoltage};

/// Drives the core regulator through a [`MemoryMappedRegister`].
///
/// Nothing is cached: every call reads the registers fresh. The caller has to
/// serialize access if more than one context owns a regulator.
pub struct CoreVoltageRegulator<R> {
    regs: R,
    update_poll_limit: u32,
}

impl<R> CoreVoltageRegulator<R>
where
    R: MemoryMappedRegister,
{
    pub fn new(regs: R) -> Self {
        Self {
            regs,
            update_poll_limit: DEFAULT_UPDATE_POLL_LIMIT,
        }
    }

    pub fn with_config(regs: R, config: &Config) -> Self {
        Self {
            regs,
            update_poll_limit: config.update_poll_limit,
        }
    }

    pub fn release(self) -> R {
        self.regs
    }

    /// Sets `VREG_CTRL.UNLOCK`. Applying it again is harmless.
    pub fn enable_regulator_control(&mut self) -> Result<(), VregError<R::Error>> {
        let ctrl = self.regs.read(RegisterAddress::VREG_CTRL);
        self.write_ctrl(ctrl | VREG_CTRL_UNLOCK_BITS | POWMAN_PASSWORD_BITS)?;
        info!("regulator control unlocked");
        Ok(())
    }

    /// Clears `VREG_CTRL.UNLOCK`. Applying it again is harmless.
    ///
    /// The RP2350 ignores this once UNLOCK has been set; only a reset relocks.
    pub fn disable_regulator_control(&mut self) -> Result<(), VregError<R::Error>> {
        let ctrl = self.regs.read(RegisterAddress::VREG_CTRL);
        self.write_ctrl((ctrl & !VREG_CTRL_UNLOCK_BITS) | POWMAN_PASSWORD_BITS)?;
        if self.is_control_unlocked() {
            info!("regulator control stays unlocked until reset");
        } else {
            info!("regulator control locked");
        }
        Ok(())
    }

    pub fn is_control_unlocked(&mut self) -> bool {
        self.regs.read(RegisterAddress::VREG_CTRL) & VREG_CTRL_UNLOCK_BITS != 0
    }

    /// Switches the regulator output to `volts`.
    ///
    /// An unsupported voltage fails before any register is touched. Otherwise
    /// the current `VREG` content gets its VSEL field replaced and is stored
    /// with a single write.
    pub fn set_voltage(&mut self, volts: f32) -> Result<VregVoltage, VregError<R::Error>> {
        let voltage = encode_voltage(volts).map_err(|e| {
            info!("Voltage unchanged, {} is not a supported input", volts);
            e.widen()
        })?;

        if !self.wait_for_update() {
            warn!("VREG busy, {}mV not applied", voltage.millivolts());
            return Err(VregError::UpdateInProgress);
        }

        // clean before combining, xor is only a merge on a cleared field
        let merged =
            isolate_voltage_field(self.regs.read(RegisterAddress::VREG)) ^ encode_field_bits(voltage.bits());

        write_voltage_register(&mut self.regs, merged).map_err(|e| {
            error!("VREG write failed");
            VregError::PlatformWriteFault(e)
        })?;

        if !self.wait_for_update() {
            warn!("VREG still updating after {} polls", self.update_poll_limit);
        }

        info!("core voltage set to {}mV", voltage.millivolts());
        Ok(voltage)
    }

    /// Level currently selected in `VREG.VSEL`.
    pub fn voltage(&mut self) -> VregVoltage {
        let code = decode_field_bits(self.regs.read(RegisterAddress::VREG));
        // the field is 5 bits wide and the table has 32 entries
        VregVoltage::from_bits(code).unwrap_or(VregVoltage::VregVoltage1_10)
    }

    /// Boot sequence: unlock if asked to, then apply the boot voltage.
    pub fn apply_config(&mut self, config: &Config) -> Result<(), VregError<R::Error>> {
        self.update_poll_limit = config.update_poll_limit;

        if config.unlock_on_boot {
            self.enable_regulator_control()?;
        }

        if let Some(volts) = config.boot_voltage {
            self.set_voltage(volts)?;
        }

        Ok(())
    }

    fn write_ctrl(&mut self, value: u32) -> Result<(), VregError<R::Error>> {
        trace!("VREG_CTRL <- {=u32:#010x}", value);
        self.regs
            .write(RegisterAddress::VREG_CTRL, value)
            .map_err(|e| {
                error!("VREG_CTRL write failed");
                VregError::PlatformWriteFault(e)
            })
    }

    /// `true` once `UPDATE_IN_PROGRESS` reads clear, `false` if the poll budget ran out.
    fn wait_for_update(&mut self) -> bool {
        for _ in 0..=self.update_poll_limit {
            if self.regs.read(RegisterAddress::VREG) & VREG_UPDATE_IN_PROGRESS_BITS == 0 {
                return true;
            }
        }
        false
    }
}
