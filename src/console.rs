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

//! Line based command console on top of the regulator and the overclock triggers.
//!
//! ```text
//! vreg <volts>          select a core voltage, 0.85 ~ 1.30
//! unlock | lock         set or clear VREG_CTRL.UNLOCK
//! status                current voltage and lock state
//! test <mhz>            run the overclock stability test once
//! test-nonstop <mhz>    run the overclock stability test until stopped
//! find-clocks <mhz>     search the highest stable clock up to <mhz>
//! help
//! ```

use arrayvec::ArrayString;
use core::str::FromStr;

use crate::error::{ConsoleError, ParseError};
use crate::overclock::{
    find_max_stable_clock_frequency, run_overclock_stability_test,
    run_overclock_stability_test_non_stop, Dispatch, OverclockTest,
};
use crate::register::MemoryMappedRegister;
use crate::rp2350_core_voltage::CoreVoltageRegulator;
use crate::voltage::VregVoltage;

pub const MAX_LINE_LEN: usize = 64;

pub const HELP: &str = "commands: vreg <volts>, unlock, lock, status, test <mhz>, test-nonstop <mhz>, find-clocks <mhz>, help";

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    SetVoltage(f32),
    Unlock,
    Lock,
    Status,
    Test(f32),
    TestNonStop(f32),
    FindClocks(f32),
    Help,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    VoltageSet(VregVoltage),
    Unlocked,
    /// `still_unlocked` is set when the hardware kept UNLOCK.
    Locked { still_unlocked: bool },
    Status { voltage: VregVoltage, unlocked: bool },
    Delegated,
    /// No overclock test in this build.
    Unavailable,
    Help,
}

/// Collects bytes from a serial port into lines.
pub struct LineBuffer {
    line: ArrayString<MAX_LINE_LEN>,
    overflowed: bool,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            line: ArrayString::new_const(),
            overflowed: false,
        }
    }

    /// Feeds one received byte. Returns a finished line on CR or LF; blank
    /// lines are swallowed.
    pub fn push(&mut self, byte: u8) -> Option<Result<ArrayString<MAX_LINE_LEN>, ParseError>> {
        match byte {
            b'\r' | b'\n' => {
                let line = core::mem::take(&mut self.line);
                if core::mem::replace(&mut self.overflowed, false) {
                    return Some(Err(ParseError::LineTooLong));
                }
                if line.trim().is_empty() {
                    return None;
                }
                Some(Ok(line))
            }
            // backspace and delete
            0x08 | 0x7f => {
                self.line.pop();
                None
            }
            b' '..=b'~' => {
                if self.line.try_push(byte as char).is_err() {
                    self.overflowed = true;
                }
                None
            }
            _ => None,
        }
    }
}

impl From<Dispatch> for Reply {
    fn from(dispatch: Dispatch) -> Self {
        match dispatch {
            Dispatch::Delegated => Reply::Delegated,
            Dispatch::CollaboratorUnavailable => Reply::Unavailable,
        }
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn number<T: FromStr>(arg: Option<&str>) -> Result<T, ParseError> {
    arg.ok_or(ParseError::MissingArgument)?
        .parse::<T>()
        .map_err(|_| ParseError::InvalidNumber)
}

pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let mut words = line.split_ascii_whitespace();
    let name = words.next().ok_or(ParseError::Empty)?;
    let arg = words.next();

    let command = match name {
        "vreg" => Command::SetVoltage(number(arg)?),
        "test" => Command::Test(number(arg)?),
        "test-nonstop" => Command::TestNonStop(number(arg)?),
        "find-clocks" => Command::FindClocks(number(arg)?),
        "unlock" | "lock" | "status" | "help" => {
            if arg.is_some() {
                return Err(ParseError::TrailingInput);
            }
            match name {
                "unlock" => Command::Unlock,
                "lock" => Command::Lock,
                "status" => Command::Status,
                _ => Command::Help,
            }
        }
        _ => return Err(ParseError::UnknownCommand),
    };

    if words.next().is_some() {
        return Err(ParseError::TrailingInput);
    }

    Ok(command)
}

/// Runs one command. Failures come back as values, the console keeps going.
pub fn execute<R>(
    regulator: &mut CoreVoltageRegulator<R>,
    command: Command,
    overclock: Option<&mut dyn OverclockTest>,
) -> Result<Reply, ConsoleError<R::Error>>
where
    R: MemoryMappedRegister,
{
    debug!("executing {}", command);

    let reply = match command {
        Command::SetVoltage(volts) => Reply::VoltageSet(regulator.set_voltage(volts)?),
        Command::Unlock => {
            regulator.enable_regulator_control()?;
            Reply::Unlocked
        }
        Command::Lock => {
            regulator.disable_regulator_control()?;
            Reply::Locked {
                still_unlocked: regulator.is_control_unlocked(),
            }
        }
        Command::Status => Reply::Status {
            voltage: regulator.voltage(),
            unlocked: regulator.is_control_unlocked(),
        },
        Command::Test(mhz) => run_overclock_stability_test(mhz, overclock)?.into(),
        Command::TestNonStop(mhz) => run_overclock_stability_test_non_stop(mhz, overclock)?.into(),
        Command::FindClocks(mhz) => find_max_stable_clock_frequency(mhz, overclock)?.into(),
        Command::Help => Reply::Help,
    };

    Ok(reply)
}
